use kiln_common::{ImportKind, Module, NormalModule, OutputFormat, ResolvedImportRecord, StmtInfos};
use kiln_ecmascript::{Edits, StmtKind};
use kiln_utils::{
  concat_string,
  ecmascript::{quote, to_module_import_export_name},
};
use oxc_index::Idx;

use crate::types::generator::GenerateContext;

/// Rewrites the code of one module so that it can live in the top-level scope of its chunk.
pub struct ScopeHoistingFinalizer<'me, 'ctx> {
  pub ctx: &'me GenerateContext<'ctx>,
  pub module: &'me NormalModule,
}

impl ScopeHoistingFinalizer<'_, '_> {
  /// Drops statements that were tree shaken, import declarations and export clauses, strips
  /// `export` from declarations, renames every top-level binding to its canonical name in the
  /// chunk and points `import()` and `require()` at the code they load.
  pub fn finalize(&self) -> String {
    let source = self.module.source();
    let scanned = &self.module.ecma.scanned;
    let mut edits = Edits::default();
    let mut is_rendered = vec![false; scanned.stmts.len()];

    for (stmt_idx, stmt) in scanned.stmts.iter().enumerate() {
      let is_included = self.module.stmt_infos[StmtInfos::stmt_info_idx_of(stmt_idx)].is_included;
      match stmt.kind {
        _ if !is_included => edits.remove(stmt.span),
        StmtKind::Import { .. } | StmtKind::ExportClause => {
          match self.call_wrapped_importee(stmt_idx) {
            Some(call) => edits.replace(stmt.span, call),
            None => edits.remove(stmt.span),
          }
        }
        StmtKind::Plain => is_rendered[stmt_idx] = true,
        StmtKind::ExportDecl { keyword } => {
          edits.remove(keyword);
          is_rendered[stmt_idx] = true;
        }
        StmtKind::ExportDefaultDecl { keyword, name_insert } => {
          edits.remove(keyword);
          if let Some(at) = name_insert {
            edits.insert(at, self.default_export_name());
          }
          is_rendered[stmt_idx] = true;
        }
        StmtKind::ExportDefaultExpr { keyword } => {
          edits.replace(keyword, concat_string!("var ", self.default_export_name(), " = "));
          is_rendered[stmt_idx] = true;
        }
      }

      if is_rendered[stmt_idx] && self.ctx.options.keep_names {
        for (original, renamed) in self.renamed_values(stmt_idx) {
          edits.insert(
            stmt.span.end,
            concat_string!(" __name(", renamed, ", ", quote(original), ");"),
          );
        }
      }
    }

    let local_db = self.ctx.link_output.symbols.local_db(self.module.idx);
    for ident in &scanned.refs {
      if !is_rendered.get(ident.stmt as usize).copied().unwrap_or(false) {
        continue;
      }
      let name = ident.span.source_text(source);
      let Some(symbol_ref) = local_db.lookup(name) else { continue };
      let replacement = self.ctx.finalized_string_pattern_for_symbol_ref(symbol_ref);
      if replacement == name {
        continue;
      }
      if ident.is_shorthand() {
        edits.replace(ident.span, concat_string!(name, ": ", replacement));
      } else {
        edits.replace(ident.span, replacement);
      }
    }

    for rec in &self.module.import_records {
      let stmt_idx = rec.related_stmt_info_idx.index() - 1;
      if !is_rendered.get(stmt_idx).copied().unwrap_or(false) {
        continue;
      }
      let replacement = match rec.kind {
        ImportKind::DynamicImport => self.rewrite_dynamic_import(rec),
        ImportKind::Require => self.rewrite_require(rec),
        ImportKind::Import | ImportKind::EntryPoint => None,
      };
      if let Some(replacement) = replacement {
        edits.replace(rec.span, replacement);
      }
    }

    edits.apply(source)
  }

  /// The namespace object of the module, if anything uses it. Each export is a getter, so the
  /// object reflects later assignments.
  pub fn namespace_object_declaration(&self) -> Option<String> {
    if !self.module.stmt_infos[StmtInfos::NAMESPACE_STMT_IDX].is_included {
      return None;
    }
    let meta = &self.ctx.link_output.metadata[self.module.idx];
    if meta.wrapper_ref.is_some() {
      return None;
    }
    let mut s = concat_string!(
      "var ",
      self.ctx.canonical_name_for(self.module.namespace_object_ref),
      " = Object.freeze({\n  __proto__: null"
    );
    for name in &meta.sorted_resolved_exports {
      let value = self.ctx.finalized_string_pattern_for_symbol_ref(meta.resolved_exports[name]);
      s.push_str(&concat_string!(
        ",\n  get ",
        to_module_import_export_name(name),
        "() { return ",
        value,
        "; }"
      ));
    }
    s.push_str("\n});");
    Some(s)
  }

  /// The head and tail that wrap the code of a commonjs module, `None` for other modules.
  pub fn wrapper(&self) -> Option<(String, &'static str)> {
    let wrapper_ref = self.ctx.link_output.metadata[self.module.idx].wrapper_ref?;
    if !self.module.stmt_infos[StmtInfos::NAMESPACE_STMT_IDX].is_included {
      return None;
    }
    let head = concat_string!(
      "var ",
      self.ctx.canonical_name_for(wrapper_ref),
      " = __commonJS({ ",
      quote(self.module.stable_id.as_str()),
      "(exports, module) {"
    );
    Some((head, "} });"))
  }

  /// Functions and classes the statement binds whose binding was renamed, with their original
  /// name. Their `name` property has to be set back.
  pub fn renamed_values(&self, stmt_idx: usize) -> impl Iterator<Item = (&str, &str)> + '_ {
    let local_db = self.ctx.link_output.symbols.local_db(self.module.idx);
    self.module.ecma.scanned.stmts[stmt_idx].named_values.iter().filter_map(move |name| {
      let renamed = self.ctx.canonical_name_for(local_db.lookup(name)?);
      (renamed != name).then_some((name.as_str(), renamed))
    })
  }

  fn default_export_name(&self) -> &str {
    self.ctx.canonical_name_for(self.module.default_export_ref)
  }

  /// `import .. from` a wrapped module runs it where the import was written.
  fn call_wrapped_importee(&self, stmt_idx: usize) -> Option<String> {
    let stmt_info = &self.module.stmt_infos[StmtInfos::stmt_info_idx_of(stmt_idx)];
    let link_output = self.ctx.link_output;
    stmt_info.import_records.iter().find_map(|rec_idx| {
      let rec = &self.module.import_records[*rec_idx];
      let wrapper_ref = link_output.metadata[rec.resolved_module()].wrapper_ref?;
      let call = concat_string!(self.ctx.canonical_name_for(wrapper_ref), "()");
      Some(if stmt_info.declared_symbols.contains(&rec.namespace_ref) {
        let namespace = self.ctx.canonical_name_for(rec.namespace_ref);
        concat_string!("var ", namespace, " = __toESM(", call, ");")
      } else {
        concat_string!(call, ";")
      })
    })
  }

  /// `require()` of a wrapped module calls its wrapper, of an esm module it gives the namespace
  /// object. Externals are required at runtime as written.
  fn rewrite_require(&self, rec: &ResolvedImportRecord) -> Option<String> {
    let link_output = self.ctx.link_output;
    let Module::Normal(importee) = &link_output.module_table[rec.resolved_module()] else {
      return None;
    };
    Some(match link_output.metadata[importee.idx].wrapper_ref {
      Some(wrapper_ref) => concat_string!(self.ctx.canonical_name_for(wrapper_ref), "()"),
      None => self.ctx.canonical_name_for(importee.namespace_object_ref).to_string(),
    })
  }

  fn rewrite_dynamic_import(&self, rec: &ResolvedImportRecord) -> Option<String> {
    let Module::Normal(importee) = &self.ctx.link_output.module_table[rec.resolved_module()] else {
      // Externals are loaded at runtime as written.
      return None;
    };

    if !self.ctx.options.splitting {
      let namespace = match self.ctx.link_output.metadata[importee.idx].wrapper_ref {
        Some(wrapper_ref) => {
          concat_string!("__toESM(", self.ctx.canonical_name_for(wrapper_ref), "())")
        }
        None => self.ctx.canonical_name_for(importee.namespace_object_ref).to_string(),
      };
      return Some(concat_string!("Promise.resolve().then(() => ", namespace, ")"));
    }

    let chunk_graph = self.ctx.chunk_graph;
    let importee_chunk_idx = chunk_graph.entry_module_to_entry_chunk.get(&importee.idx)?;
    let importee_chunk = &chunk_graph.chunk_table[*importee_chunk_idx];
    let import_path = quote(&self.ctx.chunk.import_path_for(importee_chunk));
    Some(match self.ctx.options.format {
      OutputFormat::Esm => concat_string!("import(", import_path, ")"),
      OutputFormat::Cjs | OutputFormat::Iife => {
        concat_string!("Promise.resolve().then(() => require(", import_path, "))")
      }
    })
  }
}
