use kiln_common::{
  side_effects::DeterminedSideEffects, EntryPoint, ImportKind, Module, ModuleIdx, NormalModule,
  NormalModuleMeta, StmtInfoIdx, SymbolRef, SymbolRefDb,
};
use kiln_utils::rayon::{IntoParallelRefMutIterator, ParallelIterator};
use oxc_index::IndexVec;

use super::LinkStage;
use crate::types::{linking_metadata::LinkingMetadataVec, IndexModules};

struct Context<'a> {
  module_table: &'a IndexModules,
  symbols: &'a SymbolRefDb,
  is_included_vec: &'a mut IndexVec<ModuleIdx, IndexVec<StmtInfoIdx, bool>>,
  is_module_included_vec: &'a mut IndexVec<ModuleIdx, bool>,
  tree_shaking: bool,
  /// Without code splitting, `import()` resolves to the namespace object of a module bundled
  /// into the same chunk.
  inline_dynamic_imports: bool,
  metas: &'a LinkingMetadataVec,
}

/// If no export is used and the module has no side effects, the module is left out.
fn include_module(ctx: &mut Context, module: &NormalModule) {
  if ctx.is_module_included_vec[module.idx] {
    return;
  }
  ctx.is_module_included_vec[module.idx] = true;
  tracing::trace!(module = %module.stable_id, "include module");

  if ctx.metas[module.idx].wrapper_ref.is_some() {
    // The body runs as one function, nothing in it can be left out.
    for stmt_info_id in module.stmt_infos.indices() {
      include_statement(ctx, module, stmt_info_id);
    }
  } else if ctx.tree_shaking && !matches!(module.side_effects, DeterminedSideEffects::NoTreeshake)
  {
    // The namespace statement never has side effects, it is only included when used.
    for (stmt_info_id, stmt_info) in module.stmt_infos.iter_enumerated() {
      if stmt_info.side_effect {
        include_statement(ctx, module, stmt_info_id);
      }
    }
  } else {
    for stmt_info_id in module.stmt_infos.indices().skip(1) {
      include_statement(ctx, module, stmt_info_id);
    }
  }

  // Imported modules run for their side effects. Wrapped ones only run when a statement that
  // calls `require_x()` is included.
  for &dependency_idx in &ctx.metas[module.idx].dependencies {
    if ctx.metas[dependency_idx].wrapper_ref.is_some() {
      continue;
    }
    if let Module::Normal(importee) = &ctx.module_table[dependency_idx] {
      if !ctx.tree_shaking || importee.side_effects.has_side_effects() {
        include_module(ctx, importee);
      }
    }
  }
}

fn include_symbol(ctx: &mut Context, symbol_ref: SymbolRef) {
  let mut canonical_ref = ctx.symbols.canonical_ref_for(symbol_ref);
  if let Some(namespace_alias) = &ctx.symbols.get(canonical_ref).namespace_alias {
    canonical_ref = namespace_alias.namespace_ref;
  }

  let mut include_symbol_impl = |symbol_ref: SymbolRef| {
    if let Module::Normal(module) = &ctx.module_table[symbol_ref.owner] {
      include_module(ctx, module);
      for &stmt_info_id in module.stmt_infos.declared_stmts_by_symbol(&symbol_ref) {
        include_statement(ctx, module, stmt_info_id);
      }
    }
  };

  // The symbol itself, which may be an import declared by an import statement.
  include_symbol_impl(symbol_ref);
  if symbol_ref != canonical_ref {
    // And the declaration it is bound to.
    include_symbol_impl(canonical_ref);
  }
}

fn include_statement(ctx: &mut Context, module: &NormalModule, stmt_info_id: StmtInfoIdx) {
  let is_included = &mut ctx.is_included_vec[module.idx][stmt_info_id];
  if *is_included {
    return;
  }
  *is_included = true;

  let stmt_info = &module.stmt_infos[stmt_info_id];
  for &symbol_ref in &stmt_info.referenced_symbols {
    include_symbol(ctx, symbol_ref);
  }

  if ctx.inline_dynamic_imports {
    for &rec_idx in &stmt_info.import_records {
      let rec = &module.import_records[rec_idx];
      if rec.kind != ImportKind::DynamicImport {
        continue;
      }
      if let Module::Normal(importee) = &ctx.module_table[rec.resolved_module()] {
        // Wrapped modules are reached through the `require_x` the statement references.
        if ctx.metas[importee.idx].wrapper_ref.is_none() {
          include_symbol(ctx, importee.namespace_object_ref);
        }
      }
    }
  }
}

fn include_entry(ctx: &mut Context, entry: &EntryPoint) {
  let Module::Normal(module) = &ctx.module_table[entry.id] else {
    return;
  };
  for &symbol_ref in &ctx.metas[entry.id].referenced_symbols_by_entry_point_chunk {
    include_symbol(ctx, symbol_ref);
  }
  include_module(ctx, module);
}

impl LinkStage<'_> {
  /// Marks the statements and modules that end up in the output. Entries are the roots. With
  /// code splitting a dynamic entry only lives if one of the `import()` calls that create it is
  /// included, which can depend on other dynamic entries, so they are revisited until nothing
  /// changes.
  pub(crate) fn include_statements(&mut self) {
    let splitting = self.options.splitting;
    if !splitting {
      self.entry_points.retain(|entry| entry.kind.is_user_defined());
    }

    let mut is_included_vec = self
      .module_table
      .iter()
      .map(|m| {
        m.as_normal().map_or(IndexVec::default(), |m| {
          m.stmt_infos.iter().map(|_| false).collect::<IndexVec<StmtInfoIdx, _>>()
        })
      })
      .collect::<IndexVec<ModuleIdx, _>>();

    let mut is_module_included_vec = oxc_index::index_vec![false; self.module_table.len()];

    let context = &mut Context {
      module_table: &self.module_table,
      symbols: &self.symbols,
      is_included_vec: &mut is_included_vec,
      is_module_included_vec: &mut is_module_included_vec,
      tree_shaking: self.options.tree_shaking,
      inline_dynamic_imports: !splitting,
      metas: &self.metadata,
    };

    for entry in self.entry_points.iter().filter(|entry| entry.kind.is_user_defined()) {
      include_entry(context, entry);
    }

    let mut lived = self
      .entry_points
      .iter()
      .map(|entry| entry.kind.is_user_defined())
      .collect::<Vec<_>>();
    loop {
      let mut changed = false;
      for (entry, lived) in self.entry_points.iter().zip(lived.iter_mut()) {
        if *lived {
          continue;
        }
        let created = entry
          .related_stmt_infos
          .iter()
          .any(|(module_idx, stmt_idx)| context.is_included_vec[*module_idx][*stmt_idx]);
        if created {
          include_entry(context, entry);
          *lived = true;
          changed = true;
        }
      }
      if !changed {
        break;
      }
    }

    let mut lived = lived.into_iter();
    self.entry_points.retain(|_| lived.next().unwrap_or(false));

    self.module_table.par_iter_mut().for_each(|module| {
      if let Module::Normal(module) = module {
        module.meta.set(NormalModuleMeta::INCLUDED, is_module_included_vec[module.idx]);
        for (stmt_info_id, is_included) in is_included_vec[module.idx].iter_enumerated() {
          module.stmt_infos[stmt_info_id].is_included = *is_included;
        }
      }
    });
  }
}
