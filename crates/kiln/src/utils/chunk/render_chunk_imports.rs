use kiln_common::{CrossChunkImportItem, Specifier};
use kiln_utils::{
  concat_string,
  ecmascript::{quote, to_module_import_export_name},
  indexmap::FxIndexSet,
};

use crate::types::generator::GenerateContext;

pub fn render_esm_chunk_imports(ctx: &GenerateContext<'_>) -> Option<String> {
  let mut s = String::new();

  for (importee_id, items) in &ctx.chunk.imports_from_other_chunks {
    let importee_chunk = &ctx.chunk_graph.chunk_table[*importee_id];
    let import_path = quote(&ctx.chunk.import_path_for(importee_chunk));
    if items.is_empty() {
      s.push_str(&concat_string!("import ", import_path, ";\n"));
      continue;
    }
    let specifiers = items
      .iter()
      .map(|item| {
        let local = ctx.canonical_name_for(item.import_ref);
        let imported = exported_name_of(ctx, item);
        if imported == local {
          local.to_string()
        } else {
          concat_string!(to_module_import_export_name(&imported), " as ", local)
        }
      })
      .collect::<FxIndexSet<_>>();
    let specifiers = specifiers.into_iter().collect::<Vec<_>>().join(", ");
    s.push_str(&concat_string!("import { ", specifiers, " } from ", import_path, ";\n"));
  }

  for (importee_id, named_imports) in &ctx.chunk.imports_from_external_modules {
    let Some(external) = ctx.link_output.module_table[*importee_id].as_external() else {
      continue;
    };
    let import_path = quote(&external.name);
    let mut namespaces = FxIndexSet::default();
    let mut specifiers = FxIndexSet::default();
    for named_import in named_imports {
      let local = ctx.canonical_name_for(named_import.imported_as);
      match &named_import.imported {
        Specifier::Star => {
          namespaces.insert(local);
        }
        Specifier::Literal(imported) => {
          specifiers.insert(if imported.as_str() == local {
            local.to_string()
          } else {
            concat_string!(to_module_import_export_name(imported), " as ", local)
          });
        }
      }
    }

    for namespace in &namespaces {
      s.push_str(&concat_string!("import * as ", namespace, " from ", import_path, ";\n"));
    }
    if !specifiers.is_empty() {
      let specifiers = specifiers.into_iter().collect::<Vec<_>>().join(", ");
      s.push_str(&concat_string!("import { ", specifiers, " } from ", import_path, ";\n"));
    } else if namespaces.is_empty() {
      s.push_str(&concat_string!("import ", import_path, ";\n"));
    }
  }

  finish(s)
}

/// `require()` calls for other chunks and externals, in cjs and iife output. Named imports of
/// an external are read off its namespace, so an external only needs one binding.
pub fn render_cjs_chunk_imports(ctx: &GenerateContext<'_>) -> Option<String> {
  let mut s = String::new();

  for (importee_id, items) in &ctx.chunk.imports_from_other_chunks {
    let importee_chunk = &ctx.chunk_graph.chunk_table[*importee_id];
    let import_path = quote(&ctx.chunk.import_path_for(importee_chunk));
    let require_call = concat_string!("require(", import_path, ")");
    if items.is_empty() {
      s.push_str(&concat_string!(require_call, ";\n"));
      continue;
    }
    let bindings = items
      .iter()
      .map(|item| {
        let local = ctx.canonical_name_for(item.import_ref);
        let imported = exported_name_of(ctx, item);
        if imported == local {
          local.to_string()
        } else {
          concat_string!(quote(&imported), ": ", local)
        }
      })
      .collect::<FxIndexSet<_>>();
    let bindings = bindings.into_iter().collect::<Vec<_>>().join(", ");
    s.push_str(&concat_string!("const { ", bindings, " } = ", require_call, ";\n"));
  }

  for (importee_id, named_imports) in &ctx.chunk.imports_from_external_modules {
    let Some(external) = ctx.link_output.module_table[*importee_id].as_external() else {
      continue;
    };
    let import_path = quote(&external.name);
    let require_call = concat_string!("require(", import_path, ")");
    if named_imports.is_empty() {
      s.push_str(&concat_string!(require_call, ";\n"));
    } else {
      s.push_str(&concat_string!(
        "const ",
        ctx.canonical_name_for(external.namespace_ref),
        " = __toESM(",
        require_call,
        ");\n"
      ));
    }
  }

  finish(s)
}

fn exported_name_of(ctx: &GenerateContext<'_>, item: &CrossChunkImportItem) -> String {
  match &item.export_alias {
    Some(Specifier::Literal(alias)) => alias.to_string(),
    _ => item.import_ref.name(&ctx.link_output.symbols).to_string(),
  }
}

fn finish(mut s: String) -> Option<String> {
  if s.is_empty() {
    None
  } else {
    s.truncate(s.trim_end().len());
    Some(s)
  }
}
