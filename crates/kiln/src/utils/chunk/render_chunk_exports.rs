use arcstr::ArcStr;
use kiln_common::{Chunk, ChunkKind, ExternalModule, OutputFormat, SymbolRef};
use kiln_utils::{
  concat_string,
  ecmascript::{quote, to_module_import_export_name},
  indexmap::FxIndexSet,
};

use crate::{stages::link::LinkStageOutput, types::generator::GenerateContext};

pub fn render_chunk_exports(ctx: &GenerateContext<'_>) -> Option<String> {
  let export_items = get_export_items(ctx.chunk, ctx.link_output);
  // An entry that is a wrapped commonjs module exports whatever its `module.exports` is.
  let entry_exports_call = wrapped_entry_call(ctx);

  match ctx.options.format {
    OutputFormat::Esm => {
      let mut s = String::new();
      if let Some(call) = &entry_exports_call {
        s.push_str(&concat_string!("export default ", call, ";"));
      }
      if !export_items.is_empty() {
        let mut rendered_items = Vec::with_capacity(export_items.len());
        for (exported_name, export_ref) in &export_items {
          let canonical_name = ctx.canonical_name_for(*export_ref);
          // A read off a namespace, such as an import of a commonjs module, needs a binding.
          let value = ctx.finalized_string_pattern_for_symbol_ref(*export_ref);
          if value != canonical_name {
            push_line(&mut s, &concat_string!("var ", canonical_name, " = ", value, ";"));
          }
          rendered_items.push(if canonical_name == exported_name.as_str() {
            canonical_name.to_string()
          } else {
            concat_string!(canonical_name, " as ", to_module_import_export_name(exported_name))
          });
        }
        let rendered_items = rendered_items.join(", ");
        push_line(&mut s, &concat_string!("export { ", rendered_items, " };"));
      }
      for external in star_exported_externals(ctx) {
        push_line(&mut s, &concat_string!("export * from ", quote(&external.name), ";"));
      }
      (!s.is_empty()).then_some(s)
    }
    OutputFormat::Cjs => {
      let mut s = String::new();
      if let Some(call) = &entry_exports_call {
        s.push_str(&concat_string!("module.exports = ", call, ";"));
      } else if !export_items.is_empty() {
        s.push_str("Object.defineProperty(exports, '__esModule', { value: true });");
      }
      for (exported_name, export_ref) in &export_items {
        s.push('\n');
        s.push_str(&render_object_define_property(
          exported_name,
          &ctx.finalized_string_pattern_for_symbol_ref(*export_ref),
        ));
      }

      for external in star_exported_externals(ctx) {
        let binding_name = ctx.canonical_name_for(external.namespace_ref);
        let import_stmt = "Object.keys($NAME).forEach(function (k) {
  if (k !== 'default' && !Object.prototype.hasOwnProperty.call(exports, k)) Object.defineProperty(exports, k, {
    enumerable: true,
    get: function () { return $NAME[k]; }
  });
});"
        .replace("$NAME", binding_name);
        s.push_str(&concat_string!(
          "\nvar ",
          binding_name,
          " = require(",
          quote(&external.name),
          ");\n",
          import_stmt
        ));
      }

      let s = s.trim_start_matches('\n');
      (!s.is_empty()).then(|| s.to_string())
    }
    OutputFormat::Iife => {
      if let Some(call) = entry_exports_call {
        return Some(if ctx.options.name.is_some() {
          concat_string!("return ", call, ";")
        } else {
          concat_string!(call, ";")
        });
      }
      // Only a named bundle exposes its exports, as the value of the global.
      if ctx.options.name.is_none() || export_items.is_empty() {
        return None;
      }
      let getters = export_items
        .iter()
        .map(|(exported_name, export_ref)| {
          concat_string!(
            "  get ",
            to_module_import_export_name(exported_name),
            "() { return ",
            ctx.finalized_string_pattern_for_symbol_ref(*export_ref),
            "; }"
          )
        })
        .collect::<Vec<_>>();
      let getters = getters.join(",\n");
      Some(concat_string!("return {\n", getters, "\n};"))
    }
  }
}

#[inline]
pub fn render_object_define_property(key: &str, value: &str) -> String {
  concat_string!(
    "Object.defineProperty(exports, ",
    quote(key),
    ", {
  enumerable: true,
  get: function () {
    return ",
    value,
    ";
  }
});"
  )
}

/// What the chunk exports. Entries export what their module exports, sorted by name, followed
/// by what other chunks import from them, sorted by alias.
pub fn get_export_items(chunk: &Chunk, link_output: &LinkStageOutput) -> Vec<(ArcStr, SymbolRef)> {
  let mut items = match chunk.kind {
    ChunkKind::EntryPoint { module, .. } => link_output.metadata[module]
      .canonical_exports(&link_output.symbols)
      .map(|(name, export_ref)| (name.clone(), export_ref))
      .collect::<Vec<_>>(),
    ChunkKind::Common => vec![],
  };

  let mut cross_chunk_exports = chunk
    .exports_to_other_chunks
    .iter()
    .map(|(export_ref, alias)| (alias.clone(), *export_ref))
    .collect::<Vec<_>>();
  cross_chunk_exports.sort_unstable_by(|a, b| a.0.as_str().cmp(b.0.as_str()));
  items.extend(cross_chunk_exports);

  items
}

/// `export * from "external"` of the entry module, which the chunk forwards at runtime.
fn star_exported_externals<'a>(
  ctx: &'a GenerateContext<'_>,
) -> impl Iterator<Item = &'a ExternalModule> + 'a {
  let entry = ctx.chunk.entry_module(&ctx.link_output.module_table);
  entry
    .into_iter()
    .flat_map(move |entry| {
      ctx.link_output.metadata[entry.idx]
        .star_exports_from_external_modules
        .iter()
        .map(move |rec_idx| entry.import_records[*rec_idx].resolved_module())
    })
    .collect::<FxIndexSet<_>>()
    .into_iter()
    .filter_map(|idx| ctx.link_output.module_table[idx].as_external())
}

/// `require_x()` when the chunk's entry module is wrapped commonjs.
fn wrapped_entry_call(ctx: &GenerateContext<'_>) -> Option<String> {
  let entry = ctx.chunk.entry_module_idx()?;
  let wrapper_ref = ctx.link_output.metadata[entry].wrapper_ref?;
  Some(concat_string!(ctx.canonical_name_for(wrapper_ref), "()"))
}

fn push_line(s: &mut String, line: &str) {
  if !s.is_empty() {
    s.push('\n');
  }
  s.push_str(line);
}
