use arcstr::ArcStr;
use kiln_common::NormalModule;
use kiln_sourcemap::{LineOrigin, Source, SourceMapSource};
use kiln_utils::{concat_string, line_index::lines_count};

use crate::{
  stages::generate::scope_hoisting::ScopeHoistingFinalizer, types::generator::GenerateContext,
};

pub type RenderedSources = Vec<Box<dyn Source + Send + Sync>>;

/// The output of one module, wrapped in `//#region` markers. `None` when nothing of the module
/// survives tree shaking.
pub fn render_ecma_module(
  ctx: &GenerateContext<'_>,
  module: &NormalModule,
) -> Option<RenderedSources> {
  let finalizer = ScopeHoistingFinalizer { ctx, module };
  let code = finalizer.finalize();
  let namespace = finalizer.namespace_object_declaration();
  let wrapper = finalizer.wrapper();

  // Leading blank lines are dropped, the first kept line still maps to its input line.
  let trimmed_start = code.trim_start_matches(['\n', '\r', ' ', '\t']);
  let skipped = &code[..code.len() - trimmed_start.len()];
  let first_line = lines_count(skipped);
  let body = trimmed_start.trim_end().to_string();

  if body.is_empty() && namespace.is_none() && wrapper.is_none() {
    return None;
  }

  // Markers only help readers, the minifier drops comments anyway.
  let with_region = !ctx.options.minify;
  let mut sources: RenderedSources = vec![];
  if with_region {
    sources.push(Box::new(concat_string!("//#region ", module.debug_id)));
  }
  if let Some(namespace) = namespace {
    sources.push(Box::new(namespace));
  }
  if let Some((head, _)) = &wrapper {
    sources.push(Box::new(head.clone()));
  }
  if !body.is_empty() {
    sources.push(Box::new(SourceMapSource::new(
      body,
      LineOrigin {
        source: ArcStr::from(module.stable_id.as_str()),
        source_content: Some(module.original_source.clone()),
        first_line,
        line_map: module.ecma.line_map.clone(),
      },
    )));
  }
  if let Some((_, tail)) = wrapper {
    sources.push(Box::new(tail));
  }
  if with_region {
    sources.push(Box::new("//#endregion"));
  }

  Some(sources)
}
