use kiln_sourcemap::SourceJoiner;
use kiln_utils::concat_string;

use crate::{
  stages::generate::generators::ecmascript::RenderedModuleSources,
  types::generator::GenerateContext,
  utils::chunk::{
    render_chunk_exports::render_chunk_exports, render_chunk_imports::render_cjs_chunk_imports,
    runtime_helpers::RuntimeHelpers,
  },
};

/// The whole bundle runs inside a function. With `name`, the exports become the value of a
/// global variable of that name.
pub fn render_iife(
  ctx: &GenerateContext<'_>,
  module_sources: RenderedModuleSources,
) -> SourceJoiner<'static> {
  let mut source_joiner = SourceJoiner::new(ctx.options.sourcemap);
  let exports = render_chunk_exports(ctx);

  source_joiner.append_source(match &ctx.options.name {
    Some(name) if exports.is_some() => concat_string!("var ", name, " = (function() {"),
    _ => "(function() {".to_string(),
  });
  source_joiner.append_source("\"use strict\";");

  if let Some(helpers) = RuntimeHelpers::collect(ctx).render() {
    source_joiner.append_source(helpers);
  }

  // Externals are still loaded with `require()`, the host has to provide it.
  if let Some(imports) = render_cjs_chunk_imports(ctx) {
    source_joiner.append_source(imports);
  }

  for emitted_sources in module_sources.into_iter().filter_map(|rendered| rendered.sources) {
    for source in emitted_sources {
      source_joiner.append_source(source);
    }
  }

  if let Some(exports) = exports {
    source_joiner.append_source(exports);
  }

  source_joiner.append_source("})();");

  source_joiner
}
