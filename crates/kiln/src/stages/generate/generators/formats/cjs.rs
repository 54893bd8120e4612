use kiln_sourcemap::SourceJoiner;

use crate::{
  stages::generate::generators::ecmascript::RenderedModuleSources,
  types::generator::GenerateContext,
  utils::chunk::{
    render_chunk_exports::render_chunk_exports, render_chunk_imports::render_cjs_chunk_imports,
    runtime_helpers::RuntimeHelpers,
  },
};

pub fn render_cjs(
  ctx: &GenerateContext<'_>,
  module_sources: RenderedModuleSources,
) -> SourceJoiner<'static> {
  let mut source_joiner = SourceJoiner::new(ctx.options.sourcemap);

  if ctx.renderable_ecma_modules().next().is_some() {
    source_joiner.append_source("\"use strict\";");
  }

  // Helpers go before the `require()` calls that use them.
  if let Some(helpers) = RuntimeHelpers::collect(ctx).render() {
    source_joiner.append_source(helpers);
  }

  if let Some(imports) = render_cjs_chunk_imports(ctx) {
    source_joiner.append_source(imports);
  }

  for emitted_sources in module_sources.into_iter().filter_map(|rendered| rendered.sources) {
    for source in emitted_sources {
      source_joiner.append_source(source);
    }
  }

  if let Some(exports) = render_chunk_exports(ctx) {
    source_joiner.append_source(exports);
  }

  source_joiner
}
