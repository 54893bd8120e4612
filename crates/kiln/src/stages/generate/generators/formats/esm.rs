use kiln_sourcemap::SourceJoiner;

use crate::{
  stages::generate::generators::ecmascript::RenderedModuleSources,
  types::generator::GenerateContext,
  utils::chunk::{
    render_chunk_exports::render_chunk_exports, render_chunk_imports::render_esm_chunk_imports,
    runtime_helpers::RuntimeHelpers,
  },
};

pub fn render_esm(
  ctx: &GenerateContext<'_>,
  module_sources: RenderedModuleSources,
) -> SourceJoiner<'static> {
  let mut source_joiner = SourceJoiner::new(ctx.options.sourcemap);

  if let Some(imports) = render_esm_chunk_imports(ctx) {
    source_joiner.append_source(imports);
  }

  // Imports are hoisted anyway, helpers only have to come before the modules.
  if let Some(helpers) = RuntimeHelpers::collect(ctx).render() {
    source_joiner.append_source(helpers);
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
