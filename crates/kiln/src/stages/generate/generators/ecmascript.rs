use anyhow::Context;
use kiln_common::{InstantiatedChunk, InstantiationKind, ModuleIdx, OutputFormat, StrOrBytes};
use kiln_ecmascript::{EcmaCompiler, EcmaErrorKind};
use kiln_error::{BuildDiagnostic, BuildResult, Location};
use kiln_sourcemap::{remap_through, MappedSource, Source, SourceJoiner, SourceMap};
use kiln_utils::rayon::{IntoParallelRefIterator, ParallelIterator};

use crate::{
  types::generator::{GenerateContext, GenerateOutput},
  utils::render_ecma_module::{render_ecma_module, RenderedSources},
};

use super::formats::{cjs::render_cjs, esm::render_esm, iife::render_iife};

pub struct RenderedModuleSource {
  pub module_idx: ModuleIdx,
  pub sources: Option<RenderedSources>,
}

impl RenderedModuleSource {
  pub fn new(module_idx: ModuleIdx, sources: Option<RenderedSources>) -> Self {
    Self { module_idx, sources }
  }

  /// Bytes the module takes up in the output, line breaks between its sources included.
  fn rendered_len(&self) -> usize {
    self.sources.as_ref().map_or(0, |sources| {
      sources.iter().map(|source| source.content().len() + 1).sum::<usize>()
    })
  }
}

pub type RenderedModuleSources = Vec<RenderedModuleSource>;

pub struct EcmaGenerator;

impl EcmaGenerator {
  pub async fn instantiate_chunk(ctx: &mut GenerateContext<'_>) -> BuildResult<GenerateOutput> {
    let shared_ctx = &*ctx;
    let rendered_modules = shared_ctx
      .chunk
      .modules
      .par_iter()
      .filter_map(|id| shared_ctx.link_output.module_table[*id].as_normal())
      .filter(|module| module.is_included())
      .map(|module| RenderedModuleSource::new(module.idx, render_ecma_module(shared_ctx, module)))
      .collect::<Vec<_>>();

    let rendered_lens = rendered_modules
      .iter()
      .filter(|rendered| rendered.sources.is_some())
      .map(|rendered| (rendered.module_idx, rendered.rendered_len()))
      .collect::<Vec<_>>();

    let preliminary_filename = ctx
      .chunk
      .preliminary_filename
      .clone()
      .context("Chunk file names are generated before rendering")?;

    let body_joiner = match ctx.options.format {
      OutputFormat::Esm => render_esm(ctx, rendered_modules),
      OutputFormat::Cjs => render_cjs(ctx, rendered_modules),
      OutputFormat::Iife => render_iife(ctx, rendered_modules),
    };
    let (body, body_map) = body_joiner.join();
    let (body, body_map) = if ctx.options.minify {
      minify_chunk(&body, body_map.as_ref(), preliminary_filename.as_arcstr().as_str())?
    } else {
      (body, body_map)
    };

    // Banner and footer are emitted as given, minified or not.
    let mut source_joiner = SourceJoiner::new(ctx.options.sourcemap);
    if let Some(banner) = &ctx.options.banner {
      source_joiner.append_source(banner.clone());
    }
    source_joiner.append_source(MappedSource::new(body, body_map));
    if let Some(footer) = &ctx.options.footer {
      source_joiner.append_source(footer.clone());
    }

    let (mut content, map) = source_joiner.join();
    content.push('\n');

    Ok(GenerateOutput {
      chunks: vec![InstantiatedChunk {
        origin_chunk: ctx.chunk_idx,
        kind: InstantiationKind::Ecma,
        content: StrOrBytes::Str(content),
        preliminary_filename,
        rendered_modules: rendered_lens,
        map,
      }],
      warnings: std::mem::take(&mut ctx.warnings),
    })
  }
}

/// Minifies the joined chunk as one program, so names are mangled and statements merged across
/// modules. The map of the result points through `map` back at the inputs.
fn minify_chunk(
  code: &str,
  map: Option<&SourceMap>,
  filename: &str,
) -> BuildResult<(String, Option<SourceMap>)> {
  let ret = EcmaCompiler::minify(code, map.is_some()).map_err(|errors| {
    errors
      .into_iter()
      .map(|err| BuildDiagnostic::Syntax {
        loc: Location::new(filename, err.line, err.column),
        message: match err.kind {
          EcmaErrorKind::Syntax(message) => message,
          EcmaErrorKind::Unsupported { construct, .. } => construct.to_string(),
        },
      })
      .collect::<Vec<_>>()
  })?;

  let map = map.zip(ret.mappings).map(|(map, mappings)| {
    remap_through(
      map,
      mappings.into_iter().map(|m| (m.dst_line, m.dst_col, m.src_line, m.src_col)),
    )
  });
  Ok((ret.code, map))
}
