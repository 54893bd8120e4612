use std::path::Path;

use arcstr::ArcStr;
use futures::future::try_join_all;
use kiln_common::{
  AssetIdx, ChunkIdx, ChunkKind, InstantiatedChunk, InstantiationKind, Output, OutputAsset, OutputChunk,
  PreliminaryFilename, StrOrBytes,
};
use kiln_error::{BuildDiagnostic, BuildResult};
use kiln_utils::concat_string;
use oxc_index::{index_vec, IndexVec};

use crate::{
  types::{
    bundle_output::BundleOutput, chunk_graph::ChunkGraph, generator::GenerateContext,
    IndexInstantiatedChunks,
  },
  utils::{
    asset_filename::asset_filename,
    chunk::{
      finalize_chunks::{finalize_chunks, FinalizedChunk},
      render_chunk_exports::get_export_items,
    },
  },
};

use super::{
  generators::{css::CssGenerator, ecmascript::EcmaGenerator},
  GenerateStage,
};

/// A `.map` file, named after the chunk it belongs to.
pub(super) struct EmittedSourceMap {
  pub filename: String,
  pub json: String,
}

impl GenerateStage<'_> {
  pub(super) async fn render_chunk_to_assets(
    &mut self,
    chunk_graph: &ChunkGraph,
  ) -> BuildResult<BundleOutput> {
    let mut warnings = std::mem::take(&mut self.link_output.warnings);
    let instantiated_chunks = self.instantiate_chunks(chunk_graph, &mut warnings).await?;
    let mut finalized_chunks = finalize_chunks(instantiated_chunks);

    let mut chunk_filenames: IndexVec<ChunkIdx, Option<ArcStr>> =
      index_vec![None; chunk_graph.chunk_table.len()];
    let mut css_filenames: IndexVec<ChunkIdx, Option<ArcStr>> =
      index_vec![None; chunk_graph.chunk_table.len()];
    for finalized in &finalized_chunks {
      let slot = match finalized.inner.kind {
        InstantiationKind::Ecma => &mut chunk_filenames[finalized.inner.origin_chunk],
        InstantiationKind::Css => &mut css_filenames[finalized.inner.origin_chunk],
        InstantiationKind::Asset => continue,
      };
      *slot = Some(finalized.filename.as_str().into());
    }

    let source_maps = Self::attach_source_maps(&mut finalized_chunks);

    let limit = self.options.chunk_size_warning_limit;
    for finalized in &finalized_chunks {
      let size = finalized.inner.content.as_bytes().len();
      if finalized.inner.kind != InstantiationKind::Asset && size > limit {
        warnings.push(BuildDiagnostic::LargeChunk {
          filename: finalized.filename.as_str().into(),
          size,
          limit,
        });
      }
    }

    let metafile = self.generate_metafile(
      chunk_graph,
      &finalized_chunks,
      &chunk_filenames,
      &css_filenames,
      &source_maps,
    );

    let link_output = &*self.link_output;
    let module_table = &link_output.module_table;
    let mut chunks = vec![];
    let mut css_assets = vec![];
    let mut file_assets = vec![];
    for FinalizedChunk { filename, inner } in finalized_chunks {
      let module_ids = inner
        .rendered_modules
        .iter()
        .filter_map(|(idx, _)| module_table[*idx].as_normal().map(|module| module.id.clone()))
        .collect::<Vec<_>>();
      match inner.kind {
        InstantiationKind::Ecma => {
          let chunk = &chunk_graph.chunk_table[inner.origin_chunk];
          let code = match inner.content {
            StrOrBytes::Str(code) => code,
            StrOrBytes::Bytes(bytes) => String::from_utf8_lossy(&bytes).into_owned(),
          };
          let filenames_of = |chunk_ids: &[ChunkIdx]| {
            chunk_ids.iter().filter_map(|idx| chunk_filenames[*idx].clone()).collect::<Vec<_>>()
          };
          let mut imports = filenames_of(&chunk.cross_chunk_imports);
          imports.extend(chunk.imports_from_external_modules.iter().filter_map(|(idx, _)| {
            module_table[*idx].as_external().map(|external| external.name.clone())
          }));
          chunks.push(Output::Chunk(Box::new(OutputChunk {
            name: chunk.name.clone().unwrap_or_default(),
            is_entry: matches!(chunk.kind, ChunkKind::EntryPoint { is_user_defined: true, .. }),
            is_dynamic_entry: matches!(
              chunk.kind,
              ChunkKind::EntryPoint { is_user_defined: false, .. }
            ),
            facade_module_id: chunk
              .entry_module_idx()
              .and_then(|idx| module_table[idx].as_normal())
              .map(|module| module.id.clone()),
            module_ids,
            exports: get_export_items(chunk, link_output)
              .into_iter()
              .map(|(name, _)| name)
              .collect(),
            sourcemap_filename: self
              .options
              .sourcemap
              .then(|| ArcStr::from(concat_string!(filename, ".map"))),
            filename: filename.into(),
            imports,
            dynamic_imports: filenames_of(&chunk.cross_chunk_dynamic_imports),
            code,
            preliminary_filename: inner.preliminary_filename.to_string(),
          })));
        }
        InstantiationKind::Css => {
          let chunk = &chunk_graph.chunk_table[inner.origin_chunk];
          css_assets.push(Output::Asset(Box::new(OutputAsset {
            names: chunk.name.clone().into_iter().collect(),
            module_ids,
            filename: filename.into(),
            source: inner.content.into_bytes(),
          })));
        }
        InstantiationKind::Asset => {
          file_assets.push(Output::Asset(Box::new(OutputAsset {
            names: Path::new(&filename)
              .file_stem()
              .map(|stem| ArcStr::from(stem.to_string_lossy().as_ref()))
              .into_iter()
              .collect(),
            module_ids,
            filename: filename.into(),
            source: inner.content.into_bytes(),
          })));
        }
      }
    }

    let map_assets = source_maps.into_iter().map(|map| {
      Output::Asset(Box::new(OutputAsset {
        names: vec![],
        module_ids: vec![],
        filename: map.filename.into(),
        source: map.json.into_bytes(),
      }))
    });

    let mut assets = chunks;
    assets.extend(css_assets);
    assets.extend(map_assets);
    assets.extend(file_assets);

    warnings.extend(
      self
        .options
        .external
        .iter()
        .filter(|pattern| !link_output.used_externals.contains(pattern.as_str()))
        .map(|pattern| BuildDiagnostic::UnusedExternal { pattern: pattern.clone() }),
    );

    tracing::debug!(outputs = assets.len(), warnings = warnings.len(), "rendered assets");
    Ok(BundleOutput { assets, warnings, metafile })
  }

  async fn instantiate_chunks(
    &self,
    chunk_graph: &ChunkGraph,
    warnings: &mut Vec<BuildDiagnostic>,
  ) -> BuildResult<IndexInstantiatedChunks> {
    let mut index_preliminary_assets = IndexVec::with_capacity(chunk_graph.chunk_table.len());
    let link_output = &*self.link_output;

    let tasks = chunk_graph.chunk_table.iter_enumerated().map(|(chunk_idx, chunk)| async move {
      let mut ctx = GenerateContext {
        chunk_idx,
        chunk,
        chunk_graph,
        link_output,
        options: self.options,
        warnings: vec![],
      };
      let mut output = EcmaGenerator::instantiate_chunk(&mut ctx).await?;
      output.chunks.extend(CssGenerator::instantiate_chunk(&ctx));
      BuildResult::Ok(output)
    });

    let mut css_chunks = vec![];
    for result in try_join_all(tasks).await? {
      for chunk in result.chunks {
        match chunk.kind {
          InstantiationKind::Css => css_chunks.push(chunk),
          _ => {
            index_preliminary_assets.push(chunk);
          }
        }
      }
      warnings.extend(result.warnings);
    }
    index_preliminary_assets.extend(css_chunks);
    index_preliminary_assets.extend(self.instantiate_file_assets(chunk_graph));

    Ok(index_preliminary_assets)
  }

  /// Files copied by the `file` loader. Their names only depend on their content, so they are
  /// already final.
  fn instantiate_file_assets(&self, chunk_graph: &ChunkGraph) -> Vec<InstantiatedChunk> {
    let module_table = &self.link_output.module_table;
    self
      .link_output
      .sorted_modules
      .iter()
      .filter_map(|idx| module_table[*idx].as_normal())
      .filter(|module| module.is_included())
      .filter_map(|module| {
        let bytes = module.asset_source.as_ref()?;
        let origin_chunk = chunk_graph.module_to_chunk[module.idx]?;
        let filename = asset_filename(self.options, &module.id, bytes);
        Some(InstantiatedChunk {
          origin_chunk,
          kind: InstantiationKind::Asset,
          content: StrOrBytes::Bytes(bytes.to_vec()),
          preliminary_filename: PreliminaryFilename::new(filename, None),
          rendered_modules: vec![(module.idx, bytes.len())],
          map: None,
        })
      })
      .collect()
  }

  /// Serializes the source map of each JavaScript chunk and points the chunk at it.
  fn attach_source_maps(
    finalized_chunks: &mut IndexVec<AssetIdx, FinalizedChunk>,
  ) -> Vec<EmittedSourceMap> {
    let mut source_maps = vec![];
    for finalized in finalized_chunks.iter_mut() {
      let Some(map) = finalized.inner.map.take() else { continue };
      let StrOrBytes::Str(code) = &mut finalized.inner.content else { continue };
      let map_filename = concat_string!(finalized.filename, ".map");
      let basename = Path::new(&map_filename)
        .file_name()
        .map_or_else(|| map_filename.clone(), |name| name.to_string_lossy().into_owned());
      code.push_str(&concat_string!("//# sourceMappingURL=", basename, "\n"));
      source_maps.push(EmittedSourceMap { filename: map_filename, json: map.to_json_string() });
    }
    source_maps
  }
}
