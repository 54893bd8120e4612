use std::path::Path;

use arcstr::ArcStr;
use kiln_common::{
  AssetIdx, ChunkIdx, ExportsKind, ImportKind, InstantiationKind, Metafile, MetafileImport,
  MetafileInput, MetafileOutput, MetafileOutputInput, Module, ModuleIdx,
};
use kiln_utils::{indexmap::FxIndexMap, path_ext::PathExt};
use oxc_index::IndexVec;

use crate::{
  types::chunk_graph::ChunkGraph,
  utils::chunk::{finalize_chunks::FinalizedChunk, render_chunk_exports::get_export_items},
};

use super::{render_chunk_to_assets::EmittedSourceMap, GenerateStage};

impl GenerateStage<'_> {
  /// Describes what went into the build and where it ended up. Inputs are listed in execution
  /// order, outputs in the order of the returned assets.
  pub(super) fn generate_metafile(
    &self,
    chunk_graph: &ChunkGraph,
    finalized_chunks: &IndexVec<AssetIdx, FinalizedChunk>,
    chunk_filenames: &IndexVec<ChunkIdx, Option<ArcStr>>,
    css_filenames: &IndexVec<ChunkIdx, Option<ArcStr>>,
    source_maps: &[EmittedSourceMap],
  ) -> Metafile {
    let mut metafile = Metafile::default();
    let link_output = &*self.link_output;
    let module_table = &link_output.module_table;
    let output_path = |filename: &str| Path::new(&self.options.dir).join(filename).to_slash_string();

    for &idx in &link_output.sorted_modules {
      let Module::Normal(module) = &module_table[idx] else { continue };
      let imports = module
        .import_records
        .iter()
        .map(|rec| {
          let importee = &module_table[rec.resolved_module()];
          MetafileImport {
            path: importee.stable_id().to_string(),
            kind: rec.kind.as_str(),
            external: importee.is_external(),
          }
        })
        .collect::<Vec<_>>();
      let format = match module.exports_kind {
        ExportsKind::Esm => Some("esm"),
        ExportsKind::CommonJs => Some("cjs"),
        ExportsKind::None => None,
      };
      metafile.inputs.insert(
        module.stable_id.clone(),
        MetafileInput {
          bytes: module.original_source.len(),
          imports,
          format,
        },
      );
    }

    let inputs_of = |rendered_modules: &[(ModuleIdx, usize)]| {
      rendered_modules
        .iter()
        .map(|(idx, bytes)| {
          (
            module_table[*idx].stable_id().to_string(),
            MetafileOutputInput { bytes_in_output: *bytes },
          )
        })
        .collect::<FxIndexMap<_, _>>()
    };
    let chunk_output_path =
      |idx: &ChunkIdx| chunk_filenames[*idx].as_ref().map(|filename| output_path(filename));

    let mut css_outputs = vec![];
    let mut file_outputs = vec![];
    for finalized in finalized_chunks {
      let inner = &finalized.inner;
      let output = MetafileOutput {
        bytes: inner.content.as_bytes().len(),
        inputs: inputs_of(inner.rendered_modules.as_slice()),
        ..MetafileOutput::default()
      };
      match inner.kind {
        InstantiationKind::Ecma => {
          let chunk = &chunk_graph.chunk_table[inner.origin_chunk];
          let mut imports = chunk
            .cross_chunk_imports
            .iter()
            .filter_map(chunk_output_path)
            .map(|path| MetafileImport {
              path,
              kind: ImportKind::Import.as_str(),
              external: false,
            })
            .collect::<Vec<_>>();
          imports.extend(chunk.imports_from_external_modules.iter().filter_map(|(idx, _)| {
            module_table[*idx].as_external().map(|external| MetafileImport {
              path: external.name.to_string(),
              kind: ImportKind::Import.as_str(),
              external: true,
            })
          }));
          imports.extend(chunk.cross_chunk_dynamic_imports.iter().filter_map(chunk_output_path).map(
            |path| MetafileImport { path, kind: ImportKind::DynamicImport.as_str(), external: false },
          ));

          metafile.outputs.insert(
            output_path(&finalized.filename),
            MetafileOutput {
              imports,
              exports: get_export_items(chunk, link_output)
                .into_iter()
                .map(|(name, _)| name.to_string())
                .collect(),
              entry_point: chunk
                .entry_module_idx()
                .map(|idx| module_table[idx].stable_id().to_string()),
              css_bundle: css_filenames[inner.origin_chunk]
                .as_ref()
                .map(|filename| output_path(filename)),
              ..output
            },
          );
        }
        InstantiationKind::Css => css_outputs.push((output_path(&finalized.filename), output)),
        InstantiationKind::Asset => file_outputs.push((output_path(&finalized.filename), output)),
      }
    }

    metafile.outputs.extend(css_outputs);
    metafile.outputs.extend(source_maps.iter().map(|map| {
      (output_path(&map.filename), MetafileOutput { bytes: map.json.len(), ..MetafileOutput::default() })
    }));
    metafile.outputs.extend(file_outputs);

    metafile
  }
}
