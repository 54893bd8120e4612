use std::collections::hash_map::Entry;

use arcstr::ArcStr;
use kiln_common::{ChunkIdx, ChunkKind};
use kiln_utils::{
  concat_string,
  hash_placeholder::HashPlaceholderGenerator,
  path_ext::PathExt,
  rayon::{IntoParallelRefIterator, ParallelIterator},
  sanitize_file_name::sanitize_file_name,
};
use oxc_index::IndexVec;
use rustc_hash::FxHashMap;
use sugar_path::SugarPath;

use crate::types::chunk_graph::ChunkGraph;

use super::GenerateStage;

impl GenerateStage<'_> {
  /// Notices:
  /// - Should generate filenames that are stable cross builds and os.
  pub(super) fn generate_chunk_name_and_preliminary_filenames(&self, chunk_graph: &mut ChunkGraph) {
    let module_table = &self.link_output.module_table;

    let index_pre_generated_names: IndexVec<ChunkIdx, ArcStr> = chunk_graph
      .chunk_table
      .par_iter()
      .map(|chunk| {
        if let Some(name) = &chunk.name {
          return name.clone();
        }
        match chunk.kind {
          ChunkKind::EntryPoint { module: entry_module_id, is_user_defined, .. } => {
            let module = &module_table[entry_module_id];
            if is_user_defined {
              module
                .id()
                .as_path()
                .file_stem()
                .and_then(|f| f.to_str())
                .map_or(arcstr::literal!("input"), |file_name| sanitize_file_name(file_name).into())
            } else {
              ArcStr::from(sanitize_file_name(&module.id().as_path().representative_file_name()))
            }
          }
          ChunkKind::Common => {
            // Named after the last executed module, which is the first one any of its importers
            // entered.
            chunk.modules.last().map_or_else(
              || arcstr::literal!("chunk"),
              |module_id| {
                let module = &module_table[*module_id];
                ArcStr::from(sanitize_file_name(&module.id().as_path().representative_file_name()))
              },
            )
          }
        }
      })
      .collect::<Vec<_>>()
      .into();

    let mut hash_placeholder_generator = HashPlaceholderGenerator::default();

    let create_make_unique_name = |mut used_name_counts: FxHashMap<ArcStr, u32>| {
      move |name: &ArcStr| {
        let mut candidate = name.clone();
        loop {
          match used_name_counts.entry(candidate.clone()) {
            Entry::Occupied(mut occ) => {
              // This name is already used
              let next_count = *occ.get();
              occ.insert(next_count + 1);
              candidate = ArcStr::from(concat_string!(name, itoa::Buffer::new().format(next_count)));
            }
            Entry::Vacant(vac) => {
              // This is the first time we see this name
              let name = vac.key().clone();
              vac.insert(2);
              break name;
            }
          };
        }
      }
    };
    let mut make_unique_name_for_ecma_chunk = create_make_unique_name(FxHashMap::default());
    let mut make_unique_name_for_css_chunk = create_make_unique_name(FxHashMap::default());

    let out_dir = self.options.out_dir();
    for chunk_id in &chunk_graph.sorted_chunk_idx_vec {
      let chunk = &mut chunk_graph.chunk_table[*chunk_id];
      if chunk.preliminary_filename.is_some() {
        // Already generated
        continue;
      }

      let pre_generated_chunk_name = &index_pre_generated_names[*chunk_id];
      // Chunk names are allowed to be duplicated, only file names are deconflicted.
      chunk.name = Some(pre_generated_chunk_name.clone());

      let preliminary_filename = chunk.generate_preliminary_filename(
        self.options,
        pre_generated_chunk_name,
        &mut hash_placeholder_generator,
        &mut make_unique_name_for_ecma_chunk,
      );

      let has_css = chunk.modules.iter().any(|module_idx| {
        module_table[*module_idx].as_normal().is_some_and(|module| module.css_source.is_some())
      });
      if has_css {
        let css_name = make_unique_name_for_css_chunk(pre_generated_chunk_name);
        chunk.css_preliminary_filename = Some(chunk.generate_css_preliminary_filename(
          self.options,
          &css_name,
          &mut hash_placeholder_generator,
        ));
      }

      chunk.absolute_preliminary_filename =
        Some(out_dir.join(&*preliminary_filename).normalize().to_slash_string());
      chunk.preliminary_filename = Some(preliminary_filename);
    }
  }
}
