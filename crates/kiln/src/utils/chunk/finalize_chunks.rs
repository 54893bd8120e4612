use std::hash::Hash;

use itertools::Itertools;
use kiln_common::{AssetIdx, InstantiatedChunk, StrOrBytes};
use kiln_utils::{
  base64::to_url_safe_base64,
  hash_placeholder::{find_hash_placeholders, replace_hash_placeholders},
  indexmap::FxIndexSet,
  rayon::{IndexedParallelIterator, IntoParallelIterator, IntoParallelRefIterator, ParallelIterator},
  xxhash::xxhash_base64_url,
};
use oxc_index::{index_vec, IndexVec};
use rustc_hash::FxHashMap;
use xxhash_rust::xxh3::Xxh3;

use crate::types::IndexInstantiatedChunks;

/// An instantiated chunk with its hash placeholders replaced.
#[derive(Debug)]
pub struct FinalizedChunk {
  pub filename: String,
  pub inner: InstantiatedChunk,
}

/// Replaces the hash placeholders in file names and contents with content hashes. A file's
/// hash covers its own content and the content of every file it references, directly or not.
pub fn finalize_chunks(instantiated_chunks: IndexInstantiatedChunks) -> IndexVec<AssetIdx, FinalizedChunk> {
  let asset_idx_by_placeholder = instantiated_chunks
    .iter_enumerated()
    .filter_map(|(asset_idx, asset)| {
      asset.preliminary_filename.hash_placeholder().map(move |placeholders| {
        placeholders.iter().map(move |hash_placeholder| (hash_placeholder.as_str(), asset_idx))
      })
    })
    .flatten()
    .collect::<FxHashMap<_, _>>();

  let index_direct_dependencies: IndexVec<AssetIdx, Vec<AssetIdx>> = instantiated_chunks
    .par_iter()
    .map(|asset| match &asset.content {
      StrOrBytes::Str(content) => find_hash_placeholders(content)
        .filter_map(|placeholder| asset_idx_by_placeholder.get(placeholder).copied())
        .unique()
        .collect_vec(),
      StrOrBytes::Bytes(_) => vec![],
    })
    .collect::<Vec<_>>()
    .into();

  // In `a -> b -> c`, a change of `c` changes the hash of `a` too.
  let index_transitive_dependencies = collect_transitive_dependencies(&index_direct_dependencies);

  let index_standalone_content_hashes: IndexVec<AssetIdx, String> = instantiated_chunks
    .par_iter()
    .map(|chunk| xxhash_base64_url(chunk.content.as_bytes()))
    .collect::<Vec<_>>()
    .into();

  let index_asset_hashers: IndexVec<AssetIdx, Xxh3> =
    index_vec![Xxh3::default(); instantiated_chunks.len()];

  let index_final_hashes: IndexVec<AssetIdx, String> = index_asset_hashers
    .into_par_iter()
    .enumerate()
    .map(|(asset_idx, mut hasher)| {
      let asset_idx = AssetIdx::from(asset_idx);
      index_standalone_content_hashes[asset_idx].hash(&mut hasher);
      // Files with the same content still get different hashes.
      instantiated_chunks[asset_idx].preliminary_filename.as_arcstr().as_str().hash(&mut hasher);
      for dep_id in &index_transitive_dependencies[asset_idx] {
        index_standalone_content_hashes[*dep_id].hash(&mut hasher);
      }
      to_url_safe_base64(hasher.digest128().to_le_bytes())
    })
    .collect::<Vec<_>>()
    .into();

  let final_hashes_by_placeholder = index_final_hashes
    .iter_enumerated()
    .filter_map(|(idx, hash)| {
      instantiated_chunks[idx].preliminary_filename.hash_placeholder().map(|placeholders| {
        placeholders.iter().map(|placeholder| {
          (placeholder.clone(), hash[..placeholder.len().min(hash.len())].to_string())
        })
      })
    })
    .flatten()
    .collect::<FxHashMap<_, _>>();

  instantiated_chunks
    .into_iter()
    .map(|mut asset| {
      let filename =
        replace_hash_placeholders(asset.preliminary_filename.as_arcstr().as_str(), &final_hashes_by_placeholder)
          .into_owned();
      if let StrOrBytes::Str(content) = &asset.content {
        if let std::borrow::Cow::Owned(replaced) =
          replace_hash_placeholders(content, &final_hashes_by_placeholder)
        {
          asset.content = StrOrBytes::Str(replaced);
        }
      }
      FinalizedChunk { filename, inner: asset }
    })
    .collect::<Vec<_>>()
    .into()
}

fn collect_transitive_dependencies(
  index_direct_dependencies: &IndexVec<AssetIdx, Vec<AssetIdx>>,
) -> IndexVec<AssetIdx, FxIndexSet<AssetIdx>> {
  fn traverse(
    index: AssetIdx,
    dep_map: &IndexVec<AssetIdx, Vec<AssetIdx>>,
    visited: &mut FxIndexSet<AssetIdx>,
  ) {
    for dep_index in &dep_map[index] {
      if visited.insert(*dep_index) {
        traverse(*dep_index, dep_map, visited);
      }
    }
  }

  index_direct_dependencies
    .indices()
    .map(|idx| {
      let mut visited_deps = FxIndexSet::default();
      traverse(idx, index_direct_dependencies, &mut visited_deps);
      visited_deps.shift_remove(&idx);
      visited_deps
    })
    .collect::<Vec<_>>()
    .into()
}

#[cfg(test)]
mod tests {
  use kiln_common::{ChunkIdx, InstantiationKind, PreliminaryFilename};

  use super::*;

  fn chunk(filename: &str, placeholder: Option<&str>, content: &str) -> InstantiatedChunk {
    InstantiatedChunk {
      origin_chunk: ChunkIdx::from(0usize),
      kind: InstantiationKind::Ecma,
      content: StrOrBytes::Str(content.to_string()),
      preliminary_filename: PreliminaryFilename::new(
        filename.to_string(),
        placeholder.map(|p| vec![p.to_string()]),
      ),
      rendered_modules: vec![],
      map: None,
    }
  }

  fn finalize(chunks: Vec<InstantiatedChunk>) -> Vec<FinalizedChunk> {
    finalize_chunks(chunks.into()).into_iter().collect()
  }

  #[test]
  fn hashes_follow_dependencies() {
    let build = |shared: &str| {
      finalize(vec![
        chunk("main.js", None, "import './shared-!~{000}~.js';"),
        chunk("shared-!~{000}~.js", Some("!~{000}~"), shared),
      ])
    };
    let first = build("export const a = 1;");
    let second = build("export const a = 2;");

    assert!(!first[1].filename.contains("!~{"));
    assert_eq!(first[1].filename.len(), "shared-12345678.js".len());
    assert_ne!(first[1].filename, second[1].filename);
    let StrOrBytes::Str(main) = &first[0].inner.content else { unreachable!() };
    assert_eq!(main, &format!("import './{}';", first[1].filename));
    assert_eq!(build("export const a = 1;")[1].filename, first[1].filename);
  }
}
