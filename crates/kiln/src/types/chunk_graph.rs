use kiln_common::{Chunk, ChunkIdx, ModuleIdx};
use oxc_index::IndexVec;
use rustc_hash::FxHashMap;

#[derive(Debug)]
pub struct ChunkGraph {
  pub chunk_table: IndexVec<ChunkIdx, Chunk>,
  /// Chunk order: user defined entries, dynamic entries, then common chunks.
  pub sorted_chunk_idx_vec: Vec<ChunkIdx>,
  /// Without splitting a module can be copied into several entry chunks, so this is the first
  /// chunk that holds it.
  pub module_to_chunk: IndexVec<ModuleIdx, Option<ChunkIdx>>,
  /// What `import()` of an entry module loads.
  pub entry_module_to_entry_chunk: FxHashMap<ModuleIdx, ChunkIdx>,
}

impl ChunkGraph {
  pub fn new(module_count: usize) -> Self {
    Self {
      chunk_table: IndexVec::default(),
      sorted_chunk_idx_vec: Vec::new(),
      module_to_chunk: oxc_index::index_vec![None; module_count],
      entry_module_to_entry_chunk: FxHashMap::default(),
    }
  }

  pub fn add_chunk(&mut self, chunk: Chunk) -> ChunkIdx {
    let idx = self.chunk_table.push(chunk);
    self.sorted_chunk_idx_vec.push(idx);
    idx
  }

  pub fn add_module_to_chunk(&mut self, module_idx: ModuleIdx, chunk_idx: ChunkIdx) {
    self.chunk_table[chunk_idx].modules.push(module_idx);
    self.module_to_chunk[module_idx].get_or_insert(chunk_idx);
  }
}
