use kiln_common::{Chunk, ChunkIdx, ChunkKind, ImportKind, Module, ModuleIdx};
use kiln_error::BuildResult;
use kiln_utils::bitset::BitSet;
use oxc_index::{index_vec, Idx, IndexVec};
use rustc_hash::FxHashMap;

use crate::types::chunk_graph::ChunkGraph;

use super::GenerateStage;

impl GenerateStage<'_> {
  /// Every entry owns one bit, and a module carries the bits of the entries that reach it. With
  /// code splitting, modules with equal bits share a chunk: the entry's own chunk when only one
  /// entry reaches them, otherwise a common chunk created the first time the bits are seen.
  /// Without it, every entry chunk gets its own copy of what it reaches.
  pub(super) fn generate_chunks(&self) -> BuildResult<ChunkGraph> {
    let module_table = &self.link_output.module_table;
    let entries_len: u32 = self
      .link_output
      .entry_points
      .len()
      .try_into()
      .map_err(|_| anyhow::anyhow!("Too many entries, u32 overflowed."))?;

    let mut module_to_bits = index_vec![BitSet::new(entries_len); module_table.len()];
    let mut bits_to_chunk = FxHashMap::default();
    let mut chunk_graph = ChunkGraph::new(module_table.len());

    for (bit, entry) in (0..entries_len).zip(&self.link_output.entry_points) {
      let mut bits = BitSet::new(entries_len);
      bits.set_bit(bit);
      let chunk = Chunk::new(
        entry.name.clone(),
        bits.clone(),
        vec![],
        ChunkKind::EntryPoint { is_user_defined: entry.kind.is_user_defined(), bit, module: entry.id },
      );
      let chunk_id = chunk_graph.add_chunk(chunk);
      chunk_graph.entry_module_to_entry_chunk.insert(entry.id, chunk_id);
      bits_to_chunk.insert(bits, chunk_id);

      self.determine_reachable_modules_for_entry(entry.id, bit, &mut module_to_bits);
    }

    for &module_idx in &self.link_output.sorted_modules {
      let Module::Normal(module) = &module_table[module_idx] else { continue };
      let bits = &module_to_bits[module_idx];
      if !module.is_included() || bits.is_empty() {
        continue;
      }

      if self.options.splitting {
        if let Some(&chunk_id) = bits_to_chunk.get(bits) {
          chunk_graph.add_module_to_chunk(module_idx, chunk_id);
        } else {
          let chunk = Chunk::new(None, bits.clone(), vec![], ChunkKind::Common);
          let chunk_id = chunk_graph.add_chunk(chunk);
          chunk_graph.add_module_to_chunk(module_idx, chunk_id);
          bits_to_chunk.insert(bits.clone(), chunk_id);
        }
      } else {
        for bit in bits.iter_ones() {
          chunk_graph.add_module_to_chunk(module_idx, ChunkIdx::from_usize(bit as usize));
        }
      }
    }

    for chunk in chunk_graph.chunk_table.iter_mut() {
      // An entry chunk whose module moved into a common chunk still orders by that module.
      let first_module = chunk.modules.first().copied().or(chunk.entry_module_idx());
      chunk.exec_order = first_module.map_or(u32::MAX, |idx| module_table[idx].exec_order());
    }

    tracing::debug!(chunks = chunk_graph.chunk_table.len(), "chunks generated");
    Ok(chunk_graph)
  }

  fn determine_reachable_modules_for_entry(
    &self,
    module_idx: ModuleIdx,
    entry_index: u32,
    module_to_bits: &mut IndexVec<ModuleIdx, BitSet>,
  ) {
    let Module::Normal(module) = &self.link_output.module_table[module_idx] else {
      return;
    };

    if module_to_bits[module_idx].has_bit(entry_index) {
      return;
    }
    module_to_bits[module_idx].set_bit(entry_index);

    // With code splitting an `import()` target is the root of its own chunk.
    for rec in &module.import_records {
      if rec.kind == ImportKind::DynamicImport && self.options.splitting {
        continue;
      }
      self.determine_reachable_modules_for_entry(rec.resolved_module(), entry_index, module_to_bits);
    }
  }
}
