use std::collections::hash_map::Entry;

use arcstr::ArcStr;
use itertools::{multizip, Itertools};
use kiln_common::{
  ChunkIdx, ChunkKind, CrossChunkImportItem, ImportKind, Module, ModuleIdx, NamedImport, Specifier,
  SymbolRef,
};
use kiln_utils::{
  concat_string,
  indexmap::{FxIndexMap, FxIndexSet},
};
use oxc_index::{index_vec, IndexVec};
use rustc_hash::FxHashMap;

use crate::types::chunk_graph::ChunkGraph;

use super::GenerateStage;

type IndexChunkDependedSymbols = IndexVec<ChunkIdx, FxIndexSet<SymbolRef>>;
type IndexChunkImportsFromExternalModules =
  IndexVec<ChunkIdx, FxIndexMap<ModuleIdx, Vec<NamedImport>>>;
type IndexChunkExportedSymbols = IndexVec<ChunkIdx, FxIndexSet<SymbolRef>>;
type IndexCrossChunkDynamicImports = IndexVec<ChunkIdx, FxIndexSet<ChunkIdx>>;
type IndexImportsFromOtherChunks =
  IndexVec<ChunkIdx, FxIndexMap<ChunkIdx, Vec<CrossChunkImportItem>>>;

impl GenerateStage<'_> {
  pub(super) fn compute_cross_chunk_links(&mut self, chunk_graph: &mut ChunkGraph) {
    let chunks_len = chunk_graph.chunk_table.len();
    let mut chunk_depended_symbols = index_vec![FxIndexSet::<SymbolRef>::default(); chunks_len];
    let mut chunk_exported_symbols = index_vec![FxIndexSet::<SymbolRef>::default(); chunks_len];
    let mut chunk_imports_from_external_modules =
      index_vec![FxIndexMap::<ModuleIdx, Vec<NamedImport>>::default(); chunks_len];
    let mut imports_from_other_chunks =
      index_vec![FxIndexMap::<ChunkIdx, Vec<CrossChunkImportItem>>::default(); chunks_len];
    let mut cross_chunk_dynamic_imports = index_vec![FxIndexSet::default(); chunks_len];

    self.collect_depended_symbols(
      chunk_graph,
      &mut chunk_depended_symbols,
      &mut chunk_imports_from_external_modules,
      &mut cross_chunk_dynamic_imports,
    );

    // Without code splitting an entry chunk holds everything it needs.
    if self.options.splitting {
      self.compute_chunk_imports(
        chunk_graph,
        &chunk_depended_symbols,
        &mut chunk_exported_symbols,
        &mut imports_from_other_chunks,
      );
      self.deconflict_exported_names(
        chunk_graph,
        &chunk_exported_symbols,
        &mut imports_from_other_chunks,
      );
    }

    let sorted_imports_from_other_chunks = imports_from_other_chunks
      .into_iter()
      .map(|importee_map| {
        importee_map
          .into_iter()
          .sorted_by_key(|(importee_chunk_id, _)| *importee_chunk_id)
          .collect_vec()
      })
      .collect_vec();

    let module_table = &self.link_output.module_table;
    let sorted_imports_from_external_modules = chunk_imports_from_external_modules
      .into_iter()
      .map(|imports_from_external_modules| {
        imports_from_external_modules
          .into_iter()
          .sorted_by_key(|(external_module_id, _)| module_table[*external_module_id].exec_order())
          .collect_vec()
      })
      .collect_vec();

    multizip((
      chunk_graph.chunk_table.iter_mut(),
      sorted_imports_from_other_chunks,
      sorted_imports_from_external_modules,
      cross_chunk_dynamic_imports,
    ))
    .for_each(
      |(chunk, imports_from_other_chunks, imports_from_external_modules, dynamic_imports)| {
        chunk.cross_chunk_imports =
          imports_from_other_chunks.iter().map(|(importee, _)| *importee).collect();
        chunk.imports_from_other_chunks = imports_from_other_chunks;
        chunk.imports_from_external_modules = imports_from_external_modules;
        chunk.cross_chunk_dynamic_imports = dynamic_imports.into_iter().collect();
      },
    );
  }

  /// - Assign each declared symbol to the chunk it is rendered in
  /// - Collect all referenced symbols and consider them potential imports
  fn collect_depended_symbols(
    &mut self,
    chunk_graph: &ChunkGraph,
    chunk_depended_symbols: &mut IndexChunkDependedSymbols,
    chunk_imports_from_external_modules: &mut IndexChunkImportsFromExternalModules,
    cross_chunk_dynamic_imports: &mut IndexCrossChunkDynamicImports,
  ) {
    let module_table = &self.link_output.module_table;
    let symbols = &self.link_output.symbols;
    let splitting = self.options.splitting;
    let mut chunk_id_to_symbols = Vec::with_capacity(chunk_graph.chunk_table.len());

    let chunks_iter = multizip((
      chunk_graph.chunk_table.iter_enumerated(),
      chunk_depended_symbols.iter_mut(),
      chunk_imports_from_external_modules.iter_mut(),
      cross_chunk_dynamic_imports.iter_mut(),
    ));

    for ((chunk_idx, chunk), depended_symbols, imports_from_external_modules, dynamic_imports) in
      chunks_iter
    {
      let mut symbol_needs_to_assign = vec![];
      for &module_id in &chunk.modules {
        let Module::Normal(module) = &module_table[module_id] else {
          continue;
        };

        for rec in &module.import_records {
          match &module_table[rec.resolved_module()] {
            Module::Normal(importee) => {
              if splitting
                && rec.kind == ImportKind::DynamicImport
                && importee.is_included()
                && module.stmt_infos[rec.related_stmt_info_idx].is_included
              {
                if let Some(importee_chunk) = chunk_graph.entry_module_to_entry_chunk.get(&importee.idx)
                {
                  dynamic_imports.insert(*importee_chunk);
                }
              }
            }
            Module::External(importee) => {
              // Kept for its side effects even when no binding of it is used.
              if rec.kind == ImportKind::Import && !rec.is_export_star() {
                imports_from_external_modules.entry(importee.idx).or_default();
              }
            }
          }
        }

        for import in module.named_imports.values() {
          let rec = &module.import_records[import.record_id];
          if !module.stmt_infos[rec.related_stmt_info_idx].is_included {
            continue;
          }
          if let Module::External(importee) = &module_table[rec.resolved_module()] {
            imports_from_external_modules.entry(importee.idx).or_default().push(import.clone());
          }
        }

        for stmt_info in module.stmt_infos.iter().filter(|stmt_info| stmt_info.is_included) {
          symbol_needs_to_assign.extend(stmt_info.declared_symbols.iter().copied());
          for &referenced in &stmt_info.referenced_symbols {
            let mut canonical_ref = symbols.canonical_ref_for(referenced);
            if let Some(namespace_alias) = &symbols.get(canonical_ref).namespace_alias {
              canonical_ref = namespace_alias.namespace_ref;
            }
            depended_symbols.insert(canonical_ref);
          }
        }
      }

      if let Some(entry_id) = chunk.entry_module_idx() {
        for (_, export_ref) in self.link_output.metadata[entry_id].canonical_exports(symbols) {
          let canonical_ref = symbols
            .get(export_ref)
            .namespace_alias
            .as_ref()
            .map_or(export_ref, |alias| alias.namespace_ref);
          depended_symbols.insert(canonical_ref);
        }
      }

      chunk_id_to_symbols.push((chunk_idx, symbol_needs_to_assign));
    }

    let symbols = &mut self.link_output.symbols;
    for (chunk_id, symbol_list) in chunk_id_to_symbols {
      for declared in symbol_list {
        symbols.get_mut(declared).chunk_id = Some(chunk_id);
      }
    }
  }

  /// - Filter out depended symbols to come from other chunks
  /// - Mark exports of importee chunks
  fn compute_chunk_imports(
    &self,
    chunk_graph: &ChunkGraph,
    chunk_depended_symbols: &IndexChunkDependedSymbols,
    chunk_exported_symbols: &mut IndexChunkExportedSymbols,
    imports_from_other_chunks: &mut IndexImportsFromOtherChunks,
  ) {
    let module_table = &self.link_output.module_table;
    for (chunk_id, chunk) in chunk_graph.chunk_table.iter_enumerated() {
      for &import_ref in &chunk_depended_symbols[chunk_id] {
        // Externals are imported by every chunk that uses them.
        if module_table[import_ref.owner].is_external() {
          continue;
        }
        let Some(importee_chunk_id) = self.link_output.symbols.get(import_ref).chunk_id else {
          continue;
        };
        if chunk_id != importee_chunk_id {
          imports_from_other_chunks[chunk_id]
            .entry(importee_chunk_id)
            .or_default()
            .push(CrossChunkImportItem { import_ref, export_alias: None });
          chunk_exported_symbols[importee_chunk_id].insert(import_ref);
        }
      }

      // An entry imports every chunk that belongs to it and has side effects, even when it
      // uses no binding of it, so that the chunk is evaluated.
      if let ChunkKind::EntryPoint { bit: importer_chunk_bit, .. } = &chunk.kind {
        chunk_graph
          .chunk_table
          .iter_enumerated()
          .filter(|(id, _)| *id != chunk_id)
          .filter(|(_, importee_chunk)| {
            importee_chunk.bits.has_bit(*importer_chunk_bit)
              && importee_chunk
                .modules
                .iter()
                .any(|idx| module_table[*idx].side_effects().has_side_effects())
          })
          .for_each(|(importee_chunk_id, _)| {
            imports_from_other_chunks[chunk_id].entry(importee_chunk_id).or_default();
          });
      }
    }
  }

  /// Cross-chunk exports are named after the symbol. All chunks share one namespace of names
  /// here, a name that is taken gets a `$N` suffix.
  fn deconflict_exported_names(
    &self,
    chunk_graph: &mut ChunkGraph,
    chunk_exported_symbols: &IndexChunkExportedSymbols,
    imports_from_other_chunks: &mut IndexImportsFromOtherChunks,
  ) {
    let module_table = &self.link_output.module_table;
    let symbols = &self.link_output.symbols;
    // Names entries export to users are fixed.
    let mut name_count = chunk_graph
      .chunk_table
      .iter()
      .filter_map(|chunk| chunk.entry_module_idx())
      .flat_map(|entry| self.link_output.metadata[entry].sorted_resolved_exports.iter().cloned())
      .map(|name| (name, 0))
      .collect::<FxHashMap<ArcStr, u32>>();

    for (chunk_id, chunk) in chunk_graph.chunk_table.iter_mut_enumerated() {
      let sorted_exports = chunk_exported_symbols[chunk_id].iter().sorted_by_cached_key(|symbol| {
        (module_table[symbol.owner].exec_order(), symbol.symbol)
      });
      for chunk_export in sorted_exports {
        let original_name = chunk_export.name(symbols);
        let mut candidate_name = ArcStr::from(original_name);
        loop {
          match name_count.entry(candidate_name.clone()) {
            Entry::Occupied(mut occ) => {
              let next_conflict_index = *occ.get() + 1;
              *occ.get_mut() = next_conflict_index;
              candidate_name =
                concat_string!(original_name, "$", itoa::Buffer::new().format(next_conflict_index))
                  .into();
            }
            Entry::Vacant(vac) => {
              vac.insert(0);
              break;
            }
          }
        }
        chunk.exports_to_other_chunks.insert(*chunk_export, candidate_name);
      }
    }

    for chunk_id in chunk_graph.chunk_table.indices() {
      for (importee_chunk_id, import_items) in &mut imports_from_other_chunks[chunk_id] {
        for item in import_items {
          let importee_chunk = &chunk_graph.chunk_table[*importee_chunk_id];
          if let Some(alias) = importee_chunk.exports_to_other_chunks.get(&item.import_ref) {
            item.export_alias = Some(Specifier::Literal(alias.clone()));
          }
        }
      }
    }
  }
}
