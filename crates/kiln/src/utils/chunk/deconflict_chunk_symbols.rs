use kiln_common::{Chunk, ChunkKind, OutputFormat};

use crate::{stages::link::LinkStageOutput, utils::renamer::Renamer};

pub fn deconflict_chunk_symbols(chunk: &mut Chunk, link_output: &LinkStageOutput, format: OutputFormat) {
  let entry_module =
    chunk.entry_module_idx().and_then(|idx| link_output.module_table[idx].as_normal());
  let mut renamer =
    Renamer::new(entry_module, &link_output.symbols, &link_output.module_table, format);

  // Global names should be reserved.
  chunk
    .modules
    .iter()
    .filter_map(|id| link_output.module_table[*id].as_normal())
    .filter(|module| module.is_included())
    .for_each(|module| {
      let source = module.source();
      for global in &module.ecma.scanned.global_refs {
        renamer.reserve(global.span.source_text(source));
      }
    });

  if format.requires_externals() {
    // `require()` introduces a binding per external.
    chunk
      .imports_from_external_modules
      .iter()
      .filter_map(|(idx, _)| link_output.module_table[*idx].as_external())
      .for_each(|external_module| {
        renamer.add_symbol_in_root_scope(external_module.namespace_ref);
      });

    if let Some(module) = entry_module {
      for rec_idx in &link_output.metadata[module.idx].star_exports_from_external_modules {
        let rec = &module.import_records[*rec_idx];
        if let Some(external_module) = link_output.module_table[rec.resolved_module()].as_external()
        {
          renamer.add_symbol_in_root_scope(external_module.namespace_ref);
        }
      }
    }
  }

  // Symbols imported from other chunks don't belong to this chunk, but the import statements
  // declare them here, so they take part in deconflicting.
  chunk.imports_from_other_chunks.iter().flat_map(|(_, items)| items.iter()).for_each(|item| {
    renamer.add_symbol_in_root_scope(item.import_ref);
  });

  if let ChunkKind::EntryPoint { module, .. } = chunk.kind {
    let meta = &link_output.metadata[module];
    meta.referenced_symbols_by_entry_point_chunk.iter().for_each(|symbol_ref| {
      renamer.add_symbol_in_root_scope(*symbol_ref);
    });
  }

  if format.keep_esm_import_export_syntax() {
    chunk.imports_from_external_modules.iter().flat_map(|(_, imports)| imports).for_each(
      |named_import| {
        renamer.add_symbol_in_root_scope(named_import.imported_as);
      },
    );
  }

  chunk
    .modules
    .iter()
    .copied()
    // Starts with entry module
    .rev()
    .filter_map(|id| link_output.module_table[id].as_normal())
    .for_each(|module| {
      module
        .stmt_infos
        .iter()
        .filter(|stmt_info| stmt_info.is_included)
        .flat_map(|stmt_info| stmt_info.declared_symbols.iter().copied())
        .filter(|symbol_ref| {
          // Reads off an external namespace are never declared.
          let canonical_ref = link_output.symbols.canonical_ref_for(*symbol_ref);
          link_output.symbols.get(canonical_ref).namespace_alias.is_none()
        })
        .for_each(|symbol_ref| {
          renamer.add_symbol_in_root_scope(symbol_ref);
        });
    });

  chunk.canonical_names = renamer.into_canonical_names();
}
