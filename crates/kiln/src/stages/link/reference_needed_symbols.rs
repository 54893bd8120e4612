use kiln_common::{
  ImportKind, ImportRecordMeta, Module, ModuleIdx, StmtInfoIdx, StmtInfos, SymbolRef,
};

use super::LinkStage;

struct StmtPatch {
  stmt_info_idx: StmtInfoIdx,
  referenced: Vec<SymbolRef>,
  declared: Vec<SymbolRef>,
  side_effect: bool,
}

impl LinkStage<'_> {
  /// Adds the symbols that rewritten imports refer to but the source never mentions:
  /// `require_x` for every way of loading a wrapped module, the importer's `import_x` binding
  /// for `import .. from` a wrapped module and the namespace object of a required esm module.
  pub(crate) fn reference_needed_symbols(&mut self) {
    let splitting = self.options.splitting;
    let patches = self
      .module_table
      .iter()
      .filter_map(Module::as_normal)
      .map(|importer| {
        let mut patches = vec![];
        for (stmt_info_idx, stmt_info) in importer.stmt_infos.iter_enumerated() {
          if stmt_info_idx == StmtInfos::NAMESPACE_STMT_IDX {
            continue;
          }
          let mut patch = StmtPatch {
            stmt_info_idx,
            referenced: vec![],
            declared: vec![],
            side_effect: false,
          };
          for rec_idx in &stmt_info.import_records {
            let rec = &importer.import_records[*rec_idx];
            let Module::Normal(importee) = &self.module_table[rec.resolved_module()] else {
              continue;
            };
            let wrapper_ref = self.metadata[importee.idx].wrapper_ref;
            match (rec.kind, wrapper_ref) {
              (ImportKind::Import, Some(wrapper_ref)) => {
                // `import .. from` runs the module where the import was written.
                patch.side_effect = true;
                patch.referenced.push(wrapper_ref);
                let binds_nothing = rec.is_export_star()
                  || rec.meta.contains(ImportRecordMeta::IS_PLAIN_IMPORT);
                if !binds_nothing {
                  patch.declared.push(rec.namespace_ref);
                }
              }
              (ImportKind::Require, Some(wrapper_ref)) => patch.referenced.push(wrapper_ref),
              (ImportKind::Require, None) => patch.referenced.push(importee.namespace_object_ref),
              (ImportKind::DynamicImport, Some(wrapper_ref)) if !splitting => {
                patch.referenced.push(wrapper_ref);
              }
              _ => {}
            }
          }
          if patch.side_effect || !patch.referenced.is_empty() || !patch.declared.is_empty() {
            patches.push(patch);
          }
        }
        (importer.idx, patches)
      })
      .collect::<Vec<(ModuleIdx, Vec<StmtPatch>)>>();

    for (module_idx, patches) in patches {
      let Some(module) = self.module_table[module_idx].as_normal_mut() else { continue };
      for StmtPatch { stmt_info_idx, referenced, declared, side_effect } in patches {
        for symbol_ref in declared {
          module.stmt_infos.declare_symbol_for_stmt(stmt_info_idx, symbol_ref);
        }
        let stmt_info = &mut module.stmt_infos[stmt_info_idx];
        stmt_info.referenced_symbols.extend(referenced);
        stmt_info.side_effect |= side_effect;
      }
    }
  }
}
