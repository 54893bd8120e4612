use kiln_common::StmtInfo;

use super::LinkStage;

impl LinkStage<'_> {
  pub(crate) fn create_exports_for_modules(&mut self) {
    for module in self.module_table.iter_mut().filter_map(|m| m.as_normal_mut()) {
      let meta = &mut self.metadata[module.idx];
      let is_entry = self.entry_points.iter().any(|entry| entry.id == module.idx);

      // A wrapped module has no static exports. Slot 0 holds `var require_x = __commonJS(..)`
      // and an entry chunk of it calls `require_x()` for its exports.
      if let Some(wrapper_ref) = meta.wrapper_ref {
        if is_entry {
          meta.referenced_symbols_by_entry_point_chunk.push(wrapper_ref);
        }
        module.stmt_infos.replace_namespace_stmt_info(StmtInfo {
          stmt_idx: None,
          declared_symbols: vec![wrapper_ref],
          referenced_symbols: vec![],
          side_effect: false,
          is_included: false,
          import_records: Vec::new(),
        });
        continue;
      }

      let exports = meta
        .sorted_resolved_exports
        .iter()
        .map(|name| meta.resolved_exports[name])
        .collect::<Vec<_>>();

      // An entry chunk exports everything its module exports.
      if is_entry {
        meta.referenced_symbols_by_entry_point_chunk.extend(exports.iter().copied());
      }

      // The namespace object of `import * as ns` and of dynamic imports without splitting. It is
      // a frozen object with a getter per export, built by the statement in slot 0.
      module.stmt_infos.replace_namespace_stmt_info(StmtInfo {
        stmt_idx: None,
        declared_symbols: vec![module.namespace_object_ref],
        referenced_symbols: exports,
        side_effect: false,
        is_included: false,
        import_records: Vec::new(),
      });
    }
  }
}
