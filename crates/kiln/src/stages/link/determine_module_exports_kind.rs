use kiln_common::{ExportsKind, ImportKind, Module, ModuleIdx, WrapKind};

use super::LinkStage;

impl LinkStage<'_> {
  /// A module with neither `import`/`export` syntax nor `module.exports` becomes esm when it is
  /// imported and commonjs when it is required. Commonjs modules are wrapped, so that their body
  /// runs on the first `require()` like it does in node.
  pub(crate) fn determine_module_exports_kind(&mut self) {
    let mut decided: Vec<(ModuleIdx, ExportsKind)> = vec![];

    for importer in self.module_table.iter().filter_map(Module::as_normal) {
      if !importer.is_js_type() {
        continue;
      }
      for rec in &importer.import_records {
        let Module::Normal(importee) = &self.module_table[rec.resolved_module()] else {
          continue;
        };
        if importee.exports_kind != ExportsKind::None || !importee.is_js_type() {
          continue;
        }
        match rec.kind {
          ImportKind::Import => decided.push((importee.idx, ExportsKind::Esm)),
          ImportKind::Require => decided.push((importee.idx, ExportsKind::CommonJs)),
          ImportKind::DynamicImport | ImportKind::EntryPoint => {}
        }
      }
    }

    // The first way a module is loaded decides, in module order.
    for (idx, kind) in decided {
      if let Some(module) = self.module_table[idx].as_normal_mut() {
        if module.exports_kind == ExportsKind::None {
          module.exports_kind = kind;
        }
      }
    }

    for module in self.module_table.iter().filter_map(Module::as_normal) {
      if module.exports_kind == ExportsKind::CommonJs {
        tracing::trace!(module = %module.stable_id, "wrap as commonjs");
        self.metadata[module.idx].wrap_kind = WrapKind::Cjs;
      }
    }
  }
}
