use std::sync::Arc;

use arcstr::ArcStr;
use bitflags::bitflags;
use kiln_ecmascript::EcmaAst;
use kiln_utils::indexmap::FxIndexMap;
use oxc_index::IndexVec;

use crate::{
  side_effects::DeterminedSideEffects, ExportsKind, ImportRecordIdx, LocalExport, Module, ModuleId, ModuleIdx,
  ModuleStatus, ModuleType, NamedImport, ResolvedImportRecord, StmtInfos, SymbolRef,
};

bitflags! {
  #[derive(Debug, Default, Clone, Copy)]
  pub struct NormalModuleMeta: u8 {
    const INCLUDED = 1;
    const HAS_STAR_EXPORT = 1 << 1;
    const HAS_TOP_LEVEL_AWAIT = 1 << 2;
  }
}

#[derive(Debug)]
pub struct NormalModule {
  pub exec_order: u32,
  pub idx: ModuleIdx,
  pub is_user_defined_entry: bool,
  pub id: ModuleId,
  /// `stable_id` is calculated based on `id` to be stable across machine and os.
  pub stable_id: String,
  // Pretty resource id for debug
  pub debug_id: String,
  /// A valid identifier derived from the file name, used to name facade symbols.
  pub repr_name: String,
  pub module_type: ModuleType,
  pub exports_kind: ExportsKind,
  pub status: ModuleStatus,
  /// The source as loaded, before any transform.
  pub original_source: ArcStr,
  /// The module as plain JavaScript and what the scanner found in it. Shared with the
  /// transform cache of a build context.
  pub ecma: Arc<EcmaAst>,
  /// The style sheet of a css module.
  pub css_source: Option<ArcStr>,
  /// The bytes a `file` module copies to the output directory.
  pub asset_source: Option<Arc<[u8]>>,
  /// Represents [Module Namespace Object](https://tc39.es/ecma262/#sec-module-namespace-exotic-objects)
  pub namespace_object_ref: SymbolRef,
  pub default_export_ref: SymbolRef,
  pub named_imports: FxIndexMap<SymbolRef, NamedImport>,
  pub named_exports: FxIndexMap<ArcStr, LocalExport>,
  pub stmt_infos: StmtInfos,
  pub import_records: IndexVec<ImportRecordIdx, ResolvedImportRecord>,
  pub side_effects: DeterminedSideEffects,
  pub meta: NormalModuleMeta,
  pub importers: Vec<ModuleId>,
  pub dynamic_importers: Vec<ModuleId>,
}

impl NormalModule {
  pub fn star_export_module_ids(&self) -> impl Iterator<Item = ModuleIdx> + '_ {
    self
      .import_records
      .iter()
      .filter(|rec| rec.is_export_star())
      .map(ResolvedImportRecord::resolved_module)
  }

  pub fn has_star_export(&self) -> bool {
    self.meta.contains(NormalModuleMeta::HAS_STAR_EXPORT)
  }

  pub fn is_included(&self) -> bool {
    self.meta.contains(NormalModuleMeta::INCLUDED)
  }

  /// Whether the module is JavaScript source, as opposed to data or assets turned into a module.
  pub fn is_js_type(&self) -> bool {
    matches!(self.module_type, ModuleType::Js | ModuleType::Jsx | ModuleType::Ts | ModuleType::Tsx)
  }

  /// Modules a plugin provides, which have no file behind them.
  pub fn is_virtual(&self) -> bool {
    !std::path::Path::new(self.id.as_ref()).is_absolute()
  }

  pub fn source(&self) -> &ArcStr {
    &self.ecma.source
  }

  pub fn star_exports_from_external_modules<'me>(
    &'me self,
    modules: &'me IndexVec<ModuleIdx, Module>,
  ) -> impl Iterator<Item = ImportRecordIdx> + 'me {
    self.import_records.iter_enumerated().filter_map(move |(rec_id, rec)| {
      if !rec.is_export_star() {
        return None;
      }
      match modules[rec.resolved_module()] {
        Module::External(_) => Some(rec_id),
        Module::Normal(_) => None,
      }
    })
  }

  /// Moves the module to `next`, returning `false` if that is not a valid transition.
  pub fn transition_to(&mut self, next: ModuleStatus) -> bool {
    if self.status.can_transition_to(next) {
      tracing::debug!(module = %self.stable_id, from = %self.status, to = %next, "module status");
      self.status = next;
      true
    } else {
      false
    }
  }
}
