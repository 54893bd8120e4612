use arcstr::ArcStr;
use kiln_common::{ImportRecordIdx, ModuleIdx, SymbolRef, SymbolRefDb, WrapKind};
use kiln_utils::indexmap::FxIndexSet;
use oxc_index::IndexVec;
use rustc_hash::FxHashMap;

/// Module information that only exists once the whole graph is known.
#[derive(Debug, Default)]
pub struct LinkingMetadata {
  /// Static dependencies, in import order. Externals included.
  pub dependencies: FxIndexSet<ModuleIdx>,
  /// The module's own exports plus the ones `export *` brings in.
  pub resolved_exports: FxHashMap<ArcStr, SymbolRef>,
  /// Keys of `resolved_exports`, sorted.
  pub sorted_resolved_exports: Vec<ArcStr>,
  pub referenced_symbols_by_entry_point_chunk: Vec<SymbolRef>,
  /// `export * from "external"` records. Only entries can forward them, and only as esm.
  pub star_exports_from_external_modules: Vec<ImportRecordIdx>,
  pub wrap_kind: WrapKind,
  /// `require_<name>`, the function a wrapped module's code runs in. Calling it the first time
  /// runs the module and returns its `module.exports`.
  pub wrapper_ref: Option<SymbolRef>,
}

impl LinkingMetadata {
  pub fn canonical_exports<'a>(
    &'a self,
    symbols: &'a SymbolRefDb,
  ) -> impl Iterator<Item = (&'a ArcStr, SymbolRef)> + 'a {
    self
      .sorted_resolved_exports
      .iter()
      .map(move |name| (name, symbols.canonical_ref_for(self.resolved_exports[name])))
  }
}

pub type LinkingMetadataVec = IndexVec<ModuleIdx, LinkingMetadata>;
