use kiln_error::BuildDiagnostic;
use oxc_index::IndexVec;

use crate::{ImportRecordIdx, NormalModule, RawImportRecord, ResolvedId, SymbolRefDbForModule};

pub struct NormalModuleTaskResult {
  pub module: NormalModule,
  pub symbols: SymbolRefDbForModule,
  /// One entry per import record. Records that failed to resolve with a tolerated error are
  /// resolved to an external module.
  pub resolved_deps: IndexVec<ImportRecordIdx, ResolvedId>,
  pub raw_import_records: IndexVec<ImportRecordIdx, RawImportRecord>,
  pub warnings: Vec<BuildDiagnostic>,
}
