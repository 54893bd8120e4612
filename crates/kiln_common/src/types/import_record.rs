use std::fmt::Debug;

use arcstr::ArcStr;
use kiln_ecmascript::Span;

use crate::{ImportKind, ImportRecordMeta, ModuleIdx, StmtInfoIdx, SymbolRef};

pub type RawImportRecord = ImportRecord<()>;
pub type ResolvedImportRecord = ImportRecord<ModuleIdx>;

#[derive(Debug, Clone)]
pub struct ImportRecord<State: Debug> {
  pub state: State,
  /// `./lib.js` in `import { foo } from './lib.js';`
  pub specifier: ArcStr,
  pub kind: ImportKind,
  /// The specifier string of a static import, the whole `import(..)` expression of a dynamic one.
  pub span: Span,
  pub meta: ImportRecordMeta,
  pub related_stmt_info_idx: StmtInfoIdx,
  /// `import_x` in `var import_x = __toESM(require_x())`, the binding an esm import of a
  /// commonjs module reads from. Unused otherwise.
  pub namespace_ref: SymbolRef,
}

impl RawImportRecord {
  pub fn new(
    specifier: ArcStr,
    kind: ImportKind,
    span: Span,
    related_stmt_info_idx: StmtInfoIdx,
    namespace_ref: SymbolRef,
  ) -> Self {
    Self {
      state: (),
      specifier,
      kind,
      span,
      meta: ImportRecordMeta::empty(),
      related_stmt_info_idx,
      namespace_ref,
    }
  }

  #[must_use]
  pub fn with_meta(mut self, meta: ImportRecordMeta) -> Self {
    self.meta = meta;
    self
  }

  pub fn into_resolved(self, resolved_module: ModuleIdx) -> ResolvedImportRecord {
    ResolvedImportRecord {
      state: resolved_module,
      specifier: self.specifier,
      kind: self.kind,
      span: self.span,
      meta: self.meta,
      related_stmt_info_idx: self.related_stmt_info_idx,
      namespace_ref: self.namespace_ref,
    }
  }
}

impl ResolvedImportRecord {
  #[inline]
  pub fn resolved_module(&self) -> ModuleIdx {
    self.state
  }

  pub fn is_export_star(&self) -> bool {
    self.meta.contains(ImportRecordMeta::IS_EXPORT_STAR)
  }
}
