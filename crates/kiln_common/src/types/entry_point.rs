use arcstr::ArcStr;

use crate::{ModuleIdx, StmtInfoIdx};

#[derive(Debug, Clone)]
pub struct EntryPoint {
  pub name: Option<ArcStr>,
  pub id: ModuleIdx,
  pub kind: EntryPointKind,
  /// The statements containing the `import()` expressions that create a dynamic entry.
  pub related_stmt_infos: Vec<(ModuleIdx, StmtInfoIdx)>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryPointKind {
  UserDefined,
  DynamicImport,
}

impl EntryPointKind {
  #[inline]
  pub fn is_user_defined(&self) -> bool {
    matches!(self, Self::UserDefined)
  }
}
