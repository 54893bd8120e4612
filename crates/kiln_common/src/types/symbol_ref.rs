use crate::{ModuleIdx, SymbolId, SymbolRefDb};

/// `SymbolRef` is used to represent a symbol in a module when there are multiple modules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SymbolRef {
  pub owner: ModuleIdx,
  pub symbol: SymbolId,
}

impl From<(ModuleIdx, SymbolId)> for SymbolRef {
  fn from(value: (ModuleIdx, SymbolId)) -> Self {
    Self { owner: value.0, symbol: value.1 }
  }
}

impl SymbolRef {
  pub fn name<'db>(&self, db: &'db SymbolRefDb) -> &'db str {
    db.local_db(self.owner).symbol_name(self.symbol)
  }

  #[must_use]
  pub fn canonical_ref(&self, db: &SymbolRefDb) -> Self {
    db.canonical_ref_for(*self)
  }
}
