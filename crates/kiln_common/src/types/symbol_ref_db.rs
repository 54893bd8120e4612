use arcstr::ArcStr;
use oxc_index::IndexVec;
use rustc_hash::FxHashMap;

use crate::{ChunkIdx, ModuleIdx, NamespaceAlias, SymbolId, SymbolRef};

#[derive(Debug, Default, Clone)]
pub struct SymbolRefDataClassic {
  /// For case `import {a} from 'external';console.log(a)` in cjs output, the symbol `a` becomes
  /// `external.a`, where `external` is the namespace symbol of the external module.
  /// If `namespace_alias` is not `None`, then this symbol must be rewritten to a property access.
  pub namespace_alias: Option<NamespaceAlias>,
  /// The symbol that this symbol is linked to.
  pub link: Option<SymbolRef>,
  /// The chunk that this symbol is defined in.
  pub chunk_id: Option<ChunkIdx>,
}

/// Module-scope bindings of one module, plus the facade symbols the linker adds to it.
#[derive(Debug)]
pub struct SymbolRefDbForModule {
  pub owner: ModuleIdx,
  names: IndexVec<SymbolId, ArcStr>,
  classic_data: IndexVec<SymbolId, SymbolRefDataClassic>,
  root_bindings: FxHashMap<ArcStr, SymbolId>,
}

impl SymbolRefDbForModule {
  pub fn new(owner: ModuleIdx) -> Self {
    Self {
      owner,
      names: IndexVec::default(),
      classic_data: IndexVec::default(),
      root_bindings: FxHashMap::default(),
    }
  }

  /// Returns the symbol bound to `name` at module scope, creating it on first use.
  pub fn declare(&mut self, name: &str) -> SymbolRef {
    if let Some(symbol) = self.root_bindings.get(name) {
      return (self.owner, *symbol).into();
    }
    let symbol_ref = self.create_facade_root_symbol_ref(name);
    self.root_bindings.insert(name.into(), symbol_ref.symbol);
    symbol_ref
  }

  // The `facade` means the symbol does not exist in the source text.
  pub fn create_facade_root_symbol_ref(&mut self, name: &str) -> SymbolRef {
    self.classic_data.push(SymbolRefDataClassic::default());
    (self.owner, self.names.push(name.into())).into()
  }

  pub fn lookup(&self, name: &str) -> Option<SymbolRef> {
    self.root_bindings.get(name).map(|symbol| (self.owner, *symbol).into())
  }

  pub fn symbol_name(&self, symbol: SymbolId) -> &str {
    &self.names[symbol]
  }

  pub fn symbols_len(&self) -> usize {
    self.names.len()
  }
}

// Information about symbols for all modules
#[derive(Debug, Default)]
pub struct SymbolRefDb {
  inner: IndexVec<ModuleIdx, SymbolRefDbForModule>,
}

impl SymbolRefDb {
  pub fn new(inner: IndexVec<ModuleIdx, SymbolRefDbForModule>) -> Self {
    Self { inner }
  }

  pub fn local_db(&self, owner: ModuleIdx) -> &SymbolRefDbForModule {
    &self.inner[owner]
  }

  pub fn create_facade_root_symbol_ref(&mut self, owner: ModuleIdx, name: &str) -> SymbolRef {
    self.inner[owner].create_facade_root_symbol_ref(name)
  }

  /// Make `base` point to `target`
  pub fn link(&mut self, base: SymbolRef, target: SymbolRef) {
    let base_root = self.find_mut(base);
    let target_root = self.find_mut(target);
    if base_root == target_root {
      // already linked
      return;
    }
    self.get_mut(base_root).link = Some(target_root);
  }

  pub fn canonical_name_for<'a>(
    &'a self,
    refer: SymbolRef,
    canonical_names: &'a FxHashMap<SymbolRef, ArcStr>,
  ) -> &'a str {
    let canonical_ref = self.canonical_ref_for(refer);
    canonical_names.get(&canonical_ref).map_or_else(move || canonical_ref.name(self), ArcStr::as_str)
  }

  pub fn get(&self, refer: SymbolRef) -> &SymbolRefDataClassic {
    &self.inner[refer.owner].classic_data[refer.symbol]
  }

  pub fn get_mut(&mut self, refer: SymbolRef) -> &mut SymbolRefDataClassic {
    &mut self.inner[refer.owner].classic_data[refer.symbol]
  }

  /// <https://en.wikipedia.org/wiki/Disjoint-set_data_structure>
  /// See Path halving
  pub fn find_mut(&mut self, target: SymbolRef) -> SymbolRef {
    let mut canonical = target;
    while let Some(parent) = self.get(canonical).link {
      let grand_parent = self.get(parent).link;
      self.get_mut(canonical).link = grand_parent.or(Some(parent));
      canonical = parent;
    }
    canonical
  }

  // Used for the situation where rust require `&self`
  pub fn canonical_ref_for(&self, target: SymbolRef) -> SymbolRef {
    let mut canonical = target;
    while let Some(founded) = self.get(canonical).link {
      debug_assert!(founded != target);
      canonical = founded;
    }
    canonical
  }
}

#[cfg(test)]
mod tests {
  use oxc_index::Idx;

  use super::*;

  fn db_with(modules: &[&[&str]]) -> SymbolRefDb {
    let inner = modules
      .iter()
      .enumerate()
      .map(|(idx, names)| {
        let mut local = SymbolRefDbForModule::new(ModuleIdx::from_usize(idx));
        for name in *names {
          local.declare(name);
        }
        local
      })
      .collect();
    SymbolRefDb::new(inner)
  }

  #[test]
  fn links_resolve_to_the_same_canonical_symbol() {
    let mut db = db_with(&[&["a"], &["b"], &["c"]]);
    let a = db.local_db(ModuleIdx::from_usize(0)).lookup("a").unwrap();
    let b = db.local_db(ModuleIdx::from_usize(1)).lookup("b").unwrap();
    let c = db.local_db(ModuleIdx::from_usize(2)).lookup("c").unwrap();
    db.link(a, b);
    db.link(b, c);
    assert_eq!(db.canonical_ref_for(a), c);
    assert_eq!(db.find_mut(a), c);
    assert_eq!(a.name(&db), "a");

    let mut names = FxHashMap::default();
    names.insert(c, ArcStr::from("c$1"));
    assert_eq!(db.canonical_name_for(a, &names), "c$1");
  }

  #[test]
  fn declare_is_idempotent() {
    let mut local = SymbolRefDbForModule::new(ModuleIdx::from_usize(0));
    let first = local.declare("x");
    let facade = local.create_facade_root_symbol_ref("x");
    assert_eq!(local.declare("x"), first);
    assert_ne!(facade, first);
    assert_eq!(local.symbols_len(), 2);
  }
}
