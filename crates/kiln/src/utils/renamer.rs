use std::collections::hash_map::Entry;

use arcstr::ArcStr;
use kiln_common::{ModuleIdx, NormalModule, OutputFormat, SymbolRef, SymbolRefDb};
use kiln_utils::{
  concat_string,
  ecmascript::{GLOBAL_OBJECTS, RESERVED_KEYWORDS},
};
use rustc_hash::{FxHashMap, FxHashSet};

use crate::{types::IndexModules, utils::chunk::runtime_helpers::RUNTIME_HELPER_NAMES};

/// Gives every top-level symbol of a chunk a name no other symbol of the chunk uses. A name that
/// is taken gets a `$N` suffix, counted per original name in the order symbols are added.
#[derive(Debug)]
pub struct Renamer<'name> {
  /// Next suffix to try for a name. `a -> 0` means `a` is taken, try `a$1` next.
  used_canonical_names: FxHashMap<ArcStr, u32>,
  canonical_names: FxHashMap<SymbolRef, ArcStr>,
  symbols: &'name SymbolRefDb,
  module_table: &'name IndexModules,
  entry_module: Option<&'name NormalModule>,
  used_names: FxHashSet<ArcStr>,
}

impl<'name> Renamer<'name> {
  pub fn new(
    entry_module: Option<&'name NormalModule>,
    symbols: &'name SymbolRefDb,
    module_table: &'name IndexModules,
    format: OutputFormat,
  ) -> Self {
    let manual_reserved: &[&str] = match format {
      OutputFormat::Cjs => &["module", "require", "exports", "__filename", "__dirname"],
      OutputFormat::Iife => &["require"],
      OutputFormat::Esm => &[],
    };

    let used_canonical_names = manual_reserved
      .iter()
      .chain(RUNTIME_HELPER_NAMES.iter())
      .chain(["Object", "Promise"].iter())
      .chain(RESERVED_KEYWORDS.iter())
      .chain(GLOBAL_OBJECTS.iter())
      .map(|s| (ArcStr::from(*s), 0))
      .collect();

    Self {
      used_canonical_names,
      canonical_names: FxHashMap::default(),
      symbols,
      module_table,
      entry_module,
      used_names: FxHashSet::default(),
    }
  }

  /// Global names the chunk refers to. No symbol may shadow them.
  pub fn reserve(&mut self, name: &str) {
    self.used_canonical_names.entry(name.into()).or_insert(0);
  }

  pub fn add_symbol_in_root_scope(&mut self, symbol_ref: SymbolRef) {
    let canonical_ref = symbol_ref.canonical_ref(self.symbols);
    if self.canonical_names.contains_key(&canonical_ref) {
      return;
    }
    let original_name = canonical_ref.name(self.symbols);

    let (mut candidate_name, mut count) =
      match self.used_canonical_names.entry(original_name.into()) {
        Entry::Occupied(mut o) => {
          *o.get_mut() += 1;
          (Self::generate_candidate_name(original_name, *o.get()), *o.get())
        }
        Entry::Vacant(v) => (v.key().clone(), *v.insert(0)),
      };

    loop {
      // The entry module keeps the names it declares.
      let is_entry_root_binding = self.entry_module.is_some_and(|module| {
        self.symbols.local_db(module.idx).lookup(&candidate_name).is_some_and(|base_symbol| {
          base_symbol == canonical_ref || base_symbol.canonical_ref(self.symbols) == canonical_ref
        })
      });
      if is_entry_root_binding && !self.used_names.contains(&candidate_name) {
        break;
      }

      let taken_by_entry = self.entry_module.is_some_and(|module| {
        module.ecma.scanned.nested_names.contains(candidate_name.as_str())
          || self.symbols.local_db(module.idx).lookup(&candidate_name).is_some()
      });
      // A new name must not be bound below module scope in the symbol's own module. Keeping the
      // original name is fine, the source already resolves it.
      let shadowed_in_owner = candidate_name.as_str() != original_name
        && self.is_nested_name(canonical_ref.owner, &candidate_name);

      if !self.used_names.contains(&candidate_name) && !taken_by_entry && !shadowed_in_owner {
        break;
      }

      count += 1;
      candidate_name = Self::generate_candidate_name(original_name, count);
    }

    if let Some(next) = self.used_canonical_names.get_mut(original_name) {
      *next = (*next).max(count);
    }
    self.used_names.insert(candidate_name.clone());
    self.canonical_names.insert(canonical_ref, candidate_name);
  }

  fn is_nested_name(&self, owner: ModuleIdx, name: &str) -> bool {
    self.module_table[owner]
      .as_normal()
      .is_some_and(|module| module.ecma.scanned.nested_names.contains(name))
  }

  fn generate_candidate_name(original_name: &str, count: u32) -> ArcStr {
    concat_string!(original_name, "$", itoa::Buffer::new().format(count)).into()
  }

  pub fn into_canonical_names(self) -> FxHashMap<SymbolRef, ArcStr> {
    self.canonical_names
  }
}
