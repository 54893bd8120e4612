use std::ops::{Deref, DerefMut};

use oxc_index::{Idx, IndexVec};
use rustc_hash::FxHashMap;

use crate::{ImportRecordIdx, StmtInfoIdx, SymbolRef};

/// `stmt_infos[0]` is the statement that declares the module namespace object. It has no source
/// text and is rendered by the linker when included. The rest follow the top-level statements
/// of the module in source order.
#[derive(Debug, Default)]
pub struct StmtInfos {
  infos: IndexVec<StmtInfoIdx, StmtInfo>,
  // only for top level symbols
  symbol_ref_to_declared_stmt_idx: FxHashMap<SymbolRef, Vec<StmtInfoIdx>>,
}

impl StmtInfos {
  pub const NAMESPACE_STMT_IDX: StmtInfoIdx = StmtInfoIdx::from_raw_unchecked(0);

  /// The slot of the `stmt_idx`-th top-level statement.
  #[inline]
  pub fn stmt_info_idx_of(stmt_idx: usize) -> StmtInfoIdx {
    StmtInfoIdx::from_usize(stmt_idx + 1)
  }

  pub fn new() -> Self {
    Self {
      infos: IndexVec::from_vec(vec![StmtInfo::default()]),
      symbol_ref_to_declared_stmt_idx: FxHashMap::default(),
    }
  }

  pub fn add_stmt_info(&mut self, info: StmtInfo) -> StmtInfoIdx {
    let id = self.infos.push(info);
    for symbol_ref in &self.infos[id].declared_symbols {
      self.symbol_ref_to_declared_stmt_idx.entry(*symbol_ref).or_default().push(id);
    }
    id
  }

  pub fn replace_namespace_stmt_info(&mut self, info: StmtInfo) {
    for symbol_ref in &info.declared_symbols {
      self
        .symbol_ref_to_declared_stmt_idx
        .entry(*symbol_ref)
        .or_default()
        .push(Self::NAMESPACE_STMT_IDX);
    }
    self.infos[Self::NAMESPACE_STMT_IDX] = info;
  }

  /// Adds a symbol the linker creates to the ones statement `id` declares.
  pub fn declare_symbol_for_stmt(&mut self, id: StmtInfoIdx, symbol_ref: SymbolRef) {
    self.infos[id].declared_symbols.push(symbol_ref);
    self.symbol_ref_to_declared_stmt_idx.entry(symbol_ref).or_default().push(id);
  }

  pub fn declared_stmts_by_symbol(&self, symbol_ref: &SymbolRef) -> &[StmtInfoIdx] {
    self.symbol_ref_to_declared_stmt_idx.get(symbol_ref).map_or(&[], Vec::as_slice)
  }
}

impl Deref for StmtInfos {
  type Target = IndexVec<StmtInfoIdx, StmtInfo>;

  fn deref(&self) -> &Self::Target {
    &self.infos
  }
}

impl DerefMut for StmtInfos {
  fn deref_mut(&mut self) -> &mut Self::Target {
    &mut self.infos
  }
}

#[derive(Default, Debug, Clone)]
pub struct StmtInfo {
  /// The index of the top-level statement in the scan result. `None` for statements the linker
  /// creates.
  pub stmt_idx: Option<usize>,
  // The statement declares these symbols.
  pub declared_symbols: Vec<SymbolRef>,
  // The statement references these symbols.
  pub referenced_symbols: Vec<SymbolRef>,
  pub side_effect: bool,
  pub is_included: bool,
  pub import_records: Vec<ImportRecordIdx>,
}
