oxc_index::define_index_type! {
  pub struct ModuleIdx = u32;
}

oxc_index::define_index_type! {
  pub struct ChunkIdx = u32;
}

oxc_index::define_index_type! {
  pub struct AssetIdx = u32;
}

oxc_index::define_index_type! {
  pub struct StmtInfoIdx = u32;
}

oxc_index::define_index_type! {
  pub struct ImportRecordIdx = u32;
}

oxc_index::define_index_type! {
  /// A module-scope binding, local to its owner module.
  pub struct SymbolId = u32;
}
