use crate::{Specifier, SymbolRef};

/// A binding one chunk imports from another chunk.
#[derive(Debug, Clone)]
pub struct CrossChunkImportItem {
  /// The name the exporting chunk exports the binding as. Set once export names are deconflicted.
  pub export_alias: Option<Specifier>,
  pub import_ref: SymbolRef,
}
