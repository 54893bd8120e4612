use arcstr::ArcStr;

use crate::SymbolRef;

/// The symbol is rendered as the property `property_name` of the object `namespace_ref`.
#[derive(Debug, Clone)]
pub struct NamespaceAlias {
  pub property_name: ArcStr,
  pub namespace_ref: SymbolRef,
}
