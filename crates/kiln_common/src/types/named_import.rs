use std::fmt::Display;

use arcstr::ArcStr;
use kiln_ecmascript::Span;

use crate::{ImportRecordIdx, SymbolRef};

/// This is a representation for statements like
/// - Case A: `import { foo } from 'foo'`
/// - Case B: `import * as fooNs from 'foo'`
/// - Case C: `import { foo as foo2 } from 'foo'`
/// - Case D: `import foo from 'foo'`
/// - Case E: `export { foo } from 'foo'`
#[derive(Debug, Clone)]
pub struct NamedImport {
  pub span: Span,
  /// For case A, the `imported` is `foo`.
  /// For case B, the `imported` is meaningless.
  /// For case C, the `imported` is `foo`.
  /// For case D, the `imported` is `default`.
  /// For case E, the `imported` is `foo`.
  pub imported: Specifier,
  /// For case A, the `imported_as` is a `SymbolRef` that points to `foo`.
  /// For case B, the `imported_as` is a `SymbolRef` that points to `fooNs`.
  /// For case C, the `imported_as` is a `SymbolRef` that points to `foo2`.
  /// For case D, the `imported_as` is a `SymbolRef` that points to `foo`.
  /// For case E, the `imported_as` is a facade `SymbolRef` the export points to.
  pub imported_as: SymbolRef,
  pub record_id: ImportRecordIdx,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Specifier {
  Star,
  Literal(ArcStr),
}

impl Specifier {
}

impl From<kiln_ecmascript::ImportedName> for Specifier {
  fn from(value: kiln_ecmascript::ImportedName) -> Self {
    match value {
      kiln_ecmascript::ImportedName::Default => Self::Literal(arcstr::literal!("default")),
      kiln_ecmascript::ImportedName::Star => Self::Star,
      kiln_ecmascript::ImportedName::Name(name) => Self::Literal(name.into()),
    }
  }
}

impl Display for Specifier {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match self {
      Self::Star => f.write_str("*"),
      Self::Literal(name) => f.write_str(name),
    }
  }
}
