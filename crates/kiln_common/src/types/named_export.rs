use kiln_ecmascript::Span;

use crate::SymbolRef;

/// This is a representation for statements like
/// - Case A: `export function foo() {}`
/// - Case B: `const foo = 1; export { foo }`
/// - Case C: `const foo = 1; export { foo as foo2 }`
/// - Case D: `export { foo } from './foo'`, bound to a facade symbol that is linked later
#[derive(Debug, Clone, Copy)]
pub struct LocalExport {
  pub span: Span,
  pub referenced: SymbolRef,
}
