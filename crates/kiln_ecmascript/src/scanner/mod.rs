mod ast_scanner;
pub(crate) mod side_effect;

use oxc::allocator::Allocator;
use rustc_hash::FxHashSet;

use crate::{
  ecma_compiler::{build_scoping, parse_program},
  error::EcmaResult,
  source_syntax::SourceSyntax,
  span::Span,
};

pub use ast_scanner::AstScanner;

bitflags::bitflags! {
  #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
  pub struct IdentRefFlags: u8 {
    /// The identifier introduces the binding.
    const DECLARATION = 1;
    /// `{ a }` or `{ a = 1 }`: the token is both the property key and the binding.
    const SHORTHAND = 1 << 1;
    /// The local name in `export { a as b }`.
    const EXPORT_SPECIFIER = 1 << 2;
  }
}

bitflags::bitflags! {
  #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
  pub struct ImportRecordMeta: u8 {
    /// `export * from "x"`
    const IS_EXPORT_STAR = 1;
    /// `import "x"` or `import {} from "x"`
    const IS_PLAIN_IMPORT = 1 << 1;
    /// An `import()` or `require()` inside the block of a `try` statement.
    const IN_TRY_BLOCK = 1 << 2;
    /// `export { a } from "x"` and `export * as ns from "x"`
    const IS_REEXPORT = 1 << 3;
  }
}

/// An identifier that names a module-scope binding.
#[derive(Debug, Clone, Copy)]
pub struct IdentRef {
  pub span: Span,
  pub stmt: u32,
  pub flags: IdentRefFlags,
}

impl IdentRef {
  pub fn is_declaration(&self) -> bool {
    self.flags.contains(IdentRefFlags::DECLARATION)
  }

  pub fn is_shorthand(&self) -> bool {
    self.flags.contains(IdentRefFlags::SHORTHAND)
  }

  pub fn is_export_specifier(&self) -> bool {
    self.flags.contains(IdentRefFlags::EXPORT_SPECIFIER)
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ImportedName {
  Default,
  Star,
  Name(String),
}

impl ImportedName {
  pub fn from_name(name: String) -> Self {
    if name == "default" {
      Self::Default
    } else {
      Self::Name(name)
    }
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScannedImportKind {
  Static,
  Dynamic,
  /// `require("x")` with a string literal, where `require` is not bound by the module.
  Require,
}

#[derive(Debug, Clone)]
pub struct ScannedImportRecord {
  pub specifier: String,
  pub kind: ScannedImportKind,
  /// The specifier string for static imports, the whole call for `import()` and `require()`.
  pub span: Span,
  pub stmt: u32,
  pub meta: ImportRecordMeta,
}

#[derive(Debug, Clone)]
pub struct ScannedNamedImport {
  pub local: String,
  pub imported: ImportedName,
  pub record: u32,
  pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExportLocal {
  Name(String),
  /// The value of `export default <expression>` or of an anonymous default function or class.
  DefaultExpression,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScannedExport {
  Local { exported: String, local: ExportLocal },
  ReExport { exported: String, imported: ImportedName, record: u32 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StmtKind {
  Plain,
  Import {
    record: u32,
  },
  /// `export` in front of a declaration. `keyword` covers the keyword and the space after it.
  ExportDecl {
    keyword: Span,
  },
  /// `export default function ..` or `export default class ..`. `name_insert` is where a name has
  /// to be inserted when the declaration is anonymous.
  ExportDefaultDecl {
    keyword: Span,
    name_insert: Option<u32>,
  },
  ExportDefaultExpr {
    keyword: Span,
  },
  /// `export { .. }`, `export { .. } from ..` and `export * from ..`.
  ExportClause,
}

#[derive(Debug, Clone)]
pub struct ScannedStmt {
  /// Covers the statement and its `;`.
  pub span: Span,
  pub kind: StmtKind,
  pub declared: Vec<String>,
  pub referenced: Vec<String>,
  pub side_effects: bool,
  /// Module-scope functions and classes whose `name` property comes from a binding declared by
  /// this statement, in source order.
  pub named_values: Vec<String>,
}

#[derive(Debug, Default)]
pub struct ScanResult {
  pub stmts: Vec<ScannedStmt>,
  pub import_records: Vec<ScannedImportRecord>,
  pub named_imports: Vec<ScannedNamedImport>,
  pub exports: Vec<ScannedExport>,
  pub star_exports: Vec<u32>,
  pub refs: Vec<IdentRef>,
  /// References to names no scope declares.
  pub global_refs: Vec<IdentRef>,
  /// Names bound anywhere below module scope.
  pub nested_names: FxHashSet<String>,
  pub top_level_await: Option<Span>,
  /// The module contains an `import` or `export` declaration or `import.meta`.
  pub has_module_syntax: bool,
  /// The module references `module` or `exports` without declaring them.
  pub uses_commonjs: bool,
}

impl ScanResult {
  /// Names declared at module scope, in declaration order.
  pub fn module_names(&self) -> impl Iterator<Item = &str> {
    self.stmts.iter().flat_map(|stmt| stmt.declared.iter().map(String::as_str))
  }

  pub fn default_export(&self) -> Option<&ExportLocal> {
    self.exports.iter().find_map(|export| match export {
      ScannedExport::Local { exported, local } if exported == "default" => Some(local),
      _ => None,
    })
  }
}

/// Collects the statements, imports, exports and top-level bindings of a module written in
/// plain JavaScript.
pub fn scan(source: &str) -> EcmaResult<ScanResult> {
  let allocator = Allocator::default();
  let program = parse_program(&allocator, source, SourceSyntax::Js)?;
  let scoping = build_scoping(source, &program)?;
  AstScanner::new(source, &scoping).scan(&program)
}

#[cfg(test)]
mod tests;
