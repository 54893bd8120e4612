mod ecma_compiler;
mod error;
mod es_target;
mod printer;
mod scanner;
mod source_syntax;
mod span;
mod transform;

pub use crate::{
  ecma_compiler::{EcmaAst, EcmaCompiler, Mapping, MinifyReturn},
  error::{EcmaError, EcmaErrorKind, EcmaResult},
  es_target::ESTarget,
  printer::Edits,
  scanner::{
    scan, ExportLocal, IdentRef, IdentRefFlags, ImportRecordMeta, ImportedName, ScanResult,
    ScannedExport, ScannedImportKind, ScannedImportRecord, ScannedNamedImport, ScannedStmt,
    StmtKind,
  },
  source_syntax::SourceSyntax,
  span::Span,
  transform::{transform, JsxOptions, JsxRuntime, TransformOptions, TransformReturn},
};
