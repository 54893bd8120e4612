use std::fmt::Display;

use kiln_utils::line_index::LineIndex;
use oxc::diagnostics::{OxcDiagnostic, Severity};

use crate::ESTarget;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EcmaErrorKind {
  Syntax(String),
  Unsupported { construct: &'static str, min_target: ESTarget },
}

/// An error found while parsing, scanning or transforming one module.
/// `line` and `column` are one-based.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EcmaError {
  pub kind: EcmaErrorKind,
  pub line: u32,
  pub column: u32,
}

impl EcmaError {
  fn at(source: &str, offset: u32, kind: EcmaErrorKind) -> Self {
    let (line, column) = LineIndex::new(source).line_col(offset);
    Self { kind, line: line + 1, column: column + 1 }
  }

  pub fn syntax(source: &str, offset: u32, message: impl Into<String>) -> Self {
    Self::at(source, offset, EcmaErrorKind::Syntax(message.into()))
  }

  pub fn unsupported(
    source: &str,
    offset: u32,
    construct: &'static str,
    min_target: ESTarget,
  ) -> Self {
    Self::at(source, offset, EcmaErrorKind::Unsupported { construct, min_target })
  }

  /// Keeps the diagnostics of error severity. Each one is placed at its first label.
  pub(crate) fn from_diagnostics(
    source: &str,
    diagnostics: impl IntoIterator<Item = OxcDiagnostic>,
  ) -> Vec<Self> {
    diagnostics
      .into_iter()
      .filter(|diagnostic| matches!(diagnostic.severity, Severity::Error))
      .map(|diagnostic| {
        let offset = diagnostic
          .labels
          .as_ref()
          .and_then(|labels| labels.first())
          .map_or(0, |label| u32::try_from(label.offset()).unwrap_or(u32::MAX));
        Self::syntax(source, offset.min(source.len() as u32), diagnostic.message.to_string())
      })
      .collect()
  }
}

impl Display for EcmaError {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match &self.kind {
      EcmaErrorKind::Syntax(message) => write!(f, "{}:{}: {message}", self.line, self.column),
      EcmaErrorKind::Unsupported { construct, min_target } => {
        write!(f, "{}:{}: {construct} requires {min_target}", self.line, self.column)
      }
    }
  }
}

pub type EcmaResult<T> = Result<T, Vec<EcmaError>>;
