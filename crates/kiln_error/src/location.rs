use std::fmt::Display;

use arcstr::ArcStr;

/// A one-based position in a source file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Location {
  pub file: ArcStr,
  pub line: u32,
  pub column: u32,
}

impl Location {
  pub fn new(file: impl Into<ArcStr>, line: u32, column: u32) -> Self {
    Self { file: file.into(), line, column }
  }
}

impl Display for Location {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    write!(f, "{}:{}:{}", self.file, self.line, self.column)
  }
}
