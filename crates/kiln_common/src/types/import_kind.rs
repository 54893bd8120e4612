use std::fmt::Display;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ImportKind {
  /// `import ... from` and `export ... from`
  Import,
  /// `import(...)`
  DynamicImport,
  /// `require(...)`
  Require,
  /// An input entry.
  EntryPoint,
}

impl ImportKind {
  /// The importee has to be evaluated before the statement with the import runs.
  pub fn is_eager(&self) -> bool {
    matches!(self, Self::Import | Self::Require)
  }

  pub fn as_str(&self) -> &'static str {
    match self {
      Self::Import => "import-statement",
      Self::DynamicImport => "dynamic-import",
      Self::Require => "require-call",
      Self::EntryPoint => "entry-point",
    }
  }
}

impl Display for ImportKind {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.write_str(self.as_str())
  }
}
