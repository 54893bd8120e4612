use std::fmt::Display;

use serde::Deserialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
  Esm,
  Cjs,
  Iife,
}

impl OutputFormat {
  #[inline]
  pub fn keep_esm_import_export_syntax(&self) -> bool {
    matches!(self, Self::Esm)
  }

  /// Whether imports of external modules become `require()` calls.
  #[inline]
  pub fn requires_externals(&self) -> bool {
    matches!(self, Self::Cjs | Self::Iife)
  }

  #[inline]
  pub fn supports_code_splitting(&self) -> bool {
    matches!(self, Self::Esm | Self::Cjs)
  }
}

impl Display for OutputFormat {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match self {
      Self::Esm => write!(f, "esm"),
      Self::Cjs => write!(f, "cjs"),
      Self::Iife => write!(f, "iife"),
    }
  }
}
