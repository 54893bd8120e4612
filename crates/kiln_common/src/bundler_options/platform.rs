use std::fmt::Display;

use serde::Deserialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
  /// Represents the Node.js environment.
  Node,
  /// Represents the Browser environment.
  Browser,
  /// Represents a platform-agnostic environment.
  Neutral,
}

impl Platform {
  /// The package.json fields consulted, in order, when a package has no `exports`.
  pub fn default_main_fields(self) -> &'static [&'static str] {
    match self {
      Self::Node => &["main", "module"],
      Self::Browser => &["browser", "module", "main"],
      Self::Neutral => &[],
    }
  }

  pub fn condition_name(self) -> Option<&'static str> {
    match self {
      Self::Node => Some("node"),
      Self::Browser => Some("browser"),
      Self::Neutral => None,
    }
  }
}

impl Display for Platform {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match self {
      Self::Node => write!(f, "node"),
      Self::Browser => write!(f, "browser"),
      Self::Neutral => write!(f, "neutral"),
    }
  }
}
