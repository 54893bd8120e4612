use arcstr::ArcStr;

use crate::Location;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
  Error,
  Warning,
}

#[derive(Debug, thiserror::Error)]
pub enum BuildDiagnostic {
  #[error("{loc}: Syntax error: {message}")]
  Syntax { loc: Location, message: String },

  #[error(
    "Could not resolve \"{specifier}\" from \"{importer}\". Tried: {}",
    display_candidates(.candidates)
  )]
  NotFound { specifier: String, importer: ArcStr, candidates: Vec<String> },

  #[error("{loc}: {construct} is not supported by target \"{target}\" (requires \"{min_target}\")")]
  UnsupportedSyntax {
    loc: Location,
    construct: &'static str,
    target: &'static str,
    min_target: &'static str,
  },

  #[error("Circular dependency: {}.", .paths.join(" -> "))]
  CircularDependency { paths: Vec<String> },

  #[error("\"{name}\" is not exported by \"{exporter}\", imported by \"{importer}\".")]
  MissingExport { name: String, exporter: ArcStr, importer: ArcStr },

  #[error("Build context has been disposed")]
  ContextDisposed,

  #[error("Chunk \"{filename}\" is {size} bytes, which exceeds the limit of {limit} bytes.")]
  LargeChunk { filename: ArcStr, size: usize, limit: usize },

  #[error("External \"{pattern}\" is never imported.")]
  UnusedExternal { pattern: String },

  #[error("[plugin {plugin}] {message}")]
  Plugin { plugin: String, message: String },

  #[error("Invalid option: {0}")]
  InvalidOption(String),

  #[error("Could not load \"{id}\": {reason}")]
  Load { id: ArcStr, reason: String },

  #[error(transparent)]
  Other(#[from] anyhow::Error),
}

fn display_candidates(candidates: &[String]) -> String {
  if candidates.is_empty() { "<none>".to_string() } else { candidates.join(", ") }
}

impl BuildDiagnostic {
  pub fn code(&self) -> &'static str {
    match self {
      Self::Syntax { .. } => "SYNTAX_ERROR",
      Self::NotFound { .. } => "UNRESOLVED_IMPORT",
      Self::UnsupportedSyntax { .. } => "UNSUPPORTED_SYNTAX",
      Self::CircularDependency { .. } => "CIRCULAR_DEPENDENCY",
      Self::MissingExport { .. } => "MISSING_EXPORT",
      Self::ContextDisposed => "CONTEXT_DISPOSED",
      Self::LargeChunk { .. } => "LARGE_CHUNK",
      Self::UnusedExternal { .. } => "UNUSED_EXTERNAL",
      Self::Plugin { .. } => "PLUGIN_ERROR",
      Self::InvalidOption(_) => "INVALID_OPTION",
      Self::Load { .. } => "LOAD_ERROR",
      Self::Other(_) => "UNKNOWN_ERROR",
    }
  }

  /// The severity a diagnostic has by default. Plugin lifecycle failures are reported as
  /// warnings regardless, see `PluginDriver`.
  pub fn severity(&self) -> Severity {
    match self {
      Self::CircularDependency { .. } | Self::LargeChunk { .. } | Self::UnusedExternal { .. } => {
        Severity::Warning
      }
      _ => Severity::Error,
    }
  }

  pub fn is_warning(&self) -> bool {
    self.severity() == Severity::Warning
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn not_found_lists_candidates() {
    let diagnostic = BuildDiagnostic::NotFound {
      specifier: "./missing.js".to_string(),
      importer: "/src/main.js".into(),
      candidates: vec!["/src/missing.js".to_string(), "/src/missing.ts".to_string()],
    };
    assert_eq!(
      diagnostic.to_string(),
      r#"Could not resolve "./missing.js" from "/src/main.js". Tried: /src/missing.js, /src/missing.ts"#
    );
    assert_eq!(diagnostic.severity(), Severity::Error);
  }

  #[test]
  fn circular_dependency_is_a_warning() {
    let diagnostic =
      BuildDiagnostic::CircularDependency { paths: vec!["a.js".into(), "b.js".into(), "a.js".into()] };
    assert_eq!(diagnostic.to_string(), "Circular dependency: a.js -> b.js -> a.js.");
    assert!(diagnostic.is_warning());
  }

  #[test]
  fn syntax_error_has_location() {
    let diagnostic = BuildDiagnostic::Syntax {
      loc: Location::new("src/main.js", 3, 7),
      message: "Unterminated string literal".to_string(),
    };
    assert_eq!(diagnostic.to_string(), "src/main.js:3:7: Syntax error: Unterminated string literal");
    assert_eq!(diagnostic.code(), "SYNTAX_ERROR");
  }
}
