use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum ResolveError {
  #[error("not found")]
  NotFound { candidates: Vec<String> },
  #[error("invalid package.json at {}: {reason}", path.display())]
  InvalidPackageJson { path: PathBuf, reason: String },
  #[error("\"{subpath}\" is not exported by package \"{package}\"")]
  NotExported { package: String, subpath: String, candidates: Vec<String> },
  #[error("{0}")]
  Other(String),
}

impl ResolveError {
  /// Every path tried before giving up.
  pub fn candidates(&self) -> &[String] {
    match self {
      Self::NotFound { candidates } | Self::NotExported { candidates, .. } => candidates,
      Self::InvalidPackageJson { .. } | Self::Other(_) => &[],
    }
  }
}
