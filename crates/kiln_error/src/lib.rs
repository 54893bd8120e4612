mod diagnostic;
mod location;

use std::ops::{Deref, DerefMut};

pub use crate::{
  diagnostic::{BuildDiagnostic, Severity},
  location::Location,
};

/// Every fatal diagnostic collected during one build.
#[derive(Debug, Default)]
pub struct BuildError(pub Vec<BuildDiagnostic>);

impl BuildError {
  pub fn into_vec(self) -> Vec<BuildDiagnostic> {
    self.0
  }
}

impl Deref for BuildError {
  type Target = Vec<BuildDiagnostic>;

  fn deref(&self) -> &Self::Target {
    &self.0
  }
}

impl DerefMut for BuildError {
  fn deref_mut(&mut self) -> &mut Self::Target {
    &mut self.0
  }
}

impl From<BuildDiagnostic> for BuildError {
  fn from(error: BuildDiagnostic) -> Self {
    Self(vec![error])
  }
}

impl From<anyhow::Error> for BuildError {
  fn from(error: anyhow::Error) -> Self {
    Self(vec![BuildDiagnostic::Other(error)])
  }
}

impl From<Vec<BuildDiagnostic>> for BuildError {
  fn from(errors: Vec<BuildDiagnostic>) -> Self {
    Self(errors)
  }
}

impl std::fmt::Display for BuildError {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    for (i, diagnostic) in self.0.iter().enumerate() {
      if i > 0 {
        writeln!(f)?;
      }
      write!(f, "{diagnostic}")?;
    }
    Ok(())
  }
}

impl std::error::Error for BuildError {}

pub type BuildResult<T> = Result<T, BuildError>;
