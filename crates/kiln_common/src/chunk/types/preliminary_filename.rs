use std::ops::Deref;

use arcstr::ArcStr;

/// A file name that may still contain hash placeholders.
#[derive(Debug, Clone, Default)]
pub struct PreliminaryFilename {
  filename: ArcStr,
  hash_placeholder: Option<Vec<String>>,
}

impl PreliminaryFilename {
  pub fn new(filename: impl Into<ArcStr>, hash_placeholder: Option<Vec<String>>) -> Self {
    Self { filename: filename.into(), hash_placeholder }
  }

  pub fn hash_placeholder(&self) -> Option<&[String]> {
    self.hash_placeholder.as_deref()
  }

  pub fn as_arcstr(&self) -> &ArcStr {
    &self.filename
  }
}

impl Deref for PreliminaryFilename {
  type Target = str;

  fn deref(&self) -> &Self::Target {
    &self.filename
  }
}
