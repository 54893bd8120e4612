use arcstr::ArcStr;

#[derive(Debug, Clone)]
pub struct OutputAsset {
  pub names: Vec<ArcStr>,
  /// Modules the asset was built from, for css bundles and `file` assets.
  pub module_ids: Vec<crate::ModuleId>,
  pub filename: ArcStr,
  pub source: Vec<u8>,
}

impl OutputAsset {
  pub fn filename(&self) -> &str {
    &self.filename
  }

  pub fn content_as_bytes(&self) -> &[u8] {
    &self.source
  }
}
