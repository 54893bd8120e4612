use kiln_common::{Metafile, Output};
use kiln_error::BuildDiagnostic;

#[derive(Debug, Default)]
pub struct BundleOutput {
  /// Chunks first, in chunk order, then css bundles, source maps and copied files.
  pub assets: Vec<Output>,
  pub warnings: Vec<BuildDiagnostic>,
  pub metafile: Metafile,
}

impl BundleOutput {
  pub fn get(&self, filename: &str) -> Option<&Output> {
    self.assets.iter().find(|asset| asset.filename() == filename)
  }
}

/// What `write` put on disk, relative to `cwd`.
#[derive(Debug, Default)]
pub struct WriteOutput {
  pub output: BundleOutput,
  pub written_files: Vec<String>,
}
