use std::path::PathBuf;

use kiln_common::ModuleType;

#[derive(Debug, Default, Clone)]
pub struct OnLoadResult {
  pub contents: String,
  /// Defaults to the loader of the path's extension, or `js`.
  pub loader: Option<ModuleType>,
  /// Where the module's own imports are resolved from. Defaults to the directory of the path
  /// for files, and to `cwd` otherwise.
  pub resolve_dir: Option<PathBuf>,
}
