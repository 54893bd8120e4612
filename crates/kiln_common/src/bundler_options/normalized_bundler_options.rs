use std::path::PathBuf;

use rustc_hash::FxHashMap;

use crate::{ESTarget, InputItem, JsxOptions, ModuleType, OutputFormat, Platform};

#[allow(clippy::struct_excessive_bools)] // Using raw booleans is more clear in this case
#[derive(Debug)]
pub struct NormalizedBundlerOptions {
  // --- Input
  pub input: Vec<InputItem>,
  pub cwd: PathBuf,
  pub platform: Platform,
  pub external: Vec<String>,
  pub define: FxHashMap<String, String>,
  pub loader: FxHashMap<String, ModuleType>,
  pub resolve_extensions: Vec<String>,
  pub main_fields: Vec<String>,
  pub conditions: Vec<String>,
  pub jsx: JsxOptions,
  pub tree_shaking: bool,

  // --- Output
  pub name: Option<String>,
  pub entry_filenames: String,
  pub chunk_filenames: String,
  pub asset_filenames: String,
  pub dir: String,
  pub file: Option<String>,
  pub format: OutputFormat,
  pub target: ESTarget,
  pub splitting: bool,
  pub minify: bool,
  pub keep_names: bool,
  pub sourcemap: bool,
  pub metafile: bool,
  pub banner: Option<String>,
  pub footer: Option<String>,
  pub chunk_size_warning_limit: usize,
}

impl NormalizedBundlerOptions {
  /// The loader for `ext`, given without the leading dot. A `loader` entry wins over the
  /// built-in mapping.
  pub fn module_type_for_extension(&self, ext: &str) -> Option<ModuleType> {
    self.loader.get(&format!(".{ext}")).copied().or_else(|| ModuleType::from_extension(ext))
  }

  pub fn out_dir(&self) -> PathBuf {
    self.cwd.join(&self.dir)
  }
}
