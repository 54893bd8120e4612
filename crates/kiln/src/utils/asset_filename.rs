use std::path::Path;

use kiln_common::{FilenameTemplate, NormalizedBundlerOptions};
use kiln_utils::{sanitize_file_name::sanitize_file_name, xxhash::xxhash_base64_url};

/// The output file name of a `file` module, derived from `assetFilenames`. The hash only
/// depends on the content, so the name is known while the module is loaded.
pub fn asset_filename(options: &NormalizedBundlerOptions, id: &str, content: &[u8]) -> String {
  let path = Path::new(id);
  let name = path.file_stem().map(|stem| sanitize_file_name(&stem.to_string_lossy()));
  let ext = path.extension().map(|ext| ext.to_string_lossy().into_owned()).unwrap_or_default();
  let hash = xxhash_base64_url(content);
  FilenameTemplate::new(options.asset_filenames.clone()).render(
    Some(name.as_deref().unwrap_or("asset")),
    Some(&ext),
    Some(|len: Option<usize>| hash.chars().take(len.unwrap_or(8)).collect::<String>()),
  )
}
