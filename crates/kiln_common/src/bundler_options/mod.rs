pub mod filename_template;
pub mod input_item;
pub mod module_type;
pub mod normalized_bundler_options;
pub mod output_format;
pub mod platform;

use std::path::PathBuf;

use rustc_hash::FxHashMap;
use serde::Deserialize;

use crate::{ESTarget, InputItem, JsxOptions, ModuleType, OutputFormat, Platform};

/// User facing options. Every field is optional and gets its default while normalizing.
#[derive(Default, Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct BundlerOptions {
  // --- Input
  #[serde(default, deserialize_with = "input_item::deserialize_input")]
  pub input: Option<Vec<InputItem>>,
  pub cwd: Option<PathBuf>,
  pub platform: Option<Platform>,
  pub external: Option<Vec<String>>,
  pub define: Option<FxHashMap<String, String>>,
  /// Keys are extensions with the leading dot, such as `.svg`.
  pub loader: Option<FxHashMap<String, ModuleType>>,
  pub resolve_extensions: Option<Vec<String>>,
  pub main_fields: Option<Vec<String>>,
  pub conditions: Option<Vec<String>>,
  pub jsx: Option<JsxOptions>,
  pub tree_shaking: Option<bool>,

  // --- Output
  pub name: Option<String>,
  pub entry_filenames: Option<String>,
  pub chunk_filenames: Option<String>,
  pub asset_filenames: Option<String>,
  pub dir: Option<String>,
  pub file: Option<String>,
  pub format: Option<OutputFormat>,
  pub target: Option<ESTarget>,
  pub splitting: Option<bool>,
  pub minify: Option<bool>,
  /// Functions and classes that are renamed keep their original `name` property.
  pub keep_names: Option<bool>,
  pub sourcemap: Option<bool>,
  pub metafile: Option<bool>,
  pub banner: Option<String>,
  pub footer: Option<String>,
  /// In bytes.
  pub chunk_size_warning_limit: Option<usize>,
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::JsxRuntime;

  #[test]
  fn deserialize_camel_case_options() {
    let options: BundlerOptions = serde_json::from_str(
      r#"{
        "input": { "app": "./src/main.ts" },
        "format": "cjs",
        "platform": "node",
        "external": ["react"],
        "loader": { ".svg": "file" },
        "chunkSizeWarningLimit": 1024,
        "keepNames": true,
        "jsx": { "factory": "h" }
      }"#,
    )
    .unwrap();

    let input = options.input.unwrap();
    assert_eq!(input[0].name.as_deref(), Some("app"));
    assert_eq!(input[0].import, "./src/main.ts");
    assert_eq!(options.format, Some(OutputFormat::Cjs));
    assert_eq!(options.platform, Some(Platform::Node));
    assert_eq!(options.loader.unwrap()[".svg"], ModuleType::File);
    assert_eq!(options.chunk_size_warning_limit, Some(1024));
    assert_eq!(options.keep_names, Some(true));
    let jsx = options.jsx.unwrap();
    assert_eq!(jsx.factory, "h");
    assert_eq!(jsx.fragment, "React.Fragment");
  }

  #[test]
  fn automatic_jsx_runtime() {
    let options: BundlerOptions =
      serde_json::from_str(r#"{ "jsx": { "runtime": "automatic", "importSource": "preact" } }"#)
        .unwrap();
    let jsx = options.jsx.unwrap();
    assert_eq!(jsx.runtime, JsxRuntime::Automatic);
    assert_eq!(jsx.import_source, "preact");
  }

  #[test]
  fn unknown_fields_are_rejected() {
    assert!(serde_json::from_str::<BundlerOptions>(r#"{ "outdir": "dist" }"#).is_err());
  }
}
