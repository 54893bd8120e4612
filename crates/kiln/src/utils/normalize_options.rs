use std::path::Path;

use kiln_common::{BundlerOptions, NormalizedBundlerOptions, OutputFormat, Platform};
use kiln_error::{BuildDiagnostic, BuildResult};
use kiln_resolver::ResolveOptions;
use kiln_utils::ecmascript::is_validate_identifier_name;

pub struct NormalizeOptionsReturn {
  pub options: NormalizedBundlerOptions,
  pub resolve_options: ResolveOptions,
}

const DEFAULT_CHUNK_SIZE_WARNING_LIMIT: usize = 500 * 1024;

pub fn normalize_options(raw_options: BundlerOptions) -> BuildResult<NormalizeOptionsReturn> {
  let input = raw_options.input.unwrap_or_default();
  if input.is_empty() {
    Err(BuildDiagnostic::InvalidOption("`input` must name at least one entry".to_string()))?;
  }

  let format = raw_options.format.unwrap_or(OutputFormat::Esm);
  let splitting = raw_options.splitting.unwrap_or(false);
  if splitting && !format.supports_code_splitting() {
    Err(BuildDiagnostic::InvalidOption(format!(
      "`splitting` is not supported by the \"{format}\" format"
    )))?;
  }

  let platform = raw_options.platform.unwrap_or(match format {
    OutputFormat::Cjs => Platform::Node,
    OutputFormat::Esm | OutputFormat::Iife => Platform::Browser,
  });

  if raw_options.file.is_some() && raw_options.dir.is_some() {
    Err(BuildDiagnostic::InvalidOption("`file` and `dir` cannot be used together".to_string()))?;
  }

  if let Some(name) = raw_options.name.as_deref().filter(|name| !is_validate_identifier_name(name)) {
    Err(BuildDiagnostic::InvalidOption(format!("`name` \"{name}\" is not a valid identifier")))?;
  }

  let define = raw_options.define.unwrap_or_default();
  for (key, value) in &define {
    validate_define(key, value)?;
  }

  let (dir, file) = match raw_options.file {
    Some(file) => {
      let path = Path::new(&file);
      let dir = path.parent().map(|parent| parent.to_string_lossy().into_owned()).unwrap_or_default();
      let file_name = path.file_name().map(|name| name.to_string_lossy().into_owned());
      (dir, Some(file_name.ok_or_else(|| {
        BuildDiagnostic::InvalidOption(format!("`file` \"{file}\" has no file name"))
      })?))
    }
    None => (raw_options.dir.unwrap_or_else(|| "dist".to_string()), None),
  };

  let cwd = match raw_options.cwd {
    Some(cwd) => cwd,
    None => std::env::current_dir()
      .map_err(|err| anyhow::anyhow!("Failed to get the current directory: {err}"))?,
  };

  let resolve_options = ResolveOptions {
    platform,
    extensions: raw_options
      .resolve_extensions
      .clone()
      .unwrap_or_else(|| ResolveOptions::default().extensions),
    main_fields: raw_options.main_fields.clone().unwrap_or_else(|| {
      platform.default_main_fields().iter().map(ToString::to_string).collect()
    }),
    conditions: raw_options.conditions.clone().unwrap_or_default(),
  };

  let options = NormalizedBundlerOptions {
    input,
    cwd,
    platform,
    external: raw_options.external.unwrap_or_default(),
    define,
    loader: raw_options.loader.unwrap_or_default(),
    resolve_extensions: resolve_options.extensions.clone(),
    main_fields: resolve_options.main_fields.clone(),
    conditions: resolve_options.conditions.clone(),
    jsx: raw_options.jsx.unwrap_or_default(),
    tree_shaking: raw_options.tree_shaking.unwrap_or(true),
    name: raw_options.name,
    entry_filenames: raw_options.entry_filenames.unwrap_or_else(|| "[name].js".to_string()),
    chunk_filenames: raw_options.chunk_filenames.unwrap_or_else(|| "[name]-[hash].js".to_string()),
    asset_filenames: raw_options
      .asset_filenames
      .unwrap_or_else(|| "assets/[name]-[hash][extname]".to_string()),
    dir,
    file,
    format,
    target: raw_options.target.unwrap_or_default(),
    splitting,
    minify: raw_options.minify.unwrap_or(false),
    keep_names: raw_options.keep_names.unwrap_or(false),
    sourcemap: raw_options.sourcemap.unwrap_or(false),
    metafile: raw_options.metafile.unwrap_or(false),
    banner: raw_options.banner,
    footer: raw_options.footer,
    chunk_size_warning_limit: raw_options
      .chunk_size_warning_limit
      .unwrap_or(DEFAULT_CHUNK_SIZE_WARNING_LIMIT),
  };

  Ok(NormalizeOptionsReturn { options, resolve_options })
}

fn is_member_chain(value: &str) -> bool {
  value.split('.').all(is_validate_identifier_name)
}

/// Keys are a global name or a member chain. Values are JSON or another member chain.
fn validate_define(key: &str, value: &str) -> BuildResult<()> {
  if !is_member_chain(key) {
    Err(BuildDiagnostic::InvalidOption(format!("Invalid define key \"{key}\"")))?;
  }
  if !is_member_chain(value) && serde_json::from_str::<serde_json::Value>(value).is_err() {
    Err(BuildDiagnostic::InvalidOption(format!(
      "Invalid define value for \"{key}\": \"{value}\" is neither JSON nor an identifier"
    )))?;
  }
  Ok(())
}

#[cfg(test)]
mod tests {
  use super::*;

  fn options(json: &str) -> BundlerOptions {
    serde_json::from_str(json).unwrap()
  }

  #[test]
  fn fills_defaults() {
    let NormalizeOptionsReturn { options, resolve_options } =
      normalize_options(options(r#"{ "input": ["./main.js"], "cwd": "/project" }"#)).unwrap();
    assert_eq!(options.format, OutputFormat::Esm);
    assert_eq!(options.platform, Platform::Browser);
    assert_eq!(options.dir, "dist");
    assert_eq!(options.chunk_filenames, "[name]-[hash].js");
    assert!(options.tree_shaking);
    assert_eq!(options.chunk_size_warning_limit, 500 * 1024);
    assert_eq!(resolve_options.main_fields, ["browser", "module", "main"]);
  }

  #[test]
  fn cjs_defaults_to_node() {
    let ret = normalize_options(options(
      r#"{ "input": ["./main.js"], "cwd": "/project", "format": "cjs", "file": "out/bundle.js" }"#,
    ))
    .unwrap();
    assert_eq!(ret.options.platform, Platform::Node);
    assert_eq!(ret.options.dir, "out");
    assert_eq!(ret.options.file.as_deref(), Some("bundle.js"));
  }

  #[test]
  fn rejects_invalid_combinations() {
    let err = normalize_options(options(
      r#"{ "input": ["./main.js"], "cwd": "/", "format": "iife", "splitting": true }"#,
    ))
    .err()
    .unwrap();
    assert_eq!(err[0].code(), "INVALID_OPTION");

    let err = normalize_options(options(r#"{ "cwd": "/" }"#)).err().unwrap();
    assert!(err[0].to_string().contains("`input`"));

    let err = normalize_options(options(
      r#"{ "input": ["./main.js"], "cwd": "/", "define": { "process.env.MODE": "not json" } }"#,
    ))
    .err()
    .unwrap();
    assert!(err[0].to_string().contains("process.env.MODE"));

    let err = normalize_options(options(
      r#"{ "input": ["./main.js"], "cwd": "/", "format": "iife", "name": "my-lib" }"#,
    ))
    .err()
    .unwrap();
    assert!(err[0].to_string().contains("my-lib"));
  }

  #[test]
  fn accepts_json_and_identifier_define_values() {
    let ret = normalize_options(options(
      r#"{ "input": ["./main.js"], "cwd": "/", "define": { "DEBUG": "false", "global": "globalThis", "MODE": "\"dev\"" } }"#,
    ));
    assert!(ret.is_ok());
  }
}
