use std::path::PathBuf;

use clap::Args;

use crate::types::{
  es_target::ESTarget, jsx_runtime::JsxRuntime, output_format::OutputFormat, platform::Platform,
};

#[derive(Args)]
pub struct InputArgs {
  /// Entry modules, `name=./src/main.js` names the entry chunk.
  pub input: Vec<String>,

  /// A JSON file with bundler options. Flags override it.
  #[clap(long, short = 'c')]
  pub config: Option<PathBuf>,

  #[clap(long)]
  pub cwd: Option<PathBuf>,

  #[clap(long, short)]
  pub platform: Option<Platform>,

  #[clap(long, short = 'e', action = clap::ArgAction::Append)]
  pub external: Vec<String>,

  /// `KEY=VALUE`, with VALUE inserted as an expression.
  #[clap(long, action = clap::ArgAction::Append, value_parser = parse_key_value)]
  pub define: Vec<(String, String)>,

  /// `.ext=loader`, such as `.svg=file`.
  #[clap(long, action = clap::ArgAction::Append, value_parser = parse_key_value)]
  pub loader: Vec<(String, String)>,

  #[clap(long, num_args = 0..=1, default_missing_value = "true")]
  pub tree_shaking: Option<bool>,
}

#[derive(Args)]
pub struct OutputArgs {
  #[clap(long, short = 'd')]
  pub dir: Option<String>,

  #[clap(long, short = 'o')]
  pub file: Option<String>,

  #[clap(long, short)]
  pub format: Option<OutputFormat>,

  /// Global variable name of `iife` output.
  #[clap(long)]
  pub name: Option<String>,

  #[clap(long)]
  pub entry_filenames: Option<String>,

  #[clap(long)]
  pub chunk_filenames: Option<String>,

  #[clap(long)]
  pub asset_filenames: Option<String>,

  #[clap(long)]
  pub banner: Option<String>,

  #[clap(long)]
  pub footer: Option<String>,

  #[clap(long, short = 's', num_args = 0..=1, default_missing_value = "true")]
  pub sourcemap: Option<bool>,

  #[clap(long, num_args = 0..=1, default_missing_value = "true")]
  pub metafile: Option<bool>,

  #[clap(long, num_args = 0..=1, default_missing_value = "true")]
  pub splitting: Option<bool>,
}

#[derive(Args)]
pub struct EnhanceArgs {
  #[clap(long, short = 'm', num_args = 0..=1, default_missing_value = "true")]
  pub minify: Option<bool>,

  #[clap(long, default_missing_value = "esnext")]
  pub target: Option<ESTarget>,

  /// In kilobytes.
  #[clap(long)]
  pub chunk_size_warning_limit: Option<usize>,

  /// Keep the `name` of functions and classes that get renamed in the bundle.
  #[clap(long, num_args = 0..=1, default_missing_value = "true")]
  pub keep_names: Option<bool>,

  #[clap(long)]
  pub jsx: Option<JsxRuntime>,

  /// Where the automatic runtime imports `jsx-runtime` from.
  #[clap(long)]
  pub jsx_import_source: Option<String>,
}

#[derive(Args)]
pub struct LogArgs {
  /// Debug logs from the bundler.
  #[clap(long, short = 'v', conflicts_with = "silent")]
  pub verbose: bool,

  /// Only errors, no output summary.
  #[clap(long)]
  pub silent: bool,
}

fn parse_key_value(value: &str) -> Result<(String, String), String> {
  value
    .split_once('=')
    .map(|(key, value)| (key.trim().to_string(), value.to_string()))
    .filter(|(key, _)| !key.is_empty())
    .ok_or_else(|| format!("expected KEY=VALUE, got `{value}`"))
}

#[cfg(test)]
mod tests {
  use super::parse_key_value;

  #[test]
  fn key_values() {
    assert_eq!(
      parse_key_value("process.env.NODE_ENV=\"production\""),
      Ok(("process.env.NODE_ENV".to_string(), "\"production\"".to_string()))
    );
    assert_eq!(parse_key_value("a=b=c"), Ok(("a".to_string(), "b=c".to_string())));
    assert!(parse_key_value("novalue").is_err());
    assert!(parse_key_value("=x").is_err());
  }
}
