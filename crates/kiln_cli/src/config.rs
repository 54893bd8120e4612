use std::path::Path;

use anyhow::Context;
use kiln::{BundlerOptions, InputItem, ModuleType};

use crate::args::{EnhanceArgs, InputArgs, OutputArgs};

pub fn load_config(path: &Path) -> anyhow::Result<BundlerOptions> {
  let content = std::fs::read_to_string(path)
    .with_context(|| format!("Failed to read config file {}", path.display()))?;
  serde_json::from_str(&content)
    .with_context(|| format!("Invalid config file {}", path.display()))
}

fn input_item(value: &str) -> InputItem {
  match value.split_once('=') {
    Some((name, import)) if !name.is_empty() && !name.starts_with('.') => {
      InputItem { name: Some(name.to_string()), import: import.to_string() }
    }
    _ => InputItem::from(value),
  }
}

/// Flags given on the command line replace the matching config entries. List flags replace the
/// whole list, `define` and `loader` entries are merged key by key.
pub fn overlay_args(
  mut options: BundlerOptions,
  input: InputArgs,
  output: OutputArgs,
  enhance: EnhanceArgs,
) -> anyhow::Result<BundlerOptions> {
  if !input.input.is_empty() {
    options.input = Some(input.input.iter().map(|value| input_item(value)).collect());
  }
  if !input.external.is_empty() {
    options.external = Some(input.external);
  }
  if !input.define.is_empty() {
    options.define.get_or_insert_with(Default::default).extend(input.define);
  }
  if !input.loader.is_empty() {
    let loaders = options.loader.get_or_insert_with(Default::default);
    for (ext, loader) in input.loader {
      let module_type = ModuleType::from_known_str(&loader)
        .with_context(|| format!("Unknown loader `{loader}` for `{ext}`"))?;
      loaders.insert(ext, module_type);
    }
  }

  if enhance.jsx.is_some() || enhance.jsx_import_source.is_some() {
    let jsx = options.jsx.get_or_insert_with(Default::default);
    if let Some(runtime) = enhance.jsx {
      jsx.runtime = runtime.into();
    }
    if let Some(import_source) = enhance.jsx_import_source {
      jsx.import_source = import_source;
    }
  }

  macro_rules! overlay {
    ($($field:ident: $value:expr),* $(,)?) => {
      $(if let Some(value) = $value {
        options.$field = Some(value.into());
      })*
    };
  }

  overlay! {
    cwd: input.cwd,
    platform: input.platform,
    tree_shaking: input.tree_shaking,
    dir: output.dir,
    file: output.file,
    format: output.format,
    name: output.name,
    entry_filenames: output.entry_filenames,
    chunk_filenames: output.chunk_filenames,
    asset_filenames: output.asset_filenames,
    banner: output.banner,
    footer: output.footer,
    sourcemap: output.sourcemap,
    metafile: output.metafile,
    splitting: output.splitting,
    minify: enhance.minify,
    target: enhance.target,
    chunk_size_warning_limit: enhance.chunk_size_warning_limit.map(|kb| kb * 1024),
    keep_names: enhance.keep_names,
  }

  Ok(options)
}

#[cfg(test)]
mod tests {
  use clap::Parser;

  use super::*;
  use crate::Commands;

  fn overlay(config: BundlerOptions, argv: &[&str]) -> BundlerOptions {
    let args = Commands::parse_from(std::iter::once("kiln").chain(argv.iter().copied()));
    overlay_args(config, args.input, args.output, args.enhance).unwrap()
  }

  #[test]
  fn flags_override_the_config_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("kiln.json");
    std::fs::write(
      &path,
      r#"{ "input": { "app": "./src/app.js" }, "format": "cjs", "minify": true, "define": { "DEBUG": "true" } }"#,
    )
    .unwrap();
    let config = load_config(&path).unwrap();

    let options = overlay(
      config,
      &["--format", "esm", "--define", "VERSION=\"1\"", "--loader", ".svg=file", "--sourcemap"],
    );
    assert_eq!(options.input.as_ref().unwrap()[0].name.as_deref(), Some("app"));
    assert_eq!(options.format, Some(kiln::OutputFormat::Esm));
    assert_eq!(options.minify, Some(true));
    assert_eq!(options.sourcemap, Some(true));
    let define = options.define.unwrap();
    assert_eq!(define["DEBUG"], "true");
    assert_eq!(define["VERSION"], "\"1\"");
    assert_eq!(options.loader.unwrap()[".svg"], ModuleType::File);
  }

  #[test]
  fn positional_inputs_replace_config_inputs() {
    let config = BundlerOptions { input: Some(vec![InputItem::from("./a.js")]), ..Default::default() };
    let options = overlay(config, &["admin=./src/admin.js", "./src/main.js", "--chunk-size-warning-limit", "2"]);
    let input = options.input.unwrap();
    assert_eq!(input[0], InputItem { name: Some("admin".to_string()), import: "./src/admin.js".to_string() });
    assert_eq!(input[1], InputItem::from("./src/main.js"));
    assert_eq!(options.chunk_size_warning_limit, Some(2048));
  }

  #[test]
  fn jsx_flags_keep_the_rest_of_the_config() {
    let config: BundlerOptions =
      serde_json::from_str(r#"{ "jsx": { "fragment": "Frag" } }"#).unwrap();
    let options =
      overlay(config, &["--jsx", "automatic", "--jsx-import-source", "preact", "--keep-names"]);
    let jsx = options.jsx.unwrap();
    assert_eq!(jsx.runtime, kiln::JsxRuntime::Automatic);
    assert_eq!(jsx.import_source, "preact");
    assert_eq!(jsx.fragment, "Frag");
    assert_eq!(options.keep_names, Some(true));
  }

  #[test]
  fn unknown_loaders_are_rejected() {
    let args = Commands::parse_from(["kiln", "--loader", ".svg=svgr"]);
    assert!(overlay_args(BundlerOptions::default(), args.input, args.output, args.enhance).is_err());
  }

  #[test]
  fn invalid_config_files_are_reported() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("kiln.json");
    std::fs::write(&path, r#"{ "outdir": "dist" }"#).unwrap();
    let err = load_config(&path).unwrap_err();
    assert!(err.to_string().contains("Invalid config file"));
  }
}
