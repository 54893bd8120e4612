mod common;

use std::{
  borrow::Cow,
  sync::{Arc, Mutex},
};

use common::{build, build_with_plugins, code, memory_fs, options};
use kiln::{
  BuildDiagnostic, BundlerOptions, HookFilter, OnLoadResult, OnResolveResult, Plugin, PluginBuild,
  SharedPlugin,
};

#[derive(Debug)]
struct VirtualConfig;

impl Plugin for VirtualConfig {
  fn name(&self) -> Cow<'static, str> {
    Cow::Borrowed("virtual-config")
  }

  fn setup(&self, build: &mut PluginBuild) -> anyhow::Result<()> {
    build.on_resolve(HookFilter::new(r"^virtual:config$")?, |_| {
      Ok(Some(OnResolveResult {
        path: "config".to_string(),
        namespace: Some("virtual".to_string()),
        ..Default::default()
      }))
    });
    build.on_load(HookFilter::new(".*")?.with_namespace("virtual"), |args| {
      Ok(Some(OnLoadResult {
        contents: format!("export const source = '{}:{}';\n", args.namespace, args.path),
        ..Default::default()
      }))
    });
    Ok(())
  }
}

#[tokio::test]
async fn plugins_provide_virtual_modules() {
  let fs = memory_fs(&[(
    "src/main.js",
    "import { source } from 'virtual:config';\nconsole.log(source);\n",
  )]);
  let output = build_with_plugins(&fs, options(&["./src/main.js"]), vec![Arc::new(VirtualConfig) as SharedPlugin])
    .await
    .unwrap();

  let code = code(&output, "main.js");
  assert!(code.contains("const source = 'virtual:config';"), "{code}");
  assert!(output.metafile.inputs.contains_key("virtual:config"), "{:?}", output.metafile.inputs);
}

#[tokio::test]
async fn unclaimed_virtual_imports_are_not_found() {
  let fs = memory_fs(&[("src/main.js", "import 'virtual:config';\n")]);
  let errors = build(&fs, options(&["./src/main.js"])).await.unwrap_err();
  assert!(
    errors.iter().any(|error| matches!(error, BuildDiagnostic::NotFound { specifier, .. } if specifier == "virtual:config")),
    "{errors}"
  );
}

/// Fails both lifecycle hooks and records the output files it was shown.
#[derive(Debug, Default)]
struct Lifecycle {
  seen_outputs: Arc<Mutex<Vec<String>>>,
}

impl Plugin for Lifecycle {
  fn name(&self) -> Cow<'static, str> {
    Cow::Borrowed("lifecycle")
  }

  fn setup(&self, build: &mut PluginBuild) -> anyhow::Result<()> {
    build.on_start(|| anyhow::bail!("cache unavailable"));
    let seen_outputs = Arc::clone(&self.seen_outputs);
    build.on_end(move |args| {
      let mut seen = seen_outputs.lock().unwrap();
      seen.extend(args.output_files.iter().map(ToString::to_string));
      if args.errors.is_empty() {
        anyhow::bail!("report upload failed");
      }
      Ok(())
    });
    build.define("process.env.MODE", "\"production\"");
    Ok(())
  }
}

#[tokio::test]
async fn lifecycle_failures_are_warnings() {
  let fs = memory_fs(&[("src/main.js", "console.log(process.env.MODE);\n")]);
  let plugin = Arc::new(Lifecycle::default());
  let output = build_with_plugins(&fs, options(&["./src/main.js"]), vec![plugin.clone() as SharedPlugin])
    .await
    .unwrap();

  let plugin_warnings = output
    .warnings
    .iter()
    .filter_map(|warning| match warning {
      BuildDiagnostic::Plugin { plugin, message } => Some((plugin.as_str(), message.as_str())),
      _ => None,
    })
    .collect::<Vec<_>>();
  assert_eq!(plugin_warnings.len(), 2, "{plugin_warnings:?}");
  assert_eq!(plugin_warnings[0].0, "lifecycle");
  assert!(plugin_warnings[0].1.contains("cache unavailable"));
  assert!(plugin_warnings[1].1.contains("report upload failed"));

  assert_eq!(*plugin.seen_outputs.lock().unwrap(), vec!["main.js".to_string()]);
  assert!(code(&output, "main.js").contains("console.log(\"production\");"));
}

#[tokio::test]
async fn options_define_overrides_plugin_define() {
  let fs = memory_fs(&[("src/main.js", "console.log(process.env.MODE);\n")]);
  let output = build_with_plugins(
    &fs,
    BundlerOptions {
      define: Some([("process.env.MODE".to_string(), "\"test\"".to_string())].into_iter().collect()),
      ..options(&["./src/main.js"])
    },
    vec![Arc::new(Lifecycle::default()) as SharedPlugin],
  )
  .await
  .unwrap();
  assert!(code(&output, "main.js").contains("console.log(\"test\");"));
}

#[derive(Debug)]
struct BrokenSetup;

impl Plugin for BrokenSetup {
  fn name(&self) -> Cow<'static, str> {
    Cow::Borrowed("broken")
  }

  fn setup(&self, _build: &mut PluginBuild) -> anyhow::Result<()> {
    anyhow::bail!("missing api key")
  }
}

#[tokio::test]
async fn failing_setup_fails_the_build() {
  let fs = memory_fs(&[("src/main.js", "console.log(1);\n")]);
  let errors = build_with_plugins(&fs, options(&["./src/main.js"]), vec![Arc::new(BrokenSetup) as SharedPlugin])
    .await
    .unwrap_err();
  assert!(matches!(&errors[0], BuildDiagnostic::Plugin { plugin, .. } if plugin == "broken"));
}
