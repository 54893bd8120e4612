use std::sync::Arc;

use kiln_error::BuildDiagnostic;
use rustc_hash::FxHashMap;

use crate::{
  plugin_build::PluginBuild, OnEndArgs, OnLoadArgs, OnLoadResult, OnResolveArgs, OnResolveResult,
  SharedPlugin,
};

pub type SharedPluginDriver = Arc<PluginDriver>;

pub struct PluginDriver {
  plugins: Vec<SharedPlugin>,
  build: PluginBuild,
}

impl std::fmt::Debug for PluginDriver {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("PluginDriver").field("plugins", &self.plugins).finish_non_exhaustive()
  }
}

impl PluginDriver {
  /// Runs every plugin's `setup` in order. A failing setup is reported as a plugin error.
  pub fn new_shared(plugins: Vec<SharedPlugin>) -> Result<SharedPluginDriver, BuildDiagnostic> {
    let mut build = PluginBuild::default();
    for (index, plugin) in plugins.iter().enumerate() {
      build.current_plugin = index;
      plugin.setup(&mut build).map_err(|err| BuildDiagnostic::Plugin {
        plugin: plugin.name().into_owned(),
        message: format!("setup failed: {err:#}"),
      })?;
    }
    Ok(Arc::new(Self { plugins, build }))
  }

  pub fn is_empty(&self) -> bool {
    self.plugins.is_empty()
  }

  /// `define` entries contributed by plugins.
  pub fn define(&self) -> &FxHashMap<String, String> {
    &self.build.define
  }

  fn plugin_error(&self, plugin_index: usize, hook: &str, err: &anyhow::Error) -> BuildDiagnostic {
    BuildDiagnostic::Plugin {
      plugin: self.plugins[plugin_index].name().into_owned(),
      message: format!("{hook} hook failed: {err:#}"),
    }
  }

  /// The first matching `onResolve` hook that returns a result wins.
  pub fn resolve(&self, args: &OnResolveArgs) -> Result<Option<OnResolveResult>, BuildDiagnostic> {
    for hook in &self.build.on_resolve {
      if hook.filter.as_ref().is_some_and(|filter| !filter.matches(args.path, args.namespace)) {
        continue;
      }
      match (hook.callback)(args) {
        Ok(Some(result)) => {
          tracing::trace!(plugin = %self.plugins[hook.plugin_index].name(), path = args.path, "resolved by plugin");
          return Ok(Some(result));
        }
        Ok(None) => {}
        Err(err) => return Err(self.plugin_error(hook.plugin_index, "onResolve", &err)),
      }
    }
    Ok(None)
  }

  /// The first matching `onLoad` hook that returns contents wins.
  pub fn load(&self, args: &OnLoadArgs) -> Result<Option<OnLoadResult>, BuildDiagnostic> {
    for hook in &self.build.on_load {
      if hook.filter.as_ref().is_some_and(|filter| !filter.matches(args.path, args.namespace)) {
        continue;
      }
      match (hook.callback)(args) {
        Ok(Some(result)) => return Ok(Some(result)),
        Ok(None) => {}
        Err(err) => return Err(self.plugin_error(hook.plugin_index, "onLoad", &err)),
      }
    }
    Ok(None)
  }

  /// Every `onStart` hook runs. Failures become warnings.
  pub fn build_start(&self) -> Vec<BuildDiagnostic> {
    let mut warnings = vec![];
    for hook in &self.build.on_start {
      if let Err(err) = (hook.callback)() {
        let warning = self.plugin_error(hook.plugin_index, "onStart", &err);
        tracing::warn!("{warning}");
        warnings.push(warning);
      }
    }
    warnings
  }

  /// Every `onEnd` hook runs. Failures become warnings.
  pub fn build_end(&self, args: &OnEndArgs) -> Vec<BuildDiagnostic> {
    let mut warnings = vec![];
    for hook in &self.build.on_end {
      if let Err(err) = (hook.callback)(args) {
        let warning = self.plugin_error(hook.plugin_index, "onEnd", &err);
        tracing::warn!("{warning}");
        warnings.push(warning);
      }
    }
    warnings
  }
}

#[cfg(test)]
mod tests {
  use std::borrow::Cow;

  use kiln_common::ImportKind;

  use super::*;
  use crate::{HookFilter, Plugin};

  #[derive(Debug)]
  struct Virtual(&'static str);

  impl Plugin for Virtual {
    fn name(&self) -> Cow<'static, str> {
      Cow::Borrowed(self.0)
    }

    fn setup(&self, build: &mut PluginBuild) -> anyhow::Result<()> {
      let name = self.0;
      build.on_resolve(HookFilter::new(r"^virtual:")?, move |args| {
        Ok(Some(OnResolveResult {
          path: format!("{}-{name}", args.path),
          namespace: Some("virtual".to_string()),
          ..Default::default()
        }))
      });
      build.on_start(|| anyhow::bail!("no cache"));
      build.define("process.env.NAME", format!("\"{name}\""));
      Ok(())
    }
  }

  fn resolve_args(path: &str) -> OnResolveArgs<'_> {
    OnResolveArgs { path, importer: None, namespace: "file", kind: ImportKind::Import }
  }

  #[test]
  fn first_claim_wins() {
    let driver = PluginDriver::new_shared(vec![Arc::new(Virtual("a")), Arc::new(Virtual("b"))]).unwrap();
    let resolved = driver.resolve(&resolve_args("virtual:config")).unwrap().unwrap();
    assert_eq!(resolved.path, "virtual:config-a");
    assert!(driver.resolve(&resolve_args("./main.js")).unwrap().is_none());
    assert!(driver.load(&OnLoadArgs { path: "x", namespace: "file" }).unwrap().is_none());
  }

  #[test]
  fn start_failures_are_warnings() {
    let driver = PluginDriver::new_shared(vec![Arc::new(Virtual("a"))]).unwrap();
    let warnings = driver.build_start();
    assert_eq!(warnings.len(), 1);
    assert!(warnings[0].to_string().contains("onStart hook failed: no cache"));
    assert_eq!(driver.define()["process.env.NAME"], "\"a\"");
  }
}
