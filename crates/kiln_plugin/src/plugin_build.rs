use std::sync::Arc;

use rustc_hash::FxHashMap;

use crate::{HookFilter, OnEndArgs, OnLoadArgs, OnLoadResult, OnResolveArgs, OnResolveResult};

pub(crate) type OnResolveCallback =
  Arc<dyn Fn(&OnResolveArgs) -> anyhow::Result<Option<OnResolveResult>> + Send + Sync>;
pub(crate) type OnLoadCallback =
  Arc<dyn Fn(&OnLoadArgs) -> anyhow::Result<Option<OnLoadResult>> + Send + Sync>;
pub(crate) type OnStartCallback = Arc<dyn Fn() -> anyhow::Result<()> + Send + Sync>;
pub(crate) type OnEndCallback = Arc<dyn Fn(&OnEndArgs) -> anyhow::Result<()> + Send + Sync>;

pub(crate) struct RegisteredHook<T> {
  pub plugin_index: usize,
  pub filter: Option<HookFilter>,
  pub callback: T,
}

/// Handed to [`Plugin::setup`](crate::Plugin::setup). Hooks run in the order they are
/// registered, across all plugins.
#[derive(Default)]
pub struct PluginBuild {
  pub(crate) current_plugin: usize,
  pub(crate) on_resolve: Vec<RegisteredHook<OnResolveCallback>>,
  pub(crate) on_load: Vec<RegisteredHook<OnLoadCallback>>,
  pub(crate) on_start: Vec<RegisteredHook<OnStartCallback>>,
  pub(crate) on_end: Vec<RegisteredHook<OnEndCallback>>,
  pub(crate) define: FxHashMap<String, String>,
}

impl PluginBuild {
  pub fn on_resolve(
    &mut self,
    filter: HookFilter,
    callback: impl Fn(&OnResolveArgs) -> anyhow::Result<Option<OnResolveResult>> + Send + Sync + 'static,
  ) {
    self.on_resolve.push(RegisteredHook {
      plugin_index: self.current_plugin,
      filter: Some(filter),
      callback: Arc::new(callback),
    });
  }

  pub fn on_load(
    &mut self,
    filter: HookFilter,
    callback: impl Fn(&OnLoadArgs) -> anyhow::Result<Option<OnLoadResult>> + Send + Sync + 'static,
  ) {
    self.on_load.push(RegisteredHook {
      plugin_index: self.current_plugin,
      filter: Some(filter),
      callback: Arc::new(callback),
    });
  }

  pub fn on_start(&mut self, callback: impl Fn() -> anyhow::Result<()> + Send + Sync + 'static) {
    self.on_start.push(RegisteredHook {
      plugin_index: self.current_plugin,
      filter: None,
      callback: Arc::new(callback),
    });
  }

  pub fn on_end(
    &mut self,
    callback: impl Fn(&OnEndArgs) -> anyhow::Result<()> + Send + Sync + 'static,
  ) {
    self.on_end.push(RegisteredHook {
      plugin_index: self.current_plugin,
      filter: None,
      callback: Arc::new(callback),
    });
  }

  /// Adds a `define` entry, such as `process.env.API_URL`. Entries from the bundler options
  /// take precedence.
  pub fn define(&mut self, key: impl Into<String>, value: impl Into<String>) {
    self.define.insert(key.into(), value.into());
  }
}
