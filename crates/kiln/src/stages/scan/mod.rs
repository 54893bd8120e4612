use std::sync::{atomic::AtomicBool, Arc};

use arcstr::ArcStr;
use dashmap::DashSet;
use kiln_common::{ImportKind, ResolvedId};
use kiln_error::{BuildDiagnostic, BuildResult};
use kiln_fs::SharedFileSystem;
use kiln_plugin::SharedPluginDriver;
use rustc_hash::FxHashMap;

use crate::{
  module_loader::{task_context::TaskContext, ModuleLoader, ModuleLoaderOutput},
  types::{transform_cache::SharedTransformCache, SharedOptions, SharedResolver},
  utils::resolve_id::resolve_id,
};

pub type ScanStageOutput = ModuleLoaderOutput;

pub struct ScanStage {
  fs: SharedFileSystem,
  options: SharedOptions,
  resolver: SharedResolver,
  plugin_driver: SharedPluginDriver,
  cache: Option<SharedTransformCache>,
  disposed: Arc<AtomicBool>,
}

impl ScanStage {
  pub fn new(
    fs: SharedFileSystem,
    options: SharedOptions,
    resolver: SharedResolver,
    plugin_driver: SharedPluginDriver,
    cache: Option<SharedTransformCache>,
    disposed: Arc<AtomicBool>,
  ) -> Self {
    Self { fs, options, resolver, plugin_driver, cache, disposed }
  }

  pub async fn scan(&self) -> BuildResult<ScanStageOutput> {
    let (tx, rx) = tokio::sync::mpsc::channel(1024);

    // Plugin entries go first so that the options always win.
    let mut define: FxHashMap<String, String> = self.plugin_driver.define().clone();
    define.extend(self.options.define.iter().map(|(key, value)| (key.clone(), value.clone())));

    let ctx = Arc::new(TaskContext {
      fs: Arc::clone(&self.fs),
      options: Arc::clone(&self.options),
      resolver: Arc::clone(&self.resolver),
      plugin_driver: Arc::clone(&self.plugin_driver),
      define,
      used_externals: DashSet::default(),
      cache: self.cache.clone(),
      disposed: Arc::clone(&self.disposed),
      tx,
    });

    let user_entries = Self::resolve_user_defined_entries(&ctx)?;

    let module_loader = ModuleLoader::new(ctx, rx);
    module_loader.fetch_all_modules(user_entries).await
  }

  fn resolve_user_defined_entries(
    ctx: &TaskContext,
  ) -> BuildResult<Vec<(Option<ArcStr>, ResolvedId)>> {
    let mut ret = Vec::with_capacity(ctx.options.input.len());
    let mut errors = vec![];

    for input_item in &ctx.options.input {
      match resolve_id(ctx, &input_item.import, None, ImportKind::EntryPoint, true) {
        Ok(resolved) if resolved.is_external => {
          errors.push(BuildDiagnostic::InvalidOption(format!(
            "Entry \"{}\" cannot be external",
            input_item.import
          )));
        }
        Ok(resolved) => ret.push((input_item.name.as_deref().map(ArcStr::from), resolved)),
        Err(err) => errors.push(err),
      }
    }

    if !errors.is_empty() {
      Err(errors)?;
    }

    Ok(ret)
  }
}
