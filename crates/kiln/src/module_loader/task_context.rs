use std::sync::{
  atomic::{AtomicBool, Ordering},
  Arc,
};

use dashmap::DashSet;
use kiln_common::ModuleLoaderMsg;
use kiln_fs::SharedFileSystem;
use kiln_plugin::SharedPluginDriver;
use rustc_hash::FxHashMap;

use crate::types::{transform_cache::SharedTransformCache, SharedOptions, SharedResolver};

/// Used to store common data shared between all tasks.
pub struct TaskContext {
  pub fs: SharedFileSystem,
  pub options: SharedOptions,
  pub resolver: SharedResolver,
  pub plugin_driver: SharedPluginDriver,
  /// `define` from the options over the entries plugins added.
  pub define: FxHashMap<String, String>,
  /// Patterns of `external` that matched at least one import.
  pub used_externals: DashSet<String>,
  pub cache: Option<SharedTransformCache>,
  pub disposed: Arc<AtomicBool>,
  pub tx: tokio::sync::mpsc::Sender<ModuleLoaderMsg>,
}

impl TaskContext {
  pub fn is_disposed(&self) -> bool {
    self.disposed.load(Ordering::Acquire)
  }
}
