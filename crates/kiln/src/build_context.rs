use std::sync::{
  atomic::{AtomicBool, Ordering},
  Arc,
};

use arcstr::ArcStr;
use dashmap::DashSet;
use kiln_error::{BuildDiagnostic, BuildResult};
use tokio::sync::Mutex;

use crate::{
  types::{
    bundle_output::{BundleOutput, WriteOutput},
    transform_cache::{SharedTransformCache, TransformCache},
  },
  Bundler,
};

/// A bundler kept alive between builds, for watch mode and dev servers.
///
/// Rebuilds run one at a time: a rebuild requested while another one runs waits for it. Each
/// rebuild reuses the transform of every module that was not invalidated since the last one.
pub struct BuildContext {
  bundler: Mutex<Bundler>,
  cache: SharedTransformCache,
  /// Module ids, coalesced until the next rebuild drains them.
  invalidated: DashSet<ArcStr>,
  disposed: Arc<AtomicBool>,
}

impl BuildContext {
  pub fn new(mut bundler: Bundler) -> Self {
    let cache = Arc::new(TransformCache::default());
    let disposed = Arc::new(AtomicBool::new(false));
    bundler.cache = Some(Arc::clone(&cache));
    bundler.disposed = Arc::clone(&disposed);
    Self { bundler: Mutex::new(bundler), cache, invalidated: DashSet::default(), disposed }
  }

  pub async fn rebuild(&self) -> BuildResult<BundleOutput> {
    let mut bundler = self.lock_for_rebuild().await?;
    bundler.build().await
  }

  /// Like [`BuildContext::rebuild`], writing the outputs as [`Bundler::write`] does.
  pub async fn rebuild_and_write(&self) -> BuildResult<WriteOutput> {
    let mut bundler = self.lock_for_rebuild().await?;
    bundler.write().await
  }

  /// Marks a module as changed. `id` is the module id: the absolute path of a file, or the
  /// id a plugin gave a virtual module.
  pub fn invalidate(&self, id: impl Into<ArcStr>) {
    let id = id.into();
    tracing::debug!(module = %id, "invalidated");
    self.invalidated.insert(id);
  }

  /// Stops scheduling new work. Transforms already running finish, every later rebuild fails.
  pub fn dispose(&self) {
    if !self.disposed.swap(true, Ordering::AcqRel) {
      tracing::debug!("build context disposed");
      self.cache.clear();
    }
  }

  pub fn is_disposed(&self) -> bool {
    self.disposed.load(Ordering::Acquire)
  }

  async fn lock_for_rebuild(&self) -> BuildResult<tokio::sync::MutexGuard<'_, Bundler>> {
    if self.is_disposed() {
      Err(BuildDiagnostic::ContextDisposed)?;
    }
    let bundler = self.bundler.lock().await;
    // Disposed while waiting for the previous rebuild.
    if self.is_disposed() {
      Err(BuildDiagnostic::ContextDisposed)?;
    }

    let drained = self.invalidated.iter().map(|id| id.key().clone()).collect::<Vec<_>>();
    for id in &drained {
      self.invalidated.remove(id);
      self.cache.remove(id);
    }
    if !drained.is_empty() {
      tracing::debug!(modules = drained.len(), "drained invalidations");
    }
    Ok(bundler)
  }
}

impl std::fmt::Debug for BuildContext {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("BuildContext")
      .field("cached_modules", &self.cache.len())
      .field("invalidated", &self.invalidated.len())
      .field("disposed", &self.is_disposed())
      .finish_non_exhaustive()
  }
}
