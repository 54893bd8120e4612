use std::{borrow::Cow, fmt::Debug, sync::Arc};

use crate::PluginBuild;

pub type SharedPlugin = Arc<dyn Plugin>;

/// A plugin registers its hooks once, when the bundler is created.
pub trait Plugin: Debug + Send + Sync {
  fn name(&self) -> Cow<'static, str>;

  fn setup(&self, build: &mut PluginBuild) -> anyhow::Result<()>;
}
