mod hook_filter;
mod plugin;
mod plugin_build;
mod plugin_driver;
mod types;

pub use crate::{
  hook_filter::HookFilter,
  plugin::{Plugin, SharedPlugin},
  plugin_build::PluginBuild,
  plugin_driver::{PluginDriver, SharedPluginDriver},
  types::{
    hook_end_args::OnEndArgs,
    hook_load_args::OnLoadArgs,
    hook_load_output::OnLoadResult,
    hook_resolve_args::OnResolveArgs,
    hook_resolve_output::OnResolveResult,
  },
};
