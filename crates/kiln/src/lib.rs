mod build_context;
mod bundler;
mod module_loader;
mod stages;
mod types;
mod utils;

pub use crate::{
  build_context::BuildContext,
  bundler::Bundler,
  types::bundle_output::{BundleOutput, WriteOutput},
};
pub use kiln_common::*;
pub use kiln_error::{BuildDiagnostic, BuildError, BuildResult, Severity};
pub use kiln_fs::{FileSystem, MemoryFileSystem, OsFileSystem, SharedFileSystem};
pub use kiln_plugin::{
  HookFilter, OnEndArgs, OnLoadArgs, OnLoadResult, OnResolveArgs, OnResolveResult, Plugin,
  PluginBuild, SharedPlugin,
};
