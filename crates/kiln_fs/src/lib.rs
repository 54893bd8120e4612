mod file_system;
mod memory;
#[cfg(feature = "os")]
mod os;
mod resolver_fs;

use std::sync::Arc;

pub use crate::{
  file_system::FileSystem, memory::MemoryFileSystem, resolver_fs::ResolverFileSystem,
};
#[cfg(feature = "os")]
pub use os::OsFileSystem;

pub type SharedFileSystem = Arc<dyn FileSystem>;
