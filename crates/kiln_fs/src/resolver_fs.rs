use std::{
  io,
  path::{Path, PathBuf},
};

use oxc_resolver::FileMetadata;

use crate::SharedFileSystem;

/// Lets `oxc_resolver` look up files through a [`crate::FileSystem`].
///
/// Symlinks are not reported. Resolved paths are canonicalized by the caller instead.
#[derive(Clone)]
pub struct ResolverFileSystem {
  fs: SharedFileSystem,
}

impl ResolverFileSystem {
  pub fn new(fs: SharedFileSystem) -> Self {
    Self { fs }
  }
}

impl std::fmt::Debug for ResolverFileSystem {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("ResolverFileSystem").finish_non_exhaustive()
  }
}

impl oxc_resolver::FileSystem for ResolverFileSystem {
  fn read_to_string(&self, path: &Path) -> io::Result<String> {
    self.fs.read_to_string(path)
  }

  fn metadata(&self, path: &Path) -> io::Result<FileMetadata> {
    if self.fs.is_file(path) {
      Ok(FileMetadata::new(true, false, false))
    } else if self.fs.is_dir(path) {
      Ok(FileMetadata::new(false, true, false))
    } else {
      Err(io::Error::new(io::ErrorKind::NotFound, format!("{} does not exist", path.display())))
    }
  }

  fn symlink_metadata(&self, path: &Path) -> io::Result<FileMetadata> {
    self.metadata(path)
  }

  fn read_link(&self, path: &Path) -> io::Result<PathBuf> {
    Err(io::Error::new(io::ErrorKind::InvalidInput, format!("{} is not a symlink", path.display())))
  }
}

#[cfg(test)]
mod tests {
  use std::sync::Arc;

  use oxc_resolver::FileSystem as _;

  use super::*;
  use crate::MemoryFileSystem;

  #[test]
  fn reports_files_and_directories() {
    let fs = ResolverFileSystem::new(Arc::new(MemoryFileSystem::new([("/a/b.js", "b")])));
    assert!(fs.metadata(Path::new("/a/b.js")).is_ok());
    assert!(fs.metadata(Path::new("/a")).is_ok());
    assert!(fs.read_link(Path::new("/a/b.js")).is_err());
    assert_eq!(fs.metadata(Path::new("/c")).unwrap_err().kind(), io::ErrorKind::NotFound);
    assert_eq!(fs.read_to_string(Path::new("/a/b.js")).unwrap(), "b");
  }
}
