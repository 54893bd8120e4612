use std::{
  io,
  path::{Path, PathBuf},
};

use dashmap::DashMap;
use sugar_path::SugarPath;

use crate::FileSystem;

/// An in-memory file system. Directories exist implicitly as ancestors of files.
#[derive(Debug, Default)]
pub struct MemoryFileSystem {
  files: DashMap<PathBuf, Vec<u8>>,
}

impl MemoryFileSystem {
  pub fn new<P: AsRef<Path>, C: AsRef<[u8]>>(files: impl IntoIterator<Item = (P, C)>) -> Self {
    let fs = Self::default();
    for (path, content) in files {
      fs.add_file(path.as_ref(), content.as_ref());
    }
    fs
  }

  pub fn add_file(&self, path: &Path, content: impl AsRef<[u8]>) {
    self.files.insert(path.normalize(), content.as_ref().to_vec());
  }

  /// Paths of every file, sorted.
  pub fn paths(&self) -> Vec<PathBuf> {
    let mut paths = self.files.iter().map(|entry| entry.key().clone()).collect::<Vec<_>>();
    paths.sort();
    paths
  }
}

fn not_found(path: &Path) -> io::Error {
  io::Error::new(io::ErrorKind::NotFound, format!("{} does not exist", path.display()))
}

impl FileSystem for MemoryFileSystem {
  fn read(&self, path: &Path) -> io::Result<Vec<u8>> {
    self.files.get(&path.normalize()).map(|content| content.clone()).ok_or_else(|| not_found(path))
  }

  fn is_file(&self, path: &Path) -> bool {
    self.files.contains_key(&path.normalize())
  }

  fn is_dir(&self, path: &Path) -> bool {
    let dir = path.normalize();
    self.files.iter().any(|entry| entry.key() != &dir && entry.key().starts_with(&dir))
  }

  fn canonicalize(&self, path: &Path) -> io::Result<PathBuf> {
    let normalized = path.normalize();
    if self.is_file(&normalized) || self.is_dir(&normalized) {
      Ok(normalized)
    } else {
      Err(not_found(path))
    }
  }

  fn write(&self, path: &Path, content: &[u8]) -> io::Result<()> {
    self.add_file(path, content);
    Ok(())
  }

  fn remove_file(&self, path: &Path) -> io::Result<()> {
    self.files.remove(&path.normalize()).map(|_| ()).ok_or_else(|| not_found(path))
  }

  fn create_dir_all(&self, _path: &Path) -> io::Result<()> {
    Ok(())
  }

  fn remove_dir_all(&self, path: &Path) -> io::Result<()> {
    let dir = path.normalize();
    self.files.retain(|file, _| !file.starts_with(&dir));
    Ok(())
  }
}

#[test]
fn test_memory_file_system() {
  let fs = MemoryFileSystem::new([("/project/src/main.js", "import './a.js'")]);
  assert!(fs.is_file(Path::new("/project/src/main.js")));
  assert!(fs.is_file(Path::new("/project/src/../src/main.js")));
  assert!(fs.is_dir(Path::new("/project/src")));
  assert!(!fs.is_dir(Path::new("/project/src/main.js")));
  assert!(!fs.is_file(Path::new("/project/src/a.js")));
  assert_eq!(fs.read_to_string(Path::new("/project/src/main.js")).unwrap(), "import './a.js'");
  assert_eq!(fs.read(Path::new("/nope")).unwrap_err().kind(), std::io::ErrorKind::NotFound);

  fs.write(Path::new("/project/dist/main.js"), b"1").unwrap();
  fs.write(Path::new("/project/dist/main.js.map"), b"{}").unwrap();
  fs.remove_file(Path::new("/project/dist/main.js.map")).unwrap();
  assert!(fs.remove_file(Path::new("/project/dist/main.js.map")).is_err());
  fs.remove_dir_all(Path::new("/project/dist")).unwrap();
  assert_eq!(fs.paths(), vec![PathBuf::from("/project/src/main.js")]);
}
