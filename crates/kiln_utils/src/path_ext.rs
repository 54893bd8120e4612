use std::{borrow::Cow, ffi::OsStr, path::Path};

use sugar_path::SugarPath;

pub trait PathExt {
  fn to_slash_string(&self) -> String;

  fn representative_file_name(&self) -> Cow<str>;

  /// Path of `self` relative to `base`, always `/`-separated.
  fn relative_slash(&self, base: &Path) -> String;
}

impl PathExt for Path {
  fn to_slash_string(&self) -> String {
    self.to_slash().map_or_else(|| self.to_string_lossy().replace('\\', "/"), Cow::into_owned)
  }

  /// It doesn't ensure the file name is a valid identifier in JS.
  fn representative_file_name(&self) -> Cow<str> {
    let file_name =
      self.file_stem().map_or_else(|| self.to_string_lossy(), |stem| stem.to_string_lossy());

    match &*file_name {
      // Node resolves a directory import to its `index` file, Deno style guides use `mod`.
      "index" | "mod" => self
        .parent()
        .and_then(Self::file_stem)
        .map(OsStr::to_string_lossy)
        .map_or(file_name, |parent_dir_name| parent_dir_name),
      _ => file_name,
    }
  }

  fn relative_slash(&self, base: &Path) -> String {
    if self.is_absolute() { self.relative(base).to_slash_string() } else { self.to_slash_string() }
  }
}

#[test]
fn test_representative_file_name() {
  let cwd = Path::new(".").join("project");
  let path = cwd.join("src").join("vue.js");
  assert_eq!(path.representative_file_name(), "vue");

  let path = cwd.join("vue").join("index.js");
  assert_eq!(path.representative_file_name(), "vue");

  let path = cwd.join("vue").join("mod.ts");
  assert_eq!(path.representative_file_name(), "vue");
}

#[test]
fn test_relative_slash() {
  let base = Path::new("/project");
  assert_eq!(Path::new("/project/src/main.js").relative_slash(base), "src/main.js");
  assert_eq!(Path::new("virtual:config").relative_slash(base), "virtual:config");
}
