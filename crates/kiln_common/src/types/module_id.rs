use std::path::Path;

use arcstr::ArcStr;
use kiln_utils::path_ext::PathExt;

/// `ModuleId` is the unique string identifier for each module.
/// - It is an absolute path for modules on disk and `namespace:path` for modules a plugin loads.
/// - Two specifiers that resolve to the same `ModuleId` always share one module.
#[derive(Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Clone)]
pub struct ModuleId(ArcStr);

impl ModuleId {
  pub fn new(value: impl Into<ArcStr>) -> Self {
    Self(value.into())
  }

  /// A machine independent form of the id: relative to `cwd` with `/` separators.
  pub fn stabilize(&self, cwd: &Path) -> String {
    Path::new(self.0.as_str()).relative_slash(cwd)
  }

  pub fn inner(&self) -> &ArcStr {
    &self.0
  }
}

impl std::ops::Deref for ModuleId {
  type Target = str;

  fn deref(&self) -> &Self::Target {
    &self.0
  }
}

impl AsRef<str> for ModuleId {
  fn as_ref(&self) -> &str {
    self
  }
}

impl From<ArcStr> for ModuleId {
  fn from(value: ArcStr) -> Self {
    Self::new(value)
  }
}

impl std::fmt::Display for ModuleId {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.write_str(&self.0)
  }
}

#[test]
fn test_stabilize() {
  let cwd = Path::new("/project");
  assert_eq!(ModuleId::new("/project/src/main.js").stabilize(cwd), "src/main.js");
  assert_eq!(ModuleId::new("/other/lib.js").stabilize(cwd), "../other/lib.js");
  assert_eq!(ModuleId::new("virtual:config").stabilize(cwd), "virtual:config");
}
