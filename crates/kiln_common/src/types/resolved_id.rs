use std::{path::Path, sync::Arc};

use arcstr::ArcStr;
use kiln_utils::path_ext::PathExt;

use crate::{ModuleType, PackageJson};

#[derive(Debug, Clone)]
pub struct ResolvedId {
  pub id: ArcStr,
  /// `file` for paths on disk. Plugins may put modules in namespaces of their own.
  pub namespace: ArcStr,
  pub is_external: bool,
  /// Set when a plugin decides the module's side effects.
  pub side_effects: Option<bool>,
  pub package_json: Option<Arc<PackageJson>>,
  /// A loader chosen while resolving, overriding the one derived from the extension.
  pub module_type: Option<ModuleType>,
}

impl ResolvedId {
  pub fn new_file(id: ArcStr) -> Self {
    Self {
      id,
      namespace: arcstr::literal!("file"),
      is_external: false,
      side_effects: None,
      package_json: None,
      module_type: None,
    }
  }

  pub fn new_external(id: ArcStr) -> Self {
    Self { is_external: true, ..Self::new_file(id) }
  }

  pub fn is_file_namespace(&self) -> bool {
    self.namespace == "file"
  }

  /// The key the module graph dedupes modules by.
  pub fn module_id(&self) -> ArcStr {
    if self.is_file_namespace() || self.is_external {
      self.id.clone()
    } else {
      arcstr::format!("{}:{}", self.namespace, self.id)
    }
  }

  /// Pretty resource id for diagnostics.
  pub fn debug_id(&self, cwd: impl AsRef<Path>) -> String {
    if self.id.trim_start().starts_with("data:") {
      return format!("<{}>", self.id.chars().take(32).collect::<String>());
    }
    if self.is_file_namespace() {
      Path::new(self.id.as_str()).relative_slash(cwd.as_ref())
    } else {
      self.module_id().to_string()
    }
  }
}

#[test]
fn test_module_id() {
  let file = ResolvedId::new_file("/src/main.js".into());
  assert_eq!(file.module_id(), "/src/main.js");
  assert_eq!(file.debug_id("/src"), "main.js");

  let virtual_module = ResolvedId { namespace: "virtual".into(), ..ResolvedId::new_file("config".into()) };
  assert_eq!(virtual_module.module_id(), "virtual:config");
}
