use std::path::{Path, PathBuf};

use kiln_utils::path_ext::PathExt;
use serde_json::Value;

#[derive(Debug, Clone)]
pub enum SideEffects {
  Bool(bool),
  /// Globs of the files that have side effects. Patterns without a `/` match at any depth.
  Globs(Vec<String>),
}

#[derive(Debug, Clone)]
pub struct PackageJson {
  pub path: PathBuf,
  pub name: Option<String>,
  pub r#type: Option<String>,
  pub side_effects: Option<SideEffects>,
}

impl PackageJson {
  pub fn parse(path: PathBuf, json: &str) -> serde_json::Result<Self> {
    let raw: Value = serde_json::from_str(json)?;
    let side_effects = match raw.get("sideEffects") {
      Some(Value::Bool(value)) => Some(SideEffects::Bool(*value)),
      Some(Value::Array(items)) => Some(SideEffects::Globs(
        items
          .iter()
          .filter_map(Value::as_str)
          .map(|glob| if glob.contains('/') { glob.to_string() } else { format!("**/{glob}") })
          .collect(),
      )),
      _ => None,
    };
    Ok(Self {
      name: raw.get("name").and_then(Value::as_str).map(ToString::to_string),
      r#type: raw.get("type").and_then(Value::as_str).map(ToString::to_string),
      side_effects,
      path,
    })
  }

  pub fn dir(&self) -> &Path {
    self.path.parent().unwrap_or(Path::new(""))
  }

  /// `None` when the package does not say.
  pub fn check_side_effects_for(&self, module_path: &Path) -> Option<bool> {
    match self.side_effects.as_ref()? {
      SideEffects::Bool(value) => Some(*value),
      SideEffects::Globs(globs) => {
        let relative = module_path.relative_slash(self.dir());
        let relative = relative.trim_start_matches("./");
        Some(globs.iter().any(|glob| {
          fast_glob::glob_match(glob.trim_start_matches("./"), relative)
        }))
      }
    }
  }
}

#[test]
fn test_side_effects_field() {
  let pkg = PackageJson::parse(
    PathBuf::from("/node_modules/lib/package.json"),
    r#"{ "name": "lib", "sideEffects": ["./src/polyfill.js", "*.css"] }"#,
  )
  .unwrap();
  assert_eq!(pkg.name.as_deref(), Some("lib"));
  assert_eq!(pkg.check_side_effects_for(Path::new("/node_modules/lib/src/polyfill.js")), Some(true));
  assert_eq!(pkg.check_side_effects_for(Path::new("/node_modules/lib/src/theme/a.css")), Some(true));
  assert_eq!(pkg.check_side_effects_for(Path::new("/node_modules/lib/src/index.js")), Some(false));

  let pkg = PackageJson::parse(PathBuf::from("/p/package.json"), r#"{ "main": "./lib.js" }"#).unwrap();
  assert_eq!(pkg.check_side_effects_for(Path::new("/p/lib.js")), None);
}
