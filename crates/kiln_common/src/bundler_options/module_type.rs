use std::fmt::Display;

use kiln_ecmascript::SourceSyntax;
use serde::Deserialize;

/// The loader that turns a file's bytes into a module.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModuleType {
  Js,
  Jsx,
  Ts,
  Tsx,
  Json,
  Text,
  Css,
  Base64,
  Dataurl,
  File,
  Empty,
}

impl ModuleType {
  pub fn from_known_str(value: &str) -> Option<Self> {
    match value {
      "js" => Some(Self::Js),
      "jsx" => Some(Self::Jsx),
      "ts" => Some(Self::Ts),
      "tsx" => Some(Self::Tsx),
      "json" => Some(Self::Json),
      "text" => Some(Self::Text),
      "css" => Some(Self::Css),
      "base64" => Some(Self::Base64),
      "dataurl" => Some(Self::Dataurl),
      "file" => Some(Self::File),
      "empty" => Some(Self::Empty),
      _ => None,
    }
  }

  /// The built-in loader for an extension given without the leading dot.
  pub fn from_extension(ext: &str) -> Option<Self> {
    match ext {
      "js" | "mjs" | "cjs" => Some(Self::Js),
      "jsx" => Some(Self::Jsx),
      "ts" | "mts" | "cts" => Some(Self::Ts),
      "tsx" => Some(Self::Tsx),
      "json" => Some(Self::Json),
      "css" => Some(Self::Css),
      "txt" => Some(Self::Text),
      _ => None,
    }
  }

  pub fn as_str(&self) -> &'static str {
    match self {
      Self::Js => "js",
      Self::Jsx => "jsx",
      Self::Ts => "ts",
      Self::Tsx => "tsx",
      Self::Json => "json",
      Self::Text => "text",
      Self::Css => "css",
      Self::Base64 => "base64",
      Self::Dataurl => "dataurl",
      Self::File => "file",
      Self::Empty => "empty",
    }
  }

  pub fn syntax(&self) -> SourceSyntax {
    match self {
      Self::Jsx => SourceSyntax::Jsx,
      Self::Ts => SourceSyntax::Ts,
      Self::Tsx => SourceSyntax::Tsx,
      _ => SourceSyntax::Js,
    }
  }
}

impl Display for ModuleType {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.write_str(self.as_str())
  }
}

#[test]
fn test_module_type_from_extension() {
  assert_eq!(ModuleType::from_extension("mjs"), Some(ModuleType::Js));
  assert_eq!(ModuleType::from_extension("tsx"), Some(ModuleType::Tsx));
  assert_eq!(ModuleType::from_extension("png"), None);
  assert_eq!(ModuleType::from_known_str("dataurl"), Some(ModuleType::Dataurl));
  assert_eq!(ModuleType::Tsx.syntax(), SourceSyntax::Tsx);
}
