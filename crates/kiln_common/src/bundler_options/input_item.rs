use std::borrow::Cow;

use kiln_utils::indexmap::FxIndexMap;
use serde::{Deserialize, Deserializer};

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct InputItem {
  pub name: Option<String>,
  pub import: String,
}

impl From<&str> for InputItem {
  fn from(value: &str) -> Self {
    Self { name: None, import: value.to_string() }
  }
}

impl From<Cow<'_, str>> for InputItem {
  fn from(value: Cow<'_, str>) -> Self {
    Self { name: None, import: value.to_string() }
  }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawInput {
  List(Vec<String>),
  Map(FxIndexMap<String, String>),
}

/// `input` is either a list of specifiers or a map from entry name to specifier.
pub(crate) fn deserialize_input<'de, D>(deserializer: D) -> Result<Option<Vec<InputItem>>, D::Error>
where
  D: Deserializer<'de>,
{
  let raw = Option::<RawInput>::deserialize(deserializer)?;
  Ok(raw.map(|raw| match raw {
    RawInput::List(list) => list.into_iter().map(|import| InputItem { name: None, import }).collect(),
    RawInput::Map(map) => {
      map.into_iter().map(|(name, import)| InputItem { name: Some(name), import }).collect()
    }
  }))
}
