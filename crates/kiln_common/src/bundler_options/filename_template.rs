use std::sync::LazyLock;

use regex::Regex;

static HASH_PATTERN: LazyLock<Regex> =
  LazyLock::new(|| Regex::new(r"\[hash(?::(\d+))?\]").expect("hash pattern regex is valid"));

/// A file name pattern such as `[name]-[hash].js`.
///
/// Supported placeholders are `[name]`, `[hash]` (optionally `[hash:10]`), `[ext]` for the
/// extension without the dot and `[extname]` for the extension with it.
#[derive(Debug, Clone)]
pub struct FilenameTemplate {
  template: String,
}

impl FilenameTemplate {
  pub fn new(template: String) -> Self {
    Self { template }
  }

  pub fn template(&self) -> &str {
    &self.template
  }

  pub fn has_hash_pattern(&self) -> bool {
    HASH_PATTERN.is_match(&self.template)
  }

  /// `hash_replacer` receives the requested hash width, if any, and returns the text to put in
  /// place of the `[hash]` placeholder.
  pub fn render(
    &self,
    name: Option<&str>,
    extension: Option<&str>,
    hash_replacer: Option<impl FnMut(Option<usize>) -> String>,
  ) -> String {
    let mut rendered = self.template.clone();
    if let Some(name) = name {
      rendered = rendered.replace("[name]", name);
    }
    if let Some(ext) = extension {
      let extname = if ext.is_empty() { String::new() } else { format!(".{ext}") };
      rendered = rendered.replace("[extname]", &extname).replace("[ext]", ext);
    }
    if let Some(mut hash_replacer) = hash_replacer {
      rendered = HASH_PATTERN
        .replace_all(&rendered, |caps: &regex::Captures| {
          hash_replacer(caps.get(1).and_then(|len| len.as_str().parse().ok()))
        })
        .into_owned();
    }
    rendered
  }
}

#[test]
fn test_filename_template() {
  let template = FilenameTemplate::new("assets/[name]-[hash:4][extname]".to_string());
  assert!(template.has_hash_pattern());
  let hash = |len: Option<usize>| "x".repeat(len.unwrap_or(8));
  let rendered = template.render(Some("logo"), Some("svg"), Some(hash));
  assert_eq!(rendered, "assets/logo-xxxx.svg");

  let template = FilenameTemplate::new("[name].[ext]".to_string());
  assert!(!template.has_hash_pattern());
  let rendered = template.render(Some("main"), Some("js"), None::<fn(Option<usize>) -> String>);
  assert_eq!(rendered, "main.js");
}
