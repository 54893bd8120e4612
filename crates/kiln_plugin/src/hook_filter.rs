use regex::Regex;

/// Decides which paths a hook sees. Without a namespace the hook sees every namespace.
#[derive(Debug, Clone)]
pub struct HookFilter {
  pub regex: Regex,
  pub namespace: Option<String>,
}

impl HookFilter {
  pub fn new(pattern: &str) -> Result<Self, regex::Error> {
    Ok(Self { regex: Regex::new(pattern)?, namespace: None })
  }

  #[must_use]
  pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
    self.namespace = Some(namespace.into());
    self
  }

  pub fn matches(&self, path: &str, namespace: &str) -> bool {
    self.namespace.as_deref().is_none_or(|ns| ns == namespace) && self.regex.is_match(path)
  }
}

#[test]
fn test_hook_filter() {
  let filter = HookFilter::new(r"^virtual:").unwrap();
  assert!(filter.matches("virtual:config", "file"));
  assert!(!filter.matches("./config.js", "file"));

  let filter = HookFilter::new(".*").unwrap().with_namespace("env");
  assert!(filter.matches("anything", "env"));
  assert!(!filter.matches("anything", "file"));
}
