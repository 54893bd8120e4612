#[derive(Debug, Default, Clone)]
pub struct OnResolveResult {
  pub path: String,
  /// Defaults to `file`.
  pub namespace: Option<String>,
  pub external: bool,
  pub side_effects: Option<bool>,
}
