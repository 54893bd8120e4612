#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum DeterminedSideEffects {
  /// Derived from the statements of the module and, later, from its dependencies.
  Analyzed(bool),
  /// Stated by the `sideEffects` field of the package the module belongs to, or by a plugin.
  UserDefined(bool),
  /// Tree shaking is off or the module can't be analyzed.
  NoTreeshake,
}

impl DeterminedSideEffects {
  pub fn has_side_effects(&self) -> bool {
    match self {
      Self::Analyzed(v) | Self::UserDefined(v) => *v,
      Self::NoTreeshake => true,
    }
  }
}
