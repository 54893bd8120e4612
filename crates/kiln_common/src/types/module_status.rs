use std::fmt::Display;

/// Where a module is in its lifecycle. Every state except `Linked` can move to `Errored`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ModuleStatus {
  #[default]
  Discovered,
  Scanning,
  Resolving,
  Transformed,
  Linked,
  Errored,
}

impl ModuleStatus {
  pub fn can_transition_to(self, next: Self) -> bool {
    matches!(
      (self, next),
      (Self::Discovered, Self::Scanning)
        | (Self::Scanning, Self::Resolving)
        | (Self::Resolving, Self::Transformed)
        | (Self::Transformed, Self::Linked)
        | (Self::Discovered | Self::Scanning | Self::Resolving | Self::Transformed, Self::Errored)
    )
  }
}

impl Display for ModuleStatus {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    let name = match self {
      Self::Discovered => "discovered",
      Self::Scanning => "scanning",
      Self::Resolving => "resolving",
      Self::Transformed => "transformed",
      Self::Linked => "linked",
      Self::Errored => "errored",
    };
    f.write_str(name)
  }
}

#[test]
fn test_module_status_transitions() {
  assert!(ModuleStatus::Discovered.can_transition_to(ModuleStatus::Scanning));
  assert!(ModuleStatus::Resolving.can_transition_to(ModuleStatus::Errored));
  assert!(!ModuleStatus::Linked.can_transition_to(ModuleStatus::Errored));
  assert!(!ModuleStatus::Discovered.can_transition_to(ModuleStatus::Transformed));
}
