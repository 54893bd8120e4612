#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum WrapKind {
  #[default]
  None,
  /// The module body runs inside `__commonJS`, the first `require_x()` call evaluates it.
  Cjs,
}
