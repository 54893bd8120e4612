use oxc::span::SourceType;

/// Which dialect a module's source is written in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SourceSyntax {
  #[default]
  Js,
  Jsx,
  Ts,
  Tsx,
}

impl SourceSyntax {
  pub fn is_typescript(self) -> bool {
    matches!(self, Self::Ts | Self::Tsx)
  }

  pub fn has_jsx(self) -> bool {
    matches!(self, Self::Jsx | Self::Tsx)
  }

  pub(crate) fn source_type(self) -> SourceType {
    SourceType::default()
      .with_module(true)
      .with_typescript(self.is_typescript())
      .with_jsx(self.has_jsx())
  }
}
