/// A byte range of a module's source text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, PartialOrd, Ord)]
pub struct Span {
  pub start: u32,
  pub end: u32,
}

impl Span {
  pub const fn new(start: u32, end: u32) -> Self {
    Self { start, end }
  }

  pub const fn empty(at: u32) -> Self {
    Self { start: at, end: at }
  }

  pub fn source_text<'a>(&self, source: &'a str) -> &'a str {
    &source[self.start as usize..self.end as usize]
  }

  pub fn contains(&self, other: Self) -> bool {
    self.start <= other.start && other.end <= self.end
  }
}

impl From<oxc::span::Span> for Span {
  fn from(span: oxc::span::Span) -> Self {
    Self { start: span.start, end: span.end }
  }
}
