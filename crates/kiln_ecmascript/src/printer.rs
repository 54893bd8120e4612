use std::cmp::Reverse;

use crate::span::Span;

#[derive(Debug, Clone)]
struct Edit {
  span: Span,
  text: String,
}

/// A set of byte-range replacements over one source text.
///
/// Applying the edits keeps everything outside the replaced ranges verbatim and never drops a
/// line: a replacement that contains fewer line breaks than the text it replaces is padded with
/// the missing ones.
#[derive(Debug, Default)]
pub struct Edits {
  inner: Vec<Edit>,
}

impl Edits {
  pub fn replace(&mut self, span: Span, text: impl Into<String>) {
    self.inner.push(Edit { span, text: text.into() });
  }

  pub fn remove(&mut self, span: Span) {
    self.replace(span, String::new());
  }

  pub fn insert(&mut self, at: u32, text: impl Into<String>) {
    self.replace(Span::empty(at), text);
  }

  pub fn is_empty(&self) -> bool {
    self.inner.is_empty()
  }

  pub fn len(&self) -> usize {
    self.inner.len()
  }

  /// Insertions at an offset go before a replacement starting there. Among overlapping
  /// replacements the one starting first, then the longest, wins.
  pub fn apply(self, source: &str) -> String {
    if self.inner.is_empty() {
      return source.to_string();
    }
    let mut edits = self.inner;
    edits.sort_by_key(|edit| {
      (edit.span.start, edit.span.start != edit.span.end, Reverse(edit.span.end))
    });

    let mut out = String::with_capacity(source.len());
    let mut cursor = 0usize;
    for edit in edits {
      let start = edit.span.start as usize;
      let end = edit.span.end as usize;
      if start < cursor || end > source.len() {
        continue;
      }
      out.push_str(&source[cursor..start]);
      push_replacement(&mut out, &source[start..end], &edit.text, &source[end..]);
      cursor = end;
    }
    out.push_str(&source[cursor..]);
    out
  }
}

fn is_word_char(c: char) -> bool {
  c.is_alphanumeric() || c == '_' || c == '$'
}

fn push_replacement(out: &mut String, removed: &str, text: &str, rest: &str) {
  if out.chars().next_back().is_some_and(is_word_char)
    && text.chars().next().is_some_and(is_word_char)
  {
    out.push(' ');
  }
  out.push_str(text);

  let missing_newlines = newline_count(removed).saturating_sub(newline_count(text));
  for _ in 0..missing_newlines {
    out.push('\n');
  }

  if missing_newlines == 0
    && out.chars().next_back().is_some_and(is_word_char)
    && rest.chars().next().is_some_and(is_word_char)
  {
    out.push(' ');
  }
}

fn newline_count(s: &str) -> usize {
  memchr::memchr_iter(b'\n', s.as_bytes()).count()
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn keeps_lines_and_separates_words() {
    let source = "let a: number = 1;\ninterface A {\n  x: string\n}\nlet b = a as any;";
    let mut edits = Edits::default();
    edits.remove(Span::new(5, 13));
    edits.remove(Span::new(19, 46));
    edits.remove(Span::new(56, 63));
    assert_eq!(edits.apply(source), "let a = 1;\n\n\n\nlet b = a;");
  }

  #[test]
  fn insertion_before_replacement() {
    let mut edits = Edits::default();
    edits.replace(Span::new(0, 3), "bar");
    edits.insert(0, "/*x*/");
    assert_eq!(edits.apply("foo()"), "/*x*/bar()");
  }

  #[test]
  fn guards_identifier_merges() {
    let mut edits = Edits::default();
    edits.remove(Span::new(6, 9));
    assert_eq!(edits.apply("typeof<T>x"), "typeof x");
  }
}
