/// Maps byte offsets to zero-based `(line, column)` pairs.
#[derive(Debug, Clone)]
pub struct LineIndex {
  line_starts: Vec<u32>,
}

impl LineIndex {
  pub fn new(source: &str) -> Self {
    let mut line_starts = vec![0];
    line_starts.extend(memchr::memchr_iter(b'\n', source.as_bytes()).map(|i| i as u32 + 1));
    Self { line_starts }
  }

  pub fn line_col(&self, offset: u32) -> (u32, u32) {
    let line = self.line_starts.partition_point(|start| *start <= offset) - 1;
    (line as u32, offset - self.line_starts[line])
  }

  pub fn line_count(&self) -> u32 {
    self.line_starts.len() as u32
  }
}

pub fn lines_count(str: &str) -> u32 {
  u32::try_from(memchr::memmem::find_iter(str.as_bytes(), "\n").count()).unwrap_or(u32::MAX)
}

#[test]
fn test_line_index() {
  let index = LineIndex::new("ab\ncd\n\nx");
  assert_eq!(index.line_col(0), (0, 0));
  assert_eq!(index.line_col(1), (0, 1));
  assert_eq!(index.line_col(3), (1, 0));
  assert_eq!(index.line_col(7), (3, 0));
  assert_eq!(index.line_count(), 4);
}

#[test]
fn test_lines_count() {
  assert_eq!(lines_count("a\nb\nc"), 2);
  assert_eq!(lines_count("a"), 0);
}
