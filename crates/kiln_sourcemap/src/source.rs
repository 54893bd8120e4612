use std::sync::Arc;

use arcstr::ArcStr;
use kiln_utils::line_index::lines_count;
use oxc_sourcemap::SourceMap;

/// Where the lines of a [SourceMapSource] come from. Line `n` of the content maps to line
/// `first_line + n` of `source`, or through `line_map` when the content was transformed.
#[derive(Debug, Clone)]
pub struct LineOrigin {
  /// The name written to the `sources` array.
  pub source: ArcStr,
  pub source_content: Option<ArcStr>,
  pub first_line: u32,
  /// Transformed line to input line.
  pub line_map: Option<Arc<[u32]>>,
}

impl LineOrigin {
  pub fn original_line(&self, line: u32) -> u32 {
    let line = self.first_line + line;
    match &self.line_map {
      Some(line_map) => {
        line_map.get(line as usize).or_else(|| line_map.last()).copied().unwrap_or(line)
      }
      None => line,
    }
  }
}

pub trait Source {
  fn content(&self) -> &str;

  fn lines_count(&self) -> u32 {
    lines_count(self.content())
  }

  fn origin(&self) -> Option<&LineOrigin> {
    None
  }

  /// A full map of the content, for sources that are not line for line copies of one input.
  fn sourcemap(&self) -> Option<&SourceMap> {
    None
  }
}

impl Source for &str {
  fn content(&self) -> &str {
    self
  }
}

impl Source for String {
  fn content(&self) -> &str {
    self
  }
}

/// Content whose lines map onto the lines of an input file.
#[derive(Debug)]
pub struct SourceMapSource {
  content: String,
  origin: LineOrigin,
}

impl SourceMapSource {
  pub fn new(content: String, origin: LineOrigin) -> Self {
    Self { content, origin }
  }
}

impl Source for SourceMapSource {
  fn content(&self) -> &str {
    &self.content
  }

  fn lines_count(&self) -> u32 {
    lines_count(&self.content)
  }

  fn origin(&self) -> Option<&LineOrigin> {
    Some(&self.origin)
  }
}

/// Content that carries its own source map, such as a minified chunk body.
pub struct MappedSource {
  content: String,
  map: Option<SourceMap>,
}

impl MappedSource {
  pub fn new(content: String, map: Option<SourceMap>) -> Self {
    Self { content, map }
  }
}

impl Source for MappedSource {
  fn content(&self) -> &str {
    &self.content
  }

  fn sourcemap(&self) -> Option<&SourceMap> {
    self.map.as_ref()
  }
}

impl<'a> Source for Box<dyn Source + Send + Sync + 'a> {
  fn content(&self) -> &str {
    self.as_ref().content()
  }

  fn lines_count(&self) -> u32 {
    self.as_ref().lines_count()
  }

  fn origin(&self) -> Option<&LineOrigin> {
    self.as_ref().origin()
  }

  fn sourcemap(&self) -> Option<&SourceMap> {
    self.as_ref().sourcemap()
  }
}

#[test]
fn original_line_follows_line_map() {
  let origin = LineOrigin {
    source: "a.ts".into(),
    source_content: None,
    first_line: 1,
    line_map: Some(Arc::from([0, 2, 2, 5])),
  };
  assert_eq!(origin.original_line(0), 2);
  assert_eq!(origin.original_line(2), 5);
  assert_eq!(origin.original_line(7), 5);
  let origin = LineOrigin { line_map: None, ..origin };
  assert_eq!(origin.original_line(2), 3);
}
