use arcstr::ArcStr;
use oxc_sourcemap::{SourceMap, SourceMapBuilder};
use rustc_hash::FxHashMap;

use crate::Source;

/// Concatenates sources with a line break between each, and builds a source map for the ones
/// that know their origin: line by line for a [crate::SourceMapSource], token by token for a
/// [crate::MappedSource].
#[derive(Default)]
pub struct SourceJoiner<'source> {
  inner: Vec<Box<dyn Source + Send + Sync + 'source>>,
  prepend_source: Vec<Box<dyn Source + Send + Sync + 'source>>,
  enable_sourcemap: bool,
}

impl<'source> SourceJoiner<'source> {
  pub fn new(enable_sourcemap: bool) -> Self {
    Self { enable_sourcemap, ..Self::default() }
  }

  pub fn append_source<T: Source + Send + Sync + 'source>(&mut self, source: T) {
    self.inner.push(Box::new(source));
  }

  pub fn prepend_source<T: Source + Send + Sync + 'source>(&mut self, source: T) {
    self.prepend_source.push(Box::new(source));
  }

  pub fn join(&self) -> (String, Option<SourceMap>) {
    let sources_len = self.prepend_source.len() + self.inner.len();
    let size_hint =
      self.prepend_source.iter().chain(&self.inner).map(|s| s.content().len() + 1).sum::<usize>();
    let mut code = String::with_capacity(size_hint);
    let mut map_builder = self.enable_sourcemap.then(SourceMapBuilder::default);
    let mut source_ids = FxHashMap::default();
    let mut line_offset = 0;

    for (index, source) in self.prepend_source.iter().chain(&self.inner).enumerate() {
      code.push_str(source.content());
      if index + 1 < sources_len {
        code.push('\n');
      }

      let lines = source.lines_count() + 1;
      if let Some(builder) = map_builder.as_mut() {
        if let Some(origin) = source.origin() {
          let source_id = *source_ids.entry(origin.source.clone()).or_insert_with(|| {
            builder.add_source_and_content(
              &origin.source,
              origin.source_content.as_deref().unwrap_or_default(),
            )
          });
          for line in 0..lines {
            let original_line = origin.original_line(line);
            builder.add_token(line_offset + line, 0, original_line, 0, Some(source_id), None);
          }
        } else if let Some(map) = source.sourcemap() {
          for token in map.get_tokens() {
            let source_id = token.get_source_id().and_then(|id| {
              let name = map.get_source(id)?;
              Some(*source_ids.entry(ArcStr::from(name)).or_insert_with(|| {
                builder.add_source_and_content(name, map.get_source_content(id).unwrap_or_default())
              }))
            });
            builder.add_token(
              line_offset + token.get_dst_line(),
              token.get_dst_col(),
              token.get_src_line(),
              token.get_src_col(),
              source_id,
              None,
            );
          }
        }
      }
      line_offset += lines;
    }

    (code, map_builder.map(SourceMapBuilder::into_sourcemap))
  }
}

#[cfg(test)]
mod tests {
  use crate::{LineOrigin, MappedSource, SourceMapSource};

  use super::*;

  #[test]
  fn joins_with_line_breaks_and_maps_lines() {
    let mut joiner = SourceJoiner::new(true);
    joiner.prepend_source("// banner");
    joiner.append_source(SourceMapSource::new(
      "const a = 1;\nconsole.log(a);".to_string(),
      LineOrigin { source: "src/a.js".into(), source_content: None, first_line: 2, line_map: None },
    ));
    joiner.append_source("export { a };".to_string());

    let (code, map) = joiner.join();
    assert_eq!(code, "// banner\nconst a = 1;\nconsole.log(a);\nexport { a };");

    let map = map.unwrap();
    assert_eq!(map.get_sources().collect::<Vec<_>>().len(), 1);
    let tokens = map.get_tokens().collect::<Vec<_>>();
    assert_eq!(tokens.len(), 2);
    assert_eq!((tokens[0].get_dst_line(), tokens[0].get_src_line()), (1, 2));
    assert_eq!((tokens[1].get_dst_line(), tokens[1].get_src_line()), (2, 3));
  }

  #[test]
  fn mapped_sources_keep_their_tokens() {
    let mut inner = SourceMapBuilder::default();
    let id = inner.add_source_and_content("src/b.ts", "export const b = 1;");
    inner.add_token(0, 4, 3, 0, Some(id), None);
    let mut joiner = SourceJoiner::new(true);
    joiner.append_source("// banner");
    joiner.append_source(MappedSource::new("var b=1;".to_string(), Some(inner.into_sourcemap())));

    let (code, map) = joiner.join();
    assert_eq!(code, "// banner\nvar b=1;");
    let map = map.unwrap();
    let token = map.get_tokens().next().unwrap();
    assert_eq!((token.get_dst_line(), token.get_dst_col(), token.get_src_line()), (1, 4, 3));
    assert_eq!(map.get_source(0), Some("src/b.ts"));
  }

  #[test]
  fn no_map_when_disabled() {
    let mut joiner = SourceJoiner::new(false);
    joiner.append_source("a");
    joiner.append_source("b");
    let (code, map) = joiner.join();
    assert_eq!(code, "a\nb");
    assert!(map.is_none());
  }
}
