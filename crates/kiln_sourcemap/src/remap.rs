use oxc_sourcemap::{SourceMap, SourceMapBuilder};
use rustc_hash::FxHashMap;

/// Maps positions of code printed from a joined chunk back to the inputs of the chunk.
///
/// `mappings` are `(dst_line, dst_col, src_line, src_col)` with `src` in the joined code.
/// `joined` is the line-level map of the joined code. Positions on lines `joined` knows nothing
/// about are dropped.
pub fn remap_through(
  joined: &SourceMap,
  mappings: impl IntoIterator<Item = (u32, u32, u32, u32)>,
) -> SourceMap {
  let mut lines = FxHashMap::default();
  for token in joined.get_tokens() {
    if let Some(source_id) = token.get_source_id() {
      lines.entry(token.get_dst_line()).or_insert((source_id, token.get_src_line()));
    }
  }

  let mut builder = SourceMapBuilder::default();
  let mut source_ids = FxHashMap::default();
  for (dst_line, dst_col, src_line, src_col) in mappings {
    let Some(&(joined_source_id, original_line)) = lines.get(&src_line) else { continue };
    let source_id = *source_ids.entry(joined_source_id).or_insert_with(|| {
      builder.add_source_and_content(
        joined.get_source(joined_source_id).unwrap_or_default(),
        joined.get_source_content(joined_source_id).unwrap_or_default(),
      )
    });
    builder.add_token(dst_line, dst_col, original_line, src_col, Some(source_id), None);
  }
  builder.into_sourcemap()
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn minified_positions_point_at_inputs() {
    let mut joined = SourceMapBuilder::default();
    let a = joined.add_source_and_content("src/a.js", "let a = 1;");
    joined.add_token(1, 0, 4, 0, Some(a), None);
    joined.add_token(2, 0, 5, 0, Some(a), None);
    let joined = joined.into_sourcemap();

    let map = remap_through(&joined, [(0, 0, 0, 0), (0, 6, 1, 2), (0, 12, 2, 0)]);
    let tokens = map.get_tokens().map(|t| (t.get_dst_col(), t.get_src_line())).collect::<Vec<_>>();
    assert_eq!(tokens, [(6, 4), (12, 5)]);
    assert_eq!(map.get_source(0), Some("src/a.js"));
  }
}
