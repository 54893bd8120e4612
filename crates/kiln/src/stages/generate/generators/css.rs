use kiln_common::{InstantiatedChunk, InstantiationKind, StrOrBytes};
use kiln_utils::concat_string;

use crate::types::generator::GenerateContext;

pub struct CssGenerator;

impl CssGenerator {
  /// The css of a chunk is the css of its modules, concatenated in execution order.
  pub fn instantiate_chunk(ctx: &GenerateContext<'_>) -> Option<InstantiatedChunk> {
    let preliminary_filename = ctx.chunk.css_preliminary_filename.clone()?;

    let mut content = String::new();
    let mut rendered_modules = vec![];
    for module in ctx.renderable_ecma_modules() {
      let Some(css) = &module.css_source else { continue };
      let start = content.len();
      if !ctx.options.minify {
        content.push_str(&concat_string!("/* ", module.stable_id, " */\n"));
      }
      content.push_str(css.trim_end());
      content.push('\n');
      rendered_modules.push((module.idx, content.len() - start));
    }

    if rendered_modules.is_empty() {
      return None;
    }

    Some(InstantiatedChunk {
      origin_chunk: ctx.chunk_idx,
      kind: InstantiationKind::Css,
      content: StrOrBytes::Str(content),
      preliminary_filename,
      rendered_modules,
      map: None,
    })
  }
}
