mod remap;
mod source;
mod source_joiner;

pub use crate::{
  remap::remap_through,
  source::{LineOrigin, MappedSource, Source, SourceMapSource},
  source_joiner::SourceJoiner,
};
pub use oxc_sourcemap::{SourceMap, SourceMapBuilder};
