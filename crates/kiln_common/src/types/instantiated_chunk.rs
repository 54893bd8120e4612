use crate::{ChunkIdx, ModuleIdx, PreliminaryFilename};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstantiationKind {
  Ecma,
  Css,
  /// The output of a `file` module.
  Asset,
}

#[derive(Debug, Clone)]
pub enum StrOrBytes {
  Str(String),
  Bytes(Vec<u8>),
}

impl StrOrBytes {
  pub fn as_bytes(&self) -> &[u8] {
    match self {
      Self::Str(s) => s.as_bytes(),
      Self::Bytes(b) => b,
    }
  }

  pub fn into_bytes(self) -> Vec<u8> {
    match self {
      Self::Str(s) => s.into_bytes(),
      Self::Bytes(b) => b,
    }
  }
}

/// `InstantiatedChunk`s are derived from `Chunk`s. One chunk can produce several, such as its
/// JavaScript and its css bundle. Content hashes are still placeholders at this point.
#[derive(Debug)]
pub struct InstantiatedChunk {
  pub origin_chunk: ChunkIdx,
  pub kind: InstantiationKind,
  pub content: StrOrBytes,
  pub preliminary_filename: PreliminaryFilename,
  /// Modules in output order with the number of bytes each one contributes.
  pub rendered_modules: Vec<(ModuleIdx, usize)>,
  pub map: Option<oxc_sourcemap::SourceMap>,
}
