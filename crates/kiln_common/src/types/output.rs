use arcstr::ArcStr;

use crate::{ModuleId, OutputAsset, OutputChunk};

/// One file of a build result.
#[derive(Debug, Clone)]
pub enum Output {
  Chunk(Box<OutputChunk>),
  Asset(Box<OutputAsset>),
}

impl Output {
  pub fn filename(&self) -> &str {
    match self {
      Self::Chunk(chunk) => &chunk.filename,
      Self::Asset(asset) => &asset.filename,
    }
  }

  pub fn content_as_bytes(&self) -> &[u8] {
    match self {
      Self::Chunk(chunk) => chunk.code.as_bytes(),
      Self::Asset(asset) => &asset.source,
    }
  }

  /// The input modules whose code ended up in this file.
  pub fn module_ids(&self) -> &[ModuleId] {
    match self {
      Self::Chunk(chunk) => &chunk.module_ids,
      Self::Asset(asset) => &asset.module_ids,
    }
  }

  pub fn as_chunk(&self) -> Option<&OutputChunk> {
    match self {
      Self::Chunk(chunk) => Some(chunk),
      Self::Asset(_) => None,
    }
  }

  pub fn name(&self) -> Option<&ArcStr> {
    match self {
      Self::Chunk(chunk) => Some(&chunk.name),
      Self::Asset(asset) => asset.names.first(),
    }
  }
}
