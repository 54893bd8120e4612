pub mod types;

use std::path::Path;

use arcstr::ArcStr;
use kiln_utils::{
  bitset::BitSet, hash_placeholder::HashPlaceholderGenerator, indexmap::FxIndexMap,
  path_ext::PathExt,
};
use oxc_index::IndexVec;
use rustc_hash::FxHashMap;

use crate::{
  ChunkIdx, ChunkKind, FilenameTemplate, Module, ModuleIdx, NamedImport, NormalModule,
  NormalizedBundlerOptions, SymbolRef,
};

use self::types::{
  cross_chunk_import_item::CrossChunkImportItem, preliminary_filename::PreliminaryFilename,
};

#[derive(Debug, Default)]
pub struct Chunk {
  pub exec_order: u32,
  pub kind: ChunkKind,
  /// Sorted by execution order.
  pub modules: Vec<ModuleIdx>,
  pub name: Option<ArcStr>,
  pub preliminary_filename: Option<PreliminaryFilename>,
  pub absolute_preliminary_filename: Option<String>,
  pub css_preliminary_filename: Option<PreliminaryFilename>,
  pub canonical_names: FxHashMap<SymbolRef, ArcStr>,
  // Sorted by the order the importee chunks were created
  pub cross_chunk_imports: Vec<ChunkIdx>,
  pub cross_chunk_dynamic_imports: Vec<ChunkIdx>,
  pub bits: BitSet,
  pub imports_from_other_chunks: Vec<(ChunkIdx, Vec<CrossChunkImportItem>)>,
  pub imports_from_external_modules: Vec<(ModuleIdx, Vec<NamedImport>)>,
  // meaningless if the chunk is an entrypoint
  pub exports_to_other_chunks: FxIndexMap<SymbolRef, ArcStr>,
}

impl Chunk {
  pub fn new(name: Option<ArcStr>, bits: BitSet, modules: Vec<ModuleIdx>, kind: ChunkKind) -> Self {
    Self { exec_order: u32::MAX, modules, name, bits, kind, ..Self::default() }
  }

  pub fn is_entry(&self) -> bool {
    matches!(self.kind, ChunkKind::EntryPoint { .. })
  }

  /// The specifier this chunk uses to import `importee`, such as `./shared-a1b2c3d4.js`.
  pub fn import_path_for(&self, importee: &Chunk) -> String {
    let (Some(importer_filename), Some(importee_filename)) =
      (&self.absolute_preliminary_filename, &importee.absolute_preliminary_filename)
    else {
      return importee.preliminary_filename.as_deref().map(|f| format!("./{f}")).unwrap_or_default();
    };
    let import_path = relative_path(Path::new(importer_filename), Path::new(importee_filename));
    if import_path.starts_with('.') {
      import_path
    } else {
      format!("./{import_path}")
    }
  }

  fn filename_template(&self, options: &NormalizedBundlerOptions) -> FilenameTemplate {
    let template = if matches!(self.kind, ChunkKind::EntryPoint { is_user_defined: true, .. }) {
      options.entry_filenames.clone()
    } else {
      options.chunk_filenames.clone()
    };
    FilenameTemplate::new(template)
  }

  /// Renders the chunk's file name. `[hash]` is filled with a placeholder that is replaced once
  /// the content of every chunk is known. Names that collide get a numeric suffix, unless the
  /// hash already tells them apart.
  pub fn generate_preliminary_filename(
    &self,
    options: &NormalizedBundlerOptions,
    chunk_name: &ArcStr,
    hash_placeholder_generator: &mut HashPlaceholderGenerator,
    make_unique_name: &mut impl FnMut(&ArcStr) -> ArcStr,
  ) -> PreliminaryFilename {
    if let Some(file) = &options.file {
      return PreliminaryFilename::new(file.as_str(), None);
    }

    let filename_template = self.filename_template(options);
    let has_hash_pattern = filename_template.has_hash_pattern();

    let name = if has_hash_pattern {
      make_unique_name(chunk_name);
      chunk_name.clone()
    } else {
      make_unique_name(chunk_name)
    };

    let mut hash_placeholder = has_hash_pattern.then(Vec::new);
    let hash_replacer = has_hash_pattern.then_some(|len: Option<usize>| {
      let hash = hash_placeholder_generator.generate(len.unwrap_or(8));
      if let Some(hash_placeholder) = hash_placeholder.as_mut() {
        hash_placeholder.push(hash.clone());
      }
      hash
    });

    let filename = filename_template.render(Some(&name), Some("js"), hash_replacer);
    PreliminaryFilename::new(filename, hash_placeholder)
  }

  /// The css bundle sits next to the JavaScript file and shares its name, with its own hash.
  pub fn generate_css_preliminary_filename(
    &self,
    options: &NormalizedBundlerOptions,
    chunk_name: &ArcStr,
    hash_placeholder_generator: &mut HashPlaceholderGenerator,
  ) -> PreliminaryFilename {
    if let Some(file) = &options.file {
      return PreliminaryFilename::new(Path::new(file).with_extension("css").to_slash_string(), None);
    }

    let filename_template = self.filename_template(options);
    let mut hash_placeholder = filename_template.has_hash_pattern().then(Vec::new);
    let hash_replacer = hash_placeholder.is_some().then_some(|len: Option<usize>| {
      let hash = hash_placeholder_generator.generate(len.unwrap_or(8));
      if let Some(hash_placeholder) = hash_placeholder.as_mut() {
        hash_placeholder.push(hash.clone());
      }
      hash
    });
    let filename = filename_template.render(Some(chunk_name), Some("css"), hash_replacer);
    PreliminaryFilename::new(Path::new(&filename).with_extension("css").to_slash_string(), hash_placeholder)
  }

  pub fn entry_module_idx(&self) -> Option<ModuleIdx> {
    match &self.kind {
      ChunkKind::EntryPoint { module, .. } => Some(*module),
      ChunkKind::Common => None,
    }
  }

  pub fn entry_module<'module>(
    &self,
    modules: &'module IndexVec<ModuleIdx, Module>,
  ) -> Option<&'module NormalModule> {
    self.entry_module_idx().and_then(|idx| modules[idx].as_normal())
  }
}

fn relative_path(importer: &Path, importee: &Path) -> String {
  let importer_dir = importer.parent().unwrap_or(importer);
  importee.relative_slash(importer_dir)
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn import_path_is_relative_to_the_importer() {
    let mut entry = Chunk::default();
    entry.absolute_preliminary_filename = Some("/dist/main.js".to_string());
    let mut shared = Chunk::default();
    shared.absolute_preliminary_filename = Some("/dist/chunks/shared.js".to_string());
    assert_eq!(entry.import_path_for(&shared), "./chunks/shared.js");
    assert_eq!(shared.import_path_for(&entry), "../main.js");
  }
}
