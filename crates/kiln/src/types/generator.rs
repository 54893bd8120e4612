use kiln_common::{
  Chunk, ChunkIdx, InstantiatedChunk, Module, NormalModule, NormalizedBundlerOptions, SymbolRef,
};
use kiln_error::BuildDiagnostic;
use kiln_utils::ecmascript::property_access_str;

use crate::{stages::link::LinkStageOutput, types::chunk_graph::ChunkGraph};

pub struct GenerateOutput {
  pub chunks: Vec<InstantiatedChunk>,
  pub warnings: Vec<BuildDiagnostic>,
}

pub struct GenerateContext<'a> {
  pub chunk_idx: ChunkIdx,
  pub chunk: &'a Chunk,
  pub chunk_graph: &'a ChunkGraph,
  pub link_output: &'a LinkStageOutput,
  pub options: &'a NormalizedBundlerOptions,
  pub warnings: Vec<BuildDiagnostic>,
}

impl GenerateContext<'_> {
  pub fn canonical_name_for(&self, symbol_ref: SymbolRef) -> &str {
    self.link_output.symbols.canonical_name_for(symbol_ref, &self.chunk.canonical_names)
  }

  /// A `SymbolRef` might be identifier or a property access. This function will return correct
  /// string pattern for the symbol.
  pub fn finalized_string_pattern_for_symbol_ref(&self, symbol_ref: SymbolRef) -> String {
    let symbols = &self.link_output.symbols;
    let canonical_ref = symbols.canonical_ref_for(symbol_ref);
    match &symbols.get(canonical_ref).namespace_alias {
      // `import { foo } from 'external'` reads `foo` off the namespace in cjs and iife output.
      Some(alias) => {
        property_access_str(self.canonical_name_for(alias.namespace_ref), &alias.property_name)
      }
      None => self.canonical_name_for(canonical_ref).to_string(),
    }
  }

  pub fn renderable_ecma_modules(&self) -> impl Iterator<Item = &NormalModule> {
    self.chunk.modules.iter().copied().filter_map(move |id| {
      let Module::Normal(module) = &self.link_output.module_table[id] else { return None };
      module.is_included().then_some(&**module)
    })
  }
}
