mod bind_imports_and_exports;
mod create_exports_for_modules;
mod determine_module_exports_kind;
mod determine_side_effects;
mod include_statements;
mod reference_needed_symbols;
mod sort_modules;
mod wrap_modules;

use kiln_common::{EntryPoint, ModuleIdx, ModuleStatus, OutputFormat, SymbolRefDb};
use kiln_error::{BuildDiagnostic, BuildResult, Location};
use kiln_utils::line_index::LineIndex;
use oxc_index::IndexVec;
use rustc_hash::FxHashSet;

use crate::{
  stages::scan::ScanStageOutput,
  types::{
    linking_metadata::{LinkingMetadata, LinkingMetadataVec},
    IndexModules, SharedOptions,
  },
};

#[derive(Debug)]
pub struct LinkStageOutput {
  pub module_table: IndexModules,
  /// Only the entries that produce a chunk.
  pub entry_points: Vec<EntryPoint>,
  /// Normal modules in execution order.
  pub sorted_modules: Vec<ModuleIdx>,
  pub metadata: LinkingMetadataVec,
  pub symbols: SymbolRefDb,
  pub warnings: Vec<BuildDiagnostic>,
  pub used_externals: FxHashSet<String>,
}

#[derive(Debug)]
pub struct LinkStage<'a> {
  pub module_table: IndexModules,
  pub entry_points: Vec<EntryPoint>,
  pub symbols: SymbolRefDb,
  pub sorted_modules: Vec<ModuleIdx>,
  pub metadata: LinkingMetadataVec,
  pub warnings: Vec<BuildDiagnostic>,
  pub errors: Vec<BuildDiagnostic>,
  pub used_externals: FxHashSet<String>,
  pub options: &'a SharedOptions,
}

impl<'a> LinkStage<'a> {
  pub fn new(scan_stage_output: ScanStageOutput, options: &'a SharedOptions) -> Self {
    let ScanStageOutput { module_table, symbols, entry_points, warnings, used_externals } =
      scan_stage_output;

    let metadata = module_table
      .iter()
      .map(|module| {
        let dependencies = module
          .import_records()
          .iter()
          .filter(|rec| rec.kind.is_eager())
          .map(|rec| rec.resolved_module())
          .collect();

        let star_exports_from_external_modules =
          module.as_normal().map_or_else(Vec::new, |inner| {
            inner.star_exports_from_external_modules(&module_table).collect()
          });

        LinkingMetadata {
          dependencies,
          star_exports_from_external_modules,
          ..LinkingMetadata::default()
        }
      })
      .collect::<IndexVec<ModuleIdx, _>>();

    Self {
      module_table,
      entry_points,
      symbols,
      sorted_modules: vec![],
      metadata,
      warnings,
      errors: vec![],
      used_externals,
      options,
    }
  }

  pub fn link(mut self) -> BuildResult<LinkStageOutput> {
    self.sort_modules();
    self.determine_module_exports_kind();
    self.wrap_modules();
    self.determine_side_effects();
    self.bind_imports_and_exports();
    if !self.errors.is_empty() {
      Err(std::mem::take(&mut self.errors))?;
    }
    self.create_exports_for_modules();
    self.reference_needed_symbols();
    self.include_statements();
    self.check_top_level_await();
    if !self.errors.is_empty() {
      Err(std::mem::take(&mut self.errors))?;
    }

    for module in self.module_table.iter_mut().filter_map(|module| module.as_normal_mut()) {
      module.transition_to(ModuleStatus::Linked);
    }

    Ok(LinkStageOutput {
      module_table: self.module_table,
      entry_points: self.entry_points,
      sorted_modules: self.sorted_modules,
      metadata: self.metadata,
      symbols: self.symbols,
      warnings: self.warnings,
      used_externals: self.used_externals,
    })
  }

  /// Top-level await only exists in esm, so it can't survive a wrap into cjs or iife.
  fn check_top_level_await(&mut self) {
    if self.options.format.keep_esm_import_export_syntax() {
      return;
    }
    for &idx in &self.sorted_modules {
      let Some(module) = self.module_table[idx].as_normal() else { continue };
      if !module.is_included() {
        continue;
      }
      let Some(span) = module.ecma.scanned.top_level_await else { continue };
      let (line, column) = LineIndex::new(module.source()).line_col(span.start);
      self.errors.push(BuildDiagnostic::UnsupportedSyntax {
        loc: Location::new(module.stable_id.as_str(), line + 1, column + 1),
        construct: "top-level await",
        target: match self.options.format {
          OutputFormat::Cjs => "cjs",
          _ => "iife",
        },
        min_target: "esm",
      });
    }
  }
}
