use std::borrow::Cow;

use arcstr::ArcStr;
use kiln_common::{
  Module, ModuleIdx, NamespaceAlias, Specifier, SymbolRef, SymbolRefDb, WrapKind,
};
use kiln_error::BuildDiagnostic;
use kiln_utils::{
  ecmascript::{is_validate_identifier_name, legitimize_identifier_name},
  indexmap::{FxIndexMap, FxIndexSet},
};
use rustc_hash::FxHashMap;

use super::LinkStage;
use crate::types::{linking_metadata::LinkingMetadataVec, IndexModules};

#[derive(Clone, Debug)]
struct ImportTracker {
  importer: ModuleIdx,
  importee: ModuleIdx,
  imported: Specifier,
  imported_as: SymbolRef,
}

#[derive(Debug, PartialEq, Eq)]
enum MatchImportKind {
  Cycle,
  NoMatch,
  Namespace(SymbolRef),
  Normal(SymbolRef),
  NormalAndNamespace { namespace_ref: SymbolRef, alias: ArcStr },
}

#[derive(Debug)]
enum ImportStatus {
  NoMatch,
  Matched(SymbolRef),
  External(SymbolRef),
  /// The importee is wrapped commonjs. Its exports are only known at runtime, so the import
  /// reads them off the namespace the importer gets from `__toESM(require_x())`.
  CommonJs(SymbolRef),
}

struct BindImportsAndExportsContext<'a> {
  module_table: &'a IndexModules,
  metadata: &'a LinkingMetadataVec,
  symbols: &'a mut SymbolRefDb,
  keep_esm_imports: bool,
  errors: Vec<BuildDiagnostic>,
  /// Named imports of externals, grouped by the imported name. Each group shares one binding.
  external_imports: FxIndexMap<ModuleIdx, FxIndexMap<ArcStr, FxIndexSet<SymbolRef>>>,
}

impl LinkStage<'_> {
  /// Links every import to the symbol it ends up at, following re-exports. For example
  /// ```js
  /// // main.js
  /// import { a } from './foo';
  /// // foo.js
  /// export { a } from './bar';
  /// // bar.js
  /// export const a = 1;
  /// ```
  /// links `a` of `main.js` and the facade of `foo.js` to `a` of `bar.js`.
  ///
  /// Imports of wrapped commonjs modules become property reads on the importer's namespace of
  /// them.
  ///
  /// Imports of externals have nothing to link to. In esm output, all imports of the same name
  /// from the same external share a facade symbol owned by the external. Otherwise they become
  /// property reads on the external's namespace.
  pub(crate) fn bind_imports_and_exports(&mut self) {
    for (module_idx, meta) in self.metadata.iter_mut_enumerated() {
      let Module::Normal(module) = &self.module_table[module_idx] else {
        continue;
      };

      let mut resolved_exports = module
        .named_exports
        .iter()
        .map(|(name, local)| (name.clone(), local.referenced))
        .collect::<FxHashMap<_, _>>();

      if module.has_star_export() {
        add_exports_for_export_star(
          module_idx,
          &self.module_table,
          &mut vec![],
          &mut resolved_exports,
        );
      }

      let mut sorted_resolved_exports = resolved_exports.keys().cloned().collect::<Vec<_>>();
      sorted_resolved_exports.sort_unstable();
      meta.sorted_resolved_exports = sorted_resolved_exports;
      meta.resolved_exports = resolved_exports;
    }

    let mut ctx = BindImportsAndExportsContext {
      module_table: &self.module_table,
      metadata: &self.metadata,
      symbols: &mut self.symbols,
      keep_esm_imports: self.options.format.keep_esm_import_export_syntax(),
      errors: vec![],
      external_imports: FxIndexMap::default(),
    };

    for &module_idx in &self.sorted_modules {
      ctx.match_imports_with_exports(module_idx);
    }

    let BindImportsAndExportsContext { errors, external_imports, .. } = ctx;
    self.errors.extend(errors);

    for (module_idx, map) in external_imports {
      for (key, symbol_set) in map {
        let name = if key.as_str() == "default" {
          // Named after the first local binding, `import React from 'react'` gives `React`.
          symbol_set.first().map_or(Cow::Borrowed("default"), |symbol| {
            Cow::Owned(symbol.name(&self.symbols).to_string())
          })
        } else if is_validate_identifier_name(&key) {
          Cow::Borrowed(key.as_str())
        } else {
          Cow::Owned(legitimize_identifier_name(&key))
        };
        let target = self.symbols.create_facade_root_symbol_ref(module_idx, &name);
        for symbol in symbol_set {
          self.symbols.link(symbol, target);
        }
      }
    }
  }
}

fn add_exports_for_export_star(
  module_idx: ModuleIdx,
  module_table: &IndexModules,
  module_stack: &mut Vec<ModuleIdx>,
  resolved_exports: &mut FxHashMap<ArcStr, SymbolRef>,
) {
  if module_stack.contains(&module_idx) {
    return;
  }

  let Module::Normal(module) = &module_table[module_idx] else {
    return;
  };

  module_stack.push(module_idx);

  for dep_idx in module.star_export_module_ids() {
    let Module::Normal(dep_module) = &module_table[dep_idx] else {
      continue;
    };

    for (exported_name, named_export) in &dep_module.named_exports {
      // `export *` never forwards "default"
      if exported_name.as_str() == "default" {
        continue;
      }

      // Shadowed by a real export of a module on the stack
      if module_stack
        .iter()
        .filter_map(|id| module_table[*id].as_normal())
        .any(|module| module.named_exports.contains_key(exported_name))
      {
        continue;
      }

      resolved_exports.entry(exported_name.clone()).or_insert(named_export.referenced);
    }

    add_exports_for_export_star(dep_idx, module_table, module_stack, resolved_exports);
  }

  module_stack.pop();
}

impl BindImportsAndExportsContext<'_> {
  fn match_imports_with_exports(&mut self, module_idx: ModuleIdx) {
    let Module::Normal(module) = &self.module_table[module_idx] else {
      return;
    };

    for (&imported_as, named_import) in &module.named_imports {
      let importee = module.import_records[named_import.record_id].resolved_module();
      let is_external = self.module_table[importee].is_external();

      if self.keep_esm_imports && is_external {
        if let Specifier::Literal(name) = &named_import.imported {
          self
            .external_imports
            .entry(importee)
            .or_default()
            .entry(name.clone())
            .or_default()
            .insert(imported_as);
        }
      }

      let ret = self.match_import_with_export(
        &mut Vec::default(),
        ImportTracker {
          importer: module_idx,
          importee,
          imported: named_import.imported.clone(),
          imported_as,
        },
      );

      match ret {
        MatchImportKind::Namespace(namespace_ref) => {
          self.symbols.link(imported_as, namespace_ref);
        }
        MatchImportKind::Normal(symbol) => {
          self.symbols.link(imported_as, symbol);
        }
        MatchImportKind::NormalAndNamespace { namespace_ref, alias } => {
          self.symbols.get_mut(imported_as).namespace_alias =
            Some(NamespaceAlias { property_name: alias, namespace_ref });
        }
        MatchImportKind::NoMatch => {
          self.errors.push(BuildDiagnostic::MissingExport {
            name: named_import.imported.to_string(),
            exporter: self.module_table[importee].stable_id().into(),
            importer: module.stable_id.as_str().into(),
          });
        }
        MatchImportKind::Cycle => {}
      }
    }
  }

  fn match_import_with_export(
    &self,
    tracker_stack: &mut Vec<ImportTracker>,
    mut tracker: ImportTracker,
  ) -> MatchImportKind {
    loop {
      if tracker_stack.iter().rev().any(|prev| {
        prev.importer == tracker.importer && prev.imported_as == tracker.imported_as
      }) {
        return MatchImportKind::Cycle;
      }

      tracker_stack.push(tracker.clone());

      break match self.advance_import_tracker(&tracker) {
        ImportStatus::NoMatch => MatchImportKind::NoMatch,
        ImportStatus::Matched(symbol) => {
          // A re-export of another import: keep following it.
          let Some(owner) = self.module_table[symbol.owner].as_normal() else {
            return MatchImportKind::Normal(symbol);
          };
          let Some(another_named_import) = owner.named_imports.get(&symbol) else {
            return MatchImportKind::Normal(symbol);
          };
          let next_importee =
            owner.import_records[another_named_import.record_id].resolved_module();
          match &self.module_table[next_importee] {
            // The owner's own import is bound to the external, link to it.
            Module::External(_) => MatchImportKind::Normal(another_named_import.imported_as),
            Module::Normal(importee) => {
              tracker.importee = importee.idx;
              tracker.importer = owner.idx;
              tracker.imported = another_named_import.imported.clone();
              tracker.imported_as = another_named_import.imported_as;
              continue;
            }
          }
        }
        ImportStatus::External(namespace_ref) => match &tracker.imported {
          Specifier::Star => MatchImportKind::Namespace(namespace_ref),
          // Stays an import of the external in the output.
          Specifier::Literal(_) if self.keep_esm_imports => {
            MatchImportKind::Normal(tracker.imported_as)
          }
          Specifier::Literal(alias) => {
            MatchImportKind::NormalAndNamespace { namespace_ref, alias: alias.clone() }
          }
        },
        ImportStatus::CommonJs(namespace_ref) => match &tracker.imported {
          Specifier::Star => MatchImportKind::Namespace(namespace_ref),
          Specifier::Literal(alias) => {
            MatchImportKind::NormalAndNamespace { namespace_ref, alias: alias.clone() }
          }
        },
      };
    }
  }

  fn advance_import_tracker(&self, tracker: &ImportTracker) -> ImportStatus {
    let Some(importer) = self.module_table[tracker.importer].as_normal() else {
      return ImportStatus::NoMatch;
    };
    let Some(named_import) = importer.named_imports.get(&tracker.imported_as) else {
      return ImportStatus::NoMatch;
    };

    let importee = match &self.module_table[tracker.importee] {
      Module::Normal(importee) => importee.as_ref(),
      Module::External(external) => return ImportStatus::External(external.namespace_ref),
    };

    if self.metadata[importee.idx].wrap_kind == WrapKind::Cjs {
      return ImportStatus::CommonJs(importer.import_records[named_import.record_id].namespace_ref);
    }

    match &named_import.imported {
      Specifier::Star => ImportStatus::Matched(importee.namespace_object_ref),
      Specifier::Literal(imported) => self.metadata[tracker.importee]
        .resolved_exports
        .get(imported)
        .map_or(ImportStatus::NoMatch, |symbol| ImportStatus::Matched(*symbol)),
    }
  }
}
