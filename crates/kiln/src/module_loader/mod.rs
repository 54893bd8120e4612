pub mod ecma_view;
pub mod loaders;
pub mod module_task;
pub mod task_context;

use std::{collections::hash_map::Entry, sync::Arc};

use arcstr::ArcStr;
use kiln_common::{
  EntryPoint, EntryPointKind, ExternalModule, ImportKind, ImportRecordIdx, Module, ModuleId,
  ModuleIdx, ModuleLoaderMsg, NormalModuleTaskResult, ResolvedId, StmtInfoIdx, SymbolRefDb,
  SymbolRefDbForModule,
};
use kiln_error::{BuildDiagnostic, BuildResult};
use kiln_utils::ecmascript::legitimize_identifier_name;
use oxc_index::IndexVec;
use rustc_hash::{FxHashMap, FxHashSet};
use tokio::sync::mpsc::Receiver;

use self::{module_task::ModuleTask, task_context::TaskContext};
use crate::types::IndexModules;

struct IntermediateModules {
  modules: IndexVec<ModuleIdx, Option<Module>>,
  symbols: IndexVec<ModuleIdx, Option<SymbolRefDbForModule>>,
  importers: IndexVec<ModuleIdx, Vec<(ImportKind, ModuleId)>>,
}

impl IntermediateModules {
  fn alloc_module_idx(&mut self) -> ModuleIdx {
    self.modules.push(None);
    self.symbols.push(None);
    self.importers.push(Vec::new())
  }
}

/// Drives the module tasks: spawns one per newly discovered module and collects their results
/// into the module table.
pub struct ModuleLoader {
  rx: Receiver<ModuleLoaderMsg>,
  remaining: u32,
  shared_context: Arc<TaskContext>,
  intermediate: IntermediateModules,
  visited: FxHashMap<ArcStr, ModuleIdx>,
}

#[derive(Debug)]
pub struct ModuleLoaderOutput {
  pub module_table: IndexModules,
  pub symbols: SymbolRefDb,
  /// User defined entries first, then dynamic import entries in order of first discovery.
  pub entry_points: Vec<EntryPoint>,
  pub warnings: Vec<BuildDiagnostic>,
  /// Patterns of `external` that matched at least one import.
  pub used_externals: FxHashSet<String>,
}

impl ModuleLoader {
  pub fn new(
    shared_context: Arc<TaskContext>,
    rx: Receiver<ModuleLoaderMsg>,
  ) -> Self {
    Self {
      rx,
      remaining: 0,
      shared_context,
      intermediate: IntermediateModules {
        modules: IndexVec::new(),
        symbols: IndexVec::new(),
        importers: IndexVec::new(),
      },
      visited: FxHashMap::default(),
    }
  }

  pub async fn fetch_all_modules(
    mut self,
    user_defined_entries: Vec<(Option<ArcStr>, ResolvedId)>,
  ) -> BuildResult<ModuleLoaderOutput> {
    let mut user_defined_entry_ids = FxHashSet::default();
    let mut entry_points = user_defined_entries
      .into_iter()
      .map(|(name, resolved_id)| {
        let id = self.try_spawn_new_task(resolved_id, None, true);
        user_defined_entry_ids.insert(id);
        EntryPoint { name, id, kind: EntryPointKind::UserDefined, related_stmt_infos: vec![] }
      })
      .collect::<Vec<_>>();

    let mut errors = vec![];
    let mut warnings = vec![];
    let mut dynamic_import_entry_ids: FxHashMap<ModuleIdx, Vec<(ModuleIdx, StmtInfoIdx)>> =
      FxHashMap::default();

    while self.remaining > 0 {
      let Some(msg) = self.rx.recv().await else {
        break;
      };

      match msg {
        ModuleLoaderMsg::NormalModuleDone(task_result) => {
          let NormalModuleTaskResult {
            mut module,
            symbols,
            resolved_deps,
            raw_import_records,
            warnings: task_warnings,
          } = task_result;
          warnings.extend(task_warnings);

          let owner: ArcStr = module.stable_id.as_str().into();
          let import_records = raw_import_records
            .into_iter()
            .zip(resolved_deps)
            .map(|(raw_rec, resolved_id)| {
              let id = self.try_spawn_new_task(resolved_id, Some(owner.clone()), false);
              self.intermediate.importers[id].push((raw_rec.kind, module.id.clone()));
              // Dynamically imported modules become entries of their own.
              if raw_rec.kind == ImportKind::DynamicImport && !user_defined_entry_ids.contains(&id)
              {
                dynamic_import_entry_ids
                  .entry(id)
                  .or_default()
                  .push((module.idx, raw_rec.related_stmt_info_idx));
              }
              raw_rec.into_resolved(id)
            })
            .collect::<IndexVec<ImportRecordIdx, _>>();
          module.import_records = import_records;

          let idx = module.idx;
          self.intermediate.symbols[idx] = Some(symbols);
          self.intermediate.modules[idx] = Some(module.into());
          self.remaining -= 1;
        }
        ModuleLoaderMsg::BuildErrors { module_idx, errors: task_errors } => {
          tracing::debug!(?module_idx, count = task_errors.len(), "module failed");
          errors.extend(task_errors);
          self.remaining -= 1;
        }
      }
    }

    if !errors.is_empty() {
      Err(errors)?;
    }

    let IntermediateModules { modules, symbols, mut importers } = self.intermediate;
    let module_table = modules
      .into_iter_enumerated()
      .map(|(idx, module)| {
        let mut module = module.ok_or_else(|| {
          anyhow::anyhow!("module {idx:?} was discovered but never finished loading")
        })?;
        if let Some(module) = module.as_normal_mut() {
          for (kind, importer) in std::mem::take(&mut importers[idx]) {
            let list = match kind {
              ImportKind::DynamicImport => &mut module.dynamic_importers,
              _ => &mut module.importers,
            };
            if !list.contains(&importer) {
              list.push(importer);
            }
          }
          module.importers.sort_unstable();
          module.dynamic_importers.sort_unstable();
        }
        Ok(module)
      })
      .collect::<anyhow::Result<IndexModules>>()?;

    let symbols = symbols
      .into_iter_enumerated()
      .map(|(idx, symbols)| symbols.unwrap_or_else(|| SymbolRefDbForModule::new(idx)))
      .collect::<IndexVec<ModuleIdx, _>>();

    let user_defined_entries = entry_points.iter().map(|entry| entry.id).collect::<Vec<_>>();
    let dynamic_import_entry_ids = discovery_order(&module_table, &user_defined_entries)
      .into_iter()
      .filter_map(|id| dynamic_import_entry_ids.remove(&id).map(|related| (id, related)))
      .collect::<Vec<_>>();
    entry_points.extend(dynamic_import_entry_ids.into_iter().map(|(id, mut related_stmt_infos)| {
      related_stmt_infos.sort_unstable_by(|(a, a_stmt), (b, b_stmt)| {
        module_table[*a].stable_id().cmp(module_table[*b].stable_id()).then(a_stmt.cmp(b_stmt))
      });
      EntryPoint { name: None, id, kind: EntryPointKind::DynamicImport, related_stmt_infos }
    }));

    let used_externals =
      self.shared_context.used_externals.iter().map(|pattern| pattern.key().clone()).collect();

    Ok(ModuleLoaderOutput {
      module_table,
      symbols: SymbolRefDb::new(symbols),
      entry_points,
      warnings,
      used_externals,
    })
  }

  fn try_spawn_new_task(
    &mut self,
    resolved_id: ResolvedId,
    owner: Option<ArcStr>,
    is_user_defined_entry: bool,
  ) -> ModuleIdx {
    match self.visited.entry(resolved_id.module_id()) {
      Entry::Occupied(visited) => *visited.get(),
      Entry::Vacant(not_visited) => {
        let idx = self.intermediate.alloc_module_idx();

        if resolved_id.is_external {
          let mut symbols = SymbolRefDbForModule::new(idx);
          let namespace_ref =
            symbols.create_facade_root_symbol_ref(&legitimize_identifier_name(&resolved_id.id));
          self.intermediate.symbols[idx] = Some(symbols);
          self.intermediate.modules[idx] =
            Some(ExternalModule::new(idx, resolved_id.id, namespace_ref).into());
        } else {
          self.remaining += 1;
          let task = ModuleTask::new(
            Arc::clone(&self.shared_context),
            idx,
            owner,
            resolved_id,
            is_user_defined_entry,
          );
          tokio::spawn(task.run());
        }

        *not_visited.insert(idx)
      }
    }
  }
}

/// Modules in the order a depth-first walk from the entries first reaches them. Import records
/// are followed in source order, `import()` included, so the result does not depend on which
/// module task finished first.
fn discovery_order(module_table: &IndexModules, entries: &[ModuleIdx]) -> Vec<ModuleIdx> {
  let mut visited = FxHashSet::default();
  let mut order = vec![];
  let mut stack = entries.iter().rev().copied().collect::<Vec<_>>();
  while let Some(idx) = stack.pop() {
    if !visited.insert(idx) {
      continue;
    }
    order.push(idx);
    stack.extend(module_table[idx].import_records().iter().rev().map(|rec| rec.resolved_module()));
  }
  order
}
