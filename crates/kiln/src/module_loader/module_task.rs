use std::{path::PathBuf, sync::Arc};

use arcstr::ArcStr;
use kiln_common::{
  side_effects::DeterminedSideEffects, ExportsKind, ImportKind, ImportRecordIdx, ImportRecordMeta,
  ModuleId, ModuleIdx, ModuleLoaderMsg, ModuleStatus, ModuleType, NormalModule,
  NormalModuleTaskResult, ResolvedId,
};
use kiln_error::BuildDiagnostic;
use kiln_utils::{ecmascript::legitimize_identifier_name, path_ext::PathExt};
use oxc_index::IndexVec;
use sugar_path::SugarPath;

use super::{
  ecma_view::{create_ecma_view, CreateEcmaViewReturn},
  loaders::{prepare_module, PreparedModule},
  task_context::TaskContext,
};
use crate::{
  types::transform_cache::CachedTransform,
  utils::{
    load_source::{load_source, LoadSourceReturn},
    resolve_id::{resolve_id, Importer},
  },
};

pub struct ModuleTask {
  ctx: Arc<TaskContext>,
  idx: ModuleIdx,
  /// Stable id of the module whose import discovered this one.
  owner: Option<ArcStr>,
  resolved_id: ResolvedId,
  is_user_defined_entry: bool,
}

impl ModuleTask {
  pub fn new(
    ctx: Arc<TaskContext>,
    idx: ModuleIdx,
    owner: Option<ArcStr>,
    resolved_id: ResolvedId,
    is_user_defined_entry: bool,
  ) -> Self {
    Self { ctx, idx, owner, resolved_id, is_user_defined_entry }
  }

  pub async fn run(self) {
    let msg = match self.run_inner() {
      Ok(result) => ModuleLoaderMsg::NormalModuleDone(result),
      Err(errors) => ModuleLoaderMsg::BuildErrors { module_idx: self.idx, errors },
    };
    // The receiver only goes away when the build was abandoned.
    let _ = self.ctx.tx.send(msg).await;
  }

  fn run_inner(&self) -> Result<NormalModuleTaskResult, Vec<BuildDiagnostic>> {
    if self.ctx.is_disposed() {
      return Err(vec![BuildDiagnostic::ContextDisposed]);
    }

    let module_id = self.resolved_id.module_id();
    let id = ModuleId::new(module_id.clone());
    let stable_id = id.stabilize(&self.ctx.options.cwd);
    let mut status = ModuleStatus::Discovered;
    let mut advance = |next: ModuleStatus| {
      debug_assert!(status.can_transition_to(next));
      tracing::trace!(module = %stable_id, from = %status, to = %next, "module status");
      status = next;
    };

    advance(ModuleStatus::Scanning);
    let LoadSourceReturn { content, module_type, resolve_dir } =
      load_source(&self.ctx, &self.resolved_id).map_err(|err| vec![self.with_owner(err)])?;

    let cached = self.ctx.cache.as_ref().and_then(|cache| {
      let entry = cache.get(&module_id)?;
      let cached_input =
        entry.asset_source.as_deref().unwrap_or_else(|| entry.original_source.as_bytes());
      (entry.module_type == module_type && cached_input == content.as_bytes())
        .then(|| entry.value().clone())
    });
    let cached = match cached {
      Some(cached) => {
        tracing::trace!(module = %stable_id, "transform cache hit");
        cached
      }
      None => {
        let PreparedModule { original_source, ecma, css_source, asset_source } =
          prepare_module(&self.ctx, &self.resolved_id.id, &stable_id, module_type, content)?;
        let prepared = CachedTransform {
          original_source,
          module_type,
          ecma: Arc::new(ecma),
          css_source,
          asset_source,
        };
        if let Some(cache) = &self.ctx.cache {
          cache.insert(module_id.clone(), prepared.clone());
        }
        prepared
      }
    };

    let repr_name = if self.resolved_id.is_file_namespace() {
      self.resolved_id.id.as_path().representative_file_name().into_owned()
    } else {
      self.resolved_id.id.to_string()
    };
    let repr_name = legitimize_identifier_name(&repr_name);

    advance(ModuleStatus::Resolving);
    let CreateEcmaViewReturn {
      symbols,
      namespace_object_ref,
      default_export_ref,
      named_imports,
      named_exports,
      stmt_infos,
      raw_import_records,
      meta,
      has_side_effects,
    } = create_ecma_view(self.idx, &repr_name, &cached.ecma);

    let resolve_from = match &resolve_dir {
      Some(dir) => Some(self.ctx.options.cwd.join(dir).join("index")),
      None if self.resolved_id.is_file_namespace() => {
        Some(PathBuf::from(self.resolved_id.id.as_str()))
      }
      None => None,
    };
    let importer = Importer {
      id: &self.resolved_id.id,
      namespace: &self.resolved_id.namespace,
      stable_id: &stable_id,
      resolve_from: resolve_from.as_deref(),
    };

    let mut errors = vec![];
    let mut warnings = vec![];
    let mut resolved_deps =
      IndexVec::<ImportRecordIdx, ResolvedId>::with_capacity(raw_import_records.len());
    for record in &raw_import_records {
      match resolve_id(&self.ctx, &record.specifier, Some(&importer), record.kind, false) {
        Ok(resolved) => {
          resolved_deps.push(resolved);
        }
        // `try { require("x") } catch {}` loads a module only if it is installed.
        Err(err @ BuildDiagnostic::NotFound { .. })
          if matches!(record.kind, ImportKind::DynamicImport | ImportKind::Require)
            && record.meta.contains(ImportRecordMeta::IN_TRY_BLOCK) =>
        {
          warnings.push(err);
          resolved_deps.push(ResolvedId::new_external(record.specifier.clone()));
        }
        Err(err) => {
          errors.push(err);
          // Keeps `resolved_deps` aligned with the records.
          resolved_deps.push(ResolvedId::new_external(record.specifier.clone()));
        }
      }
    }
    if !errors.is_empty() {
      advance(ModuleStatus::Errored);
      return Err(errors);
    }

    let side_effects = if !self.ctx.options.tree_shaking {
      DeterminedSideEffects::NoTreeshake
    } else if let Some(value) = self.resolved_id.side_effects {
      DeterminedSideEffects::UserDefined(value)
    } else if let Some(value) = self
      .resolved_id
      .package_json
      .as_ref()
      .and_then(|package_json| package_json.check_side_effects_for(self.resolved_id.id.as_path()))
    {
      DeterminedSideEffects::UserDefined(value)
    } else if module_type == ModuleType::Css {
      DeterminedSideEffects::Analyzed(true)
    } else {
      DeterminedSideEffects::Analyzed(has_side_effects)
    };

    let scanned = &cached.ecma.scanned;
    let exports_kind = if scanned.has_module_syntax {
      ExportsKind::Esm
    } else if scanned.uses_commonjs {
      ExportsKind::CommonJs
    } else if self
      .resolved_id
      .package_json
      .as_ref()
      .is_some_and(|package_json| package_json.r#type.as_deref() == Some("module"))
    {
      // Node treats every `.js` file of a `"type": "module"` package as esm.
      ExportsKind::Esm
    } else {
      ExportsKind::None
    };

    advance(ModuleStatus::Transformed);

    let module = NormalModule {
      exec_order: u32::MAX,
      idx: self.idx,
      is_user_defined_entry: self.is_user_defined_entry,
      debug_id: self.resolved_id.debug_id(&self.ctx.options.cwd),
      id,
      stable_id,
      repr_name,
      module_type,
      exports_kind,
      status: ModuleStatus::Transformed,
      original_source: cached.original_source,
      ecma: cached.ecma,
      css_source: cached.css_source,
      asset_source: cached.asset_source,
      namespace_object_ref,
      default_export_ref,
      named_imports,
      named_exports,
      stmt_infos,
      import_records: IndexVec::default(),
      side_effects,
      meta,
      importers: vec![],
      dynamic_importers: vec![],
    };

    Ok(NormalModuleTaskResult { module, symbols, resolved_deps, raw_import_records, warnings })
  }

  fn with_owner(&self, err: BuildDiagnostic) -> BuildDiagnostic {
    match (err, &self.owner) {
      (BuildDiagnostic::Load { id, reason }, Some(owner)) => {
        BuildDiagnostic::Load { id, reason: format!("{reason} (imported by {owner})") }
      }
      (err, _) => err,
    }
  }
}
