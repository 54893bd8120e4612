use std::path::{Path, PathBuf};

use kiln_common::{ModuleType, ResolvedId, StrOrBytes};
use kiln_error::BuildDiagnostic;
use kiln_plugin::OnLoadArgs;

use crate::module_loader::task_context::TaskContext;

pub struct LoadSourceReturn {
  pub content: StrOrBytes,
  pub module_type: ModuleType,
  /// Set by a plugin to resolve the module's imports from somewhere else than its own directory.
  pub resolve_dir: Option<PathBuf>,
}

fn extension_of(id: &str) -> &str {
  Path::new(id).extension().and_then(|ext| ext.to_str()).unwrap_or("")
}

/// `onLoad` hooks first. Files nobody claims are read from the file system with the loader of
/// their extension.
pub fn load_source(
  ctx: &TaskContext,
  resolved_id: &ResolvedId,
) -> Result<LoadSourceReturn, BuildDiagnostic> {
  if !ctx.plugin_driver.is_empty() {
    let args = OnLoadArgs { path: &resolved_id.id, namespace: &resolved_id.namespace };
    if let Some(loaded) = ctx.plugin_driver.load(&args)? {
      let module_type = loaded
        .loader
        .or(resolved_id.module_type)
        .or_else(|| ctx.options.module_type_for_extension(extension_of(&resolved_id.id)))
        .unwrap_or(ModuleType::Js);
      return Ok(LoadSourceReturn {
        content: StrOrBytes::Str(loaded.contents),
        module_type,
        resolve_dir: loaded.resolve_dir,
      });
    }
  }

  if !resolved_id.is_file_namespace() {
    return Err(BuildDiagnostic::Load {
      id: resolved_id.module_id(),
      reason: format!("no plugin loads modules of the \"{}\" namespace", resolved_id.namespace),
    });
  }

  let ext = extension_of(&resolved_id.id);
  let module_type =
    resolved_id.module_type.or_else(|| ctx.options.module_type_for_extension(ext)).ok_or_else(
      || BuildDiagnostic::Load {
        id: resolved_id.id.clone(),
        reason: format!("no loader is configured for \".{ext}\" files"),
      },
    )?;

  let bytes = ctx.fs.read(Path::new(resolved_id.id.as_str())).map_err(|err| {
    BuildDiagnostic::Load { id: resolved_id.id.clone(), reason: err.to_string() }
  })?;

  Ok(LoadSourceReturn { content: StrOrBytes::Bytes(bytes), module_type, resolve_dir: None })
}
