use std::path::{Path, PathBuf};

use arcstr::ArcStr;
use kiln_common::{ImportKind, Platform, ResolvedId};
use kiln_error::BuildDiagnostic;
use kiln_plugin::OnResolveArgs;
use kiln_resolver::{is_node_builtin, ResolveError};

use crate::module_loader::task_context::TaskContext;

#[inline]
fn is_http_url(s: &str) -> bool {
  s.starts_with("http://") || s.starts_with("https://") || s.starts_with("//")
}

#[inline]
fn is_data_url(s: &str) -> bool {
  s.trim_start().starts_with("data:")
}

/// The module an import is written in.
#[derive(Debug)]
pub struct Importer<'a> {
  pub id: &'a str,
  pub namespace: &'a str,
  /// Pretty id for diagnostics.
  pub stable_id: &'a str,
  /// A path inside the directory relative imports start from. `None` resolves against `cwd`.
  pub resolve_from: Option<&'a Path>,
}

fn matches_external(pattern: &str, request: &str) -> bool {
  if pattern == request {
    return true;
  }
  // `react` also covers `react/jsx-runtime`.
  if request.strip_prefix(pattern).is_some_and(|rest| rest.starts_with('/')) {
    return true;
  }
  pattern.contains('*') && fast_glob::glob_match(pattern, request)
}

fn external_pattern_for(ctx: &TaskContext, request: &str) -> Option<String> {
  ctx.options.external.iter().find(|pattern| matches_external(pattern, request)).cloned()
}

/// Resolution order: plugins, `external`, node builtins, urls, then the file system.
pub fn resolve_id(
  ctx: &TaskContext,
  request: &str,
  importer: Option<&Importer>,
  kind: ImportKind,
  is_user_defined_entry: bool,
) -> Result<ResolvedId, BuildDiagnostic> {
  if !ctx.plugin_driver.is_empty() {
    let args = OnResolveArgs {
      path: request,
      importer: importer.map(|importer| importer.id),
      namespace: importer.map_or("file", |importer| importer.namespace),
      kind,
    };
    if let Some(resolved) = ctx.plugin_driver.resolve(&args)? {
      let namespace = resolved.namespace.map_or(arcstr::literal!("file"), ArcStr::from);
      let id: ArcStr = if namespace == "file" && !resolved.external {
        let path = PathBuf::from(&resolved.path);
        if path.is_absolute() {
          resolved.path.into()
        } else {
          ctx.options.cwd.join(path).to_string_lossy().into()
        }
      } else {
        resolved.path.into()
      };
      return Ok(ResolvedId {
        namespace,
        is_external: resolved.external,
        side_effects: resolved.side_effects,
        ..ResolvedId::new_file(id)
      });
    }
  }

  if let Some(pattern) = external_pattern_for(ctx, request) {
    ctx.used_externals.insert(pattern);
    return Ok(ResolvedId::new_external(request.into()));
  }

  if ctx.options.platform == Platform::Node && is_node_builtin(request) {
    return Ok(ResolvedId::new_external(request.into()));
  }

  // Auto external http url or data url
  if is_http_url(request) || is_data_url(request) {
    return Ok(ResolvedId::new_external(request.into()));
  }

  let resolve_from = importer.and_then(|importer| importer.resolve_from);
  match ctx.resolver.resolve(resolve_from, request, is_user_defined_entry) {
    Ok(resolved) => Ok(ResolvedId {
      package_json: resolved.package_json,
      ..ResolvedId::new_file(resolved.path)
    }),
    Err(ResolveError::InvalidPackageJson { path, reason }) => Err(BuildDiagnostic::Load {
      id: path.to_string_lossy().into(),
      reason: format!("invalid package.json: {reason}"),
    }),
    Err(ResolveError::Other(reason)) => {
      Err(BuildDiagnostic::Load { id: request.into(), reason })
    }
    Err(err) => Err(BuildDiagnostic::NotFound {
      specifier: request.to_string(),
      importer: importer.map_or(arcstr::literal!("<entry>"), |importer| importer.stable_id.into()),
      candidates: err.candidates().to_vec(),
    }),
  }
}

#[cfg(test)]
mod tests {
  use super::matches_external;

  #[test]
  fn external_patterns() {
    assert!(matches_external("react", "react"));
    assert!(matches_external("react", "react/jsx-runtime"));
    assert!(!matches_external("react", "react-dom"));
    assert!(matches_external("@scope/*", "@scope/pkg"));
    assert!(!matches_external("@scope/*", "@other/pkg"));
  }
}
