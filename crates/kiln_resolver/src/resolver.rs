use std::{
  path::{Path, PathBuf},
  sync::Arc,
};

use arcstr::ArcStr;
use dashmap::DashMap;
use itertools::Itertools;
use kiln_common::{PackageJson, Platform};
use kiln_fs::{ResolverFileSystem, SharedFileSystem};
use oxc_resolver::{
  FsCache, ResolveError as OxcResolveError, ResolveOptions as OxcResolverOptions, ResolverGeneric,
};
use sugar_path::SugarPath;

use crate::error::ResolveError;

#[derive(Debug, Clone)]
pub struct ResolveOptions {
  pub platform: Platform,
  /// Tried in order, each with the leading dot.
  pub extensions: Vec<String>,
  pub main_fields: Vec<String>,
  /// Extra `exports` conditions on top of the ones implied by the platform.
  pub conditions: Vec<String>,
}

impl Default for ResolveOptions {
  fn default() -> Self {
    Self {
      platform: Platform::Browser,
      extensions: [".tsx", ".ts", ".jsx", ".js", ".css", ".json"].map(String::from).to_vec(),
      main_fields: Platform::Browser.default_main_fields().iter().map(ToString::to_string).collect(),
      conditions: vec![],
    }
  }
}

#[derive(Debug)]
pub struct ResolveReturn {
  pub path: ArcStr,
  /// The closest `package.json` above the resolved file.
  pub package_json: Option<Arc<PackageJson>>,
}

pub struct Resolver {
  cwd: PathBuf,
  fs: SharedFileSystem,
  import_resolver: ResolverGeneric<FsCache<ResolverFileSystem>>,
  extensions: Vec<String>,
  conditions: Vec<String>,
  package_json_cache: DashMap<PathBuf, Arc<PackageJson>>,
}

impl std::fmt::Debug for Resolver {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("Resolver")
      .field("cwd", &self.cwd)
      .field("extensions", &self.extensions)
      .field("conditions", &self.conditions)
      .finish_non_exhaustive()
  }
}

impl Resolver {
  pub fn new(cwd: PathBuf, fs: SharedFileSystem, options: ResolveOptions) -> Self {
    let mut conditions = options.conditions;
    conditions.extend(options.platform.condition_name().map(String::from));
    conditions.push("import".to_string());
    conditions.push("default".to_string());
    let conditions: Vec<String> = conditions.into_iter().unique().collect();

    let alias_fields = match options.platform {
      Platform::Browser => vec![vec!["browser".to_string()]],
      Platform::Node | Platform::Neutral => vec![],
    };

    let resolve_options = OxcResolverOptions {
      main_fields: options.main_fields,
      alias_fields,
      builtin_modules: options.platform == Platform::Node,
      condition_names: conditions.clone(),
      extensions: options.extensions.clone(),
      extension_alias: TS_REWRITES
        .iter()
        .map(|(js_ext, ts_exts)| {
          let aliases = std::iter::once(*js_ext).chain(ts_exts.iter().copied());
          ((*js_ext).to_string(), aliases.map(String::from).collect())
        })
        .collect(),
      ..Default::default()
    };

    let import_resolver = ResolverGeneric::new_with_cache(
      Arc::new(FsCache::new(ResolverFileSystem::new(Arc::clone(&fs)))),
      resolve_options,
    );

    Self {
      cwd,
      fs,
      import_resolver,
      extensions: options.extensions,
      conditions,
      package_json_cache: DashMap::default(),
    }
  }

  pub fn cwd(&self) -> &PathBuf {
    &self.cwd
  }

  pub fn conditions(&self) -> &[String] {
    &self.conditions
  }

  /// Resolves `specifier` as imported from `importer`, or from `cwd` for entries.
  pub fn resolve(
    &self,
    importer: Option<&Path>,
    specifier: &str,
    is_user_defined_entry: bool,
  ) -> Result<ResolveReturn, ResolveError> {
    let dir = importer
      .and_then(Path::parent)
      .filter(|inner| inner.components().next().is_some())
      .unwrap_or(self.cwd.as_path());

    let mut resolution = self.import_resolver.resolve(dir, specifier);

    // Handle `{ input: 'main' }` -> `<CWD>/main.{js,ts}`
    if resolution.is_err() && is_user_defined_entry && !is_path_like(specifier) {
      let normalized_specifier = self.cwd.join(specifier).normalize();
      let result = self.import_resolver.resolve(dir, &normalized_specifier.to_string_lossy());
      if result.is_ok() {
        resolution = result;
      }
    }

    let info = match resolution {
      Ok(info) => info,
      Err(err) => {
        let err = self.convert_error(err, dir, specifier);
        tracing::trace!(specifier, candidates = ?err.candidates(), "unresolved");
        return Err(err);
      }
    };

    let path = info.full_path();
    tracing::trace!(specifier, resolved = %path.display(), "resolved");
    let path = self.fs.canonicalize(&path).unwrap_or(path);
    let package_json = info
      .package_json()
      .map(|package_json| self.cached_package_json(&package_json.path))
      .transpose()?;
    Ok(ResolveReturn { path: path.to_string_lossy().into(), package_json })
  }

  fn convert_error(&self, err: OxcResolveError, dir: &Path, specifier: &str) -> ResolveError {
    match err {
      OxcResolveError::NotFound(_) | OxcResolveError::ExtensionAlias(..) => {
        ResolveError::NotFound { candidates: self.candidates(dir, specifier) }
      }
      OxcResolveError::PackagePathNotExported(..) => {
        let (package, subpath) = split_package_specifier(specifier);
        ResolveError::NotExported {
          package: package.to_string(),
          subpath: if subpath.is_empty() { ".".to_string() } else { format!("./{subpath}") },
          candidates: self.candidates(dir, specifier),
        }
      }
      err => ResolveError::Other(err.to_string()),
    }
  }

  /// What a failed lookup tried: for paths, the file itself, TypeScript sources behind `.js`
  /// style specifiers, the configured extensions appended and the index files of a directory.
  /// For packages, the `node_modules` directory of every ancestor.
  fn candidates(&self, dir: &Path, specifier: &str) -> Vec<String> {
    let mut candidates = vec![];
    if !is_path_like(specifier) {
      let (package_name, _) = split_package_specifier(specifier);
      for ancestor in dir.ancestors() {
        if ancestor.file_name().is_some_and(|name| name == "node_modules") {
          continue;
        }
        candidates.push(ancestor.join("node_modules").join(package_name).to_string_lossy().into_owned());
      }
      return candidates;
    }

    let path = dir.join(specifier).normalize();
    let path_str = path.to_string_lossy();
    candidates.push(path_str.to_string());
    for (js_ext, ts_exts) in TS_REWRITES {
      if let Some(stem) = path_str.strip_suffix(js_ext) {
        candidates.extend(ts_exts.iter().map(|ts_ext| format!("{stem}{ts_ext}")));
      }
    }
    candidates.extend(self.extensions.iter().map(|ext| format!("{path_str}{ext}")));
    if self.fs.is_dir(&path) {
      let index = path.join("index");
      let index = index.to_string_lossy();
      candidates.extend(self.extensions.iter().map(|ext| format!("{index}{ext}")));
    }
    candidates
  }

  fn cached_package_json(&self, path: &Path) -> Result<Arc<PackageJson>, ResolveError> {
    if let Some(cached) = self.package_json_cache.get(path) {
      return Ok(Arc::clone(cached.value()));
    }
    let invalid = |reason: String| ResolveError::InvalidPackageJson { path: path.to_path_buf(), reason };
    let json = self.fs.read_to_string(path).map_err(|err| invalid(err.to_string()))?;
    let parsed = PackageJson::parse(path.to_path_buf(), &json).map_err(|err| invalid(err.to_string()))?;
    let parsed = Arc::new(parsed);
    self.package_json_cache.insert(path.to_path_buf(), Arc::clone(&parsed));
    Ok(parsed)
  }
}

const TS_REWRITES: &[(&str, &[&str])] = &[
  (".js", &[".ts", ".tsx"]),
  (".jsx", &[".tsx"]),
  (".mjs", &[".mts"]),
  (".cjs", &[".cts"]),
];

fn is_path_like(specifier: &str) -> bool {
  specifier.starts_with("./")
    || specifier.starts_with("../")
    || specifier == "."
    || specifier == ".."
    || Path::new(specifier).is_absolute()
}

/// `@scope/pkg/sub/path` -> (`@scope/pkg`, `sub/path`)
fn split_package_specifier(specifier: &str) -> (&str, &str) {
  let name_segments = if specifier.starts_with('@') { 2 } else { 1 };
  match specifier.match_indices('/').nth(name_segments - 1) {
    Some((idx, _)) => (&specifier[..idx], &specifier[idx + 1..]),
    None => (specifier, ""),
  }
}

#[cfg(test)]
mod tests {
  use kiln_fs::MemoryFileSystem;

  use super::*;

  fn resolver(files: &[(&str, &str)]) -> Resolver {
    Resolver::new(
      PathBuf::from("/app"),
      Arc::new(MemoryFileSystem::new(files.iter().copied())),
      ResolveOptions::default(),
    )
  }

  fn resolve(resolver: &Resolver, specifier: &str) -> Result<String, ResolveError> {
    resolver.resolve(Some(Path::new("/app/src/main.js")), specifier, false).map(|r| r.path.to_string())
  }

  #[test]
  fn split_scoped_packages() {
    assert_eq!(split_package_specifier("react"), ("react", ""));
    assert_eq!(split_package_specifier("react/jsx-runtime"), ("react", "jsx-runtime"));
    assert_eq!(split_package_specifier("@scope/pkg"), ("@scope/pkg", ""));
    assert_eq!(split_package_specifier("@scope/pkg/a/b"), ("@scope/pkg", "a/b"));
  }

  #[test]
  fn relative_files_and_extensions() {
    let r = resolver(&[
      ("/app/src/a.ts", ""),
      ("/app/src/b.js", ""),
      ("/app/src/c.tsx", ""),
      ("/app/src/dir/index.ts", ""),
    ]);
    assert_eq!(resolve(&r, "./a.js").unwrap(), "/app/src/a.ts");
    assert_eq!(resolve(&r, "./b").unwrap(), "/app/src/b.js");
    assert_eq!(resolve(&r, "./c").unwrap(), "/app/src/c.tsx");
    assert_eq!(resolve(&r, "./dir").unwrap(), "/app/src/dir/index.ts");
    assert_eq!(resolve(&r, "../src/b.js").unwrap(), "/app/src/b.js");
  }

  #[test]
  fn not_found_lists_candidates_in_lookup_order() {
    let r = resolver(&[("/app/src/main.js", "")]);
    let err = resolve(&r, "./missing.js").unwrap_err();
    let candidates = err.candidates();
    assert_eq!(candidates[0], "/app/src/missing.js");
    assert_eq!(candidates[1], "/app/src/missing.ts");
    assert_eq!(candidates[2], "/app/src/missing.tsx");
    assert!(candidates.contains(&"/app/src/missing.js.json".to_string()));
  }

  #[test]
  fn packages_with_main_fields_and_exports() {
    let r = resolver(&[
      ("/app/node_modules/legacy/package.json", r#"{ "main": "./lib/index.js", "module": "./es/index.js" }"#),
      ("/app/node_modules/legacy/es/index.js", ""),
      ("/app/node_modules/legacy/lib/index.js", ""),
      ("/app/node_modules/legacy/lib/extra.js", ""),
      (
        "/app/node_modules/modern/package.json",
        r#"{ "exports": { ".": { "import": "./index.mjs", "require": "./index.cjs" }, "./sub": "./sub.js" } }"#,
      ),
      ("/app/node_modules/modern/index.mjs", ""),
      ("/app/node_modules/modern/sub.js", ""),
      ("/app/node_modules/@scope/pkg/index.js", ""),
    ]);
    assert_eq!(resolve(&r, "legacy").unwrap(), "/app/node_modules/legacy/es/index.js");
    assert_eq!(resolve(&r, "legacy/lib/extra").unwrap(), "/app/node_modules/legacy/lib/extra.js");
    assert_eq!(resolve(&r, "modern").unwrap(), "/app/node_modules/modern/index.mjs");
    assert_eq!(resolve(&r, "modern/sub").unwrap(), "/app/node_modules/modern/sub.js");
    assert!(matches!(resolve(&r, "modern/internal"), Err(ResolveError::NotExported { .. })));
    assert_eq!(resolve(&r, "@scope/pkg").unwrap(), "/app/node_modules/@scope/pkg/index.js");
    assert!(matches!(resolve(&r, "nope"), Err(ResolveError::NotFound { .. })));
  }

  #[test]
  fn entries_fall_back_to_cwd() {
    let r = resolver(&[("/app/main.ts", "")]);
    let resolved = r.resolve(None, "main", true).unwrap();
    assert_eq!(resolved.path, "/app/main.ts");
  }

  #[test]
  fn closest_package_json_is_attached() {
    let r = resolver(&[
      ("/app/node_modules/lib/package.json", r#"{ "name": "lib", "sideEffects": false }"#),
      ("/app/node_modules/lib/index.js", ""),
    ]);
    let resolved = r.resolve(Some(Path::new("/app/main.js")), "lib", false).unwrap();
    assert_eq!(resolved.package_json.unwrap().name.as_deref(), Some("lib"));
  }
}
