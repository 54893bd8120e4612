mod common;

use std::{path::Path, sync::Arc};

use common::{bundler, code, memory_fs, options};
use kiln::{BuildContext, BuildDiagnostic};

fn project() -> Arc<kiln::MemoryFileSystem> {
  memory_fs(&[
    ("src/main.js", "import { greet } from './greet.js';\nconsole.log(greet('kiln'));\n"),
    ("src/greet.js", "export function greet(name) { return 'hello ' + name; }\n"),
  ])
}

#[tokio::test]
async fn rebuilds_are_idempotent() {
  let fs = project();
  let ctx = BuildContext::new(bundler(&fs, options(&["./src/main.js"])));

  let first = ctx.rebuild().await.unwrap();
  assert_eq!(format!("{ctx:?}"), "BuildContext { cached_modules: 2, invalidated: 0, disposed: false, .. }");
  let second = ctx.rebuild().await.unwrap();
  assert_eq!(code(&first, "main.js"), code(&second, "main.js"));
  assert_eq!(first.metafile.to_json_string().unwrap(), second.metafile.to_json_string().unwrap());
}

#[tokio::test]
async fn invalidated_modules_are_reloaded() {
  let fs = project();
  let ctx = BuildContext::new(bundler(&fs, options(&["./src/main.js"])));
  let first = ctx.rebuild().await.unwrap();
  assert!(code(&first, "main.js").contains("'hello '"));

  fs.add_file(
    Path::new("/project/src/greet.js"),
    "export function greet(name) { return 'welcome ' + name; }\n",
  );
  ctx.invalidate("/project/src/greet.js");
  ctx.invalidate("/project/src/greet.js");
  assert!(format!("{ctx:?}").contains("invalidated: 1"));

  let second = ctx.rebuild().await.unwrap();
  let code = code(&second, "main.js");
  assert!(code.contains("'welcome '"), "{code}");
  assert!(!code.contains("'hello '"), "{code}");
  assert!(format!("{ctx:?}").contains("invalidated: 0"));
}

#[tokio::test]
async fn concurrent_rebuilds_run_one_at_a_time() {
  let fs = project();
  let ctx = Arc::new(BuildContext::new(bundler(&fs, options(&["./src/main.js"]))));
  let (a, b) = tokio::join!(ctx.rebuild(), ctx.rebuild());
  assert_eq!(code(&a.unwrap(), "main.js"), code(&b.unwrap(), "main.js"));
}

#[tokio::test]
async fn disposed_contexts_refuse_to_rebuild() {
  let fs = project();
  let ctx = BuildContext::new(bundler(&fs, options(&["./src/main.js"])));
  ctx.rebuild().await.unwrap();
  assert!(!ctx.is_disposed());

  ctx.dispose();
  ctx.dispose();
  assert!(ctx.is_disposed());
  let errors = ctx.rebuild().await.unwrap_err();
  assert!(matches!(errors[0], BuildDiagnostic::ContextDisposed), "{errors}");
  assert!(ctx.rebuild_and_write().await.is_err());
  assert!(fs.paths().iter().all(|path| !path.starts_with("/project/dist")));
}

#[tokio::test]
async fn failed_rebuilds_recover_once_fixed() {
  let fs = project();
  let ctx = BuildContext::new(bundler(&fs, options(&["./src/main.js"])));

  fs.add_file(Path::new("/project/src/greet.js"), "export function greet(name) {\n");
  ctx.invalidate("/project/src/greet.js");
  let errors = ctx.rebuild().await.unwrap_err();
  assert!(errors.iter().any(|error| matches!(error, BuildDiagnostic::Syntax { .. })), "{errors}");

  fs.add_file(Path::new("/project/src/greet.js"), "export function greet(name) { return name; }\n");
  ctx.invalidate("/project/src/greet.js");
  let output = ctx.rebuild().await.unwrap();
  assert!(code(&output, "main.js").contains("return name;"));
}
