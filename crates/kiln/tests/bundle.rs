mod common;

use kiln::{BuildDiagnostic, BundlerOptions, JsxOptions, JsxRuntime, ModuleType, OutputFormat};

use common::{build, code, filenames, memory_fs, options, position_of};

fn diamond() -> Vec<(&'static str, &'static str)> {
  vec![
    ("src/main.js", "import './a.js';\nimport './b.js';\nconsole.log(\"main\");\n"),
    ("src/a.js", "import './shared.js';\nconsole.log(\"a\");\n"),
    ("src/b.js", "import './shared.js';\nconsole.log(\"b\");\n"),
    ("src/shared.js", "console.log(\"shared\");\n"),
  ]
}

#[tokio::test]
async fn shared_dependency_is_emitted_once_before_its_importers() {
  let fs = memory_fs(&diamond());
  let output = build(&fs, options(&["./src/main.js"])).await.unwrap();

  assert_eq!(filenames(&output), vec!["main.js"]);
  let code = code(&output, "main.js");
  let shared = position_of(code, "console.log(\"shared\")");
  let a = position_of(code, "console.log(\"a\")");
  let b = position_of(code, "console.log(\"b\")");
  let main = position_of(code, "console.log(\"main\")");
  assert!(shared < a && a < b && b < main, "unexpected order:\n{code}");
}

#[tokio::test]
async fn splitting_moves_shared_modules_into_a_common_chunk() {
  let fs = memory_fs(&diamond());
  let output = build(
    &fs,
    BundlerOptions { splitting: Some(true), ..options(&["./src/a.js", "./src/b.js"]) },
  )
  .await
  .unwrap();

  let names = filenames(&output);
  assert_eq!(names.len(), 3, "{names:?}");
  assert_eq!(&names[..2], ["a.js", "b.js"]);
  let shared_chunk = names[2];
  assert!(shared_chunk.starts_with("shared-") && shared_chunk.ends_with(".js"), "{shared_chunk}");

  position_of(code(&output, shared_chunk), "console.log(\"shared\")");
  for entry in ["a.js", "b.js"] {
    let code = code(&output, entry);
    assert!(!code.contains("console.log(\"shared\")"), "{code}");
    assert!(code.contains(&format!("import \"./{shared_chunk}\";")), "{code}");
  }
}

#[tokio::test]
async fn unused_code_is_tree_shaken() {
  let fs = memory_fs(&[
    ("src/main.js", "import { used } from './lib.js';\nconsole.log(used());\n"),
    (
      "src/lib.js",
      "export function used() { return 'used'; }\nexport function unused() { return 'unused'; }\n",
    ),
  ]);
  let output = build(&fs, options(&["./src/main.js"])).await.unwrap();
  let code = code(&output, "main.js");
  assert!(code.contains("function used()"), "{code}");
  assert!(!code.contains("function unused()"), "{code}");
}

#[tokio::test]
async fn colliding_top_level_names_get_numeric_suffixes() {
  let fs = memory_fs(&[
    (
      "src/main.js",
      "import { readLib } from './lib.js';\nconst value = 'main';\nconsole.log(readLib(), value);\n",
    ),
    ("src/lib.js", "const value = 'lib';\nexport function readLib() { return value; }\n"),
  ]);
  let output = build(&fs, options(&["./src/main.js"])).await.unwrap();
  let code = code(&output, "main.js");
  // The entry keeps its names.
  assert!(code.contains("const value = 'main';"), "{code}");
  assert!(code.contains("const value$1 = 'lib';"), "{code}");
  assert!(code.contains("return value$1;"), "{code}");
}

#[tokio::test]
async fn builds_are_byte_identical() {
  let files = [
    ("src/main.js", "import { a } from './a.js';\nimport { b } from './b.js';\nconst x = 1;\nconsole.log(a, b, x);\n"),
    ("src/a.js", "const x = 'a';\nexport const a = x;\nexport const b0 = import('./lazy.js');\n"),
    ("src/b.js", "const x = 'b';\nexport const b = x;\n"),
    ("src/lazy.js", "export default 'lazy';\n"),
  ];
  let run = || async {
    let fs = memory_fs(&files);
    build(&fs, BundlerOptions { splitting: Some(true), ..options(&["./src/main.js"]) })
      .await
      .unwrap()
  };
  let first = run().await;
  let second = run().await;

  assert_eq!(filenames(&first), filenames(&second));
  for (left, right) in first.assets.iter().zip(&second.assets) {
    assert_eq!(left.content_as_bytes(), right.content_as_bytes(), "{}", left.filename());
  }
  assert!(code(&first, "main.js").contains("x$1"));
}

#[tokio::test]
async fn circular_imports_build_with_a_warning() {
  let fs = memory_fs(&[
    ("src/a.js", "import { b } from './b.js';\nexport const a = 'a';\nconsole.log(b);\n"),
    ("src/b.js", "import './a.js';\nexport const b = 'b';\n"),
  ]);
  let output = build(&fs, options(&["./src/a.js"])).await.unwrap();

  let cycle = output
    .warnings
    .iter()
    .find_map(|warning| match warning {
      BuildDiagnostic::CircularDependency { paths } => Some(paths.clone()),
      _ => None,
    })
    .expect("a circular dependency warning");
  assert_eq!(cycle, vec!["src/a.js", "src/b.js", "src/a.js"]);

  // a was found first, so it runs first.
  let code = code(&output, "a.js");
  assert!(position_of(code, "console.log(b)") < position_of(code, "const b = 'b'"), "{code}");
}

#[tokio::test]
async fn cycle_members_run_in_discovery_order() {
  let fs = memory_fs(&[
    ("src/main.js", "import './a.js';\nconsole.log('main');\n"),
    ("src/a.js", "import './b.js';\nconsole.log('a');\n"),
    ("src/b.js", "import './a.js';\nconsole.log('b');\n"),
  ]);
  let output = build(&fs, options(&["./src/main.js"])).await.unwrap();

  let code = code(&output, "main.js");
  let a = position_of(code, "console.log('a')");
  let b = position_of(code, "console.log('b')");
  let main = position_of(code, "console.log('main')");
  assert!(a < b && b < main, "unexpected order:\n{code}");
  assert!(output.warnings.iter().any(|warning| matches!(
    warning,
    BuildDiagnostic::CircularDependency { paths } if paths == &["src/a.js", "src/b.js", "src/a.js"]
  )));
}

#[tokio::test]
async fn required_modules_are_bundled() {
  let fs = memory_fs(&[
    (
      "src/main.js",
      "const lib = require('./lib.js');\nlet opt;\ntry { opt = require('./optional.js'); } catch {}\nconsole.log(lib.value, opt);\n",
    ),
    ("src/lib.js", "module.exports = { value: 'lib' };\n"),
  ]);
  let output = build(&fs, options(&["./src/main.js"])).await.unwrap();

  let code = code(&output, "main.js");
  let wrapper = position_of(code, "var require_lib = __commonJS({ \"src/lib.js\"(exports, module) {");
  assert!(wrapper < position_of(code, "const lib = require_lib();"), "{code}");
  position_of(code, "module.exports = { value: 'lib' };");
  position_of(code, "var __commonJS = ");
  assert!(!code.contains("'./lib.js'"), "{code}");
  // Not installed, so it is left to the runtime.
  assert!(code.contains("opt = require('./optional.js');"), "{code}");
  assert!(output.warnings.iter().any(|warning| matches!(
    warning,
    BuildDiagnostic::NotFound { specifier, .. } if specifier == "./optional.js"
  )));
  assert_eq!(output.metafile.inputs["src/lib.js"].format, Some("cjs"));
}

#[tokio::test]
async fn module_packages_are_never_wrapped() {
  let fs = memory_fs(&[
    ("package.json", r#"{ "type": "module" }"#),
    ("src/main.js", "const plain = require('./plain.js');\nconsole.log(plain);\n"),
    ("src/plain.js", "console.log('plain');\n"),
  ]);
  let output = build(&fs, options(&["./src/main.js"])).await.unwrap();

  let code = code(&output, "main.js");
  assert!(!code.contains("__commonJS"), "{code}");
  assert!(!code.contains("require("), "{code}");
  assert!(position_of(code, "console.log('plain')") < position_of(code, "console.log(plain)"));
  assert_eq!(output.metafile.inputs["src/plain.js"].format, Some("esm"));
}

#[tokio::test]
async fn importing_commonjs_goes_through_to_esm() {
  let fs = memory_fs(&[
    ("src/main.js", "import greet from './cjs.js';\nconsole.log(greet());\n"),
    ("src/cjs.js", "module.exports = function () { return 'cjs'; };\n"),
  ]);
  let output = build(&fs, options(&["./src/main.js"])).await.unwrap();

  let code = code(&output, "main.js");
  position_of(code, "var __toESM = ");
  let call = position_of(code, "var import_cjs = __toESM(require_cjs());");
  assert!(call < position_of(code, "console.log(import_cjs.default());"), "{code}");
}

#[tokio::test]
async fn dynamic_entries_follow_discovery_order() {
  let fs = memory_fs(&[
    ("src/main.js", "import './x.js';\nimport('./b.js');\n"),
    ("src/x.js", "import('./a.js');\n"),
    ("src/a.js", "export default 'a';\n"),
    ("src/b.js", "export default 'b';\n"),
  ]);
  let output = build(&fs, BundlerOptions { splitting: Some(true), ..options(&["./src/main.js"]) })
    .await
    .unwrap();
  assert_eq!(filenames(&output), vec!["main.js", "a.js", "b.js"]);
}

#[tokio::test]
async fn typescript_generic_defaults_and_non_null_casts_are_stripped() {
  let fs = memory_fs(&[(
    "src/main.ts",
    "function id<T = {}>(a: T): T { return a; }\nclass Box<T = {}> { x: number = 1; }\nconst obj: any = { a: 1 };\nconst v = obj!.a! as number;\nconsole.log(id(v), new Box().x);\n",
  )]);
  let output = build(&fs, options(&["./src/main.ts"])).await.unwrap();

  let code = code(&output, "main.js");
  assert!(code.contains("function id(a)"), "{code}");
  assert!(code.contains("class Box {"), "{code}");
  assert!(code.contains("obj.a"), "{code}");
  assert!(!code.contains("<T"), "{code}");
  assert!(!code.contains(" as number"), "{code}");
  assert!(!code.contains('!'), "{code}");
}

#[tokio::test]
async fn automatic_jsx_runtime_imports_jsx() {
  let fs = memory_fs(&[("src/app.jsx", "export const App = () => <div>hi</div>;\n")]);
  let output = build(
    &fs,
    BundlerOptions {
      jsx: Some(JsxOptions { runtime: JsxRuntime::Automatic, ..JsxOptions::default() }),
      external: Some(vec!["react/jsx-runtime".to_string()]),
      ..options(&["./src/app.jsx"])
    },
  )
  .await
  .unwrap();

  let code = code(&output, "app.js");
  assert!(code.contains("from \"react/jsx-runtime\";"), "{code}");
  assert!(code.contains("(\"div\""), "{code}");
  assert!(!code.contains("React.createElement"), "{code}");
}

#[tokio::test]
async fn keep_names_restores_renamed_functions() {
  let fs = memory_fs(&[
    (
      "src/main.js",
      "import { helper as libHelper } from './lib.js';\nfunction helper() { return 'main'; }\nconsole.log(helper(), libHelper());\n",
    ),
    ("src/lib.js", "export function helper() { return 'lib'; }\n"),
  ]);
  let output = build(&fs, BundlerOptions { keep_names: Some(true), ..options(&["./src/main.js"]) })
    .await
    .unwrap();

  let code = code(&output, "main.js");
  position_of(code, "var __name = ");
  assert!(code.contains("function helper$1() { return 'lib'; } __name(helper$1, \"helper\");"), "{code}");
  // Names the entry keeps need no fix.
  assert!(!code.contains("__name(helper,"), "{code}");
}

#[tokio::test]
async fn externals_stay_runtime_imports() {
  let fs = memory_fs(&[
    ("src/main.js", "import { useState } from 'react';\nconsole.log(useState(0));\n"),
    ("node_modules/react/package.json", r#"{ "name": "react", "main": "index.js" }"#),
    ("node_modules/react/index.js", "export function useState() { return 'bundled react'; }\n"),
  ]);
  let output = build(
    &fs,
    BundlerOptions { external: Some(vec!["react".to_string()]), ..options(&["./src/main.js"]) },
  )
  .await
  .unwrap();

  let code = code(&output, "main.js");
  assert!(code.contains("import { useState } from \"react\";"), "{code}");
  assert!(!code.contains("bundled react"), "{code}");
  assert!(!output.warnings.iter().any(|w| matches!(w, BuildDiagnostic::UnusedExternal { .. })));
  assert!(output.metafile.inputs.keys().all(|input| !input.contains("node_modules")));
}

#[tokio::test]
async fn externals_in_cjs_are_required() {
  let fs = memory_fs(&[("src/main.js", "import { useState } from 'react';\nconsole.log(useState);\n")]);
  let output = build(
    &fs,
    BundlerOptions {
      external: Some(vec!["react".to_string()]),
      format: Some(OutputFormat::Cjs),
      ..options(&["./src/main.js"])
    },
  )
  .await
  .unwrap();

  let code = code(&output, "main.js");
  assert!(code.starts_with("\"use strict\";"), "{code}");
  assert!(code.contains("__toESM(require(\"react\"))"), "{code}");
  assert!(code.contains(".useState)"), "{code}");
}

#[tokio::test]
async fn unused_externals_are_reported() {
  let fs = memory_fs(&[("src/main.js", "import 'react';\n")]);
  let output = build(
    &fs,
    BundlerOptions {
      external: Some(vec!["react".to_string(), "lodash".to_string()]),
      ..options(&["./src/main.js"])
    },
  )
  .await
  .unwrap();

  let unused = output
    .warnings
    .iter()
    .filter_map(|warning| match warning {
      BuildDiagnostic::UnusedExternal { pattern } => Some(pattern.as_str()),
      _ => None,
    })
    .collect::<Vec<_>>();
  assert_eq!(unused, vec!["lodash"]);
  assert!(code(&output, "main.js").contains("import \"react\";"));
}

#[tokio::test]
async fn missing_modules_fail_the_build_with_candidates() {
  let fs = memory_fs(&[("src/main.js", "import x from './missing.js';\nconsole.log(x);\n")]);
  let errors = build(&fs, options(&["./src/main.js"])).await.unwrap_err();

  let (specifier, candidates) = errors
    .iter()
    .find_map(|error| match error {
      BuildDiagnostic::NotFound { specifier, candidates, .. } => Some((specifier, candidates)),
      _ => None,
    })
    .expect("a not found error");
  assert_eq!(specifier, "./missing.js");
  assert!(candidates.len() > 1, "{candidates:?}");
  assert!(candidates.iter().any(|candidate| candidate.ends_with("src/missing.js")), "{candidates:?}");
  assert!(candidates.iter().any(|candidate| candidate.ends_with("src/missing.ts")), "{candidates:?}");

  let mut bundler = common::bundler(&fs, options(&["./src/main.js"]));
  assert!(bundler.write().await.is_err());
  assert!(fs.paths().iter().all(|path| !path.starts_with("/project/dist")));
}

#[tokio::test]
async fn esm_output_round_trips_through_the_bundler() {
  let fs = memory_fs(&[(
    "src/lib.js",
    "const answer = 42;\nexport function ask() { return answer; }\nexport { answer as default, answer };\n",
  )]);
  let output = build(&fs, options(&["./src/lib.js"])).await.unwrap();
  let lib = code(&output, "lib.js").to_string();
  assert!(lib.contains("export {"), "{lib}");

  let fs = memory_fs(&[
    ("dist/lib.js", lib.as_str()),
    (
      "src/main.js",
      "import answerDefault, { answer, ask } from '../dist/lib.js';\nconsole.log(answerDefault, answer, ask());\n",
    ),
  ]);
  let output = build(&fs, BundlerOptions { dir: Some("out".to_string()), ..options(&["./src/main.js"]) })
    .await
    .unwrap();
  let code = code(&output, "main.js");
  assert!(code.contains("const answer = 42;"), "{code}");
  assert!(code.contains("console.log(answer, answer, ask());"), "{code}");
  assert!(!code.contains("export"), "{code}");
}

#[tokio::test]
async fn iife_exposes_exports_on_a_named_global() {
  let fs = memory_fs(&[("src/main.js", "export const version = '1.0.0';\n")]);
  let output = build(
    &fs,
    BundlerOptions {
      format: Some(OutputFormat::Iife),
      name: Some("MyLib".to_string()),
      ..options(&["./src/main.js"])
    },
  )
  .await
  .unwrap();

  let code = code(&output, "main.js");
  assert!(code.starts_with("var MyLib = (function() {"), "{code}");
  assert!(code.contains("get version() { return version; }"), "{code}");
  assert!(code.trim_end().ends_with("})();"), "{code}");
}

#[tokio::test]
async fn invalid_options_are_reported() {
  let fs = memory_fs(&[("src/main.js", "console.log(1);\n")]);
  let errors = build(
    &fs,
    BundlerOptions {
      format: Some(OutputFormat::Iife),
      splitting: Some(true),
      ..options(&["./src/main.js"])
    },
  )
  .await
  .unwrap_err();
  assert!(matches!(errors[0], BuildDiagnostic::InvalidOption(_)), "{errors}");
}

#[tokio::test]
async fn banner_footer_and_minify() {
  let fs = memory_fs(&[(
    "src/main.js",
    "// greeting\nconst greeting = 'hi';\n\nconsole.log( greeting );\n",
  )]);
  let output = build(
    &fs,
    BundlerOptions {
      banner: Some("/* banner */".to_string()),
      footer: Some("/* footer */".to_string()),
      minify: Some(true),
      ..options(&["./src/main.js"])
    },
  )
  .await
  .unwrap();

  let code = code(&output, "main.js");
  assert!(code.starts_with("/* banner */\n"), "{code}");
  assert!(code.trim_end().ends_with("/* footer */"), "{code}");
  assert!(!code.contains("// greeting"), "{code}");
  assert!(!code.contains("//#region"), "{code}");
  assert!(!code.contains("console.log( greeting )"), "{code}");
}

#[tokio::test]
async fn minified_chunks_keep_source_maps() {
  let fs = memory_fs(&[
    ("src/main.js", "import { greet } from './greet.js';\nconsole.log(greet('kiln'));\n"),
    ("src/greet.js", "export function greet(name) {\n  return 'hello ' + name;\n}\n"),
  ]);
  let output = build(
    &fs,
    BundlerOptions { sourcemap: Some(true), minify: Some(true), ..options(&["./src/main.js"]) },
  )
  .await
  .unwrap();

  let code = code(&output, "main.js");
  assert!(!code.contains("\n  return"), "{code}");
  assert!(code.contains("hello "), "{code}");
  let map = output.get("main.js.map").unwrap().content_as_bytes();
  let map: serde_json::Value = serde_json::from_slice(map).unwrap();
  let sources = map["sources"].as_array().unwrap();
  assert!(sources.contains(&serde_json::json!("src/greet.js")), "{sources:?}");
  assert!(!map["mappings"].as_str().unwrap().is_empty());
}

#[tokio::test]
async fn large_chunks_are_reported() {
  let fs = memory_fs(&[("src/main.js", "console.log('a fairly long line of output');\n")]);
  let output = build(
    &fs,
    BundlerOptions { chunk_size_warning_limit: Some(8), ..options(&["./src/main.js"]) },
  )
  .await
  .unwrap();
  assert!(output.warnings.iter().any(|warning| matches!(
    warning,
    BuildDiagnostic::LargeChunk { filename, limit: 8, .. } if filename == "main.js"
  )));
}

#[tokio::test]
async fn source_maps_and_metafile() {
  let fs = memory_fs(&[
    ("src/main.js", "import { greet } from './greet.js';\nconsole.log(greet('kiln'));\n"),
    ("src/greet.js", "export function greet(name) {\n  return 'hello ' + name;\n}\n"),
  ]);
  let output = build(
    &fs,
    BundlerOptions { sourcemap: Some(true), ..options(&["./src/main.js"]) },
  )
  .await
  .unwrap();

  assert_eq!(filenames(&output), vec!["main.js", "main.js.map"]);
  let code = code(&output, "main.js");
  assert!(code.ends_with("//# sourceMappingURL=main.js.map\n"), "{code}");

  let map = output.get("main.js.map").unwrap().content_as_bytes();
  let map: serde_json::Value = serde_json::from_slice(map).unwrap();
  assert_eq!(map["version"], 3);
  assert_eq!(map["sources"], serde_json::json!(["src/greet.js", "src/main.js"]));

  let metafile = &output.metafile;
  assert_eq!(metafile.inputs.keys().collect::<Vec<_>>(), vec!["src/greet.js", "src/main.js"]);
  assert_eq!(metafile.inputs["src/main.js"].imports[0].path, "src/greet.js");
  assert_eq!(metafile.inputs["src/main.js"].format, Some("esm"));
  let main = &metafile.outputs["dist/main.js"];
  assert_eq!(main.entry_point.as_deref(), Some("src/main.js"));
  assert_eq!(main.bytes, code.len());
  assert!(main.inputs["src/greet.js"].bytes_in_output > 0);
  assert!(metafile.outputs.contains_key("dist/main.js.map"));
}

#[tokio::test]
async fn json_text_and_css_loaders() {
  let fs = memory_fs(&[
    (
      "src/main.js",
      "import pkg from './data.json';\nimport notes from './notes.txt';\nimport './style.css';\nconsole.log(pkg.name, notes);\n",
    ),
    ("src/data.json", r#"{ "name": "kiln" }"#),
    ("src/notes.txt", "plain text"),
    ("src/style.css", "body { color: red; }\n"),
  ]);
  let output = build(&fs, options(&["./src/main.js"])).await.unwrap();

  assert_eq!(filenames(&output), vec!["main.js", "main.css"]);
  let code = code(&output, "main.js");
  assert!(code.contains("\"kiln\""), "{code}");
  assert!(code.contains("\"plain text\""), "{code}");
  let css = std::str::from_utf8(output.get("main.css").unwrap().content_as_bytes()).unwrap();
  assert!(css.contains("body { color: red; }"), "{css}");
  assert_eq!(output.metafile.outputs["dist/main.js"].css_bundle.as_deref(), Some("dist/main.css"));
}

#[tokio::test]
async fn file_loader_copies_the_asset() {
  let fs = memory_fs(&[
    ("src/main.js", "import logo from './logo.png';\nconsole.log(logo);\n"),
    ("src/logo.png", "not really a png"),
  ]);
  let output = build(
    &fs,
    BundlerOptions {
      loader: Some([(".png".to_string(), ModuleType::File)].into_iter().collect()),
      ..options(&["./src/main.js"])
    },
  )
  .await
  .unwrap();

  let names = filenames(&output);
  assert_eq!(names.len(), 2, "{names:?}");
  let asset = names[1];
  assert!(asset.starts_with("assets/logo-") && asset.ends_with(".png"), "{asset}");
  assert_eq!(output.get(asset).unwrap().content_as_bytes(), b"not really a png");
  assert!(code(&output, "main.js").contains(asset), "{}", code(&output, "main.js"));
}

#[tokio::test]
async fn optional_dynamic_imports_only_warn() {
  let fs = memory_fs(&[(
    "src/main.js",
    "async function load() {\n  try {\n    return await import('./optional.js');\n  } catch {\n    return null;\n  }\n}\nload();\n",
  )]);
  let output = build(&fs, options(&["./src/main.js"])).await.unwrap();

  assert!(output.warnings.iter().any(|warning| matches!(
    warning,
    BuildDiagnostic::NotFound { specifier, .. } if specifier == "./optional.js"
  )));
  assert!(code(&output, "main.js").contains("import('./optional.js')"));
}
