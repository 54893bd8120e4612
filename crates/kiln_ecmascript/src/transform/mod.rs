mod define;
mod unsupported;

use std::path::{Path, PathBuf};

use kiln_utils::line_index::lines_count;
use oxc::{
  allocator::Allocator,
  codegen::{Codegen, CodegenOptions},
  transformer::{
    ESTarget as OxcESTarget, JsxOptions as OxcJsxOptions, JsxRuntime as OxcJsxRuntime,
    TransformOptions as OxcTransformOptions, Transformer,
  },
};
use rustc_hash::FxHashMap;
use serde::Deserialize;

use crate::{
  ecma_compiler::{build_scoping, parse_program},
  error::{EcmaError, EcmaResult},
  es_target::ESTarget,
  source_syntax::SourceSyntax,
};

pub(crate) use define::apply_define;

/// Name the transformer sees for every module. Nothing it emits depends on it.
const SOURCE_PATH: &str = "module.js";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JsxRuntime {
  /// Every element becomes a call to `factory`.
  #[default]
  Classic,
  /// Elements call `jsx` and `jsxs` imported from `<importSource>/jsx-runtime`.
  Automatic,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct JsxOptions {
  pub runtime: JsxRuntime,
  pub factory: String,
  pub fragment: String,
  pub import_source: String,
}

impl Default for JsxOptions {
  fn default() -> Self {
    Self {
      runtime: JsxRuntime::Classic,
      factory: "React.createElement".to_string(),
      fragment: "React.Fragment".to_string(),
      import_source: "react".to_string(),
    }
  }
}

#[derive(Debug, Clone, Default)]
pub struct TransformOptions {
  pub syntax: SourceSyntax,
  pub target: ESTarget,
  pub jsx: JsxOptions,
  /// Global names and member chains mapped to the expression that replaces them.
  pub define: FxHashMap<String, String>,
}

impl TransformOptions {
  fn needs_lowering(&self) -> bool {
    self.syntax != SourceSyntax::Js || self.target != ESTarget::EsNext
  }

  fn to_oxc(&self) -> OxcTransformOptions {
    let mut options = OxcTransformOptions::from(OxcESTarget::from(self.target));
    if !self.syntax.has_jsx() {
      options.jsx.jsx_plugin = false;
      return options;
    }
    let jsx = &self.jsx;
    options.jsx = match jsx.runtime {
      JsxRuntime::Classic => OxcJsxOptions {
        runtime: OxcJsxRuntime::Classic,
        pragma: Some(jsx.factory.clone()),
        pragma_frag: Some(jsx.fragment.clone()),
        ..OxcJsxOptions::default()
      },
      JsxRuntime::Automatic => OxcJsxOptions {
        runtime: OxcJsxRuntime::Automatic,
        import_source: Some(jsx.import_source.clone()),
        ..OxcJsxOptions::default()
      },
    };
    // Keeps the import of the factory's root name alive in TSX.
    options.typescript.jsx_pragma = jsx.factory.clone().into();
    options.typescript.jsx_pragma_frag = jsx.fragment.clone().into();
    options
  }
}

#[derive(Debug)]
pub struct TransformReturn {
  pub code: String,
  /// Line `n` of `code` comes from line `line_map[n]` of the input. `None` when `code` is the
  /// input itself.
  pub line_map: Option<Vec<u32>>,
}

/// Turns TypeScript and JSX into plain JavaScript and lowers it to the target. Syntax that
/// cannot be lowered is reported at its position in the input.
pub fn transform(source: &str, options: &TransformOptions) -> EcmaResult<TransformReturn> {
  if !options.needs_lowering() {
    return Ok(TransformReturn { code: source.to_string(), line_map: None });
  }

  let allocator = Allocator::default();
  let mut program = parse_program(&allocator, source, options.syntax)?;
  let scoping = build_scoping(source, &program)?;

  let ret = Transformer::new(&allocator, Path::new(SOURCE_PATH), &options.to_oxc())
    .build_with_scoping(scoping, &mut program);
  let errors = EcmaError::from_diagnostics(source, ret.errors);
  if !errors.is_empty() {
    return Err(errors);
  }
  unsupported::check_unsupported(source, &program, options.target)?;

  let ret = Codegen::new()
    .with_options(CodegenOptions {
      source_map_path: Some(PathBuf::from(SOURCE_PATH)),
      ..CodegenOptions::default()
    })
    .build(&program);
  let line_map = ret.map.as_ref().map(|map| {
    to_line_map(&ret.code, map.get_tokens().map(|token| (token.get_dst_line(), token.get_src_line())))
  });
  Ok(TransformReturn { code: ret.code, line_map })
}

/// Maps each output line to the input line of its first token. Lines without tokens take the
/// line of the one before them.
fn to_line_map(code: &str, tokens: impl Iterator<Item = (u32, u32)>) -> Vec<u32> {
  let mut lines = vec![None; lines_count(code) as usize + 1];
  for (dst_line, src_line) in tokens {
    if let Some(line) = lines.get_mut(dst_line as usize) {
      line.get_or_insert(src_line);
    }
  }
  let mut last = 0;
  lines
    .into_iter()
    .map(|line| {
      last = line.unwrap_or(last);
      last
    })
    .collect()
}

#[cfg(test)]
mod tests {
  use super::*;

  fn ts(source: &str) -> String {
    let options = TransformOptions { syntax: SourceSyntax::Ts, ..Default::default() };
    transform(source, &options).unwrap().code
  }

  #[test]
  fn tsx_to_javascript() {
    let source = "import React from \"react\";
import type { Props } from \"./types\";
export const App = (props: Props) => <div>{props.name}</div>;
";
    let options = TransformOptions { syntax: SourceSyntax::Tsx, ..Default::default() };
    let ret = transform(source, &options).unwrap();
    assert!(ret.code.contains("import React from \"react\";"));
    assert!(!ret.code.contains("./types"));
    assert!(ret.code.contains("React.createElement(\"div\", null, props.name)"));
    let line_map = ret.line_map.unwrap();
    let app_line = ret.code.lines().position(|line| line.contains("App")).unwrap();
    assert_eq!(line_map[app_line], 2);
  }

  #[test]
  fn automatic_jsx_runtime() {
    let options = TransformOptions {
      syntax: SourceSyntax::Jsx,
      jsx: JsxOptions {
        runtime: JsxRuntime::Automatic,
        import_source: "preact".to_string(),
        ..JsxOptions::default()
      },
      ..Default::default()
    };
    let code = transform("export const A = () => <p>hi</p>;\n", &options).unwrap().code;
    assert!(code.contains("from \"preact/jsx-runtime\""));
    assert!(code.contains("_jsx(\"p\""));
    assert!(!code.contains("createElement"));
  }

  #[test]
  fn generic_defaults_are_stripped() {
    let code = ts("export function f<T = {}>(a: T): T { return a; }\n");
    assert!(code.contains("export function f(a) {"));
    assert!(!code.contains('<'));
  }

  #[test]
  fn non_null_before_as() {
    let code = ts("declare const obj: any;\ndeclare function f(): any;\n\
      export const a = obj!.a! as number;\nexport const b = f()! as number;\n");
    assert!(code.contains("export const a = obj.a;"));
    assert!(code.contains("export const b = f();"));
  }

  #[test]
  fn unsupported_target_reports_position() {
    let options = TransformOptions { target: ESTarget::Es2019, ..Default::default() };
    let errors = transform("const a = 1;\nconst b = 10n;", &options).unwrap_err();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].to_string(), "2:11: BigInt requires es2020");
  }

  #[test]
  fn nullish_coalescing_is_lowered() {
    let options = TransformOptions { target: ESTarget::Es2019, ..Default::default() };
    let code = transform("export const b = a ?? 2;\n", &options).unwrap().code;
    assert!(!code.contains("??"));
  }

  #[test]
  fn line_map_fills_gaps() {
    assert_eq!(to_line_map("a\n\nb\nc", [(0, 3), (2, 5), (2, 1)].into_iter()), [3, 3, 5, 5]);
  }
}
