use std::{path::PathBuf, sync::Arc};

use arcstr::ArcStr;
use oxc::{
  allocator::Allocator,
  ast::ast::Program,
  codegen::{Codegen, CodegenOptions},
  minifier::{CompressOptions, CompressOptionsKeepNames, MangleOptions, Minifier, MinifierOptions},
  parser::Parser,
  semantic::{Scoping, SemanticBuilder},
  transformer::ESTarget,
};

use crate::{
  error::{EcmaError, EcmaResult},
  scanner::{scan, ScanResult},
  source_syntax::SourceSyntax,
  transform::{apply_define, transform, TransformOptions},
};

/// A module's JavaScript source together with what the scanner found in it.
#[derive(Debug)]
pub struct EcmaAst {
  pub source: ArcStr,
  pub scanned: ScanResult,
  /// Line `n` of `source` comes from line `line_map[n]` of the module's original text. `None`
  /// when the lines match one to one.
  pub line_map: Option<Arc<[u32]>>,
}

/// One segment of minified code: a position in the output and the position of the input it was
/// printed from. Lines and columns are zero-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Mapping {
  pub dst_line: u32,
  pub dst_col: u32,
  pub src_line: u32,
  pub src_col: u32,
}

pub struct MinifyReturn {
  pub code: String,
  pub mappings: Option<Vec<Mapping>>,
}

pub struct EcmaCompiler;

impl EcmaCompiler {
  pub fn parse(source: impl Into<ArcStr>) -> EcmaResult<EcmaAst> {
    let source = source.into();
    let scanned = scan(&source)?;
    Ok(EcmaAst { source, scanned, line_map: None })
  }

  /// Transforms `source` to plain JavaScript for the target, applies `define` and scans the
  /// result.
  pub fn compile(source: &str, options: &TransformOptions) -> EcmaResult<EcmaAst> {
    let transformed = transform(source, options)?;
    let code = apply_define(&transformed.code, &options.define)?;
    let mut ast = Self::parse(code)?;
    ast.line_map = transformed.line_map.map(Arc::from);
    Ok(ast)
  }

  pub fn minify(source_text: &str, with_mappings: bool) -> EcmaResult<MinifyReturn> {
    let allocator = Allocator::default();
    let mut program = parse_program(&allocator, source_text, SourceSyntax::Js)?;

    let ret = Minifier::new(MinifierOptions {
      mangle: Some(MangleOptions::default()),
      compress: Some(CompressOptions {
        target: ESTarget::ESNext,
        drop_debugger: false,
        drop_console: false,
        keep_names: CompressOptionsKeepNames { function: true, class: true },
      }),
    })
    .build(&allocator, &mut program);

    let ret = Codegen::new()
      .with_options(CodegenOptions {
        minify: true,
        source_map_path: with_mappings.then(|| PathBuf::from("chunk.js")),
        ..CodegenOptions::default()
      })
      .with_scoping(ret.scoping)
      .build(&program);

    let mappings = ret.map.as_ref().map(|map| {
      map
        .get_tokens()
        .map(|token| Mapping {
          dst_line: token.get_dst_line(),
          dst_col: token.get_dst_col(),
          src_line: token.get_src_line(),
          src_col: token.get_src_col(),
        })
        .collect()
    });
    Ok(MinifyReturn { code: ret.code, mappings })
  }
}

pub(crate) fn parse_program<'a>(
  allocator: &'a Allocator,
  source: &'a str,
  syntax: SourceSyntax,
) -> EcmaResult<Program<'a>> {
  let ret = Parser::new(allocator, source, syntax.source_type()).parse();
  if ret.panicked || !ret.errors.is_empty() {
    let mut errors = EcmaError::from_diagnostics(source, ret.errors);
    if errors.is_empty() {
      errors.push(EcmaError::syntax(source, 0, "Failed to parse"));
    }
    return Err(errors);
  }
  Ok(ret.program)
}

pub(crate) fn build_scoping(source: &str, program: &Program<'_>) -> EcmaResult<Scoping> {
  let ret = SemanticBuilder::new().build(program);
  let errors = EcmaError::from_diagnostics(source, ret.errors);
  if !errors.is_empty() {
    return Err(errors);
  }
  Ok(ret.semantic.into_scoping())
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn basic_test() {
    let ast = EcmaCompiler::parse("const a = 1;".to_string()).unwrap();
    assert_eq!(ast.scanned.stmts.len(), 1);
    assert_eq!(ast.scanned.module_names().collect::<Vec<_>>(), ["a"]);
    assert!(ast.line_map.is_none());
  }

  #[test]
  fn syntax_errors_have_positions() {
    let errors = EcmaCompiler::parse("const a = 1;\nconst = 2;").unwrap_err();
    assert_eq!(errors[0].line, 2);
  }

  #[test]
  fn minify_keeps_escaped_identifiers_apart() {
    let ret = EcmaCompiler::minify("export const \\u0061b = 1;\nexport let c = ab + 1;", false)
      .unwrap();
    assert!(ret.code.contains("ab=1"));
    assert!(!ret.code.contains("\\u"));
    assert!(ret.mappings.is_none());
  }

  #[test]
  fn minify_reports_mappings() {
    let ret = EcmaCompiler::minify("export const a = 1;\n\nexport const b = a;\n", true).unwrap();
    let mappings = ret.mappings.unwrap();
    assert!(mappings.iter().all(|mapping| mapping.dst_line == 0));
    assert!(mappings.iter().any(|mapping| mapping.src_line == 2));
  }
}
