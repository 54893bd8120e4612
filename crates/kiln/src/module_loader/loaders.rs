use std::{path::Path, sync::Arc};

use arcstr::ArcStr;
use kiln_common::{ModuleType, StrOrBytes};
use kiln_ecmascript::{EcmaAst, EcmaCompiler, EcmaError, EcmaErrorKind, TransformOptions};
use kiln_error::{BuildDiagnostic, Location};
use kiln_utils::{
  base64::to_standard_base64, concat_string, ecmascript::quote, mime::guess_mime,
};

use super::task_context::TaskContext;
use crate::utils::asset_filename::asset_filename;

pub struct PreparedModule {
  pub original_source: ArcStr,
  pub ecma: EcmaAst,
  pub css_source: Option<ArcStr>,
  pub asset_source: Option<Arc<[u8]>>,
}

pub fn ecma_errors_to_diagnostics(
  errors: Vec<EcmaError>,
  stable_id: &str,
  ctx: &TaskContext,
) -> Vec<BuildDiagnostic> {
  errors
    .into_iter()
    .map(|err| {
      let loc = Location::new(stable_id, err.line, err.column);
      match err.kind {
        EcmaErrorKind::Syntax(message) => BuildDiagnostic::Syntax { loc, message },
        EcmaErrorKind::Unsupported { construct, min_target } => BuildDiagnostic::UnsupportedSyntax {
          loc,
          construct,
          target: ctx.options.target.as_str(),
          min_target: min_target.as_str(),
        },
      }
    })
    .collect()
}

fn into_text(content: StrOrBytes, id: &str) -> Result<String, BuildDiagnostic> {
  match content {
    StrOrBytes::Str(text) => Ok(text),
    StrOrBytes::Bytes(bytes) => simdutf8::basic::from_utf8(&bytes)
      .map(ToOwned::to_owned)
      .map_err(|_| BuildDiagnostic::Load { id: id.into(), reason: "invalid UTF-8".to_string() }),
  }
}

/// Turns loaded content into JavaScript according to its loader, then transforms and scans it.
pub fn prepare_module(
  ctx: &TaskContext,
  id: &str,
  stable_id: &str,
  module_type: ModuleType,
  content: StrOrBytes,
) -> Result<PreparedModule, Vec<BuildDiagnostic>> {
  let mut css_source = None;
  let mut asset_source = None;

  let (original_source, code): (ArcStr, String) = match module_type {
    ModuleType::Js | ModuleType::Jsx | ModuleType::Ts | ModuleType::Tsx => {
      let text: ArcStr = into_text(content, id).map_err(|err| vec![err])?.into();
      let options = TransformOptions {
        syntax: module_type.syntax(),
        target: ctx.options.target,
        jsx: ctx.options.jsx.clone(),
        define: ctx.define.clone(),
      };
      let ecma = EcmaCompiler::compile(&text, &options)
        .map_err(|errors| ecma_errors_to_diagnostics(errors, stable_id, ctx))?;
      return Ok(PreparedModule { original_source: text, ecma, css_source, asset_source });
    }
    ModuleType::Json => {
      let text = into_text(content, id).map_err(|err| vec![err])?;
      if let Err(err) = serde_json::from_str::<serde_json::Value>(&text) {
        let line = u32::try_from(err.line()).unwrap_or(u32::MAX);
        let column = u32::try_from(err.column()).unwrap_or(u32::MAX);
        return Err(vec![BuildDiagnostic::Syntax {
          loc: Location::new(stable_id, line, column),
          message: format!("invalid JSON: {err}"),
        }]);
      }
      let code = concat_string!("export default ", text.trim(), ";\n");
      (text.into(), code)
    }
    ModuleType::Text => {
      let text = into_text(content, id).map_err(|err| vec![err])?;
      let code = concat_string!("export default ", quote(&text), ";\n");
      (text.into(), code)
    }
    ModuleType::Css => {
      let text: ArcStr = into_text(content, id).map_err(|err| vec![err])?.into();
      css_source = Some(text.clone());
      (text, String::new())
    }
    ModuleType::Empty => (ArcStr::default(), String::new()),
    ModuleType::Base64 | ModuleType::Dataurl | ModuleType::File => {
      let bytes = match content {
        StrOrBytes::Str(text) => text.into_bytes(),
        StrOrBytes::Bytes(bytes) => bytes,
      };
      let value = match module_type {
        ModuleType::Base64 => to_standard_base64(&bytes),
        ModuleType::Dataurl => {
          let mime = guess_mime(Path::new(id), &bytes);
          concat_string!("data:", mime.essence_str(), ";base64,", to_standard_base64(&bytes))
        }
        _ => concat_string!("./", asset_filename(&ctx.options, id, &bytes)),
      };
      asset_source = Some(Arc::from(bytes));
      (ArcStr::default(), concat_string!("export default ", quote(&value), ";\n"))
    }
  };

  let ecma = EcmaCompiler::parse(code)
    .map_err(|errors| ecma_errors_to_diagnostics(errors, stable_id, ctx))?;
  Ok(PreparedModule { original_source, ecma, css_source, asset_source })
}
