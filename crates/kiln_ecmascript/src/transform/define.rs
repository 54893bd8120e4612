use oxc::{
  allocator::Allocator,
  ast::ast::{self, Expression},
  ast_visit::{walk, Visit},
  semantic::Scoping,
  span::GetSpan,
  syntax::operator::UnaryOperator,
};
use rustc_hash::FxHashMap;

use crate::{
  ecma_compiler::{build_scoping, parse_program},
  error::EcmaResult,
  printer::Edits,
  source_syntax::SourceSyntax,
};

/// Replaces global identifiers and member chains such as `process.env.NODE_ENV` with the
/// expressions in `define`. Locally bound names and assignment targets are left alone.
pub(crate) fn apply_define(source: &str, define: &FxHashMap<String, String>) -> EcmaResult<String> {
  if define.is_empty() {
    return Ok(source.to_string());
  }
  let allocator = Allocator::default();
  let program = parse_program(&allocator, source, SourceSyntax::Js)?;
  let scoping = build_scoping(source, &program)?;

  let keys = define.iter().map(|(key, value)| (key.split('.').collect(), value.as_str())).collect();
  let mut replacer = DefineReplacer { scoping: &scoping, keys, edits: Edits::default() };
  replacer.visit_program(&program);
  Ok(replacer.edits.apply(source))
}

struct DefineReplacer<'me> {
  scoping: &'me Scoping,
  keys: Vec<(Vec<&'me str>, &'me str)>,
  edits: Edits,
}

impl DefineReplacer<'_> {
  fn is_global(&self, ident: &ast::IdentifierReference<'_>) -> bool {
    ident
      .reference_id
      .get()
      .is_some_and(|reference_id| self.scoping.get_reference(reference_id).symbol_id().is_none())
  }

  /// The dotted path of a global identifier, of `import.meta`, or of a static member chain
  /// rooted at one of them.
  fn dotted_path<'a>(&self, expr: &'a Expression<'_>) -> Option<Vec<&'a str>> {
    match expr {
      Expression::Identifier(ident) if self.is_global(ident) => Some(vec![ident.name.as_str()]),
      Expression::MetaProperty(meta) => {
        Some(vec![meta.meta.name.as_str(), meta.property.name.as_str()])
      }
      Expression::StaticMemberExpression(member) if !member.optional => {
        let mut path = self.dotted_path(&member.object)?;
        path.push(member.property.name.as_str());
        Some(path)
      }
      _ => None,
    }
  }

  fn replacement(&self, expr: &Expression<'_>) -> Option<&str> {
    let path = self.dotted_path(expr)?;
    self.keys.iter().find(|(parts, _)| *parts == path).map(|(_, value)| *value)
  }
}

impl<'a> Visit<'a> for DefineReplacer<'_> {
  fn visit_expression(&mut self, expr: &Expression<'a>) {
    if let Some(value) = self.replacement(expr) {
      let value = value.to_string();
      self.edits.replace(expr.span().into(), value);
      return;
    }
    walk::walk_expression(self, expr);
  }

  fn visit_object_property(&mut self, prop: &ast::ObjectProperty<'a>) {
    if prop.shorthand {
      if let Some(value) = self.replacement(&prop.value) {
        let value = format!(": {value}");
        self.edits.insert(prop.value.span().end, value);
      }
      return;
    }
    walk::walk_object_property(self, prop);
  }

  fn visit_unary_expression(&mut self, expr: &ast::UnaryExpression<'a>) {
    if expr.operator != UnaryOperator::Delete {
      walk::walk_unary_expression(self, expr);
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn define(source: &str, pairs: &[(&str, &str)]) -> String {
    let define =
      pairs.iter().map(|(k, v)| ((*k).to_string(), (*v).to_string())).collect::<FxHashMap<_, _>>();
    apply_define(source, &define).unwrap()
  }

  #[test]
  fn replaces_globals_and_member_chains() {
    let code = define(
      "if (process.env.NODE_ENV !== \"production\") log(DEBUG, process.env.OTHER);",
      &[("process.env.NODE_ENV", "\"production\""), ("DEBUG", "false")],
    );
    assert_eq!(code, "if (\"production\" !== \"production\") log(false, process.env.OTHER);");
  }

  #[test]
  fn skips_bound_names_and_assignments() {
    let code = define(
      "const o = { DEBUG };\nfunction f(DEBUG) { return DEBUG; }\nDEBUG = 1;",
      &[("DEBUG", "true")],
    );
    assert_eq!(code, "const o = { DEBUG: true };\nfunction f(DEBUG) { return DEBUG; }\nDEBUG = 1;");
  }

  #[test]
  fn import_meta_keys() {
    let code = define("const mode = import.meta.env.MODE;", &[("import.meta.env.MODE", "\"dev\"")]);
    assert_eq!(code, "const mode = \"dev\";");
  }
}
