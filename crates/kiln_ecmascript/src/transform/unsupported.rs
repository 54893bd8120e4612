use oxc::{
  ast::ast::{self, BindingPatternKind, ObjectPropertyKind, VariableDeclarationKind},
  ast_visit::{walk, Visit},
  semantic::ScopeFlags,
  syntax::operator::{AssignmentOperator, BinaryOperator, LogicalOperator},
};

use crate::{
  error::{EcmaError, EcmaResult},
  es_target::ESTarget,
};

/// Reports the syntax left in a lowered program that `target` cannot run.
///
/// Nodes the transformer did not touch keep their spans, so positions point into the input.
pub(crate) fn check_unsupported(
  source: &str,
  program: &ast::Program<'_>,
  target: ESTarget,
) -> EcmaResult<()> {
  if target == ESTarget::EsNext {
    return Ok(());
  }
  let mut checker = UnsupportedSyntaxChecker { source, target, function_depth: 0, errors: vec![] };
  checker.visit_program(program);
  if checker.errors.is_empty() {
    Ok(())
  } else {
    Err(checker.errors)
  }
}

struct UnsupportedSyntaxChecker<'me> {
  source: &'me str,
  target: ESTarget,
  function_depth: u32,
  errors: Vec<EcmaError>,
}

impl UnsupportedSyntaxChecker<'_> {
  fn require(&mut self, at: oxc::span::Span, construct: &'static str, since: ESTarget) {
    if !self.target.supports(since) {
      self.errors.push(EcmaError::unsupported(self.source, at.start, construct, since));
    }
  }
}

impl<'a> Visit<'a> for UnsupportedSyntaxChecker<'_> {
  fn visit_variable_declaration(&mut self, decl: &ast::VariableDeclaration<'a>) {
    if decl.kind != VariableDeclarationKind::Var {
      self.require(decl.span, "let and const", ESTarget::Es2015);
    }
    walk::walk_variable_declaration(self, decl);
  }

  fn visit_class(&mut self, class: &ast::Class<'a>) {
    self.require(class.span, "classes", ESTarget::Es2015);
    walk::walk_class(self, class);
  }

  fn visit_function(&mut self, func: &ast::Function<'a>, flags: ScopeFlags) {
    if func.generator {
      self.require(func.span, "generators", ESTarget::Es2015);
    }
    if func.r#async {
      self.require(func.span, "async functions", ESTarget::Es2017);
    }
    self.function_depth += 1;
    walk::walk_function(self, func, flags);
    self.function_depth -= 1;
  }

  fn visit_arrow_function_expression(&mut self, arrow: &ast::ArrowFunctionExpression<'a>) {
    self.require(arrow.span, "arrow functions", ESTarget::Es2015);
    if arrow.r#async {
      self.require(arrow.span, "async functions", ESTarget::Es2017);
    }
    self.function_depth += 1;
    walk::walk_arrow_function_expression(self, arrow);
    self.function_depth -= 1;
  }

  fn visit_template_literal(&mut self, lit: &ast::TemplateLiteral<'a>) {
    self.require(lit.span, "template literals", ESTarget::Es2015);
    walk::walk_template_literal(self, lit);
  }

  fn visit_binding_pattern(&mut self, pattern: &ast::BindingPattern<'a>) {
    if let BindingPatternKind::ObjectPattern(object) = &pattern.kind {
      self.require(object.span, "destructuring", ESTarget::Es2015);
      if let Some(rest) = &object.rest {
        self.require(rest.span, "object rest and spread", ESTarget::Es2018);
      }
    }
    if let BindingPatternKind::ArrayPattern(array) = &pattern.kind {
      self.require(array.span, "destructuring", ESTarget::Es2015);
    }
    walk::walk_binding_pattern(self, pattern);
  }

  fn visit_spread_element(&mut self, spread: &ast::SpreadElement<'a>) {
    self.require(spread.span, "spread syntax", ESTarget::Es2015);
    walk::walk_spread_element(self, spread);
  }

  fn visit_object_expression(&mut self, object: &ast::ObjectExpression<'a>) {
    for prop in &object.properties {
      if let ObjectPropertyKind::SpreadProperty(spread) = prop {
        self.require(spread.span, "object rest and spread", ESTarget::Es2018);
      }
    }
    walk::walk_object_expression(self, object);
  }

  fn visit_for_of_statement(&mut self, stmt: &ast::ForOfStatement<'a>) {
    self.require(stmt.span, "for-of loops", ESTarget::Es2015);
    if stmt.r#await {
      self.require(stmt.span, "async iteration", ESTarget::Es2018);
      if self.function_depth == 0 {
        self.require(stmt.span, "top-level await", ESTarget::Es2022);
      }
    }
    walk::walk_for_of_statement(self, stmt);
  }

  fn visit_binary_expression(&mut self, expr: &ast::BinaryExpression<'a>) {
    if expr.operator == BinaryOperator::Exponential {
      self.require(expr.span, "exponentiation operator", ESTarget::Es2016);
    }
    walk::walk_binary_expression(self, expr);
  }

  fn visit_logical_expression(&mut self, expr: &ast::LogicalExpression<'a>) {
    if expr.operator == LogicalOperator::Coalesce {
      self.require(expr.span, "nullish coalescing", ESTarget::Es2020);
    }
    walk::walk_logical_expression(self, expr);
  }

  fn visit_assignment_expression(&mut self, expr: &ast::AssignmentExpression<'a>) {
    match expr.operator {
      AssignmentOperator::Exponential => {
        self.require(expr.span, "exponentiation operator", ESTarget::Es2016);
      }
      AssignmentOperator::LogicalAnd
      | AssignmentOperator::LogicalOr
      | AssignmentOperator::LogicalNullish => {
        self.require(expr.span, "logical assignment", ESTarget::Es2021);
      }
      _ => {}
    }
    walk::walk_assignment_expression(self, expr);
  }

  fn visit_catch_clause(&mut self, clause: &ast::CatchClause<'a>) {
    if clause.param.is_none() {
      self.require(clause.span, "optional catch binding", ESTarget::Es2019);
    }
    walk::walk_catch_clause(self, clause);
  }

  fn visit_big_int_literal(&mut self, lit: &ast::BigIntLiteral<'a>) {
    self.require(lit.span, "BigInt", ESTarget::Es2020);
  }

  fn visit_chain_expression(&mut self, expr: &ast::ChainExpression<'a>) {
    self.require(expr.span, "optional chaining", ESTarget::Es2020);
    walk::walk_chain_expression(self, expr);
  }

  fn visit_private_identifier(&mut self, ident: &ast::PrivateIdentifier<'a>) {
    self.require(ident.span, "private class members", ESTarget::Es2022);
  }

  fn visit_property_definition(&mut self, prop: &ast::PropertyDefinition<'a>) {
    self.require(prop.span, "class fields", ESTarget::Es2022);
    walk::walk_property_definition(self, prop);
  }

  fn visit_static_block(&mut self, block: &ast::StaticBlock<'a>) {
    self.require(block.span, "class static blocks", ESTarget::Es2022);
    walk::walk_static_block(self, block);
  }

  fn visit_await_expression(&mut self, expr: &ast::AwaitExpression<'a>) {
    if self.function_depth == 0 {
      self.require(expr.span, "top-level await", ESTarget::Es2022);
    }
    walk::walk_await_expression(self, expr);
  }
}
