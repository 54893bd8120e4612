use oxc::{
  ast::ast::{
    self, Argument, BindingPatternKind, Declaration, ExportDefaultDeclarationKind, Expression,
    ModuleExportName, Statement,
  },
  ast_visit::{walk, Visit},
  semantic::{ScopeFlags, ScopeId, Scoping, SymbolId},
  span::GetSpan,
  syntax::operator::UnaryOperator,
};

use super::{
  side_effect::{has_pure_annotation, SideEffectDetector},
  ExportLocal, IdentRef, IdentRefFlags, ImportRecordMeta, ImportedName, ScanResult, ScannedExport,
  ScannedImportKind, ScannedImportRecord, ScannedNamedImport, ScannedStmt, StmtKind,
};
use crate::{
  error::{EcmaError, EcmaResult},
  span::Span,
};

/// Walks a parsed module once, splitting it into top-level statements and recording what each
/// one declares, references and whether it has side effects.
///
/// Bindings are resolved by the semantic pass that built `scoping`; only symbols of the root
/// scope are tracked.
pub struct AstScanner<'me> {
  source: &'me str,
  scoping: &'me Scoping,
  root_scope_id: ScopeId,
  current_stmt: u32,
  /// `try` blocks enclosing the current node inside the current function.
  try_depth: u32,
  side_effects: SideEffectDetector,
  result: ScanResult,
  errors: Vec<EcmaError>,
}

impl<'me> AstScanner<'me> {
  pub fn new(source: &'me str, scoping: &'me Scoping) -> Self {
    Self {
      source,
      scoping,
      root_scope_id: scoping.root_scope_id(),
      current_stmt: 0,
      try_depth: 0,
      side_effects: SideEffectDetector::default(),
      result: ScanResult::default(),
      errors: vec![],
    }
  }

  pub fn scan(mut self, program: &ast::Program<'_>) -> EcmaResult<ScanResult> {
    self.visit_program(program);
    for symbol_id in self.scoping.symbol_ids() {
      if !self.is_root_symbol(symbol_id) {
        self.result.nested_names.insert(self.scoping.symbol_name(symbol_id).to_string());
      }
    }
    if self.errors.is_empty() {
      Ok(self.result)
    } else {
      Err(self.errors)
    }
  }

  fn is_root_symbol(&self, symbol_id: SymbolId) -> bool {
    self.scoping.symbol_scope_id(symbol_id) == self.root_scope_id
  }

  fn is_unresolved(&self, ident: &ast::IdentifierReference<'_>) -> bool {
    ident
      .reference_id
      .get()
      .is_some_and(|reference_id| self.scoping.get_reference(reference_id).symbol_id().is_none())
  }

  fn current(&mut self) -> &mut ScannedStmt {
    &mut self.result.stmts[self.current_stmt as usize]
  }

  fn scan_top_level_statement(&mut self, stmt: &Statement<'_>) {
    self.current_stmt = self.result.stmts.len() as u32;
    self.result.stmts.push(ScannedStmt {
      span: stmt.span().into(),
      kind: StmtKind::Plain,
      declared: vec![],
      referenced: vec![],
      side_effects: false,
      named_values: named_values(stmt),
    });

    let kind = match stmt {
      Statement::ImportDeclaration(decl) => self.scan_import_declaration(decl),
      Statement::ExportNamedDeclaration(decl) => self.scan_export_named_declaration(decl),
      Statement::ExportDefaultDeclaration(decl) => self.scan_export_default_declaration(decl),
      Statement::ExportAllDeclaration(decl) => self.scan_export_all_declaration(decl),
      _ => StmtKind::Plain,
    };
    if stmt.is_module_declaration() {
      self.result.has_module_syntax = true;
    }

    self.visit_statement(stmt);

    if let StmtKind::ExportDecl { .. } = kind {
      let declared = self.current().declared.clone();
      self.result.exports.extend(declared.into_iter().map(|name| ScannedExport::Local {
        exported: name.clone(),
        local: ExportLocal::Name(name),
      }));
    }
    let side_effects = self.side_effects.take()
      && !matches!(kind, StmtKind::Import { .. } | StmtKind::ExportClause);
    let current = self.current();
    current.kind = kind;
    current.side_effects = side_effects;
  }

  fn scan_import_declaration(&mut self, decl: &ast::ImportDeclaration<'_>) -> StmtKind {
    let meta = if decl.specifiers.as_ref().is_none_or(|specifiers| specifiers.is_empty()) {
      ImportRecordMeta::IS_PLAIN_IMPORT
    } else {
      ImportRecordMeta::empty()
    };
    let record = self.add_import_record(
      decl.source.value.to_string(),
      ScannedImportKind::Static,
      decl.source.span.into(),
      meta,
    );
    for specifier in decl.specifiers.iter().flatten() {
      let (local, imported) = match specifier {
        ast::ImportDeclarationSpecifier::ImportSpecifier(s) => {
          (&s.local, ImportedName::from_name(s.imported.name().to_string()))
        }
        ast::ImportDeclarationSpecifier::ImportDefaultSpecifier(s) => {
          (&s.local, ImportedName::Default)
        }
        ast::ImportDeclarationSpecifier::ImportNamespaceSpecifier(s) => {
          (&s.local, ImportedName::Star)
        }
      };
      self.result.named_imports.push(ScannedNamedImport {
        local: local.name.to_string(),
        imported,
        record,
        span: local.span.into(),
      });
    }
    StmtKind::Import { record }
  }

  fn scan_export_named_declaration(&mut self, decl: &ast::ExportNamedDeclaration<'_>) -> StmtKind {
    if let Some(declaration) = &decl.declaration {
      let keyword = Span::new(decl.span.start, declaration.span().start);
      return StmtKind::ExportDecl { keyword };
    }

    if let Some(source) = &decl.source {
      let record = self.add_import_record(
        source.value.to_string(),
        ScannedImportKind::Static,
        source.span.into(),
        ImportRecordMeta::IS_REEXPORT,
      );
      for specifier in &decl.specifiers {
        self.result.exports.push(ScannedExport::ReExport {
          exported: specifier.exported.name().to_string(),
          imported: ImportedName::from_name(specifier.local.name().to_string()),
          record,
        });
      }
      return StmtKind::ExportClause;
    }

    for specifier in &decl.specifiers {
      let ModuleExportName::IdentifierReference(local) = &specifier.local else { continue };
      self.reference(local, IdentRefFlags::EXPORT_SPECIFIER);
      self.result.exports.push(ScannedExport::Local {
        exported: specifier.exported.name().to_string(),
        local: ExportLocal::Name(local.name.to_string()),
      });
    }
    StmtKind::ExportClause
  }

  fn scan_export_default_declaration(
    &mut self,
    decl: &ast::ExportDefaultDeclaration<'_>,
  ) -> StmtKind {
    let keyword = Span::new(decl.span.start, decl.declaration.span().start);
    let (name, name_insert) = match &decl.declaration {
      ExportDefaultDeclarationKind::FunctionDeclaration(func) => {
        let insert = self.source[func.span.start as usize..]
          .find('(')
          .map(|at| func.span.start + at as u32);
        (func.id.as_ref().map(|id| id.name.to_string()), insert)
      }
      ExportDefaultDeclarationKind::ClassDeclaration(class) => {
        let insert = class.span.start + "class".len() as u32;
        (class.id.as_ref().map(|id| id.name.to_string()), Some(insert))
      }
      kind if kind.is_expression() => {
        self.push_default_export(None);
        return StmtKind::ExportDefaultExpr { keyword };
      }
      _ => return StmtKind::ExportClause,
    };
    let name_insert = if name.is_some() { None } else { name_insert };
    self.push_default_export(name);
    StmtKind::ExportDefaultDecl { keyword, name_insert }
  }

  fn scan_export_all_declaration(&mut self, decl: &ast::ExportAllDeclaration<'_>) -> StmtKind {
    let meta = if decl.exported.is_some() {
      ImportRecordMeta::IS_REEXPORT
    } else {
      ImportRecordMeta::IS_EXPORT_STAR
    };
    let record = self.add_import_record(
      decl.source.value.to_string(),
      ScannedImportKind::Static,
      decl.source.span.into(),
      meta,
    );
    match &decl.exported {
      Some(exported) => self.result.exports.push(ScannedExport::ReExport {
        exported: exported.name().to_string(),
        imported: ImportedName::Star,
        record,
      }),
      None => self.result.star_exports.push(record),
    }
    StmtKind::ExportClause
  }

  fn push_default_export(&mut self, name: Option<String>) {
    let local = name.map_or(ExportLocal::DefaultExpression, ExportLocal::Name);
    self.result.exports.push(ScannedExport::Local { exported: "default".to_string(), local });
  }

  fn add_import_record(
    &mut self,
    specifier: String,
    kind: ScannedImportKind,
    span: Span,
    meta: ImportRecordMeta,
  ) -> u32 {
    let index = self.result.import_records.len() as u32;
    self.result.import_records.push(ScannedImportRecord {
      specifier,
      kind,
      span,
      stmt: self.current_stmt,
      meta,
    });
    index
  }

  fn try_block_meta(&self) -> ImportRecordMeta {
    if self.try_depth > 0 {
      ImportRecordMeta::IN_TRY_BLOCK
    } else {
      ImportRecordMeta::empty()
    }
  }

  fn declare(&mut self, ident: &ast::BindingIdentifier<'_>, flags: IdentRefFlags) {
    let Some(symbol_id) = ident.symbol_id.get() else { return };
    if !self.is_root_symbol(symbol_id) {
      return;
    }
    push_unique(&mut self.current().declared, &ident.name);
    self.result.refs.push(IdentRef {
      span: ident.span.into(),
      stmt: self.current_stmt,
      flags: flags | IdentRefFlags::DECLARATION,
    });
  }

  fn reference(&mut self, ident: &ast::IdentifierReference<'_>, flags: IdentRefFlags) {
    let Some(reference_id) = ident.reference_id.get() else { return };
    let ident_ref = IdentRef { span: ident.span.into(), stmt: self.current_stmt, flags };
    match self.scoping.get_reference(reference_id).symbol_id() {
      Some(symbol_id) if self.is_root_symbol(symbol_id) => {
        if !ident_ref.is_export_specifier() {
          push_unique(&mut self.current().referenced, &ident.name);
        }
        self.result.refs.push(ident_ref);
      }
      Some(_) => {}
      None if ident_ref.is_export_specifier() => {
        self.errors.push(EcmaError::syntax(
          self.source,
          ident.span.start,
          format!("Export \"{}\" is not defined", ident.name),
        ));
      }
      None => {
        if matches!(ident.name.as_str(), "module" | "exports") {
          self.result.uses_commonjs = true;
        }
        self.result.global_refs.push(ident_ref);
      }
    }
  }

  /// The specifier of `require("x")` when `require` is the global one.
  fn require_specifier(&self, call: &ast::CallExpression<'_>) -> Option<String> {
    let Expression::Identifier(callee) = &call.callee else { return None };
    if callee.name.as_str() != "require" || call.optional || call.arguments.len() != 1 {
      return None;
    }
    if !self.is_unresolved(callee) {
      return None;
    }
    match &call.arguments[0] {
      Argument::StringLiteral(specifier) => Some(specifier.value.to_string()),
      _ => None,
    }
  }

  fn note_top_level_await(&mut self, span: oxc::span::Span) {
    if self.side_effects.is_module_evaluation() && self.result.top_level_await.is_none() {
      self.result.top_level_await = Some(span.into());
    }
  }

  fn in_function_body(&mut self, f: impl FnOnce(&mut Self)) {
    let try_depth = std::mem::take(&mut self.try_depth);
    self.side_effects.enter_function();
    f(self);
    self.side_effects.leave_function();
    self.try_depth = try_depth;
  }
}

impl<'a> Visit<'a> for AstScanner<'_> {
  fn visit_program(&mut self, program: &ast::Program<'a>) {
    for stmt in &program.body {
      self.scan_top_level_statement(stmt);
    }
  }

  fn visit_statement(&mut self, stmt: &Statement<'a>) {
    if matches!(
      stmt,
      Statement::IfStatement(_)
        | Statement::ForStatement(_)
        | Statement::ForInStatement(_)
        | Statement::ForOfStatement(_)
        | Statement::WhileStatement(_)
        | Statement::DoWhileStatement(_)
        | Statement::TryStatement(_)
        | Statement::SwitchStatement(_)
        | Statement::ReturnStatement(_)
        | Statement::ThrowStatement(_)
        | Statement::DebuggerStatement(_)
        | Statement::WithStatement(_)
    ) {
      self.side_effects.mark();
    }
    walk::walk_statement(self, stmt);
  }

  fn visit_export_named_declaration(&mut self, decl: &ast::ExportNamedDeclaration<'a>) {
    // Specifiers were handled when the statement was classified.
    if let Some(declaration) = &decl.declaration {
      self.visit_declaration(declaration);
    }
  }

  fn visit_binding_identifier(&mut self, ident: &ast::BindingIdentifier<'a>) {
    self.declare(ident, IdentRefFlags::empty());
  }

  fn visit_identifier_reference(&mut self, ident: &ast::IdentifierReference<'a>) {
    self.reference(ident, IdentRefFlags::empty());
  }

  fn visit_object_property(&mut self, prop: &ast::ObjectProperty<'a>) {
    if prop.shorthand {
      if let Expression::Identifier(ident) = &prop.value {
        self.reference(ident, IdentRefFlags::SHORTHAND);
        return;
      }
    }
    walk::walk_object_property(self, prop);
  }

  fn visit_binding_property(&mut self, prop: &ast::BindingProperty<'a>) {
    if prop.shorthand {
      match &prop.value.kind {
        BindingPatternKind::BindingIdentifier(ident) => {
          self.declare(ident, IdentRefFlags::SHORTHAND);
          return;
        }
        BindingPatternKind::AssignmentPattern(pattern) => {
          if let BindingPatternKind::BindingIdentifier(ident) = &pattern.left.kind {
            self.declare(ident, IdentRefFlags::SHORTHAND);
            self.visit_expression(&pattern.right);
            return;
          }
        }
        _ => {}
      }
    }
    walk::walk_binding_property(self, prop);
  }

  fn visit_assignment_target_property_identifier(
    &mut self,
    prop: &ast::AssignmentTargetPropertyIdentifier<'a>,
  ) {
    self.reference(&prop.binding, IdentRefFlags::SHORTHAND);
    if let Some(init) = &prop.init {
      self.visit_expression(init);
    }
  }

  fn visit_call_expression(&mut self, call: &ast::CallExpression<'a>) {
    if !has_pure_annotation(self.source, call.span.start) {
      self.side_effects.mark();
    }
    if let Some(specifier) = self.require_specifier(call) {
      let meta = self.try_block_meta();
      self.add_import_record(specifier, ScannedImportKind::Require, call.span.into(), meta);
    }
    walk::walk_call_expression(self, call);
  }

  fn visit_new_expression(&mut self, new: &ast::NewExpression<'a>) {
    if !has_pure_annotation(self.source, new.span.start) {
      self.side_effects.mark();
    }
    walk::walk_new_expression(self, new);
  }

  fn visit_import_expression(&mut self, expr: &ast::ImportExpression<'a>) {
    self.side_effects.mark();
    if let Expression::StringLiteral(specifier) = &expr.source {
      let meta = self.try_block_meta();
      self.add_import_record(
        specifier.value.to_string(),
        ScannedImportKind::Dynamic,
        expr.span.into(),
        meta,
      );
    }
    walk::walk_import_expression(self, expr);
  }

  fn visit_meta_property(&mut self, meta: &ast::MetaProperty<'a>) {
    if meta.meta.name.as_str() == "import" {
      self.result.has_module_syntax = true;
    }
  }

  fn visit_try_statement(&mut self, stmt: &ast::TryStatement<'a>) {
    self.try_depth += 1;
    self.visit_block_statement(&stmt.block);
    self.try_depth -= 1;
    if let Some(handler) = &stmt.handler {
      self.visit_catch_clause(handler);
    }
    if let Some(finalizer) = &stmt.finalizer {
      self.visit_block_statement(finalizer);
    }
  }

  fn visit_function(&mut self, func: &ast::Function<'a>, flags: ScopeFlags) {
    self.in_function_body(|this| walk::walk_function(this, func, flags));
  }

  fn visit_arrow_function_expression(&mut self, arrow: &ast::ArrowFunctionExpression<'a>) {
    self.in_function_body(|this| walk::walk_arrow_function_expression(this, arrow));
  }

  fn visit_class(&mut self, class: &ast::Class<'a>) {
    if class.super_class.is_some() {
      self.side_effects.mark();
    }
    walk::walk_class(self, class);
  }

  fn visit_property_definition(&mut self, prop: &ast::PropertyDefinition<'a>) {
    if prop.r#static {
      walk::walk_property_definition(self, prop);
      return;
    }
    self.visit_property_key(&prop.key);
    if let Some(value) = &prop.value {
      self.in_function_body(|this| this.visit_expression(value));
    }
  }

  fn visit_static_block(&mut self, block: &ast::StaticBlock<'a>) {
    self.side_effects.mark();
    walk::walk_static_block(self, block);
  }

  fn visit_assignment_expression(&mut self, expr: &ast::AssignmentExpression<'a>) {
    self.side_effects.mark();
    walk::walk_assignment_expression(self, expr);
  }

  fn visit_update_expression(&mut self, expr: &ast::UpdateExpression<'a>) {
    self.side_effects.mark();
    walk::walk_update_expression(self, expr);
  }

  fn visit_unary_expression(&mut self, expr: &ast::UnaryExpression<'a>) {
    if expr.operator == UnaryOperator::Delete {
      self.side_effects.mark();
    }
    walk::walk_unary_expression(self, expr);
  }

  fn visit_tagged_template_expression(&mut self, expr: &ast::TaggedTemplateExpression<'a>) {
    self.side_effects.mark();
    walk::walk_tagged_template_expression(self, expr);
  }

  fn visit_await_expression(&mut self, expr: &ast::AwaitExpression<'a>) {
    self.side_effects.mark();
    self.note_top_level_await(expr.span);
    walk::walk_await_expression(self, expr);
  }

  fn visit_for_of_statement(&mut self, stmt: &ast::ForOfStatement<'a>) {
    if stmt.r#await {
      self.note_top_level_await(stmt.span);
    }
    walk::walk_for_of_statement(self, stmt);
  }

  fn visit_yield_expression(&mut self, expr: &ast::YieldExpression<'a>) {
    self.side_effects.mark();
    walk::walk_yield_expression(self, expr);
  }
}

/// Functions and classes a statement binds to a name at module scope: declarations, and
/// declarators initialized with an anonymous function, arrow function or class.
fn named_values(stmt: &Statement<'_>) -> Vec<String> {
  let declaration = match stmt {
    Statement::ExportNamedDeclaration(decl) => decl.declaration.as_ref(),
    Statement::ExportDefaultDeclaration(decl) => {
      let id = match &decl.declaration {
        ExportDefaultDeclarationKind::FunctionDeclaration(func) => func.id.as_ref(),
        ExportDefaultDeclarationKind::ClassDeclaration(class) => class.id.as_ref(),
        _ => None,
      };
      return id.map(|id| id.name.to_string()).into_iter().collect();
    }
    _ => stmt.as_declaration(),
  };
  match declaration {
    Some(Declaration::FunctionDeclaration(func)) => {
      func.id.iter().map(|id| id.name.to_string()).collect()
    }
    Some(Declaration::ClassDeclaration(class)) => {
      class.id.iter().map(|id| id.name.to_string()).collect()
    }
    Some(Declaration::VariableDeclaration(decl)) => decl
      .declarations
      .iter()
      .filter(|declarator| declarator.init.as_ref().is_some_and(is_anonymous_function_or_class))
      .filter_map(|declarator| declarator.id.get_binding_identifier())
      .map(|id| id.name.to_string())
      .collect(),
    _ => vec![],
  }
}

fn is_anonymous_function_or_class(expr: &Expression<'_>) -> bool {
  match expr.without_parentheses() {
    Expression::FunctionExpression(func) => func.id.is_none(),
    Expression::ClassExpression(class) => class.id.is_none(),
    Expression::ArrowFunctionExpression(_) => true,
    _ => false,
  }
}

fn push_unique(names: &mut Vec<String>, name: &str) {
  if !names.iter().any(|n| n == name) {
    names.push(name.to_string());
  }
}
