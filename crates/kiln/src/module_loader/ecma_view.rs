use std::path::Path;

use arcstr::ArcStr;
use kiln_common::{
  ImportKind, ImportRecordIdx, LocalExport, ModuleIdx, NamedImport, NormalModuleMeta,
  RawImportRecord, StmtInfo, StmtInfos, SymbolRef, SymbolRefDbForModule,
};
use kiln_ecmascript::{
  EcmaAst, ExportLocal, ImportRecordMeta, ScannedExport, ScannedImportKind, Span, StmtKind,
};
use kiln_utils::{
  concat_string, ecmascript::legitimize_identifier_name, indexmap::FxIndexMap, path_ext::PathExt,
};
use oxc_index::{Idx, IndexVec};

pub struct CreateEcmaViewReturn {
  pub symbols: SymbolRefDbForModule,
  pub namespace_object_ref: SymbolRef,
  pub default_export_ref: SymbolRef,
  pub named_imports: FxIndexMap<SymbolRef, NamedImport>,
  pub named_exports: FxIndexMap<ArcStr, LocalExport>,
  pub stmt_infos: StmtInfos,
  pub raw_import_records: IndexVec<ImportRecordIdx, RawImportRecord>,
  pub meta: NormalModuleMeta,
  /// Whether any top-level statement may have side effects when evaluated.
  pub has_side_effects: bool,
}

/// Turns the scan result of a module into symbols, statement infos and import records.
pub fn create_ecma_view(idx: ModuleIdx, repr_name: &str, ast: &EcmaAst) -> CreateEcmaViewReturn {
  let scanned = &ast.scanned;
  let mut symbols = SymbolRefDbForModule::new(idx);

  for name in scanned.module_names() {
    symbols.declare(name);
  }

  let namespace_object_ref =
    symbols.create_facade_root_symbol_ref(&format!("{repr_name}_exports"));
  let default_export_ref = match scanned.default_export() {
    Some(ExportLocal::Name(name)) => symbols.lookup(name),
    _ => None,
  }
  .unwrap_or_else(|| symbols.create_facade_root_symbol_ref(&format!("{repr_name}_default")));

  let raw_import_records = scanned
    .import_records
    .iter()
    .map(|record| {
      let kind = match record.kind {
        ScannedImportKind::Static => ImportKind::Import,
        ScannedImportKind::Dynamic => ImportKind::DynamicImport,
        ScannedImportKind::Require => ImportKind::Require,
      };
      let importee_name = Path::new(&record.specifier).representative_file_name();
      let namespace_ref = symbols.create_facade_root_symbol_ref(&concat_string!(
        "import_",
        legitimize_identifier_name(&importee_name)
      ));
      RawImportRecord::new(
        record.specifier.as_str().into(),
        kind,
        record.span,
        StmtInfos::stmt_info_idx_of(record.stmt as usize),
        namespace_ref,
      )
      .with_meta(record.meta)
    })
    .collect::<IndexVec<ImportRecordIdx, _>>();

  let mut named_imports = FxIndexMap::default();
  for import in &scanned.named_imports {
    let imported_as = symbols.declare(&import.local);
    named_imports.insert(
      imported_as,
      NamedImport {
        span: import.span,
        imported: import.imported.clone().into(),
        imported_as,
        record_id: ImportRecordIdx::from_usize(import.record as usize),
      },
    );
  }

  // Re-exports get a facade symbol declared by the statement they are written in.
  let mut facades_by_stmt: Vec<Vec<SymbolRef>> = vec![Vec::new(); scanned.stmts.len()];
  let mut named_exports = FxIndexMap::default();
  for export in &scanned.exports {
    match export {
      ScannedExport::Local { exported, local } => {
        let referenced = match local {
          ExportLocal::Name(name) => symbols.declare(name),
          ExportLocal::DefaultExpression => default_export_ref,
        };
        named_exports
          .insert(exported.as_str().into(), LocalExport { span: Span::default(), referenced });
      }
      ScannedExport::ReExport { exported, imported, record } => {
        let facade = symbols.create_facade_root_symbol_ref(&legitimize_identifier_name(exported));
        let record_id = ImportRecordIdx::from_usize(*record as usize);
        named_imports.insert(
          facade,
          NamedImport {
            span: Span::default(),
            imported: imported.clone().into(),
            imported_as: facade,
            record_id,
          },
        );
        named_exports.insert(
          exported.as_str().into(),
          LocalExport { span: Span::default(), referenced: facade },
        );
        let stmt = scanned.import_records.get(*record as usize).map(|record| record.stmt as usize);
        if let Some(facades) = stmt.and_then(|stmt| facades_by_stmt.get_mut(stmt)) {
          facades.push(facade);
        }
      }
    }
  }

  let mut stmt_infos = StmtInfos::new();
  for (i, (stmt, facades)) in scanned.stmts.iter().zip(facades_by_stmt).enumerate() {
    let mut declared_symbols =
      stmt.declared.iter().filter_map(|name| symbols.lookup(name)).collect::<Vec<_>>();
    declared_symbols.extend(facades);
    match stmt.kind {
      StmtKind::ExportDefaultExpr { .. }
      | StmtKind::ExportDefaultDecl { name_insert: Some(_), .. } => {
        declared_symbols.push(default_export_ref);
      }
      _ => {}
    }
    let referenced_symbols =
      stmt.referenced.iter().filter_map(|name| symbols.lookup(name)).collect();
    let import_records = raw_import_records
      .iter_enumerated()
      .filter(|(_, record)| record.related_stmt_info_idx.index() == i + 1)
      .map(|(record_idx, _)| record_idx)
      .collect();
    stmt_infos.add_stmt_info(StmtInfo {
      stmt_idx: Some(i),
      declared_symbols,
      referenced_symbols,
      side_effect: stmt.side_effects,
      is_included: false,
      import_records,
    });
  }

  let mut meta = NormalModuleMeta::empty();
  if raw_import_records
    .iter()
    .any(|record| record.meta.contains(ImportRecordMeta::IS_EXPORT_STAR))
  {
    meta.insert(NormalModuleMeta::HAS_STAR_EXPORT);
  }
  if scanned.top_level_await.is_some() {
    meta.insert(NormalModuleMeta::HAS_TOP_LEVEL_AWAIT);
  }

  CreateEcmaViewReturn {
    symbols,
    namespace_object_ref,
    default_export_ref,
    named_imports,
    named_exports,
    stmt_infos,
    raw_import_records,
    meta,
    has_side_effects: scanned.stmts.iter().any(|stmt| stmt.side_effects),
  }
}

#[cfg(test)]
mod tests {
  use kiln_common::{Specifier, StmtInfoIdx};
  use kiln_ecmascript::EcmaCompiler;

  use super::*;

  fn view(source: &str) -> CreateEcmaViewReturn {
    let ast = EcmaCompiler::parse(source.to_string()).unwrap();
    create_ecma_view(ModuleIdx::from_usize(0), "main", &ast)
  }

  #[test]
  fn declares_module_bindings_and_facades() {
    let ret = view("import { a as b } from './a';\nexport const c = b + 1;\nexport default c;\n");
    assert_eq!(ret.symbols.symbol_name(ret.namespace_object_ref.symbol), "main_exports");
    assert_eq!(ret.raw_import_records.len(), 1);
    assert_eq!(ret.raw_import_records[ImportRecordIdx::from_usize(0)].kind, ImportKind::Import);

    let (local, import) = ret.named_imports.first().unwrap();
    assert_eq!(ret.symbols.symbol_name(local.symbol), "b");
    assert_eq!(import.imported, Specifier::Literal("a".into()));

    let c = ret.symbols.lookup("c").unwrap();
    assert_eq!(ret.named_exports["c"].referenced, c);
    // Slot 0 is the namespace statement.
    assert_eq!(ret.stmt_infos.len(), 4);
    assert_eq!(ret.stmt_infos.declared_stmts_by_symbol(&c), [StmtInfoIdx::from_usize(2)]);
  }

  #[test]
  fn re_exports_get_facades() {
    let ret = view("export { x as y } from './x';\nexport * from './z';\n");
    let facade = ret.named_exports["y"].referenced;
    assert_eq!(ret.named_imports[&facade].imported, Specifier::Literal("x".into()));
    assert!(ret.meta.contains(NormalModuleMeta::HAS_STAR_EXPORT));
    assert_eq!(ret.stmt_infos.declared_stmts_by_symbol(&facade), [StmtInfoIdx::from_usize(1)]);
  }

  #[test]
  fn require_calls_become_records() {
    let ret = view("const lib = require('./lib.js');\nmodule.exports = lib;\n");
    let record = &ret.raw_import_records[ImportRecordIdx::from_usize(0)];
    assert_eq!(record.kind, ImportKind::Require);
    assert_eq!(record.specifier, "./lib.js");
    assert_eq!(ret.symbols.symbol_name(record.namespace_ref.symbol), "import_lib");
    assert_eq!(ret.stmt_infos[StmtInfoIdx::from_usize(1)].import_records.len(), 1);
  }

  #[test]
  fn default_expression_declares_facade() {
    let ret = view("export default 1;\n");
    assert_eq!(ret.symbols.symbol_name(ret.default_export_ref.symbol), "main_default");
    assert_eq!(
      ret.stmt_infos.declared_stmts_by_symbol(&ret.default_export_ref),
      [StmtInfoIdx::from_usize(1)]
    );
    assert!(!ret.has_side_effects);
  }
}
