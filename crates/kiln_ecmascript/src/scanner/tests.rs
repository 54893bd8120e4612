use super::*;

fn kinds(result: &ScanResult) -> Vec<StmtKind> {
  result.stmts.iter().map(|stmt| stmt.kind).collect()
}

#[test]
fn collects_imports_and_exports() {
  let source = r#"import def, { a as b, c } from "./x";
import * as ns from "./ns";
import "./side";
export const value = b + c;
export default function () {}
export { value as renamed, def };
export * from "./star";
export { x as y } from "./re";
"#;
  let result = scan(source).unwrap();

  let specifiers: Vec<_> = result.import_records.iter().map(|r| r.specifier.as_str()).collect();
  assert_eq!(specifiers, ["./x", "./ns", "./side", "./star", "./re"]);
  assert!(result.import_records[2].meta.contains(ImportRecordMeta::IS_PLAIN_IMPORT));
  assert!(result.import_records[3].meta.contains(ImportRecordMeta::IS_EXPORT_STAR));
  assert_eq!(result.star_exports, [3]);

  let imports: Vec<_> =
    result.named_imports.iter().map(|i| (i.local.as_str(), i.imported.clone())).collect();
  assert_eq!(
    imports,
    [
      ("def", ImportedName::Default),
      ("b", ImportedName::Name("a".to_string())),
      ("c", ImportedName::Name("c".to_string())),
      ("ns", ImportedName::Star),
    ]
  );

  assert_eq!(
    result.exports,
    [
      ScannedExport::Local { exported: "value".into(), local: ExportLocal::Name("value".into()) },
      ScannedExport::Local { exported: "default".into(), local: ExportLocal::DefaultExpression },
      ScannedExport::Local { exported: "renamed".into(), local: ExportLocal::Name("value".into()) },
      ScannedExport::Local { exported: "def".into(), local: ExportLocal::Name("def".into()) },
      ScannedExport::ReExport {
        exported: "y".into(),
        imported: ImportedName::Name("x".into()),
        record: 4
      },
    ]
  );

  let kinds = kinds(&result);
  assert_eq!(kinds.len(), 8);
  assert!(matches!(kinds[0], StmtKind::Import { record: 0 }));
  assert!(matches!(kinds[3], StmtKind::ExportDecl { .. }));
  assert!(matches!(kinds[4], StmtKind::ExportDefaultDecl { name_insert: Some(_), .. }));
  assert!(matches!(kinds[5], StmtKind::ExportClause));

  assert_eq!(result.stmts[3].declared, ["value"]);
  assert_eq!(result.stmts[3].referenced, ["b", "c"]);
  assert_eq!(result.stmts[3].span.source_text(source), "export const value = b + c;");
}

#[test]
fn classifies_side_effects() {
  let source = "const a = 1;
const b = foo();
const c = /* @__PURE__ */ foo();
function d() { bar(); }
console.log(a);
class E extends Base {}
let f = () => g();
x = 1;
class G { y = h(); }
";
  let result = scan(source).unwrap();
  let flags: Vec<_> = result.stmts.iter().map(|stmt| stmt.side_effects).collect();
  assert_eq!(flags, [false, true, false, false, true, true, false, true, false]);
}

#[test]
fn shorthand_properties_and_shadowing() {
  let source = "const a = 1;
function f(a) { return { a }; }
const o = { a };
";
  let result = scan(source).unwrap();
  let shorthand: Vec<_> = result.refs.iter().filter(|r| r.is_shorthand()).collect();
  assert_eq!(shorthand.len(), 1);
  assert_eq!(shorthand[0].stmt, 2);
  assert!(result.nested_names.contains("a"));
  assert_eq!(result.stmts[1].referenced, Vec::<String>::new());
  assert_eq!(result.stmts[2].referenced, ["a"]);
}

#[test]
fn dynamic_imports_and_top_level_await() {
  let source = r#"try { await import("./lazy"); } catch {}
const later = () => import("./later");
"#;
  let result = scan(source).unwrap();
  assert_eq!(result.import_records.len(), 2);
  let lazy = &result.import_records[0];
  assert_eq!(lazy.kind, ScannedImportKind::Dynamic);
  assert!(lazy.meta.contains(ImportRecordMeta::IN_TRY_BLOCK));
  assert_eq!(lazy.span.source_text(source), r#"import("./lazy")"#);
  assert!(result.import_records[1].meta.is_empty());
  assert!(result.top_level_await.is_some());
  assert!(!result.stmts[1].side_effects);
}

#[test]
fn unresolved_names_are_globals() {
  let result = scan("let x = 1\nconsole.log(window.x, x)\n").unwrap();
  let globals: Vec<_> = result
    .global_refs
    .iter()
    .map(|r| r.span.source_text("let x = 1\nconsole.log(window.x, x)\n"))
    .collect();
  assert_eq!(globals, ["console", "window"]);
  assert_eq!(result.stmts.len(), 2);
  assert_eq!(result.stmts[1].referenced, ["x"]);
}

#[test]
fn hoisted_var_inside_block() {
  let result = scan("if (ok) { var flag = true; }\nexport { flag };\n").unwrap();
  assert_eq!(result.stmts[0].declared, ["flag"]);
  assert!(result.stmts[0].side_effects);
}

#[test]
fn default_export_forms() {
  let named = scan("export default class Foo {}").unwrap();
  assert_eq!(named.default_export(), Some(&ExportLocal::Name("Foo".into())));
  assert!(matches!(named.stmts[0].kind, StmtKind::ExportDefaultDecl { name_insert: None, .. }));

  let expression = scan("export default 1 + 2;").unwrap();
  assert_eq!(expression.default_export(), Some(&ExportLocal::DefaultExpression));
  assert!(matches!(expression.stmts[0].kind, StmtKind::ExportDefaultExpr { .. }));
}

#[test]
fn exporting_an_undeclared_name_fails() {
  let errors = scan("export { missing };").unwrap_err();
  assert_eq!(errors.len(), 1);
  assert_eq!(errors[0].to_string(), "1:10: Export \"missing\" is not defined");
}

#[test]
fn require_calls_and_commonjs_markers() {
  let source = r#"const lib = require("./lib.js");
let opt;
try { opt = require("./optional.js"); } catch {}
function local(require) { return require("./not-a-record"); }
module.exports = { lib, opt };
"#;
  let result = scan(source).unwrap();
  let records: Vec<_> = result
    .import_records
    .iter()
    .map(|r| (r.specifier.as_str(), r.kind, r.meta.contains(ImportRecordMeta::IN_TRY_BLOCK)))
    .collect();
  assert_eq!(
    records,
    [
      ("./lib.js", ScannedImportKind::Require, false),
      ("./optional.js", ScannedImportKind::Require, true),
    ]
  );
  assert_eq!(result.import_records[0].span.source_text(source), r#"require("./lib.js")"#);
  assert_eq!(result.import_records[1].stmt, 2);
  assert!(result.uses_commonjs);
  assert!(!result.has_module_syntax);
}

#[test]
fn module_syntax_is_detected() {
  assert!(scan("console.log(import.meta.url);").unwrap().has_module_syntax);
  assert!(scan("export {};").unwrap().has_module_syntax);
  let plain = scan("const exports = {};\nexports.a = 1;").unwrap();
  assert!(!plain.has_module_syntax);
  assert!(!plain.uses_commonjs);
}

#[test]
fn named_values_for_keep_names() {
  let source = "function f() {}
export class C {}
const g = () => {}, h = function () {}, k = function named() {}, n = 1;
export default function d() {}
";
  let result = scan(source).unwrap();
  let names: Vec<_> = result.stmts.iter().map(|stmt| stmt.named_values.clone()).collect();
  assert_eq!(
    names,
    [vec!["f".to_string()], vec!["C".to_string()], vec!["g".to_string(), "h".to_string()], vec![
      "d".to_string()
    ]]
  );
}
