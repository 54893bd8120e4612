use phf::{phf_set, Set};

use crate::concat_string;

/// Words that can never be used as a binding name in strict-mode module code.
pub static RESERVED_KEYWORDS: Set<&'static str> = phf_set! {
  "arguments", "await", "break", "case", "catch", "class", "const", "continue", "debugger",
  "default", "delete", "do", "else", "enum", "eval", "export", "extends", "false", "finally",
  "for", "function", "if", "implements", "import", "in", "instanceof", "interface", "let", "new",
  "null", "package", "private", "protected", "public", "return", "static", "super", "switch",
  "this", "throw", "true", "try", "typeof", "undefined", "var", "void", "while", "with", "yield",
};

/// Global names generated code may read. A renamed top-level binding must not shadow them.
pub static GLOBAL_OBJECTS: Set<&'static str> = phf_set! {
  "Array", "ArrayBuffer", "BigInt", "Boolean", "DataView", "Date", "Error", "EvalError",
  "Function", "Infinity", "JSON", "Map", "Math", "NaN", "Number", "Object", "Promise", "Proxy",
  "RangeError", "ReferenceError", "Reflect", "RegExp", "Set", "String", "Symbol", "SyntaxError",
  "TypeError", "URIError", "WeakMap", "WeakSet", "console", "document", "exports", "globalThis",
  "module", "process", "require", "self", "window", "__dirname", "__filename",
};

fn is_id_start(c: char) -> bool {
  c == '$' || c == '_' || c.is_ascii_alphabetic() || (!c.is_ascii() && c.is_alphabetic())
}

fn is_id_continue(c: char) -> bool {
  is_id_start(c) || c.is_ascii_digit() || c == '\u{200c}' || c == '\u{200d}'
    || (!c.is_ascii() && c.is_alphanumeric())
}

pub fn is_validate_identifier_name(name: &str) -> bool {
  let mut chars = name.chars();
  chars.next().is_some_and(is_id_start) && chars.all(is_id_continue)
}

pub fn property_access_str(obj: &str, prop: &str) -> String {
  if is_validate_identifier_name(prop) {
    concat_string!(obj, ".", prop)
  } else {
    concat_string!(obj, "[", quote(prop), "]")
  }
}

pub fn to_module_import_export_name(name: &str) -> String {
  if is_validate_identifier_name(name) { name.into() } else { quote(name) }
}

/// Quotes `s` as a JSON string literal, which is also a valid JS string literal.
pub fn quote(s: &str) -> String {
  serde_json::Value::String(s.to_string()).to_string()
}

/// Turns an arbitrary name (usually a file stem) into a valid binding name.
pub fn legitimize_identifier_name(name: &str) -> String {
  let mut legitimized = String::with_capacity(name.len());
  for (i, c) in name.chars().enumerate() {
    let valid = if i == 0 { is_id_start(c) } else { is_id_continue(c) };
    if valid {
      legitimized.push(c);
    } else if i == 0 && c.is_ascii_digit() {
      legitimized.push('_');
      legitimized.push(c);
    } else {
      legitimized.push('_');
    }
  }
  if legitimized.is_empty() {
    legitimized.push('_');
  }
  legitimized
}

#[test]
fn test_is_validate_identifier_name() {
  assert!(is_validate_identifier_name("foo"));
  assert!(is_validate_identifier_name("$foo_1"));
  assert!(!is_validate_identifier_name("1aaaa"));
  assert!(!is_validate_identifier_name("😈"));
  assert!(!is_validate_identifier_name(""));
}

#[test]
fn test_property_access_str() {
  assert_eq!(property_access_str("ns", "foo"), "ns.foo");
  assert_eq!(property_access_str("ns", "a-b"), r#"ns["a-b"]"#);
}

#[test]
fn test_legitimize_identifier_name() {
  assert_eq!(legitimize_identifier_name("react-dom"), "react_dom");
  assert_eq!(legitimize_identifier_name("1abc"), "_1abc");
  assert_eq!(legitimize_identifier_name("virtual:config"), "virtual_config");
}
