use std::{borrow::Cow, sync::LazyLock};

use regex::{Captures, Regex};
use rustc_hash::FxHashMap;

const PREFIX: &str = "!~{";
const SUFFIX: &str = "}~";

static PLACEHOLDER_REGEX: LazyLock<Regex> = LazyLock::new(|| {
  Regex::new(r"!~\{[0-9a-z]+\}~").expect("placeholder regex is valid")
});

/// Hands out unique fixed-width placeholders that stand in for content hashes until every
/// chunk has been rendered.
#[derive(Debug, Default)]
pub struct HashPlaceholderGenerator {
  next_index: usize,
}

impl HashPlaceholderGenerator {
  /// `len` is the width of the hash the placeholder will be replaced with.
  pub fn generate(&mut self, len: usize) -> String {
    let index = to_base36(self.next_index);
    self.next_index += 1;
    let width = len.saturating_sub(PREFIX.len() + SUFFIX.len()).max(index.len());
    format!("{PREFIX}{index:0>width$}{SUFFIX}")
  }
}

fn to_base36(mut n: usize) -> String {
  const DIGITS: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";
  let mut buf = Vec::new();
  loop {
    buf.push(DIGITS[n % 36]);
    n /= 36;
    if n == 0 {
      break;
    }
  }
  buf.reverse();
  String::from_utf8(buf).unwrap_or_default()
}

pub fn find_hash_placeholders(source: &str) -> impl Iterator<Item = &str> {
  PLACEHOLDER_REGEX.find_iter(source).map(|m| m.as_str())
}

/// Replaces every known placeholder with its final hash. Unknown ones are left untouched.
pub fn replace_hash_placeholders<'a>(
  source: &'a str,
  hashes: &FxHashMap<String, String>,
) -> Cow<'a, str> {
  PLACEHOLDER_REGEX.replace_all(source, |caps: &Captures| {
    let placeholder = &caps[0];
    hashes.get(placeholder).map_or_else(|| placeholder.to_string(), Clone::clone)
  })
}

#[test]
fn test_hash_placeholder() {
  let mut generator = HashPlaceholderGenerator::default();
  let first = generator.generate(8);
  let second = generator.generate(8);
  assert_eq!(first, "!~{000}~");
  assert_eq!(second, "!~{001}~");

  let source = format!("import './{second}.js'; // {first}");
  assert_eq!(find_hash_placeholders(&source).collect::<Vec<_>>(), vec![&*second, &*first]);

  let mut hashes = FxHashMap::default();
  hashes.insert(second.clone(), "abcdefgh".to_string());
  assert_eq!(replace_hash_placeholders(&source, &hashes), "import './abcdefgh.js'; // !~{000}~");
}
