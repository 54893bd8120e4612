use xxhash_rust::xxh3::xxh3_128;

use crate::base64::to_url_safe_base64;

pub fn xxhash_base64_url(input: &[u8]) -> String {
  let hash = xxh3_128(input).to_le_bytes();
  to_url_safe_base64(hash)
}

#[test]
fn test_xxhash_base64_url() {
  let a = xxhash_base64_url(b"export default 1");
  assert_eq!(a, xxhash_base64_url(b"export default 1"));
  assert_ne!(a, xxhash_base64_url(b"export default 2"));
  assert!(a.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_'));
}
