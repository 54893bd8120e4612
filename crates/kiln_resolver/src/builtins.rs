use phf::{phf_set, Set};

static NODE_BUILTINS: Set<&'static str> = phf_set! {
  "assert", "assert/strict", "async_hooks", "buffer", "child_process", "cluster", "console",
  "constants", "crypto", "dgram", "diagnostics_channel", "dns", "dns/promises", "domain",
  "events", "fs", "fs/promises", "http", "http2", "https", "inspector", "module", "net", "os",
  "path", "path/posix", "path/win32", "perf_hooks", "process", "punycode", "querystring",
  "readline", "readline/promises", "repl", "stream", "stream/consumers", "stream/promises",
  "stream/web", "string_decoder", "sys", "timers", "timers/promises", "tls", "trace_events",
  "tty", "url", "util", "util/types", "v8", "vm", "wasi", "worker_threads", "zlib",
};

/// `fs`, `node:fs` and friends. Modules only reachable through the `node:` prefix, such as
/// `node:test`, count too.
pub fn is_node_builtin(specifier: &str) -> bool {
  specifier.strip_prefix("node:").map_or_else(
    || NODE_BUILTINS.contains(specifier),
    |name| !name.is_empty(),
  )
}

#[test]
fn test_is_node_builtin() {
  assert!(is_node_builtin("fs"));
  assert!(is_node_builtin("fs/promises"));
  assert!(is_node_builtin("node:path"));
  assert!(is_node_builtin("node:test"));
  assert!(!is_node_builtin("react"));
  assert!(!is_node_builtin("fs-extra"));
}
