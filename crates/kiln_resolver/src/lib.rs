// A node style module resolver: `oxc_resolver` over `kiln_fs`. A failed lookup lists the paths
// it tried.

mod builtins;
mod error;
mod resolver;

pub use crate::{
  builtins::is_node_builtin,
  error::ResolveError,
  resolver::{ResolveOptions, ResolveReturn, Resolver},
};
