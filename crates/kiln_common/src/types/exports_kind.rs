/// How a module hands out its exports.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum ExportsKind {
  /// `import`/`export` syntax.
  Esm,
  /// Assigns to `module.exports` or `exports`.
  CommonJs,
  /// Neither. Decided by how other modules load it.
  #[default]
  None,
}
