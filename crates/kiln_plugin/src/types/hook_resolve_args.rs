use kiln_common::ImportKind;

#[derive(Debug)]
pub struct OnResolveArgs<'a> {
  /// The specifier as written.
  pub path: &'a str,
  /// `None` for entries.
  pub importer: Option<&'a str>,
  /// The namespace of the importer.
  pub namespace: &'a str,
  pub kind: ImportKind,
}
