use kiln_error::BuildDiagnostic;

/// What an `onEnd` callback learns about the finished build.
#[derive(Debug)]
pub struct OnEndArgs<'a> {
  pub errors: &'a [BuildDiagnostic],
  pub warnings: &'a [BuildDiagnostic],
  /// File names of the outputs, empty for failed builds.
  pub output_files: Vec<&'a str>,
}
