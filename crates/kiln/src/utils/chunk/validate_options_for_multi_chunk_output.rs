use kiln_common::NormalizedBundlerOptions;
use kiln_error::{BuildDiagnostic, BuildResult};

pub fn validate_options_for_multi_chunk_output(
  options: &NormalizedBundlerOptions,
) -> BuildResult<()> {
  options.file.as_ref().map_or(Ok(()), |_| {
    Err(BuildDiagnostic::InvalidOption(
      "When building multiple chunks, the \"dir\" option must be used, not \"file\".".to_string(),
    ))?
  })
}
