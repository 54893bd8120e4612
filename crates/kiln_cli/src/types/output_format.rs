use clap::ValueEnum;

#[derive(PartialEq, Eq, Clone, Copy, ValueEnum)]
#[clap(rename_all = "lower")]
pub enum OutputFormat {
  Esm,
  Cjs,
  Iife,
}

impl From<OutputFormat> for kiln::OutputFormat {
  fn from(value: OutputFormat) -> Self {
    match value {
      OutputFormat::Esm => kiln::OutputFormat::Esm,
      OutputFormat::Cjs => kiln::OutputFormat::Cjs,
      OutputFormat::Iife => kiln::OutputFormat::Iife,
    }
  }
}
