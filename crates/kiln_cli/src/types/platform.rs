use clap::ValueEnum;

#[derive(PartialEq, Eq, Clone, Copy, ValueEnum)]
#[clap(rename_all = "lower")]
pub enum Platform {
  Node,
  Browser,
  Neutral,
}

impl From<Platform> for kiln::Platform {
  fn from(value: Platform) -> Self {
    match value {
      Platform::Node => kiln::Platform::Node,
      Platform::Browser => kiln::Platform::Browser,
      Platform::Neutral => kiln::Platform::Neutral,
    }
  }
}
