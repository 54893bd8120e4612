use clap::ValueEnum;

#[derive(PartialEq, Eq, Clone, Copy, ValueEnum)]
#[clap(rename_all = "lower")]
pub enum JsxRuntime {
  Classic,
  Automatic,
}

impl From<JsxRuntime> for kiln::JsxRuntime {
  fn from(value: JsxRuntime) -> Self {
    match value {
      JsxRuntime::Classic => kiln::JsxRuntime::Classic,
      JsxRuntime::Automatic => kiln::JsxRuntime::Automatic,
    }
  }
}
