use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// `--verbose` and `--silent` win over `RUST_LOG`. Without either, only warnings are logged.
pub fn init_logger(verbose: bool, silent: bool) {
  let filter = if verbose {
    EnvFilter::new("kiln=debug,kiln_resolver=debug,kiln_plugin=debug,kiln_cli=debug")
  } else if silent {
    EnvFilter::new("error")
  } else {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("kiln=warn,kiln_plugin=warn"))
  };

  let fmt_layer = fmt::layer().with_target(false).with_writer(std::io::stderr).compact();
  tracing_subscriber::registry().with(filter).with(fmt_layer).init();
}
