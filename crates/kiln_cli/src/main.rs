mod args;
mod config;
mod logger;
mod types;

use std::{process::ExitCode, time::Instant};

use ansi_term::Colour;
use args::{EnhanceArgs, InputArgs, LogArgs, OutputArgs};
use clap::Parser;

use kiln::{BuildDiagnostic, Bundler, BundlerOptions, WriteOutput};

#[derive(Parser)]
#[command(version, about, long_about = None)]
struct Commands {
  #[clap(flatten)]
  input: InputArgs,

  #[clap(flatten)]
  output: OutputArgs,

  #[clap(flatten)]
  enhance: EnhanceArgs,

  #[clap(flatten)]
  log: LogArgs,
}

/// One line per written file, with the paths `write` reported.
fn print_output_assets(written: &WriteOutput) {
  let mut left = 0;
  let mut right = 0;

  let mut assets = Vec::with_capacity(written.output.assets.len());

  for (output, path) in written.output.assets.iter().zip(&written.written_files) {
    #[allow(clippy::cast_precision_loss)]
    let size = format!("{:.2}", output.content_as_bytes().len() as f64 / 1024.0);
    let (dir, filename) = path.rsplit_once('/').unwrap_or(("", path.as_str()));

    right = right.max(size.len());
    left = left.max(path.len());

    assets.push((dir, filename, size, output.as_chunk().is_some()));
  }

  let dim = Colour::White.dimmed();
  let color = Colour::Cyan;

  for (dir, filename, size, is_chunk) in assets {
    let asset_type = if is_chunk { "chunk" } else { "asset" };
    let dir = if dir.is_empty() { String::new() } else { format!("{dir}/") };
    let path_len = dir.len() + filename.len();

    println!(
      "{}{}{:left$} {}{}{:right$}{} kB",
      dim.paint(dir),
      color.paint(filename),
      "",
      dim.paint(asset_type),
      dim.paint(" │ size: "),
      "",
      size,
      left = left - path_len,
      right = right - size.len()
    );
  }
}

fn print_diagnostics(label: &str, colour: Colour, diagnostics: &[BuildDiagnostic]) {
  for diagnostic in diagnostics {
    eprintln!("{} [{}] {}", colour.paint(label), diagnostic.code(), diagnostic);
  }
}

fn bundler_options(args: Commands) -> anyhow::Result<BundlerOptions> {
  let config = match &args.input.config {
    Some(path) => config::load_config(path)?,
    None => BundlerOptions::default(),
  };
  config::overlay_args(config, args.input, args.output, args.enhance)
}

#[tokio::main]
async fn main() -> ExitCode {
  let args = Commands::parse();
  let LogArgs { verbose, silent } = args.log;
  logger::init_logger(verbose, silent);

  let options = match bundler_options(args) {
    Ok(options) => options,
    Err(err) => {
      eprintln!("{} {err:#}", Colour::Red.paint("Error:"));
      return ExitCode::FAILURE;
    }
  };

  tracing::debug!(?options, "bundler options");

  let start = Instant::now();
  let mut bundler = Bundler::new(options);
  let result = bundler.write().await;
  bundler.close();

  match result {
    Ok(written) => {
      if !silent {
        print_diagnostics("Warning:", Colour::Yellow, &written.output.warnings);
        if !written.output.assets.is_empty() {
          print_output_assets(&written);
        }
        let elapsed = format!("{:.2} ms", start.elapsed().as_secs_f64() * 1000.0);
        println!("\n{} Finished in {}", Colour::Green.paint("✔"), Colour::White.bold().paint(elapsed));
      }
      ExitCode::SUCCESS
    }
    Err(errors) => {
      print_diagnostics("Error:", Colour::Red, &errors);
      ExitCode::FAILURE
    }
  }
}
