//! CLI entrypoint for `starlark-bindgen`.

use std::process::ExitCode;

use clap::Parser;
use starlark_bindgen::cli::Args;
use starlark_bindgen::output::{Destination, write_output};
use starlark_bindgen::{BindgenError, GeneratorConfig, generate_dir};
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    init_tracing();
    let args = Args::parse();
    match run(&args) {
        Ok(destination) => {
            report(&format!("Wrote output to {destination}"));
            ExitCode::SUCCESS
        }
        Err(err) => {
            report(&format!("Error: {err}"));
            ExitCode::FAILURE
        }
    }
}

fn run(args: &Args) -> Result<Destination, BindgenError> {
    let config = GeneratorConfig::load(&args.input_dir)?;
    let rendered = generate_dir(&args.input_dir, &config)?;
    let destination = Destination::from_arg(&args.output, &config.output_file);
    write_output(&destination, &rendered.source)?;
    Ok(destination)
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

#[expect(clippy::print_stderr, reason = "the CLI reports outcomes on stderr")]
fn report(message: &str) {
    eprintln!("{message}");
}
