//! Command-line interface definitions for `starlark-bindgen`.

use camino::Utf8PathBuf;
use clap::Parser;

/// Parsed CLI arguments for `starlark-bindgen`.
#[derive(Debug, Parser)]
#[command(name = "starlark-bindgen")]
#[command(about = "Generate Starlark host bindings for a package of Rust model types")]
#[command(version)]
#[command(after_help = "Configuration is read from starlark-bindgen.toml in the input \
directory and from STARLARK_BINDGEN_* environment variables.\n\
Set RUST_LOG=debug to trace discovery and planning.")]
pub struct Args {
    /// Directory containing the model package sources.
    #[arg(value_name = "input-dir")]
    pub input_dir: Utf8PathBuf,
    /// Directory to write the generated file into, or `-` for stdout.
    #[arg(value_name = "output-dir")]
    pub output: Utf8PathBuf,
}
