//! Binding generator for Starlark-style host scripts.
//!
//! `starlark_bindgen` reads a directory of Rust model types, selects the root
//! records tagged `+starlark:gen=true` in their doc comments, and emits
//! constructors, wrapper types and dict/list unpackers that let scripts
//! running on the [`starlark_value`](https://docs.rs/starlark_value) runtime
//! build those records.
//!
//! The pipeline is [`loader`] (source to [`model::TypeGraph`]), [`discover`]
//! (reachable nested structs), [`plan`] (per-field conversion plans), [`emit`]
//! (token streams) and [`format`] (pretty-printed source). [`generate_dir`]
//! runs the whole pipeline and is what build scripts call.

pub mod cli;
pub mod config;
pub mod discover;
pub mod emit;
pub mod error;
pub mod format;
pub mod loader;
pub mod model;
pub mod naming;
pub mod output;
pub mod plan;

use camino::Utf8Path;
use tracing::info;

pub use config::GeneratorConfig;
pub use error::BindgenError;
pub use format::Rendered;
pub use loader::LoadedPackage;

/// Generates bindings for an already-loaded package.
///
/// # Errors
///
/// Propagates planning and emission failures. Formatting failures are not
/// errors; see [`format::render`].
pub fn generate(package: &LoadedPackage, config: &GeneratorConfig) -> Result<Rendered, BindgenError> {
    let tokens = emit::Emitter::new(package, config)?.emit()?;
    let rendered = format::render(&format::header(&package.name), tokens);
    info!(
        package = %package.name,
        bytes = rendered.source.len(),
        formatted = rendered.formatted,
        "generated bindings"
    );
    Ok(rendered)
}

/// Loads the model package in `input_dir` and generates its bindings.
///
/// # Errors
///
/// See [`loader::load_dir`] and [`generate`].
pub fn generate_dir(input_dir: &Utf8Path, config: &GeneratorConfig) -> Result<Rendered, BindgenError> {
    let package = loader::load_dir(input_dir, config)?;
    generate(&package, config)
}
