//! Generates host bindings for the `v1alpha1` model package.

use camino::Utf8PathBuf;
use starlark_bindgen::output::{Destination, write_output};
use starlark_bindgen::{GeneratorConfig, generate_dir};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let manifest_dir = Utf8PathBuf::from(std::env::var("CARGO_MANIFEST_DIR")?);
    let out_dir = Utf8PathBuf::from(std::env::var("OUT_DIR")?);
    let model_dir = manifest_dir.join("src").join("v1alpha1");
    println!("cargo::rerun-if-changed={model_dir}");

    let config = GeneratorConfig::load(&model_dir)?;
    let rendered = generate_dir(&model_dir, &config)?;
    if !rendered.formatted {
        println!("cargo::warning=generated bindings did not parse; see {out_dir}");
    }
    let destination = Destination::File {
        dir: out_dir,
        file_name: config.output_file.clone(),
    };
    write_output(&destination, &rendered.source)?;
    Ok(())
}
