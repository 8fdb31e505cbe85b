//! Generator configuration.
//!
//! Values are layered with `figment`: built-in defaults, then an optional
//! `starlark-bindgen.toml` inside the input directory, then
//! `STARLARK_BINDGEN_*` environment variables (nested keys use `__`).

use std::collections::{BTreeMap, BTreeSet};

use camino::Utf8Path;
use figment::Figment;
use figment::providers::{Env, Format, Serialized, Toml};
use serde::{Deserialize, Serialize};

use crate::error::BindgenError;
use crate::model::{TypeExpr, TypeGraph};

/// File name of the optional per-package configuration file.
pub const CONFIG_FILE_NAME: &str = "starlark-bindgen.toml";

/// Prefix of configuration environment variables.
pub const ENV_PREFIX: &str = "STARLARK_BINDGEN_";

/// Casing overrides applied when deriving identifiers.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NamingConfig {
    /// Whole-word overrides for lower-camel conversion, e.g.
    /// `HTTPGetAction = "httpGetAction"`.
    pub acronyms: BTreeMap<String, String>,
}

/// Member names and type names with special meaning to the generator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Conventions {
    /// Root member holding the desired-state struct.
    pub spec_member: String,
    /// Root member holding a string-to-string data map.
    pub data_member: String,
    /// Root member holding object metadata (`name`, `labels`, `annotations`).
    pub metadata_member: String,
    /// Local variable names for spec fields that would collide with the
    /// metadata parameters of a root constructor.
    pub reserved_renames: BTreeMap<String, String>,
    /// Struct names the generator never exposes (timestamps and the like).
    pub opaque_types: BTreeSet<String>,
}

impl Default for Conventions {
    fn default() -> Self {
        let reserved_renames = [
            ("args", "specArgs"),
            ("labels", "specLabels"),
            ("annotations", "specAnnotations"),
        ]
        .into_iter()
        .map(|(field, var)| (field.to_owned(), var.to_owned()))
        .collect();
        Self {
            spec_member: "spec".to_owned(),
            data_member: "data".to_owned(),
            metadata_member: "metadata".to_owned(),
            reserved_renames,
            opaque_types: ["Time", "MicroTime"].into_iter().map(str::to_owned).collect(),
        }
    }
}

impl Conventions {
    /// Returns `true` when `ty` is an opaque type or a pointer to one.
    #[must_use]
    pub fn is_opaque(&self, graph: &TypeGraph, ty: &TypeExpr) -> bool {
        let target = match ty {
            TypeExpr::Pointer { elem, .. } => elem.as_ref(),
            other => other,
        };
        graph
            .resolve(target)
            .is_some_and(|t| self.opaque_types.contains(&t.name))
    }
}

/// Settings for one generator run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    /// Package name used for registration prefixes. Defaults to the final
    /// component of the input directory.
    pub package: Option<String>,
    /// Module path of the model types as seen from the generated code.
    /// Defaults to `crate::<package>`.
    pub model_module: Option<String>,
    /// Additional `use` paths emitted into the generated preamble, for
    /// external types referenced by the model.
    pub extra_imports: Vec<String>,
    /// Path of the host runtime crate.
    pub runtime_crate: String,
    /// Name of the plugin type receiving the generated constructors.
    pub plugin_type: String,
    /// File name written inside the output directory.
    pub output_file: String,
    /// Doc-comment tag namespace (`+<namespace>:gen=true`).
    pub tag_namespace: String,
    /// Casing overrides.
    pub naming: NamingConfig,
    /// Special members and types.
    pub conventions: Conventions,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            package: None,
            model_module: None,
            extra_imports: Vec::new(),
            runtime_crate: "starlark_value".to_owned(),
            plugin_type: "Plugin".to_owned(),
            output_file: "types.rs".to_owned(),
            tag_namespace: "starlark".to_owned(),
            naming: NamingConfig::default(),
            conventions: Conventions::default(),
        }
    }
}

impl GeneratorConfig {
    /// Loads the layered configuration for `input_dir`.
    ///
    /// # Errors
    ///
    /// Returns [`BindgenError::Config`] when a layer cannot be parsed or does
    /// not match the configuration schema.
    pub fn load(input_dir: &Utf8Path) -> Result<Self, BindgenError> {
        Figment::from(Serialized::defaults(Self::default()))
            .merge(Toml::file(input_dir.join(CONFIG_FILE_NAME).as_std_path()))
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
            .extract()
            .map_err(|err| BindgenError::Config(Box::new(err)))
    }

    /// The package name for `input_dir`.
    ///
    /// # Errors
    ///
    /// Returns [`BindgenError::MissingPackageName`] when no package is
    /// configured and `input_dir` has no usable final component.
    pub fn package_name(&self, input_dir: &Utf8Path) -> Result<String, BindgenError> {
        if let Some(package) = &self.package {
            return Ok(package.clone());
        }
        input_dir
            .file_name()
            .map(str::to_owned)
            .ok_or_else(|| BindgenError::MissingPackageName(input_dir.to_path_buf()))
    }

    /// The model module path for `package`.
    #[must_use]
    pub fn model_module(&self, package: &str) -> String {
        self.model_module
            .clone()
            .unwrap_or_else(|| format!("crate::{package}"))
    }
}
