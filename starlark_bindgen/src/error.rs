//! Error types for `starlark-bindgen`.

use camino::Utf8PathBuf;
use thiserror::Error;

/// Errors surfaced by the `starlark-bindgen` pipeline.
///
/// Every variant aborts generation. Formatting failures are not errors: the
/// unformatted source is emitted instead (see [`crate::format`]).
#[derive(Debug, Error)]
pub enum BindgenError {
    /// Reading input or writing output failed.
    #[error("I/O error at {path}: {source}")]
    Io {
        /// Path being accessed.
        path: Utf8PathBuf,
        /// Underlying failure.
        #[source]
        source: std::io::Error,
    },

    /// A model file is not valid Rust.
    #[error("failed to parse {path}: {source}")]
    Parse {
        /// File that failed to parse.
        path: Utf8PathBuf,
        /// Parser diagnostic.
        #[source]
        source: syn::Error,
    },

    /// A configuration layer could not be read or extracted.
    #[error("failed to load configuration: {0}")]
    Config(#[from] Box<figment::Error>),

    /// No package name was configured and the input path has none.
    #[error("cannot derive a package name from input path {0}; set `package` explicitly")]
    MissingPackageName(Utf8PathBuf),

    /// A marker tag has a malformed value.
    #[error("parsing tags on {item}: {message}")]
    InvalidTag {
        /// Declaration or field carrying the tag.
        item: String,
        /// What is wrong with it.
        message: String,
    },

    /// A field names a type that is neither declared nor imported.
    #[error("type {ty} of field {owner}.{field} is not declared in the input package")]
    UnresolvedType {
        /// Declaring struct.
        owner: String,
        /// Field name.
        field: String,
        /// Type as written.
        ty: String,
    },

    /// Two declarations share a name.
    #[error("type {name} is declared more than once")]
    DuplicateDeclaration {
        /// Repeated name.
        name: String,
    },

    /// A local type name is also used for an external type.
    #[error("type {name} is declared locally and also referenced as external path {path}")]
    ConflictingType {
        /// Clashing name.
        name: String,
        /// External path using it.
        path: String,
    },

    /// A reachable field has no conversion.
    #[error("generating type {owner}: cannot unpack member {field} of type {ty}")]
    UnsupportedField {
        /// Type being generated.
        owner: String,
        /// Field name.
        field: String,
        /// Field type.
        ty: String,
    },

    /// A root type has neither a spec nor a data member.
    #[error("type has no spec or data field: {0}")]
    MissingSpecOrData(String),

    /// A root type has both a spec and a data member.
    #[error("type {0} has both spec and data fields")]
    AmbiguousRoot(String),

    /// A root's spec member is not a struct.
    #[error("spec field of {owner} must name a struct, found {ty}")]
    SpecNotStruct {
        /// Root type.
        owner: String,
        /// Spec member type.
        ty: String,
    },

    /// A flattened member is not a struct.
    #[error("embedded member {field} of {owner} must name a struct, found {ty}")]
    EmbeddedNotStruct {
        /// Embedding struct.
        owner: String,
        /// Flattened member.
        field: String,
        /// Member type.
        ty: String,
    },

    /// Two members map to the same host attribute.
    #[error("type {owner} exposes attribute '{key}' more than once")]
    DuplicateAttribute {
        /// Type whose surface clashes.
        owner: String,
        /// Repeated attribute.
        key: String,
    },

    /// A generated name is not unique in the output.
    #[error("generated name {0} is used twice or collides with an imported name")]
    NameCollision(String),

    /// A name cannot be spelled as a Rust identifier.
    #[error("{what} '{value}' is not a valid Rust identifier")]
    InvalidIdentifier {
        /// Role of the name.
        what: &'static str,
        /// Offending name.
        value: String,
    },

    /// A configured module path does not parse.
    #[error("{what} '{value}' is not a valid Rust path: {source}")]
    InvalidPath {
        /// Role of the path.
        what: &'static str,
        /// Offending path.
        value: String,
        /// Parser diagnostic.
        #[source]
        source: syn::Error,
    },
}
