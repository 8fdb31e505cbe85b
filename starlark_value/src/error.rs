//! Error type shared by host values, argument binding and unpackers.

use thiserror::Error;

use crate::Value;

/// Errors raised while binding arguments or unpacking host values.
///
/// Nested failures keep their context: a failing dict attribute is wrapped in
/// [`Error::Attribute`] and a failing list element in [`Error::Index`], so the
/// rendered message reads like `unpacking probes: at index 1: expected dict,
/// actual: int`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum Error {
    /// A value of the wrong kind was supplied.
    #[error("expected {expected}, actual: {actual}")]
    UnexpectedType {
        /// Kind the unpacker accepts.
        expected: &'static str,
        /// Kind that was supplied.
        actual: &'static str,
    },

    /// A dict key was not a string.
    #[error("key must be string, got: {0}")]
    NonStringKey(&'static str),

    /// A dict carried a key that the target struct does not declare.
    #[error("unexpected attribute name: {0}")]
    UnexpectedAttribute(String),

    /// Unpacking the value stored under `key` failed.
    #[error("unpacking {key}: {source}")]
    Attribute {
        /// Attribute key being unpacked.
        key: String,
        /// Underlying failure.
        #[source]
        source: Box<Error>,
    },

    /// Unpacking the list element at `index` failed.
    #[error("at index {index}: {source}")]
    Index {
        /// Zero-based position of the failing element.
        index: usize,
        /// Underlying failure.
        #[source]
        source: Box<Error>,
    },

    /// A required parameter received no value.
    #[error("{function}: missing argument for {param}")]
    MissingArgument {
        /// Builtin being called.
        function: String,
        /// Parameter without a value.
        param: String,
    },

    /// A keyword argument matched no parameter.
    #[error("{function}: unexpected keyword argument {param}")]
    UnexpectedKeyword {
        /// Builtin being called.
        function: String,
        /// Unknown keyword.
        param: String,
    },

    /// A parameter was bound twice.
    #[error("{function}: got multiple values for parameter {param}")]
    DuplicateArgument {
        /// Builtin being called.
        function: String,
        /// Parameter bound more than once.
        param: String,
    },

    /// More positional arguments than parameters.
    #[error("{function}: got {got} arguments, want at most {max}")]
    TooManyArguments {
        /// Builtin being called.
        function: String,
        /// Number of positional arguments supplied.
        got: usize,
        /// Number of parameters declared.
        max: usize,
    },

    /// Unpacking an argument into its parameter failed.
    #[error("{function}: for parameter {param}: {source}")]
    Argument {
        /// Builtin being called.
        function: String,
        /// Parameter being bound.
        param: String,
        /// Underlying failure.
        #[source]
        source: Box<Error>,
    },

    /// A frozen container was mutated.
    #[error("cannot modify frozen {0}")]
    Frozen(&'static str),

    /// An integer did not fit the target field.
    #[error("value {value} out of range for {target}")]
    IntOutOfRange {
        /// Supplied integer.
        value: i64,
        /// Rust type of the target field.
        target: &'static str,
    },

    /// A builtin name was registered twice.
    #[error("builtin {0} is already defined")]
    DuplicateBuiltin(String),

    /// No builtin is registered under the requested name.
    #[error("undefined builtin: {0}")]
    UnknownBuiltin(String),
}

impl Error {
    /// Builds an [`Error::UnexpectedType`] describing `actual`.
    #[must_use]
    pub fn unexpected_type(expected: &'static str, actual: &Value) -> Self {
        Self::UnexpectedType {
            expected,
            actual: actual.type_name(),
        }
    }

    /// Wraps `self` with the attribute key it was raised for.
    #[must_use]
    pub fn in_attribute(self, key: impl Into<String>) -> Self {
        Self::Attribute {
            key: key.into(),
            source: Box::new(self),
        }
    }

    /// Wraps `self` with the list position it was raised for.
    #[must_use]
    pub fn at_index(self, index: usize) -> Self {
        Self::Index {
            index,
            source: Box::new(self),
        }
    }

    /// Returns the innermost error once attribute, index and argument context
    /// has been peeled away.
    #[must_use]
    pub fn root_cause(&self) -> &Self {
        match self {
            Self::Attribute { source, .. }
            | Self::Index { source, .. }
            | Self::Argument { source, .. } => source.root_cause(),
            other => other,
        }
    }
}
