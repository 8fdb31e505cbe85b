//! Registry of builtins exposed to scripts.

use std::collections::BTreeMap;
use std::fmt;

use crate::{Arguments, Error, Thread, Value};

/// Signature of a builtin bound to plugin state `P`.
///
/// The `&str` argument is the name the builtin was registered under; argument
/// binding errors are prefixed with it.
pub type Builtin<P> = fn(&P, &Thread, &str, &Arguments) -> Result<Value, Error>;

/// Named builtins available to scripts.
pub struct Environment<P> {
    builtins: BTreeMap<String, Builtin<P>>,
}

impl<P> Environment<P> {
    /// Creates an empty environment.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            builtins: BTreeMap::new(),
        }
    }

    /// Binds `builtin` under `name`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DuplicateBuiltin`] when `name` is already bound.
    pub fn add_builtin(&mut self, name: impl Into<String>, builtin: Builtin<P>) -> Result<(), Error> {
        let name = name.into();
        if self.builtins.contains_key(&name) {
            return Err(Error::DuplicateBuiltin(name));
        }
        self.builtins.insert(name, builtin);
        Ok(())
    }

    /// Returns `true` when a builtin is bound under `name`.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.builtins.contains_key(name)
    }

    /// Bound names, sorted.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.builtins.keys().map(String::as_str)
    }

    /// Invokes the builtin bound under `name`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownBuiltin`] for unbound names, otherwise whatever
    /// the builtin returns.
    pub fn call(
        &self,
        plugin: &P,
        thread: &Thread,
        name: &str,
        args: &Arguments,
    ) -> Result<Value, Error> {
        let Some((bound_name, builtin)) = self.builtins.get_key_value(name) else {
            return Err(Error::UnknownBuiltin(name.to_owned()));
        };
        builtin(plugin, thread, bound_name, args)
    }
}

impl<P> Default for Environment<P> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P> fmt::Debug for Environment<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Environment")
            .field("builtins", &self.builtins.keys().collect::<Vec<_>>())
            .finish()
    }
}
