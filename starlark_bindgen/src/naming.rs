//! Identifier casing and validation.

use heck::{ToLowerCamelCase, ToSnakeCase};
use proc_macro2::{Ident, Span};

use crate::config::NamingConfig;
use crate::error::BindgenError;

/// Derives generated identifiers and host-visible names.
#[derive(Debug, Clone, Copy)]
pub struct Naming<'a> {
    config: &'a NamingConfig,
}

impl<'a> Naming<'a> {
    /// Creates a namer honouring `config`'s acronym overrides.
    #[must_use]
    pub const fn new(config: &'a NamingConfig) -> Self {
        Self { config }
    }

    /// Lower-camel form of `name`. Whole-word overrides win over the
    /// mechanical conversion.
    #[must_use]
    pub fn lower_camel(&self, name: &str) -> String {
        self.config
            .acronyms
            .get(name)
            .cloned()
            .unwrap_or_else(|| name.to_lower_camel_case())
    }

    /// Snake-case form of `name`, used for host-visible keys.
    #[must_use]
    pub fn snake(&self, name: &str) -> String {
        name.to_snake_case()
    }

    /// Name a constructor for `type_name` is registered under.
    #[must_use]
    pub fn registered_name(&self, package: &str, type_name: &str) -> String {
        format!("{package}.{}", self.snake(type_name))
    }
}

const RESERVED: &[&str] = &["self", "Self", "super", "crate", "_"];

/// Builds an identifier, escaping keywords as raw identifiers.
///
/// # Errors
///
/// Returns [`BindgenError::InvalidIdentifier`] when `name` cannot be spelled
/// as a Rust identifier at all.
pub fn ident(what: &'static str, name: &str) -> Result<Ident, BindgenError> {
    let invalid = || BindgenError::InvalidIdentifier {
        what,
        value: name.to_owned(),
    };
    let mut chars = name.chars();
    let starts_well = chars
        .next()
        .is_some_and(|c| c == '_' || c.is_alphabetic());
    if !starts_well || !chars.all(|c| c == '_' || c.is_alphanumeric()) || RESERVED.contains(&name) {
        return Err(invalid());
    }
    if syn::parse_str::<Ident>(name).is_ok() {
        Ok(Ident::new(name, Span::call_site()))
    } else {
        Ok(Ident::new_raw(name, Span::call_site()))
    }
}
