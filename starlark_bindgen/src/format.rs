//! Source rendering for generated bindings.

use proc_macro2::TokenStream;
use tracing::warn;

/// Rendered source text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rendered {
    /// Source text, header included.
    pub source: String,
    /// Whether the body went through the formatter.
    pub formatted: bool,
}

/// Leading comment block of every generated file.
#[must_use]
pub fn header(package: &str) -> String {
    format!(
        "// Code generated by starlark-bindgen. DO NOT EDIT.\n\
         //\n\
         // Host bindings for the `{package}` model package.\n\n"
    )
}

/// Renders `tokens` below `header`.
///
/// Formatting failures are not fatal: the tokens are written as-is and a
/// warning is logged, so the broken output can still be inspected.
#[must_use]
pub fn render(header: &str, tokens: TokenStream) -> Rendered {
    match syn::parse2::<syn::File>(tokens.clone()) {
        Ok(file) => Rendered {
            source: format!("{header}{}", prettyplease::unparse(&file)),
            formatted: true,
        },
        Err(err) => {
            warn!(error = %err, "generated code does not parse; writing it unformatted");
            Rendered {
                source: format!("{header}{tokens}\n"),
                formatted: false,
            }
        }
    }
}
