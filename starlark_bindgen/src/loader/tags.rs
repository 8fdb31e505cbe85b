//! Marker extraction from item attributes.

use syn::punctuated::Punctuated;
use syn::{Attribute, Expr, ExprLit, Lit, Meta, Token};

use crate::model::Tags;

/// Collects `+<namespace>:<key>[=<value>]` lines from doc comments.
///
/// Only lines whose first non-blank character is `+` are considered, so tags
/// can sit alongside prose in the same comment.
pub(super) fn doc_tags(attrs: &[Attribute], namespace: &str) -> Tags {
    let mut tags = Tags::default();
    for attr in attrs {
        if !attr.path().is_ident("doc") {
            continue;
        }
        let Meta::NameValue(nv) = &attr.meta else {
            continue;
        };
        let Expr::Lit(ExprLit {
            lit: Lit::Str(doc), ..
        }) = &nv.value
        else {
            continue;
        };
        for line in doc.value().lines() {
            let Some(rest) = line
                .trim()
                .strip_prefix('+')
                .and_then(|rest| rest.strip_prefix(namespace))
                .and_then(|rest| rest.strip_prefix(':'))
            else {
                continue;
            };
            match rest.split_once('=') {
                Some((key, value)) => tags.insert(key.trim(), value.trim()),
                None => tags.insert(rest.trim(), ""),
            }
        }
    }
    tags
}

/// Returns `true` when a field carries `#[serde(flatten)]`.
pub(super) fn is_flattened(attrs: &[Attribute]) -> syn::Result<bool> {
    for attr in attrs {
        if !attr.path().is_ident("serde") {
            continue;
        }
        let metas = attr.parse_args_with(Punctuated::<Meta, Token![,]>::parse_terminated)?;
        if metas
            .iter()
            .any(|meta| matches!(meta, Meta::Path(path) if path.is_ident("flatten")))
        {
            return Ok(true);
        }
    }
    Ok(false)
}
