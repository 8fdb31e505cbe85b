//! Lowering of `syn::Type` into [`TypeExpr`].
//!
//! Containers are recognised by their final path segment, so both `Vec<T>`
//! and `std::vec::Vec<T>` match. Names that are neither containers nor
//! scalars resolve against the package's own declarations first, then
//! against its `use` imports.

use std::collections::{BTreeMap, BTreeSet};

use quote::ToTokens;
use syn::{GenericArgument, PathArguments, Type, TypePath};

use crate::error::BindgenError;
use crate::model::{ScalarKind, TypeExpr};

/// Classifies a built-in scalar name.
pub(super) fn scalar_kind(name: &str) -> Option<ScalarKind> {
    match name {
        "String" => Some(ScalarKind::String),
        "bool" => Some(ScalarKind::Bool),
        "i8" | "i16" | "i32" | "i64" | "isize" | "u8" | "u16" | "u32" | "u64" | "usize" => {
            Some(ScalarKind::Int)
        }
        "i128" | "u128" | "f32" | "f64" | "char" => Some(ScalarKind::Other),
        _ => None,
    }
}

fn type_arguments(args: &PathArguments) -> Vec<&Type> {
    let PathArguments::AngleBracketed(angle_args) = args else {
        return Vec::new();
    };
    angle_args
        .args
        .iter()
        .filter_map(|arg| match arg {
            GenericArgument::Type(inner) => Some(inner),
            _ => None,
        })
        .collect()
}

/// Returns the inner type if `ty` is `Box<T>`.
fn box_inner(ty: &Type) -> Option<&Type> {
    let Type::Path(p) = ty else {
        return None;
    };
    let last = p.path.segments.last()?;
    if last.ident != "Box" {
        return None;
    }
    match type_arguments(&last.arguments).as_slice() {
        [inner] => Some(*inner),
        _ => None,
    }
}

fn render(tokens: &impl ToTokens) -> String {
    tokens.to_token_stream().to_string()
}

/// A type referenced through a `use` import or a qualified path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(super) struct ExternalRef {
    pub(super) name: String,
    pub(super) module: String,
}

/// Per-package lowering state.
pub(super) struct Lowering<'a> {
    locals: &'a BTreeSet<String>,
    imports: &'a BTreeMap<String, String>,
    model_module: &'a str,
    externals: BTreeMap<String, ExternalRef>,
}

/// Where an unresolvable name was found, for error reporting.
pub(super) struct Site<'a> {
    pub(super) owner: &'a str,
    pub(super) field: &'a str,
}

impl<'a> Lowering<'a> {
    pub(super) fn new(
        locals: &'a BTreeSet<String>,
        imports: &'a BTreeMap<String, String>,
        model_module: &'a str,
    ) -> Self {
        Self {
            locals,
            imports,
            model_module,
            externals: BTreeMap::new(),
        }
    }

    /// External types referenced so far, keyed by name.
    pub(super) fn into_externals(self) -> BTreeMap<String, ExternalRef> {
        self.externals
    }

    pub(super) fn lower(&mut self, ty: &Type, site: &Site<'_>) -> Result<TypeExpr, BindgenError> {
        match ty {
            Type::Path(path) if path.qself.is_none() => self.lower_path(path, site),
            Type::Group(group) => self.lower(&group.elem, site),
            Type::Paren(paren) => self.lower(&paren.elem, site),
            other => Ok(TypeExpr::Unsupported(render(other))),
        }
    }

    fn lower_path(&mut self, ty: &TypePath, site: &Site<'_>) -> Result<TypeExpr, BindgenError> {
        let Some(last) = ty.path.segments.last() else {
            return Ok(TypeExpr::Unsupported(render(ty)));
        };
        let name = last.ident.to_string();
        let args = type_arguments(&last.arguments);
        match (name.as_str(), args.as_slice()) {
            ("Option", [inner]) => {
                if let Some(boxed) = box_inner(inner) {
                    Ok(TypeExpr::Pointer {
                        elem: Box::new(self.lower(boxed, site)?),
                        boxed: true,
                    })
                } else {
                    Ok(TypeExpr::optional(self.lower(inner, site)?))
                }
            }
            ("Vec", [inner]) => Ok(TypeExpr::slice(self.lower(inner, site)?)),
            ("BTreeMap" | "HashMap" | "IndexMap", [key, value, ..]) => Ok(TypeExpr::map(
                self.lower(key, site)?,
                self.lower(value, site)?,
            )),
            (_, []) if !last.arguments.is_empty() => Ok(TypeExpr::Unsupported(render(ty))),
            (_, []) => {
                if let Some(kind) = scalar_kind(&name) {
                    return Ok(TypeExpr::scalar(name.clone(), kind));
                }
                self.lower_named(ty, name.clone(), site)
            }
            _ => Ok(TypeExpr::Unsupported(render(ty))),
        }
    }

    fn lower_named(
        &mut self,
        ty: &TypePath,
        name: String,
        site: &Site<'_>,
    ) -> Result<TypeExpr, BindgenError> {
        let prefix: Vec<String> = ty
            .path
            .segments
            .iter()
            .rev()
            .skip(1)
            .rev()
            .map(|segment| segment.ident.to_string())
            .collect();

        let module = if prefix.is_empty() {
            if self.locals.contains(&name) {
                return Ok(TypeExpr::Named(name));
            }
            let Some(module) = self.imports.get(&name) else {
                return Err(BindgenError::UnresolvedType {
                    owner: site.owner.to_owned(),
                    field: site.field.to_owned(),
                    ty: render(ty),
                });
            };
            module.clone()
        } else {
            let expanded = self.expand_prefix(&prefix);
            if expanded == self.model_module && self.locals.contains(&name) {
                return Ok(TypeExpr::Named(name));
            }
            expanded
        };

        if self.locals.contains(&name) {
            return Err(BindgenError::ConflictingType {
                path: format!("{module}::{name}"),
                name,
            });
        }
        if let Some(seen) = self.externals.get(&name) {
            if seen.module != module {
                return Err(BindgenError::ConflictingType {
                    path: format!("{module}::{name}"),
                    name,
                });
            }
            return Ok(TypeExpr::Named(name));
        }
        self.externals.insert(
            name.clone(),
            ExternalRef {
                name: name.clone(),
                module,
            },
        );
        Ok(TypeExpr::Named(name))
    }

    /// Rewrites a module prefix so it resolves from outside the model module.
    fn expand_prefix(&self, prefix: &[String]) -> String {
        let Some((first, rest)) = prefix.split_first() else {
            return self.model_module.to_owned();
        };
        let head = match first.as_str() {
            "self" => self.model_module.to_owned(),
            "super" => parent_module(self.model_module),
            other => self
                .imports
                .get(other)
                .map_or_else(|| other.to_owned(), |module| format!("{module}::{other}")),
        };
        std::iter::once(head)
            .chain(rest.iter().cloned())
            .collect::<Vec<_>>()
            .join("::")
    }
}

/// The parent of a `::`-separated module path.
pub(super) fn parent_module(module: &str) -> String {
    module
        .rsplit_once("::")
        .map_or_else(|| "crate".to_owned(), |(parent, _)| parent.to_owned())
}
