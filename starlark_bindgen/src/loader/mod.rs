//! Loads a package of Rust model types into a [`TypeGraph`].
//!
//! The input is a directory of `.rs` files (non-recursive, sorted by file
//! name). Top-level structs, enums and type aliases become declarations;
//! `use` imports and qualified paths introduce external structs whose members
//! are unknown. Structs whose doc comment carries `+<namespace>:gen=true` are
//! the package's roots.

mod tags;
mod types;

use std::collections::{BTreeMap, BTreeSet};

use camino::{Utf8Path, Utf8PathBuf};
use cap_std::ambient_authority;
use cap_std::fs_utf8::Dir;
use syn::ext::IdentExt;
use syn::{Fields, Item, UseTree};
use tracing::{debug, info};

use crate::config::GeneratorConfig;
use crate::error::BindgenError;
use crate::model::{FieldDescriptor, Shape, TypeDescriptor, TypeGraph};

use self::tags::{doc_tags, is_flattened};
use self::types::{Lowering, Site, parent_module};

/// Tag selecting a struct as a root type.
pub const GEN_TAG: &str = "gen";

/// Tag marking a string or string-list field as a local filesystem path.
pub const LOCAL_PATH_TAG: &str = "local-path";

/// A loaded model package.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadedPackage {
    /// Package name used in registered constructor names.
    pub name: String,
    /// Module path of the model types as seen from generated code.
    pub model_module: String,
    /// Every declaration reachable by name.
    pub graph: TypeGraph,
    /// Names of the root types, sorted.
    pub roots: Vec<String>,
}

impl LoadedPackage {
    /// Root declarations in name order.
    #[must_use]
    pub fn root_types(&self) -> Vec<&TypeDescriptor> {
        self.roots
            .iter()
            .filter_map(|name| self.graph.get(name))
            .collect()
    }
}

/// One parsed source file.
#[derive(Debug, Clone)]
pub struct SourceFile {
    /// Path used in diagnostics.
    pub path: Utf8PathBuf,
    /// File contents.
    pub contents: String,
}

/// Reads every `.rs` file directly inside `input_dir`.
///
/// # Errors
///
/// Returns [`BindgenError::Io`] when the directory or a file cannot be read.
pub fn read_sources(input_dir: &Utf8Path) -> Result<Vec<SourceFile>, BindgenError> {
    let io_err = |source| BindgenError::Io {
        path: input_dir.to_path_buf(),
        source,
    };
    let dir = Dir::open_ambient_dir(input_dir, ambient_authority()).map_err(io_err)?;
    let mut names = Vec::new();
    for entry in dir.entries().map_err(io_err)? {
        let entry = entry.map_err(io_err)?;
        let name = entry.file_name().map_err(io_err)?;
        if name.ends_with(".rs") && entry.file_type().map_err(io_err)?.is_file() {
            names.push(name);
        }
    }
    names.sort();

    names
        .into_iter()
        .map(|name| {
            let path = input_dir.join(&name);
            let contents = dir.read_to_string(&name).map_err(|source| BindgenError::Io {
                path: path.clone(),
                source,
            })?;
            Ok(SourceFile { path, contents })
        })
        .collect()
}

/// Loads the package in `input_dir`.
///
/// # Errors
///
/// Propagates I/O and parse failures, unresolvable field types, conflicting
/// declarations and malformed root tags.
pub fn load_dir(input_dir: &Utf8Path, config: &GeneratorConfig) -> Result<LoadedPackage, BindgenError> {
    let name = config.package_name(input_dir)?;
    let sources = read_sources(input_dir)?;
    load_sources(&name, &sources, config)
}

/// Loads a package from already-read sources.
///
/// # Errors
///
/// See [`load_dir`].
pub fn load_sources(
    package: &str,
    sources: &[SourceFile],
    config: &GeneratorConfig,
) -> Result<LoadedPackage, BindgenError> {
    let model_module = config.model_module(package);
    let mut items = Vec::new();
    for source in sources {
        let file = syn::parse_file(&source.contents).map_err(|err| BindgenError::Parse {
            path: source.path.clone(),
            source: err,
        })?;
        debug!(path = %source.path, items = file.items.len(), "parsed model file");
        items.extend(file.items.into_iter().map(|item| (source.path.clone(), item)));
    }

    let mut locals = BTreeSet::new();
    let mut imports = BTreeMap::new();
    for (_, item) in &items {
        match item {
            Item::Struct(s) => declare(&mut locals, s.ident.unraw().to_string())?,
            Item::Enum(e) => declare(&mut locals, e.ident.unraw().to_string())?,
            Item::Type(t) => declare(&mut locals, t.ident.unraw().to_string())?,
            Item::Use(u) => collect_imports(&u.tree, &[], &model_module, &mut imports),
            _ => {}
        }
    }

    let mut lowering = Lowering::new(&locals, &imports, &model_module);
    let mut graph = TypeGraph::new();
    let mut roots = Vec::new();
    for (path, item) in &items {
        let Some(descriptor) = lower_item(item, &model_module, &config.tag_namespace, &mut lowering)
            .map_err(|err| match err {
                LowerItemError::Attr(source) => BindgenError::Parse {
                    path: path.clone(),
                    source,
                },
                LowerItemError::Bindgen(err) => err,
            })?
        else {
            continue;
        };
        if descriptor.is_struct() && descriptor.tags.flag(GEN_TAG, false, &descriptor.name)? {
            roots.push(descriptor.name.clone());
        }
        graph.insert(descriptor);
    }

    for (name, external) in lowering.into_externals() {
        graph.insert(TypeDescriptor::new_struct(name, external.module, Vec::new()));
    }

    roots.sort();
    info!(
        package,
        roots = roots.len(),
        types = graph.iter().count(),
        "loaded model package"
    );
    Ok(LoadedPackage {
        name: package.to_owned(),
        model_module,
        graph,
        roots,
    })
}

fn declare(locals: &mut BTreeSet<String>, name: String) -> Result<(), BindgenError> {
    if locals.contains(&name) {
        return Err(BindgenError::DuplicateDeclaration { name });
    }
    locals.insert(name);
    Ok(())
}

/// Flattens a `use` tree into `name -> module` entries. Globs and renames are
/// not followed.
fn collect_imports(
    tree: &UseTree,
    prefix: &[String],
    model_module: &str,
    out: &mut BTreeMap<String, String>,
) {
    match tree {
        UseTree::Path(path) => {
            let mut next = prefix.to_vec();
            next.push(path.ident.to_string());
            collect_imports(&path.tree, &next, model_module, out);
        }
        UseTree::Name(name) => {
            let ident = name.ident.to_string();
            if ident == "self" {
                if let Some((last, parent)) = prefix.split_last() {
                    out.insert(last.clone(), absolute_module(parent, model_module));
                }
            } else if !prefix.is_empty() {
                out.insert(ident, absolute_module(prefix, model_module));
            }
        }
        UseTree::Group(group) => {
            for item in &group.items {
                collect_imports(item, prefix, model_module, out);
            }
        }
        UseTree::Rename(_) | UseTree::Glob(_) => {}
    }
}

fn absolute_module(segments: &[String], model_module: &str) -> String {
    let Some((first, rest)) = segments.split_first() else {
        return model_module.to_owned();
    };
    let head = match first.as_str() {
        "self" => model_module.to_owned(),
        "super" => parent_module(model_module),
        other => other.to_owned(),
    };
    std::iter::once(head)
        .chain(rest.iter().cloned())
        .collect::<Vec<_>>()
        .join("::")
}

enum LowerItemError {
    Attr(syn::Error),
    Bindgen(BindgenError),
}

impl From<BindgenError> for LowerItemError {
    fn from(err: BindgenError) -> Self {
        Self::Bindgen(err)
    }
}

fn lower_item(
    item: &Item,
    model_module: &str,
    namespace: &str,
    lowering: &mut Lowering<'_>,
) -> Result<Option<TypeDescriptor>, LowerItemError> {
    let descriptor = match item {
        Item::Struct(s) => {
            let name = s.ident.unraw().to_string();
            let mut members = Vec::new();
            if let Fields::Named(named) = &s.fields {
                for field in &named.named {
                    let Some(ident) = &field.ident else {
                        continue;
                    };
                    let field_name = ident.unraw().to_string();
                    let site = Site {
                        owner: &name,
                        field: &field_name,
                    };
                    let ty = lowering.lower(&field.ty, &site)?;
                    members.push(FieldDescriptor {
                        embedded: is_flattened(&field.attrs).map_err(LowerItemError::Attr)?,
                        tags: doc_tags(&field.attrs, namespace),
                        name: field_name,
                        ty,
                    });
                }
            }
            TypeDescriptor {
                tags: doc_tags(&s.attrs, namespace),
                name,
                package: model_module.to_owned(),
                shape: Shape::Struct(members),
            }
        }
        Item::Type(t) => {
            let name = t.ident.unraw().to_string();
            let site = Site {
                owner: &name,
                field: "<alias>",
            };
            let target = lowering.lower(&t.ty, &site)?;
            TypeDescriptor {
                tags: doc_tags(&t.attrs, namespace),
                name,
                package: model_module.to_owned(),
                shape: Shape::Alias(target),
            }
        }
        Item::Enum(e) => TypeDescriptor {
            tags: doc_tags(&e.attrs, namespace),
            name: e.ident.unraw().to_string(),
            package: model_module.to_owned(),
            shape: Shape::Enum,
        },
        _ => return Ok(None),
    };
    Ok(Some(descriptor))
}
