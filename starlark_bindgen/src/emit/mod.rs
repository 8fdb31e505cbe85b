//! Token emission for generated bindings.
//!
//! The emitter turns conversion plans into Rust items targeting the host
//! runtime crate. Output order is fixed: imports, registration, root
//! constructors in root order, then for every discovered struct its wrapper,
//! constructor, unpacker and list wrapper.

mod lists;
mod registration;
mod root;
mod structs;

use std::collections::BTreeSet;

use proc_macro2::{Ident, TokenStream};
use quote::quote;

use crate::config::GeneratorConfig;
use crate::discover::find_struct_members;
use crate::error::BindgenError;
use crate::loader::LoadedPackage;
use crate::model::TypeDescriptor;
use crate::naming::{Naming, ident};
use crate::plan::{Assignment, ConversionPlan, Initializer, Planner, Wrapper};

/// Runtime items every generated file imports.
const RUNTIME_IMPORTS: [&str; 15] = [
    "Arguments",
    "Dict",
    "Environment",
    "Error",
    "List",
    "LocalPath",
    "LocalPathList",
    "Object",
    "Param",
    "StringList",
    "StringStringMap",
    "Thread",
    "Unpack",
    "Value",
    "unpack_args",
];

/// Type names the generated code relies on from the prelude.
const PRELUDE_TYPES: [&str; 7] = ["Box", "Default", "None", "Option", "Some", "String", "Vec"];

fn parse_path(what: &'static str, value: &str) -> Result<syn::Path, BindgenError> {
    syn::parse_str(value).map_err(|source| BindgenError::InvalidPath {
        what,
        value: value.to_owned(),
        source,
    })
}

/// Emits the token stream for a loaded package.
pub struct Emitter<'a> {
    package: &'a LoadedPackage,
    config: &'a GeneratorConfig,
    naming: Naming<'a>,
    planner: Planner<'a>,
    runtime: syn::Path,
    plugin: Ident,
}

impl<'a> Emitter<'a> {
    /// Creates an emitter.
    ///
    /// # Errors
    ///
    /// Fails when the configured runtime path or plugin name is not valid
    /// Rust.
    pub fn new(package: &'a LoadedPackage, config: &'a GeneratorConfig) -> Result<Self, BindgenError> {
        let naming = Naming::new(&config.naming);
        Ok(Self {
            package,
            config,
            naming,
            planner: Planner::new(&package.graph, &config.conventions, naming),
            runtime: parse_path("runtime crate", &config.runtime_crate)?,
            plugin: ident("plugin type", &config.plugin_type)?,
        })
    }

    /// Emits every generated item for the package.
    ///
    /// # Errors
    ///
    /// Propagates planning failures and name collisions between generated
    /// items.
    pub fn emit(&self) -> Result<TokenStream, BindgenError> {
        let roots = self.package.root_types();
        let members = find_struct_members(&self.package.graph, &roots, &self.config.conventions);
        self.check_names(&roots, &members)?;

        let registered: Vec<&TypeDescriptor> = roots.iter().chain(&members).copied().collect();
        let mut tokens = self.imports()?;
        tokens.extend(self.registration(&registered)?);
        for root in &roots {
            tokens.extend(self.root_constructor(root)?);
        }
        for member in &members {
            tokens.extend(self.struct_binding(member)?);
            tokens.extend(self.list_binding(member)?);
        }
        Ok(tokens)
    }

    fn imports(&self) -> Result<TokenStream, BindgenError> {
        let runtime = &self.runtime;
        let items = RUNTIME_IMPORTS
            .iter()
            .map(|name| ident("runtime item", name))
            .collect::<Result<Vec<_>, _>>()?;
        let model = parse_path("model module", &self.package.model_module)?;
        let extras = self
            .config
            .extra_imports
            .iter()
            .map(|path| parse_path("extra import", path))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(quote! {
            #[allow(unused_imports)]
            use #runtime::{ #( #items ),* };
            #[allow(unused_imports)]
            use #model;
            #(
                #[allow(unused_imports)]
                use #extras;
            )*
        })
    }

    /// Rejects generated names that would clash with each other or with the
    /// names the preamble brings into scope.
    fn check_names(
        &self,
        roots: &[&TypeDescriptor],
        members: &[&TypeDescriptor],
    ) -> Result<(), BindgenError> {
        let mut registered = BTreeSet::new();
        for t in roots.iter().chain(members) {
            let name = self.naming.registered_name(&self.package.name, &t.name);
            if !registered.insert(name.clone()) {
                return Err(BindgenError::NameCollision(name));
            }
        }

        let mut types: BTreeSet<String> = RUNTIME_IMPORTS
            .iter()
            .chain(&PRELUDE_TYPES)
            .map(|name| (*name).to_owned())
            .collect();
        types.insert(self.config.plugin_type.clone());
        if let Some(module) = self.package.model_module.rsplit("::").next() {
            types.insert(module.to_owned());
        }
        for t in members {
            for name in [t.name.clone(), list_wrapper_name(&t.name)] {
                if !types.insert(name.clone()) {
                    return Err(BindgenError::NameCollision(name));
                }
            }
        }
        Ok(())
    }

    /// Path of a model type as seen from the generated code.
    fn model_type(&self, t: &TypeDescriptor) -> Result<TokenStream, BindgenError> {
        let name = ident("type name", &t.name)?;
        if t.package == self.package.model_module {
            let module = self
                .package
                .model_module
                .rsplit("::")
                .next()
                .unwrap_or(&self.package.model_module);
            let module = ident("model module", module)?;
            return Ok(quote!(#module::#name));
        }
        let module = parse_path("external module", &t.package)?;
        Ok(quote!(#module::#name))
    }

    fn constructor_ident(&self, type_name: &str) -> Result<Ident, BindgenError> {
        ident("constructor", &self.naming.lower_camel(type_name))
    }

    fn wrapper_type(wrapper: &Wrapper) -> Result<Ident, BindgenError> {
        match wrapper {
            Wrapper::LocalPath => ident("wrapper", "LocalPath"),
            Wrapper::StringStringMap => ident("wrapper", "StringStringMap"),
            Wrapper::StringList => ident("wrapper", "StringList"),
            Wrapper::LocalPathList => ident("wrapper", "LocalPathList"),
            Wrapper::Struct(name) => ident("wrapper", name),
            Wrapper::StructList(name) => ident("wrapper", &list_wrapper_name(name)),
        }
    }

    /// `let mut <var> = <init>;`, with the local-path seed when `seed` is
    /// set.
    fn wrapper_decl(
        wrapper: &Wrapper,
        var: &Ident,
        thread: &TokenStream,
        seed: bool,
    ) -> Result<TokenStream, BindgenError> {
        let ty = Self::wrapper_type(wrapper)?;
        Ok(match wrapper.initializer() {
            Initializer::Default => quote! { let mut #var = #ty::default(); },
            Initializer::Thread => quote! { let mut #var = #ty::new(#thread); },
            Initializer::SeededPath if seed => quote! {
                let mut #var = #ty::new(#thread);
                #var.unpack(&Value::from(""))?;
            },
            Initializer::SeededPath => quote! { let mut #var = #ty::new(#thread); },
        })
    }

    /// `base.a.b` for a plan's field path.
    fn field_access(base: &TokenStream, plan: &ConversionPlan) -> Result<TokenStream, BindgenError> {
        let segments = plan
            .field_path
            .iter()
            .map(|segment| ident("field", segment))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(quote!(#base #( . #segments )*))
    }
}

fn assignment(assign: Assignment, var: &Ident, target: &TokenStream) -> TokenStream {
    match assign {
        Assignment::InPlace => TokenStream::new(),
        Assignment::Value => quote! { #target = #var.value; },
        Assignment::Collect => quote! { #target = #var.value.into_iter().collect(); },
        Assignment::Guarded { boxed: false } => quote! {
            if #var.is_unpacked {
                #target = Some(#var.value);
            }
        },
        Assignment::Guarded { boxed: true } => quote! {
            if #var.is_unpacked {
                #target = Some(Box::new(#var.value));
            }
        },
    }
}

/// Name of the list wrapper generated for `type_name`.
#[must_use]
pub fn list_wrapper_name(type_name: &str) -> String {
    format!("{type_name}List")
}
