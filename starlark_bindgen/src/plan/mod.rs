//! Per-field conversion planning.
//!
//! A [`ConversionPlan`] records how one host attribute reaches one model
//! field: the wrapper it is unpacked through (if any), the local variable
//! holding that wrapper, and how the decoded value is assigned back. Both the
//! root constructor and the nested unpackers are emitted from the same plans.

use std::collections::BTreeSet;

use heck::ToUpperCamelCase;

use crate::config::Conventions;
use crate::error::BindgenError;
use crate::loader::LOCAL_PATH_TAG;
use crate::model::{FieldDescriptor, ScalarKind, TypeDescriptor, TypeExpr, TypeGraph, TypeKind};
use crate::naming::Naming;

/// Parameter names every root constructor binds to the metadata member.
pub const METADATA_KEYS: [&str; 3] = ["name", "labels", "annotations"];

/// Locals the emitted functions declare themselves.
const GENERATED_LOCALS: &[&str] = &["args", "thread", "obj", "dict", "labels", "annotations"];

/// Intermediate unpacker a field is decoded through.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Wrapper {
    /// `LocalPath`, pre-seeded with the thread's base directory.
    LocalPath,
    /// `StringStringMap`.
    StringStringMap,
    /// `StringList`.
    StringList,
    /// `LocalPathList`.
    LocalPathList,
    /// The generated wrapper for the named struct.
    Struct(String),
    /// The generated list wrapper for the named struct.
    StructList(String),
}

/// How a wrapper variable is initialised.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Initializer {
    /// `Default::default()`.
    Default,
    /// `T::new(thread)`.
    Thread,
    /// `T::new(thread)` followed by unpacking the empty string, so an omitted
    /// argument still resolves to the base directory.
    SeededPath,
}

impl Wrapper {
    /// The initializer this wrapper needs.
    #[must_use]
    pub const fn initializer(&self) -> Initializer {
        match self {
            Self::LocalPath => Initializer::SeededPath,
            Self::StringStringMap | Self::StringList => Initializer::Default,
            Self::LocalPathList | Self::Struct(_) | Self::StructList(_) => Initializer::Thread,
        }
    }
}

/// How a decoded value reaches the model field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Assignment {
    /// The field itself is the unpack target.
    InPlace,
    /// `field = wrapper.value`.
    Value,
    /// `field = wrapper.value.into_iter().collect()`.
    Collect,
    /// `if wrapper.is_unpacked { field = Some(wrapper.value) }`, boxing the
    /// value when the field is `Option<Box<T>>`.
    Guarded {
        /// Whether the pointee is boxed.
        boxed: bool,
    },
}

/// Conversion of one host attribute into one model field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversionPlan {
    /// Field names from the owning value down to the target field.
    pub field_path: Vec<String>,
    /// Host-visible attribute or parameter name.
    pub key: String,
    /// Local variable holding the wrapper (or argument) in generated code.
    pub var_name: String,
    /// Wrapper, or `None` for in-place unpacking.
    pub wrapper: Option<Wrapper>,
    /// Assignment back into the field.
    pub assignment: Assignment,
}

/// Which member carries a root type's settable data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RootKind {
    /// Attributes come from the spec struct's members.
    Spec,
    /// A single string map populates the data member.
    Data,
}

/// Plans for one root constructor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RootPlan {
    /// Root flavour.
    pub kind: RootKind,
    /// Plans for the non-metadata parameters, in declaration order.
    pub fields: Vec<ConversionPlan>,
}

/// Builds conversion plans against a type graph.
#[derive(Debug, Clone, Copy)]
pub struct Planner<'a> {
    graph: &'a TypeGraph,
    conventions: &'a Conventions,
    naming: Naming<'a>,
}

impl<'a> Planner<'a> {
    /// Creates a planner.
    #[must_use]
    pub const fn new(graph: &'a TypeGraph, conventions: &'a Conventions, naming: Naming<'a>) -> Self {
        Self {
            graph,
            conventions,
            naming,
        }
    }

    /// Plans the conversion of a single field of `owner`. `prefix` holds the
    /// field path of any embedding members.
    ///
    /// # Errors
    ///
    /// Returns [`BindgenError::UnsupportedField`] for field types without a
    /// conversion and [`BindgenError::InvalidTag`] for malformed tags.
    pub fn plan_field(
        &self,
        owner: &str,
        prefix: &[String],
        field: &FieldDescriptor,
    ) -> Result<ConversionPlan, BindgenError> {
        let local_path = field
            .tags
            .flag(LOCAL_PATH_TAG, false, &format!("{owner}.{}", field.name))?;
        let unsupported = || BindgenError::UnsupportedField {
            owner: owner.to_owned(),
            field: field.name.clone(),
            ty: field.ty.to_string(),
        };

        let (wrapper, assignment) = match self.graph.kind_of(&field.ty) {
            TypeKind::Scalar | TypeKind::Alias => match self.scalar_of(&field.ty) {
                Some(ScalarKind::String) if local_path => (Some(Wrapper::LocalPath), Assignment::Value),
                Some(ScalarKind::String | ScalarKind::Bool | ScalarKind::Int) if !local_path => {
                    (None, Assignment::InPlace)
                }
                _ => return Err(unsupported()),
            },
            TypeKind::Struct if !local_path => {
                let target = self.graph.as_struct(&field.ty).ok_or_else(unsupported)?;
                (Some(Wrapper::Struct(target.name.clone())), Assignment::Value)
            }
            TypeKind::Pointer if !local_path => {
                let TypeExpr::Pointer { elem, boxed } = &field.ty else {
                    return Err(unsupported());
                };
                if let Some(target) = self.graph.as_struct(elem) {
                    (
                        Some(Wrapper::Struct(target.name.clone())),
                        Assignment::Guarded { boxed: *boxed },
                    )
                } else if !*boxed && self.is_plain_scalar(elem) {
                    (None, Assignment::InPlace)
                } else {
                    return Err(unsupported());
                }
            }
            TypeKind::Map if !local_path => {
                let TypeExpr::Map { key, value } = &field.ty else {
                    return Err(unsupported());
                };
                if !self.is_string(key) || !self.is_string(value) {
                    return Err(unsupported());
                }
                (Some(Wrapper::StringStringMap), Assignment::Collect)
            }
            TypeKind::Slice => {
                let TypeExpr::Slice(elem) = &field.ty else {
                    return Err(unsupported());
                };
                if self.is_string(elem) {
                    let wrapper = if local_path {
                        Wrapper::LocalPathList
                    } else {
                        Wrapper::StringList
                    };
                    (Some(wrapper), Assignment::Value)
                } else if let Some(target) = self.graph.as_struct(elem).filter(|_| !local_path) {
                    (Some(Wrapper::StructList(target.name.clone())), Assignment::Value)
                } else {
                    return Err(unsupported());
                }
            }
            _ => return Err(unsupported()),
        };

        let mut field_path = prefix.to_vec();
        field_path.push(field.name.clone());
        Ok(ConversionPlan {
            field_path,
            key: self.naming.snake(&field.name),
            var_name: self.var_name(&field.name),
            wrapper,
            assignment,
        })
    }

    /// Plans every exposed member of `owner`, flattening embedded members and
    /// skipping opaque ones. `prefix` is prepended to every field path.
    ///
    /// # Errors
    ///
    /// Fails on unsupported members, embedded members that are not structs
    /// and attribute names exposed twice.
    pub fn plan_members(
        &self,
        owner: &TypeDescriptor,
        prefix: &[String],
    ) -> Result<Vec<ConversionPlan>, BindgenError> {
        let mut plans = Vec::new();
        let mut embedding = vec![owner.name.clone()];
        self.collect_members(&owner.name, owner, prefix, &mut embedding, &mut plans)?;
        ensure_unique_keys(&owner.name, &[], &plans)?;
        Ok(plans)
    }

    fn collect_members(
        &self,
        owner: &str,
        current: &TypeDescriptor,
        prefix: &[String],
        embedding: &mut Vec<String>,
        plans: &mut Vec<ConversionPlan>,
    ) -> Result<(), BindgenError> {
        for member in current.members() {
            if self.conventions.is_opaque(self.graph, &member.ty) {
                continue;
            }
            if !member.embedded {
                plans.push(self.plan_field(owner, prefix, member)?);
                continue;
            }
            let Some(inner) = self.graph.as_struct(&member.ty) else {
                return Err(BindgenError::EmbeddedNotStruct {
                    owner: current.name.clone(),
                    field: member.name.clone(),
                    ty: member.ty.to_string(),
                });
            };
            if embedding.contains(&inner.name) {
                continue;
            }
            let mut inner_prefix = prefix.to_vec();
            inner_prefix.push(member.name.clone());
            embedding.push(inner.name.clone());
            self.collect_members(owner, inner, &inner_prefix, embedding, plans)?;
            embedding.pop();
        }
        Ok(())
    }

    /// Plans a root constructor.
    ///
    /// # Errors
    ///
    /// Fails when the root has neither or both of the spec and data members,
    /// when the spec member is not a struct, and on any member planning error.
    /// Spec attributes named like a metadata parameter are exposed under the
    /// snake-case form of their reserved rename (`labels` becomes
    /// `spec_labels`); any other reuse of a metadata name is an error.
    pub fn plan_root(&self, root: &TypeDescriptor) -> Result<RootPlan, BindgenError> {
        let spec = root.member(&self.conventions.spec_member);
        let data = root.member(&self.conventions.data_member);
        let (kind, fields) = match (spec, data) {
            (Some(_), Some(_)) => return Err(BindgenError::AmbiguousRoot(root.name.clone())),
            (None, None) => return Err(BindgenError::MissingSpecOrData(root.name.clone())),
            (Some(spec_member), None) => {
                let Some(spec_type) = self.graph.as_struct(&spec_member.ty) else {
                    return Err(BindgenError::SpecNotStruct {
                        owner: root.name.clone(),
                        ty: spec_member.ty.to_string(),
                    });
                };
                let mut plans = Vec::new();
                let mut embedding = vec![spec_type.name.clone()];
                self.collect_members(
                    &root.name,
                    spec_type,
                    std::slice::from_ref(&spec_member.name),
                    &mut embedding,
                    &mut plans,
                )?;
                for plan in &mut plans {
                    self.rename_reserved_key(plan);
                }
                (RootKind::Spec, plans)
            }
            (None, Some(data_member)) => {
                let plan = self.plan_field(&root.name, &[], data_member)?;
                if plan.wrapper != Some(Wrapper::StringStringMap) {
                    return Err(BindgenError::UnsupportedField {
                        owner: root.name.clone(),
                        field: data_member.name.clone(),
                        ty: data_member.ty.to_string(),
                    });
                }
                (RootKind::Data, vec![plan])
            }
        };
        ensure_unique_keys(&root.name, &METADATA_KEYS, &fields)?;
        Ok(RootPlan { kind, fields })
    }

    fn rename_reserved_key(&self, plan: &mut ConversionPlan) {
        if !METADATA_KEYS.contains(&plan.key.as_str()) {
            return;
        }
        let renamed = plan
            .field_path
            .last()
            .and_then(|field| self.conventions.reserved_renames.get(field));
        if let Some(var) = renamed {
            plan.key = self.naming.snake(var);
        }
    }

    fn var_name(&self, field: &str) -> String {
        if let Some(var) = self.conventions.reserved_renames.get(field) {
            return var.clone();
        }
        let var = self.naming.lower_camel(field);
        if GENERATED_LOCALS.contains(&var.as_str()) {
            format!("spec{}", field.to_upper_camel_case())
        } else {
            var
        }
    }

    fn scalar_of(&self, ty: &TypeExpr) -> Option<ScalarKind> {
        match self.graph.underlying(ty)? {
            TypeExpr::Scalar { kind, .. } => Some(*kind),
            _ => None,
        }
    }

    fn is_string(&self, ty: &TypeExpr) -> bool {
        self.scalar_of(ty) == Some(ScalarKind::String)
    }

    fn is_plain_scalar(&self, ty: &TypeExpr) -> bool {
        matches!(
            self.scalar_of(ty),
            Some(ScalarKind::String | ScalarKind::Bool | ScalarKind::Int)
        )
    }
}

fn ensure_unique_keys(
    owner: &str,
    reserved: &[&str],
    plans: &[ConversionPlan],
) -> Result<(), BindgenError> {
    let mut seen: BTreeSet<&str> = reserved.iter().copied().collect();
    for plan in plans {
        if !seen.insert(plan.key.as_str()) {
            return Err(BindgenError::DuplicateAttribute {
                owner: owner.to_owned(),
                key: plan.key.clone(),
            });
        }
    }
    Ok(())
}
