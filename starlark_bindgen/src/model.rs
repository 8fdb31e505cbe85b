//! Type graph consumed by the generator.
//!
//! Named declarations (structs, aliases, enums and external structs) live in a
//! [`TypeGraph`] keyed by name. Anonymous structure such as `Option<T>` or
//! `Vec<T>` is a [`TypeExpr`] tree whose [`TypeExpr::Named`] leaves resolve
//! through the graph, which keeps self-referential schemas representable
//! without shared ownership.

use std::collections::BTreeMap;
use std::fmt;

use crate::config::Conventions;
use crate::error::BindgenError;

/// Kind of a built-in scalar type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScalarKind {
    /// `String`.
    String,
    /// `bool`.
    Bool,
    /// Any fixed-width or pointer-sized integer.
    Int,
    /// Floats and `char`: loadable, but without a conversion plan.
    Other,
}

/// Anonymous type structure of a field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeExpr {
    /// A built-in scalar such as `String` or `i32`.
    Scalar {
        /// Rust spelling of the scalar.
        name: String,
        /// Scalar classification.
        kind: ScalarKind,
    },
    /// A named declaration in the [`TypeGraph`].
    Named(String),
    /// `Option<T>`, or `Option<Box<T>>` when `boxed` is set.
    Pointer {
        /// Pointee.
        elem: Box<TypeExpr>,
        /// Whether the pointee sits behind a `Box`.
        boxed: bool,
    },
    /// `Vec<T>`.
    Slice(Box<TypeExpr>),
    /// `BTreeMap<K, V>`, `HashMap<K, V>` or `IndexMap<K, V>`.
    Map {
        /// Key type.
        key: Box<TypeExpr>,
        /// Value type.
        value: Box<TypeExpr>,
    },
    /// Any other syntax (references, tuples, arrays, bare `Box<T>`...).
    Unsupported(String),
}

impl TypeExpr {
    /// Shorthand for a scalar expression.
    pub fn scalar(name: impl Into<String>, kind: ScalarKind) -> Self {
        Self::Scalar {
            name: name.into(),
            kind,
        }
    }

    /// Shorthand for a named expression.
    pub fn named(name: impl Into<String>) -> Self {
        Self::Named(name.into())
    }

    /// Shorthand for `Option<T>`.
    #[must_use]
    pub fn optional(elem: Self) -> Self {
        Self::Pointer {
            elem: Box::new(elem),
            boxed: false,
        }
    }

    /// Shorthand for `Vec<T>`.
    #[must_use]
    pub fn slice(elem: Self) -> Self {
        Self::Slice(Box::new(elem))
    }

    /// Shorthand for a map type.
    #[must_use]
    pub fn map(key: Self, value: Self) -> Self {
        Self::Map {
            key: Box::new(key),
            value: Box::new(value),
        }
    }

    /// Name of the declaration this expression refers to directly, if any.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        match self {
            Self::Named(name) => Some(name),
            _ => None,
        }
    }
}

impl fmt::Display for TypeExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Scalar { name, .. } | Self::Named(name) | Self::Unsupported(name) => {
                f.write_str(name)
            }
            Self::Pointer { elem, boxed: false } => write!(f, "Option<{elem}>"),
            Self::Pointer { elem, boxed: true } => write!(f, "Option<Box<{elem}>>"),
            Self::Slice(elem) => write!(f, "Vec<{elem}>"),
            Self::Map { key, value } => write!(f, "map<{key}, {value}>"),
        }
    }
}

/// Kind classification of a type expression.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeKind {
    /// Built-in scalar.
    Scalar,
    /// Named struct, local or external.
    Struct,
    /// `Option<T>`.
    Pointer,
    /// `Vec<T>`.
    Slice,
    /// Map container.
    Map,
    /// `type X = ...;` alias.
    Alias,
    /// Anything the generator cannot describe.
    Unsupported,
}

/// Marker tags attached to a declaration or field through doc comments.
///
/// Values are kept raw; [`Tags::flag`] interprets them on demand so that a
/// malformed tag only fails generation when it is actually consulted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Tags {
    values: BTreeMap<String, Vec<String>>,
}

impl Tags {
    /// Records one occurrence of `key`. A bare tag has an empty value.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.values.entry(key.into()).or_default().push(value.into());
    }

    /// Returns `true` when no tags were recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Interprets `key` as a boolean flag.
    ///
    /// A missing tag yields `default`; a bare tag or `true` yields `true`;
    /// `false` yields `false`.
    ///
    /// # Errors
    ///
    /// Returns [`BindgenError::InvalidTag`] for non-boolean values and for
    /// repeated tags that disagree.
    pub fn flag(&self, key: &str, default: bool, item: &str) -> Result<bool, BindgenError> {
        let Some(values) = self.values.get(key) else {
            return Ok(default);
        };
        let mut parsed = None;
        for raw in values {
            let value = match raw.trim() {
                "" | "true" => true,
                "false" => false,
                other => {
                    return Err(BindgenError::InvalidTag {
                        item: item.to_owned(),
                        message: format!("tag value for {key:?} is not boolean: {other:?}"),
                    });
                }
            };
            if parsed.is_some_and(|previous| previous != value) {
                return Err(BindgenError::InvalidTag {
                    item: item.to_owned(),
                    message: format!("conflicting values for tag {key:?}"),
                });
            }
            parsed = Some(value);
        }
        Ok(parsed.unwrap_or(default))
    }
}

/// A struct member.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDescriptor {
    /// Field name without any raw-identifier prefix.
    pub name: String,
    /// Field type.
    pub ty: TypeExpr,
    /// Whether the member is flattened into its parent (`#[serde(flatten)]`).
    pub embedded: bool,
    /// Marker tags from the field's doc comment.
    pub tags: Tags,
}

impl FieldDescriptor {
    /// Creates an untagged, non-embedded field.
    pub fn new(name: impl Into<String>, ty: TypeExpr) -> Self {
        Self {
            name: name.into(),
            ty,
            embedded: false,
            tags: Tags::default(),
        }
    }

    /// Marks the field as embedded.
    #[must_use]
    pub fn embedded(mut self) -> Self {
        self.embedded = true;
        self
    }

    /// Attaches a tag.
    #[must_use]
    pub fn with_tag(mut self, key: &str, value: &str) -> Self {
        self.tags.insert(key, value);
        self
    }
}

/// Shape of a named declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Shape {
    /// Struct with named members in declaration order. External structs have
    /// no known members.
    Struct(Vec<FieldDescriptor>),
    /// Type alias.
    Alias(TypeExpr),
    /// Enum: known by name, never convertible.
    Enum,
}

/// A named declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeDescriptor {
    /// Type name.
    pub name: String,
    /// Module path of the declaring package.
    pub package: String,
    /// Declaration shape.
    pub shape: Shape,
    /// Marker tags from the declaration's doc comment.
    pub tags: Tags,
}

impl TypeDescriptor {
    /// Creates an untagged struct declaration.
    pub fn new_struct(
        name: impl Into<String>,
        package: impl Into<String>,
        members: Vec<FieldDescriptor>,
    ) -> Self {
        Self {
            name: name.into(),
            package: package.into(),
            shape: Shape::Struct(members),
            tags: Tags::default(),
        }
    }

    /// Struct members; empty for aliases and enums.
    #[must_use]
    pub fn members(&self) -> &[FieldDescriptor] {
        match &self.shape {
            Shape::Struct(members) => members,
            Shape::Alias(_) | Shape::Enum => &[],
        }
    }

    /// Looks up a member by name.
    #[must_use]
    pub fn member(&self, name: &str) -> Option<&FieldDescriptor> {
        self.members().iter().find(|member| member.name == name)
    }

    /// Returns `true` for struct declarations.
    #[must_use]
    pub const fn is_struct(&self) -> bool {
        matches!(self.shape, Shape::Struct(_))
    }
}

/// Every named declaration visible to one generator run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TypeGraph {
    types: BTreeMap<String, TypeDescriptor>,
}

impl TypeGraph {
    /// Creates an empty graph.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a declaration, replacing any previous one with the same name.
    pub fn insert(&mut self, descriptor: TypeDescriptor) {
        self.types.insert(descriptor.name.clone(), descriptor);
    }

    /// Looks up a declaration by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&TypeDescriptor> {
        self.types.get(name)
    }

    /// Returns `true` when `name` is declared.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.types.contains_key(name)
    }

    /// All declarations, name-sorted.
    pub fn iter(&self) -> impl Iterator<Item = &TypeDescriptor> {
        self.types.values()
    }

    /// Resolves a [`TypeExpr::Named`] expression.
    #[must_use]
    pub fn resolve(&self, ty: &TypeExpr) -> Option<&TypeDescriptor> {
        ty.name().and_then(|name| self.get(name))
    }

    /// Classifies `ty`.
    #[must_use]
    pub fn kind_of(&self, ty: &TypeExpr) -> TypeKind {
        match ty {
            TypeExpr::Scalar { .. } => TypeKind::Scalar,
            TypeExpr::Pointer { .. } => TypeKind::Pointer,
            TypeExpr::Slice(_) => TypeKind::Slice,
            TypeExpr::Map { .. } => TypeKind::Map,
            TypeExpr::Unsupported(_) => TypeKind::Unsupported,
            TypeExpr::Named(name) => match self.get(name).map(|t| &t.shape) {
                Some(Shape::Struct(_)) => TypeKind::Struct,
                Some(Shape::Alias(_)) => TypeKind::Alias,
                Some(Shape::Enum) | None => TypeKind::Unsupported,
            },
        }
    }

    /// Follows alias chains to the first non-alias expression.
    ///
    /// Returns `None` for cyclic alias chains.
    #[must_use]
    pub fn underlying<'a>(&'a self, ty: &'a TypeExpr) -> Option<&'a TypeExpr> {
        let mut current = ty;
        for _ in 0..=self.types.len() {
            match self.resolve(current).map(|t| &t.shape) {
                Some(Shape::Alias(target)) => current = target,
                _ => return Some(current),
            }
        }
        None
    }

    /// The struct declaration `ty` names directly.
    #[must_use]
    pub fn as_struct(&self, ty: &TypeExpr) -> Option<&TypeDescriptor> {
        self.resolve(ty).filter(|t| t.is_struct())
    }

    /// The struct a field of type `ty` needs a generated wrapper for: `T`,
    /// `Option<T>`, `Option<Box<T>>` or `Vec<T>` where `T` is a struct.
    #[must_use]
    pub fn struct_target(&self, ty: &TypeExpr) -> Option<&TypeDescriptor> {
        match ty {
            TypeExpr::Named(_) => self.as_struct(ty),
            TypeExpr::Pointer { elem, .. } | TypeExpr::Slice(elem) => self.as_struct(elem),
            _ => None,
        }
    }

    /// The struct behind a root type's spec member, if it has one.
    #[must_use]
    pub fn spec_type(
        &self,
        root: &TypeDescriptor,
        conventions: &Conventions,
    ) -> Option<&TypeDescriptor> {
        root.member(&conventions.spec_member)
            .and_then(|member| self.as_struct(&member.ty))
    }
}
