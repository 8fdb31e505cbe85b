//! The dynamic value model of the host.

use std::any::Any;
use std::fmt;
use std::rc::Rc;

use crate::{Dict, List};

/// A host-defined value type, such as a generated struct wrapper.
///
/// Objects travel through the host as [`Value::Object`] and are recovered with
/// [`Value::downcast_ref`].
pub trait Object: Any + fmt::Debug {
    /// Name reported in type errors.
    fn type_name(&self) -> &'static str;

    /// Upcast used for downcasting back to the concrete type.
    fn as_any(&self) -> &dyn Any;
}

/// A dynamic host value.
#[derive(Clone, Debug, Default)]
pub enum Value {
    /// The `None` singleton.
    #[default]
    None,
    /// A boolean.
    Bool(bool),
    /// A signed integer.
    Int(i64),
    /// A string.
    String(String),
    /// A shared, freezable list.
    List(List),
    /// A shared, freezable, insertion-ordered dict.
    Dict(Dict),
    /// A host-defined object.
    Object(Rc<dyn Object>),
}

impl Value {
    /// Wraps a host-defined object.
    #[must_use]
    pub fn object<T: Object>(obj: T) -> Self {
        Self::Object(Rc::new(obj))
    }

    /// Name of the value's kind, as reported in type errors.
    #[must_use]
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::None => "NoneType",
            Self::Bool(_) => "bool",
            Self::Int(_) => "int",
            Self::String(_) => "string",
            Self::List(_) => "list",
            Self::Dict(_) => "dict",
            Self::Object(obj) => obj.type_name(),
        }
    }

    /// Returns `true` for [`Value::None`].
    #[must_use]
    pub const fn is_none(&self) -> bool {
        matches!(self, Self::None)
    }

    /// Borrows the string payload, if any.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    /// Borrows the object payload as `T`, if it is one.
    #[must_use]
    pub fn downcast_ref<T: Object>(&self) -> Option<&T> {
        match self {
            Self::Object(obj) => obj.as_any().downcast_ref::<T>(),
            _ => None,
        }
    }

    /// Freezes any containers reachable from this value.
    pub fn freeze(&self) {
        match self {
            Self::List(list) => list.freeze(),
            Self::Dict(dict) => dict.freeze(),
            _ => {}
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::None, Self::None) => true,
            (Self::Bool(a), Self::Bool(b)) => a == b,
            (Self::Int(a), Self::Int(b)) => a == b,
            (Self::String(a), Self::String(b)) => a == b,
            (Self::List(a), Self::List(b)) => a == b,
            (Self::Dict(a), Self::Dict(b)) => a == b,
            (Self::Object(a), Self::Object(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Self::Int(i64::from(value))
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Self::String(value.to_owned())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<List> for Value {
    fn from(value: List) -> Self {
        Self::List(value)
    }
}

impl From<Dict> for Value {
    fn from(value: Dict) -> Self {
        Self::Dict(value)
    }
}

/// Hashable subset of [`Value`] usable as a dict key.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum DictKey {
    /// Boolean key.
    Bool(bool),
    /// Integer key.
    Int(i64),
    /// String key.
    String(String),
}

impl DictKey {
    /// Name of the key's kind, as reported in type errors.
    #[must_use]
    pub const fn type_name(&self) -> &'static str {
        match self {
            Self::Bool(_) => "bool",
            Self::Int(_) => "int",
            Self::String(_) => "string",
        }
    }

    /// Borrows the string payload, if any.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }
}

impl From<&str> for DictKey {
    fn from(value: &str) -> Self {
        Self::String(value.to_owned())
    }
}

impl From<String> for DictKey {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<i64> for DictKey {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<bool> for DictKey {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<DictKey> for Value {
    fn from(value: DictKey) -> Self {
        match value {
            DictKey::Bool(b) => Self::Bool(b),
            DictKey::Int(i) => Self::Int(i),
            DictKey::String(s) => Self::String(s),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[derive(Debug)]
    struct Marker(u8);

    impl Object for Marker {
        fn type_name(&self) -> &'static str {
            "marker"
        }

        fn as_any(&self) -> &dyn Any {
            self
        }
    }

    #[rstest]
    #[case::none(Value::None, "NoneType")]
    #[case::bool(Value::from(true), "bool")]
    #[case::int(Value::from(3), "int")]
    #[case::string(Value::from("x"), "string")]
    #[case::list(Value::from(List::new()), "list")]
    #[case::dict(Value::from(Dict::new()), "dict")]
    fn reports_type_names(#[case] value: Value, #[case] expected: &str) {
        assert_eq!(value.type_name(), expected);
    }

    #[rstest]
    fn downcasts_objects_by_concrete_type() {
        let value = Value::object(Marker(7));
        assert_eq!(value.type_name(), "marker");
        assert_eq!(value.downcast_ref::<Marker>().map(|m| m.0), Some(7));
        assert!(Value::from("x").downcast_ref::<Marker>().is_none());
    }

    #[rstest]
    fn objects_compare_by_identity() {
        let value = Value::object(Marker(1));
        assert_eq!(value, value.clone());
        assert_ne!(value, Value::object(Marker(1)));
    }
}
