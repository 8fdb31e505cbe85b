//! Conversion from host values into native Rust values.
//!
//! [`Unpack`] is the single seam between the host and typed records: scalar
//! fields unpack in place, while the generic unpackers below and the
//! generated struct wrappers expose the decoded result through a public
//! `value` field.

use std::collections::BTreeMap;

use crate::{Error, Thread, Value};

/// Decodes a host [`Value`] into `self`.
pub trait Unpack {
    /// Overwrites `self` with the decoded form of `value`.
    ///
    /// # Errors
    ///
    /// Returns an [`Error`] describing the first mismatch between `value` and
    /// the expected shape.
    fn unpack(&mut self, value: &Value) -> Result<(), Error>;
}

impl Unpack for Value {
    fn unpack(&mut self, value: &Value) -> Result<(), Error> {
        *self = value.clone();
        Ok(())
    }
}

impl Unpack for String {
    fn unpack(&mut self, value: &Value) -> Result<(), Error> {
        match value {
            Value::String(s) => {
                *self = s.clone();
                Ok(())
            }
            other => Err(Error::unexpected_type("string", other)),
        }
    }
}

impl Unpack for bool {
    fn unpack(&mut self, value: &Value) -> Result<(), Error> {
        match value {
            Value::Bool(b) => {
                *self = *b;
                Ok(())
            }
            other => Err(Error::unexpected_type("bool", other)),
        }
    }
}

macro_rules! impl_unpack_int {
    ($($ty:ty),* $(,)?) => {
        $(
            impl Unpack for $ty {
                fn unpack(&mut self, value: &Value) -> Result<(), Error> {
                    match value {
                        Value::Int(n) => {
                            *self = <$ty>::try_from(*n).map_err(|_| Error::IntOutOfRange {
                                value: *n,
                                target: stringify!($ty),
                            })?;
                            Ok(())
                        }
                        other => Err(Error::unexpected_type("int", other)),
                    }
                }
            }
        )*
    };
}

impl_unpack_int!(i8, i16, i32, i64, isize, u8, u16, u32, u64, usize);

/// `None` clears the option; anything else unpacks into a fresh `T`.
impl<T: Unpack + Default> Unpack for Option<T> {
    fn unpack(&mut self, value: &Value) -> Result<(), Error> {
        if value.is_none() {
            *self = None;
            return Ok(());
        }
        let mut inner = T::default();
        inner.unpack(value)?;
        *self = Some(inner);
        Ok(())
    }
}

fn list_items(value: &Value) -> Result<Vec<Value>, Error> {
    match value {
        Value::List(list) => Ok(list.items()),
        other => Err(Error::unexpected_type("list", other)),
    }
}

/// A list of strings.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct StringList {
    /// Decoded strings, in list order.
    pub value: Vec<String>,
}

impl Unpack for StringList {
    fn unpack(&mut self, value: &Value) -> Result<(), Error> {
        let mut items = Vec::new();
        for (index, item) in list_items(value)?.iter().enumerate() {
            let mut s = String::new();
            s.unpack(item).map_err(|err| err.at_index(index))?;
            items.push(s);
        }
        self.value = items;
        Ok(())
    }
}

/// A dict whose keys and values are all strings.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct StringStringMap {
    /// Decoded entries.
    pub value: BTreeMap<String, String>,
}

impl Unpack for StringStringMap {
    fn unpack(&mut self, value: &Value) -> Result<(), Error> {
        let Value::Dict(dict) = value else {
            return Err(Error::unexpected_type("dict", value));
        };
        let mut entries = BTreeMap::new();
        for (key, item) in dict.items() {
            let Some(key) = key.as_str() else {
                return Err(Error::NonStringKey(key.type_name()));
            };
            let mut s = String::new();
            s.unpack(&item).map_err(|err| err.in_attribute(key))?;
            entries.insert(key.to_owned(), s);
        }
        self.value = entries;
        Ok(())
    }
}

/// A string naming a local filesystem path, resolved against the calling
/// thread's base directory.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LocalPath {
    thread: Thread,
    /// Absolute path after resolution.
    pub value: String,
}

impl LocalPath {
    /// Creates an unpacker resolving against `thread`.
    #[must_use]
    pub fn new(thread: &Thread) -> Self {
        Self {
            thread: thread.clone(),
            value: String::new(),
        }
    }
}

impl Unpack for LocalPath {
    fn unpack(&mut self, value: &Value) -> Result<(), Error> {
        let mut raw = String::new();
        raw.unpack(value)?;
        self.value = self.thread.abs_path(&raw).into_string();
        Ok(())
    }
}

/// A list of local filesystem paths.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LocalPathList {
    thread: Thread,
    /// Absolute paths after resolution, in list order.
    pub value: Vec<String>,
}

impl LocalPathList {
    /// Creates an unpacker resolving against `thread`.
    #[must_use]
    pub fn new(thread: &Thread) -> Self {
        Self {
            thread: thread.clone(),
            value: Vec::new(),
        }
    }
}

impl Unpack for LocalPathList {
    fn unpack(&mut self, value: &Value) -> Result<(), Error> {
        let mut paths = Vec::new();
        for (index, item) in list_items(value)?.iter().enumerate() {
            let mut path = LocalPath::new(&self.thread);
            path.unpack(item).map_err(|err| err.at_index(index))?;
            paths.push(path.value);
        }
        self.value = paths;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Dict, List};
    use anyhow::{Result, ensure};
    use rstest::rstest;

    #[rstest]
    fn ints_reject_out_of_range_values() {
        let mut n: u8 = 0;
        assert_eq!(
            n.unpack(&Value::Int(300)),
            Err(Error::IntOutOfRange {
                value: 300,
                target: "u8"
            })
        );
        assert_eq!(n.unpack(&Value::Int(7)), Ok(()));
        assert_eq!(n, 7);
    }

    #[rstest]
    #[case::string_from_int(Value::Int(1), "string")]
    #[case::string_from_list(Value::from(List::new()), "string")]
    fn strings_reject_other_kinds(#[case] value: Value, #[case] expected: &'static str) {
        let mut s = String::new();
        assert_eq!(
            s.unpack(&value),
            Err(Error::unexpected_type(expected, &value))
        );
    }

    #[rstest]
    fn option_treats_none_as_unset() -> Result<()> {
        let mut slot = Some(3_i32);
        slot.unpack(&Value::None)?;
        ensure!(slot.is_none());
        slot.unpack(&Value::Int(4))?;
        ensure!(slot == Some(4));
        Ok(())
    }

    #[rstest]
    fn string_list_reports_failing_index() {
        let value = Value::from(List::from_values([
            Value::from("a"),
            Value::from("b"),
            Value::Int(3),
        ]));
        let err = StringList::default()
            .unpack(&value)
            .expect_err("third element is not a string");
        assert_eq!(err.to_string(), "at index 2: expected string, actual: int");
    }

    #[rstest]
    fn string_string_map_rejects_non_string_keys() {
        let value = Value::from(Dict::from_entries([(1_i64, "x")]));
        assert_eq!(
            StringStringMap::default().unpack(&value),
            Err(Error::NonStringKey("int"))
        );
    }

    #[rstest]
    fn local_paths_resolve_against_thread() -> Result<()> {
        let thread = Thread::new("/work/project");
        let mut empty = LocalPath::new(&thread);
        empty.unpack(&Value::from(""))?;
        ensure!(empty.value == "/work/project");

        let mut list = LocalPathList::new(&thread);
        list.unpack(&Value::from(List::from_values(["src", "/abs"])))?;
        ensure!(list.value == vec!["/work/project/src".to_owned(), "/abs".to_owned()]);
        Ok(())
    }
}
