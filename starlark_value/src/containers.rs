//! Shared, freezable list and dict containers.
//!
//! Both containers have reference semantics: clones share storage, so
//! freezing a dict that was passed into an unpacker is visible to the caller
//! that built it.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use indexmap::IndexMap;

use crate::{DictKey, Error, Value};

#[derive(Debug, Default)]
struct DictInner {
    entries: RefCell<IndexMap<DictKey, Value>>,
    frozen: Cell<bool>,
}

/// Insertion-ordered mapping from [`DictKey`] to [`Value`].
#[derive(Clone, Debug, Default)]
pub struct Dict {
    inner: Rc<DictInner>,
}

impl Dict {
    /// Creates an empty dict.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty dict with room for `capacity` entries.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            inner: Rc::new(DictInner {
                entries: RefCell::new(IndexMap::with_capacity(capacity)),
                frozen: Cell::new(false),
            }),
        }
    }

    /// Builds an unfrozen dict from key/value pairs.
    pub fn from_entries<K, V, I>(entries: I) -> Self
    where
        K: Into<DictKey>,
        V: Into<Value>,
        I: IntoIterator<Item = (K, V)>,
    {
        let map = entries
            .into_iter()
            .map(|(key, value)| (key.into(), value.into()))
            .collect();
        Self {
            inner: Rc::new(DictInner {
                entries: RefCell::new(map),
                frozen: Cell::new(false),
            }),
        }
    }

    /// Inserts or replaces an entry, returning the previous value.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Frozen`] when the dict has been frozen.
    pub fn insert(
        &self,
        key: impl Into<DictKey>,
        value: impl Into<Value>,
    ) -> Result<Option<Value>, Error> {
        if self.is_frozen() {
            return Err(Error::Frozen("dict"));
        }
        Ok(self
            .inner
            .entries
            .borrow_mut()
            .insert(key.into(), value.into()))
    }

    /// Looks up a string key.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<Value> {
        self.inner
            .entries
            .borrow()
            .get(&DictKey::from(key))
            .cloned()
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.entries.borrow().len()
    }

    /// Returns `true` when the dict has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Snapshot of the entries in insertion order.
    #[must_use]
    pub fn items(&self) -> Vec<(DictKey, Value)> {
        self.inner
            .entries
            .borrow()
            .iter()
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect()
    }

    /// Makes the dict and every value reachable from it immutable.
    pub fn freeze(&self) {
        if self.inner.frozen.replace(true) {
            return;
        }
        for value in self.inner.entries.borrow().values() {
            value.freeze();
        }
    }

    /// Returns `true` once [`Dict::freeze`] has run.
    #[must_use]
    pub fn is_frozen(&self) -> bool {
        self.inner.frozen.get()
    }

    /// Returns `true` when both handles share storage.
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}

impl PartialEq for Dict {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
            || compare_once(
                (addr(&self.inner), addr(&other.inner)),
                || *self.inner.entries.borrow() == *other.inner.entries.borrow(),
            )
    }
}

#[derive(Debug, Default)]
struct ListInner {
    items: RefCell<Vec<Value>>,
    frozen: Cell<bool>,
}

/// Ordered sequence of [`Value`]s.
#[derive(Clone, Debug, Default)]
pub struct List {
    inner: Rc<ListInner>,
}

impl List {
    /// Creates an empty list.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds an unfrozen list from values.
    pub fn from_values<V, I>(values: I) -> Self
    where
        V: Into<Value>,
        I: IntoIterator<Item = V>,
    {
        Self {
            inner: Rc::new(ListInner {
                items: RefCell::new(values.into_iter().map(Into::into).collect()),
                frozen: Cell::new(false),
            }),
        }
    }

    /// Appends a value.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Frozen`] when the list has been frozen.
    pub fn push(&self, value: impl Into<Value>) -> Result<(), Error> {
        if self.is_frozen() {
            return Err(Error::Frozen("list"));
        }
        self.inner.items.borrow_mut().push(value.into());
        Ok(())
    }

    /// Element at `index`, if present.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<Value> {
        self.inner.items.borrow().get(index).cloned()
    }

    /// Number of elements.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.items.borrow().len()
    }

    /// Returns `true` when the list has no elements.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Snapshot of the elements.
    #[must_use]
    pub fn items(&self) -> Vec<Value> {
        self.inner.items.borrow().clone()
    }

    /// Makes the list and every value reachable from it immutable.
    pub fn freeze(&self) {
        if self.inner.frozen.replace(true) {
            return;
        }
        for value in self.inner.items.borrow().iter() {
            value.freeze();
        }
    }

    /// Returns `true` once [`List::freeze`] has run.
    #[must_use]
    pub fn is_frozen(&self) -> bool {
        self.inner.frozen.get()
    }

    /// Returns `true` when both handles share storage.
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}

impl PartialEq for List {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
            || compare_once(
                (addr(&self.inner), addr(&other.inner)),
                || *self.inner.items.borrow() == *other.inner.items.borrow(),
            )
    }
}

thread_local! {
    static COMPARING: RefCell<Vec<(usize, usize)>> = const { RefCell::new(Vec::new()) };
}

fn addr<T>(inner: &Rc<T>) -> usize {
    Rc::as_ptr(inner).cast::<()>().addr()
}

/// Runs `compare` for a pair of containers. A pair that is already being
/// compared further up the stack is assumed equal, so cyclic values terminate.
fn compare_once(pair: (usize, usize), compare: impl FnOnce() -> bool) -> bool {
    let entered = COMPARING.with(|stack| {
        let mut stack = stack.borrow_mut();
        if stack.contains(&pair) {
            false
        } else {
            stack.push(pair);
            true
        }
    });
    if !entered {
        return true;
    }
    let equal = compare();
    COMPARING.with(|stack| {
        stack.borrow_mut().pop();
    });
    equal
}
