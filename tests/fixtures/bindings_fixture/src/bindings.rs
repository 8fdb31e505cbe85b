//! Host bindings for the `v1alpha1` model package.
//!
//! Everything below [`Plugin`] is generated by the build script.

use std::any::Any;
use std::cell::RefCell;

/// Collects every root object built by a script.
#[derive(Default)]
pub struct Plugin {
    registered: RefCell<Vec<Box<dyn Any>>>,
}

impl Plugin {
    /// Creates a plugin with nothing registered.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn register<T: Any>(
        &self,
        _thread: &starlark_value::Thread,
        obj: T,
    ) -> Result<starlark_value::Value, starlark_value::Error> {
        self.registered.borrow_mut().push(Box::new(obj));
        Ok(starlark_value::Value::None)
    }

    /// Registered objects of type `T`, in registration order.
    #[must_use]
    pub fn registered<T: Any + Clone>(&self) -> Vec<T> {
        self.registered
            .borrow()
            .iter()
            .filter_map(|obj| obj.downcast_ref::<T>())
            .cloned()
            .collect()
    }

    /// Number of registered objects of any type.
    #[must_use]
    pub fn len(&self) -> usize {
        self.registered.borrow().len()
    }

    /// Whether nothing has been registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.registered.borrow().is_empty()
    }
}

include!(concat!(env!("OUT_DIR"), "/types.rs"));
