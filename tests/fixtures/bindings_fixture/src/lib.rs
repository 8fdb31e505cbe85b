//! Model package and generated host bindings exercised by the integration
//! tests.

pub mod bindings;
pub mod metav1;
pub mod v1alpha1;
