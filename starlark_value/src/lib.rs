//! Host value model targeted by `starlark-bindgen` output.
//!
//! Generated bindings convert between these dynamic values and typed Rust
//! records. The crate provides the value kinds a script can produce
//! ([`Value`], [`Dict`], [`List`]), the [`Unpack`] trait with its generic
//! unpackers, keyword-argument binding ([`unpack_args`]) and a registry of
//! builtins ([`Environment`]). It does not evaluate scripts.
//!
//! All types use `Rc` and interior mutability: a host serialises calls into
//! one thread, so none of them are `Send`.

mod args;
mod containers;
mod env;
mod error;
mod thread;
mod unpack;
mod value;

pub use args::{Arguments, Param, unpack_args};
pub use containers::{Dict, List};
pub use env::{Builtin, Environment};
pub use error::Error;
pub use thread::Thread;
pub use unpack::{LocalPath, LocalPathList, StringList, StringStringMap, Unpack};
pub use value::{DictKey, Object, Value};
