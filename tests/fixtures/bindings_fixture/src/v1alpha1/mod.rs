//! `v1alpha1` model types.

mod cmd;
mod config_map;
mod probe;

pub use cmd::{Cmd, CmdSpec, Port};
pub use config_map::ConfigMap;
pub use probe::{ExecAction, HttpGetAction, Probe, Scheme};
