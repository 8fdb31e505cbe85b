use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::{ExecAction, Probe};
use crate::metav1::{ObjectMeta, Time};

/// A command run by the host.
///
/// +starlark:gen=true
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Cmd {
    pub metadata: ObjectMeta,
    pub spec: CmdSpec,
}

/// Port number a command listens on.
pub type Port = i32;

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct CmdSpec {
    pub args: Vec<String>,
    /// Labels attached to the spawned process, separate from the object's own.
    pub labels: BTreeMap<String, String>,
    /// Working directory.
    ///
    /// +starlark:local-path=true
    pub dir: String,
    pub env: BTreeMap<String, String>,
    pub port: Port,
    pub disabled: bool,
    pub restart_limit: Option<i32>,
    pub readiness_probe: Option<Probe>,
    pub probes: Vec<Probe>,
    /// +starlark:local-path=true
    pub watch_paths: Vec<String>,
    pub started_at: Option<Time>,
    #[serde(flatten)]
    pub exec: ExecAction,
}
