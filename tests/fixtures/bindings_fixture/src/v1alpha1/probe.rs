use serde::{Deserialize, Serialize};

/// Health check for a running command.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Probe {
    pub initial_delay_seconds: i32,
    pub period_seconds: i32,
    pub exec: Option<ExecAction>,
    pub http_get: Option<HttpGetAction>,
    /// Checked when this probe fails.
    pub fallback: Option<Box<Probe>>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecAction {
    pub command: Vec<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HttpGetAction {
    pub host: String,
    pub port: i32,
    pub path: String,
    #[serde(flatten)]
    pub scheme: Scheme,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scheme {
    pub scheme: String,
}
