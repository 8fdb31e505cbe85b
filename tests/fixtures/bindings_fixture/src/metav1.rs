//! Shared object metadata.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Identity and free-form labels common to every root object.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectMeta {
    /// Object name, unique per kind.
    pub name: String,
    /// Selector labels.
    pub labels: BTreeMap<String, String>,
    /// Non-identifying annotations.
    pub annotations: BTreeMap<String, String>,
}

/// A point in time. Scripts cannot set it.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Time {
    /// Seconds since the Unix epoch.
    pub seconds: i64,
}
