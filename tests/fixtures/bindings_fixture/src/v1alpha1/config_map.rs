use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::metav1::ObjectMeta;

/// Plain key/value configuration.
///
/// +starlark:gen=true
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigMap {
    pub metadata: ObjectMeta,
    pub data: BTreeMap<String, String>,
}
