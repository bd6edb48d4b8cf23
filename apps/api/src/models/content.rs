use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// One row of the marketing content catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentEntry {
    pub topic: String,
    pub description: String,
    pub link: String,
    /// Any additional catalog columns, keyed by header.
    #[serde(flatten)]
    pub extra: BTreeMap<String, String>,
}
