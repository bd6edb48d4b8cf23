use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A single CRM activity as returned by the activity collection.
///
/// Only `activity_at` and `lead_id` are read by the fetcher. Every other field
/// is carried through untouched in `payload`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivityRecord {
    pub activity_at: DateTime<Utc>,
    #[serde(default)]
    pub lead_id: Option<String>,
    #[serde(flatten)]
    pub payload: Map<String, Value>,
}

/// One page of the activity collection, in server order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ActivityPage {
    #[serde(rename = "data", default)]
    pub records: Vec<ActivityRecord>,
    #[serde(default)]
    pub has_more: bool,
}
