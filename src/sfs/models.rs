use serde::Deserialize;

use crate::internals::utils;

/// Response of the indexing request, `{ "loadingId": ... }`
#[derive(Debug, Deserialize)]
pub struct Index {
    /// The id of the triggered loading
    #[serde(rename = "loadingId", deserialize_with = "utils::id_from_string_or_number")]
    pub loading_id: String,
}

/// Minimum model of a loading log entry, all other fields the service sends
/// are kept in `extra`
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct LoadingLog {
    /// The loading id
    #[serde(deserialize_with = "utils::id_from_string_or_number")]
    pub id: String,
    /// Timestamp the task started
    #[serde(rename = "executionStart", default)]
    pub execution_start: Option<String>,
    /// Status of the task, `completed` once it is done
    #[serde(rename = "executionStatus", default)]
    pub execution_status: Option<String>,
    /// Outcome of the task
    #[serde(default)]
    pub outcome: Option<String>,
    /// Every other field of the entry
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}
