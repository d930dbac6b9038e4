use serde::{Deserialize, Serialize};

/// One audit record of the execution history as persisted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PlainHistoryEntry {
  pub state_id: String,
  pub state_name: String,
  /// ISO-8601 timestamp, e.g. `2024-01-01T00:00:00.000Z`.
  pub timestamp: String,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub operator: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub comment: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub transition_id: Option<String>,
}
