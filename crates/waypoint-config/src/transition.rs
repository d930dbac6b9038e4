use serde::{Deserialize, Serialize};

/// A directed edge between two states as persisted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PlainTransition {
  pub id: String,
  pub from: String,
  pub to: String,
  /// Human-readable label describing when the transition fires.
  pub condition: String,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub action: Option<String>,
}
