use serde::{Deserialize, Serialize};

/// A workflow state as persisted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PlainState {
  pub id: String,
  pub name: String,
  pub description: String,
  pub is_initial: bool,
  pub is_final: bool,
  /// Display metadata, passed through untouched.
  pub color: String,
}
