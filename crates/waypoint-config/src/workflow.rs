use serde::{Deserialize, Serialize};

use crate::history::PlainHistoryEntry;
use crate::state::PlainState;
use crate::transition::PlainTransition;

/// The complete persisted form of one workflow.
///
/// Missing fields default to empty, so `{}` decodes to a workflow with no
/// states, no transitions, an empty current state and no history.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PlainWorkflow {
  pub states: Vec<PlainState>,
  pub transitions: Vec<PlainTransition>,
  pub current_state_id: String,
  pub execution_history: Vec<PlainHistoryEntry>,
}

#[cfg(test)]
mod tests {
  use super::*;
  use serde_json::json;

  #[test]
  fn test_missing_fields_default_to_empty() {
    let plain: PlainWorkflow = serde_json::from_value(json!({})).unwrap();
    assert_eq!(plain, PlainWorkflow::default());
    assert!(plain.current_state_id.is_empty());
  }

  #[test]
  fn test_field_names_are_camel_case() {
    let plain = PlainWorkflow {
      states: vec![PlainState {
        id: "s1".to_string(),
        name: "Draft".to_string(),
        is_initial: true,
        ..Default::default()
      }],
      transitions: vec![PlainTransition {
        id: "t1".to_string(),
        from: "s1".to_string(),
        to: "s2".to_string(),
        condition: "Submit".to_string(),
        action: None,
      }],
      current_state_id: "s1".to_string(),
      execution_history: vec![PlainHistoryEntry {
        state_id: "s1".to_string(),
        state_name: "Draft".to_string(),
        timestamp: "2024-01-01T00:00:00.000Z".to_string(),
        operator: Some("System".to_string()),
        comment: None,
        transition_id: None,
      }],
    };

    let value = serde_json::to_value(&plain).unwrap();
    assert_eq!(value["currentStateId"], "s1");
    assert_eq!(value["states"][0]["isInitial"], true);
    assert_eq!(value["states"][0]["isFinal"], false);
    assert_eq!(value["executionHistory"][0]["stateName"], "Draft");
    assert!(value["executionHistory"][0].get("comment").is_none());
    assert!(value["transitions"][0].get("action").is_none());
  }

  #[test]
  fn test_partial_state_fills_defaults() {
    let plain: PlainWorkflow = serde_json::from_value(json!({
      "states": [{ "id": "s1", "name": "Draft" }],
      "currentStateId": "s1"
    }))
    .unwrap();

    assert_eq!(plain.states.len(), 1);
    assert!(!plain.states[0].is_initial);
    assert_eq!(plain.states[0].color, "");
    assert!(plain.execution_history.is_empty());
  }
}
