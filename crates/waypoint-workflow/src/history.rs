use chrono::{DateTime, SubsecRound, Utc};

use crate::state::State;

/// Operator recorded on the synthetic entry for the starting state.
pub const SYSTEM_OPERATOR: &str = "System";

/// Comment recorded on the synthetic entry for the starting state.
pub const INITIAL_STATE_COMMENT: &str = "Initial state";

/// Immutable audit record of the workflow entering a state.
///
/// The state name is captured when the entry is written, so it survives later
/// renames or removal of the state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryEntry {
  pub state_id: String,
  pub state_name: String,
  /// Whole milliseconds; finer precision is dropped when the entry is written.
  pub timestamp: DateTime<Utc>,
  pub operator: Option<String>,
  pub comment: Option<String>,
  /// The transition that produced this entry; absent on the synthetic seed.
  pub transition_id: Option<String>,
}

/// Truncate `at` to the millisecond precision history timestamps are persisted with.
pub(crate) fn recorded_at(at: DateTime<Utc>) -> DateTime<Utc> {
  at.trunc_subsecs(3)
}

impl HistoryEntry {
  pub(crate) fn seed(state: &State, at: DateTime<Utc>) -> Self {
    Self {
      state_id: state.id.clone(),
      state_name: state.name.clone(),
      timestamp: recorded_at(at),
      operator: Some(SYSTEM_OPERATOR.to_string()),
      comment: Some(INITIAL_STATE_COMMENT.to_string()),
      transition_id: None,
    }
  }
}

/// Who moved the workflow and why.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransitionContext {
  pub operator: Option<String>,
  pub comment: Option<String>,
  pub transition_id: Option<String>,
}

impl TransitionContext {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn by(mut self, operator: impl Into<String>) -> Self {
    self.operator = Some(operator.into());
    self
  }

  pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
    self.comment = Some(comment.into());
    self
  }

  pub fn via(mut self, transition_id: impl Into<String>) -> Self {
    self.transition_id = Some(transition_id.into());
    self
  }
}
