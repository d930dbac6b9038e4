use thiserror::Error;

/// Errors raised by workflow operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WorkflowError {
  /// No outgoing transition leads from the current state to the target.
  #[error("illegal transition: no transition from '{from}' to '{to}'")]
  IllegalTransition { from: String, to: String },

  /// The id does not resolve to any registered state.
  #[error("unknown state: {0}")]
  UnknownState(String),

  /// The id does not resolve to any registered transition.
  #[error("unknown transition: {0}")]
  UnknownTransition(String),
}

/// Errors raised while decoding a persisted workflow.
#[derive(Debug, Error)]
pub enum DecodeError {
  #[error("invalid workflow json: {0}")]
  Json(#[from] serde_json::Error),

  #[error("invalid timestamp '{value}' in history entry {index}: {source}")]
  InvalidTimestamp {
    index: usize,
    value: String,
    #[source]
    source: chrono::ParseError,
  },

  /// `currentStateId` is set but names no state in the workflow.
  #[error("current state '{0}' does not reference any state")]
  DanglingCurrentState(String),
}
