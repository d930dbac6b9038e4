//! Conversion between [`Workflow`] and its persisted plain form.
//!
//! Encoding is infallible. Decoding tolerates missing fields (they default to
//! empty) but rejects malformed JSON, unparseable timestamps and a current
//! state that names no state.

use chrono::{DateTime, SecondsFormat, Utc};
use waypoint_config::{PlainHistoryEntry, PlainState, PlainTransition, PlainWorkflow};

use crate::error::DecodeError;
use crate::history::HistoryEntry;
use crate::state::{State, StateRegistry};
use crate::transition::{Transition, TransitionTable};
use crate::workflow::Workflow;

impl Workflow {
  /// Encode into the persisted shape. Timestamps become ISO-8601 strings.
  pub fn to_plain(&self) -> PlainWorkflow {
    PlainWorkflow {
      states: self.states().all().iter().map(PlainState::from).collect(),
      transitions: self
        .transitions()
        .all()
        .iter()
        .map(PlainTransition::from)
        .collect(),
      current_state_id: self.current_state_id().to_string(),
      execution_history: self.history().iter().map(PlainHistoryEntry::from).collect(),
    }
  }

  /// Decode the persisted shape.
  pub fn from_plain(plain: PlainWorkflow) -> Result<Self, DecodeError> {
    let states = StateRegistry::from_states(plain.states.into_iter().map(State::from).collect());
    let transitions =
      TransitionTable::from_transitions(plain.transitions.into_iter().map(Transition::from).collect());

    if !plain.current_state_id.is_empty() && !states.contains(&plain.current_state_id) {
      return Err(DecodeError::DanglingCurrentState(plain.current_state_id));
    }

    let history = plain
      .execution_history
      .into_iter()
      .enumerate()
      .map(|(index, entry)| decode_history_entry(index, entry))
      .collect::<Result<Vec<_>, _>>()?;

    Ok(Self::from_parts(
      states,
      transitions,
      plain.current_state_id,
      history,
    ))
  }

  pub fn to_json(&self) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(&self.to_plain())
  }

  pub fn from_json(json: &str) -> Result<Self, DecodeError> {
    let plain: PlainWorkflow = serde_json::from_str(json)?;
    Self::from_plain(plain)
  }
}

impl From<&Workflow> for PlainWorkflow {
  fn from(workflow: &Workflow) -> Self {
    workflow.to_plain()
  }
}

impl TryFrom<PlainWorkflow> for Workflow {
  type Error = DecodeError;

  fn try_from(plain: PlainWorkflow) -> Result<Self, Self::Error> {
    Workflow::from_plain(plain)
  }
}

/// Format a timestamp the way history entries are persisted: `2024-01-01T00:00:00.000Z`.
pub fn format_timestamp(timestamp: &DateTime<Utc>) -> String {
  timestamp.to_rfc3339_opts(SecondsFormat::Millis, true)
}

pub fn parse_timestamp(value: &str) -> Result<DateTime<Utc>, chrono::ParseError> {
  DateTime::parse_from_rfc3339(value).map(|ts| ts.with_timezone(&Utc))
}

fn decode_history_entry(index: usize, entry: PlainHistoryEntry) -> Result<HistoryEntry, DecodeError> {
  let timestamp = parse_timestamp(&entry.timestamp).map_err(|source| DecodeError::InvalidTimestamp {
    index,
    value: entry.timestamp.clone(),
    source,
  })?;

  Ok(HistoryEntry {
    state_id: entry.state_id,
    state_name: entry.state_name,
    timestamp,
    operator: entry.operator,
    comment: entry.comment,
    transition_id: entry.transition_id,
  })
}

impl From<&State> for PlainState {
  fn from(state: &State) -> Self {
    Self {
      id: state.id.clone(),
      name: state.name.clone(),
      description: state.description.clone(),
      is_initial: state.is_initial,
      is_final: state.is_final,
      color: state.color.clone(),
    }
  }
}

impl From<PlainState> for State {
  fn from(plain: PlainState) -> Self {
    Self {
      id: plain.id,
      name: plain.name,
      description: plain.description,
      is_initial: plain.is_initial,
      is_final: plain.is_final,
      color: plain.color,
    }
  }
}

impl From<&Transition> for PlainTransition {
  fn from(transition: &Transition) -> Self {
    Self {
      id: transition.id.clone(),
      from: transition.from.clone(),
      to: transition.to.clone(),
      condition: transition.condition.clone(),
      action: transition.action.clone(),
    }
  }
}

impl From<PlainTransition> for Transition {
  fn from(plain: PlainTransition) -> Self {
    Self {
      id: plain.id,
      from: plain.from,
      to: plain.to,
      condition: plain.condition,
      action: plain.action,
    }
  }
}

impl From<&HistoryEntry> for PlainHistoryEntry {
  fn from(entry: &HistoryEntry) -> Self {
    Self {
      state_id: entry.state_id.clone(),
      state_name: entry.state_name.clone(),
      timestamp: format_timestamp(&entry.timestamp),
      operator: entry.operator.clone(),
      comment: entry.comment.clone(),
      transition_id: entry.transition_id.clone(),
    }
  }
}
