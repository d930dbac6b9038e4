use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

use crate::error::WorkflowError;
use crate::history::{HistoryEntry, TransitionContext, recorded_at};
use crate::state::{DEFAULT_STATE_COLOR, State, StatePatch, StateRegistry};
use crate::transition::{Transition, TransitionTable};

/// Name reported for ids that do not resolve to a state.
pub const UNKNOWN_STATE_NAME: &str = "Unknown state";

/// A workflow: states, transitions, the current position and its history.
///
/// `Workflow` is an immutable value. Every operation returns a new snapshot
/// and leaves `self` untouched, so callers can keep previous snapshots around
/// for undo or diffing.
///
/// `current_state_id` is either empty or the id of a registered state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Workflow {
  states: StateRegistry,
  transitions: TransitionTable,
  current_state_id: String,
  history: Vec<HistoryEntry>,
}

impl Workflow {
  /// A workflow with no states, no transitions and no history.
  pub fn empty() -> Self {
    Self::default()
  }

  /// Build a workflow and seed its history.
  ///
  /// Without an explicit `current_state_id` the state flagged initial becomes
  /// current. An explicit id that does not resolve falls back the same way.
  /// When a current state is resolved, history starts with one synthetic
  /// entry attributed to the system.
  pub fn create(
    states: Vec<State>,
    transitions: Vec<Transition>,
    current_state_id: Option<&str>,
    at: DateTime<Utc>,
  ) -> Self {
    let states = StateRegistry::from_states(states);
    let transitions = TransitionTable::from_transitions(transitions);

    let current = match current_state_id {
      Some(id) if states.contains(id) => Some(id.to_string()),
      Some(id) => {
        warn!(state_id = %id, "current state does not resolve, falling back to initial state");
        None
      }
      None => None,
    }
    .or_else(|| states.initial().map(|s| s.id.clone()))
    .unwrap_or_default();

    let history = states
      .get(&current)
      .map(|state| vec![HistoryEntry::seed(state, at)])
      .unwrap_or_default();

    Self {
      states,
      transitions,
      current_state_id: current,
      history,
    }
  }

  /// Reassemble a workflow from already-validated parts.
  pub(crate) fn from_parts(
    states: StateRegistry,
    transitions: TransitionTable,
    current_state_id: String,
    history: Vec<HistoryEntry>,
  ) -> Self {
    Self {
      states,
      transitions,
      current_state_id,
      history,
    }
  }

  pub fn states(&self) -> &StateRegistry {
    &self.states
  }

  pub fn transitions(&self) -> &TransitionTable {
    &self.transitions
  }

  pub fn current_state_id(&self) -> &str {
    &self.current_state_id
  }

  pub fn current_state(&self) -> Option<&State> {
    self.states.get(&self.current_state_id)
  }

  pub fn initial_state(&self) -> Option<&State> {
    self.states.initial()
  }

  /// Audit trail, oldest first.
  pub fn history(&self) -> &[HistoryEntry] {
    &self.history
  }

  /// Register a state.
  ///
  /// The first state of an empty workflow becomes initial and current, and a
  /// synthetic entry for it is appended to the history.
  pub fn add_state(&self, state: State, at: DateTime<Utc>) -> Self {
    let was_empty = self.states.is_empty();
    debug!(state_id = %state.id, name = %state.name, "adding state");

    let mut next = Self {
      states: self.states.add_state(state),
      ..self.clone()
    };

    if was_empty && let Some(first) = next.states.all().first() {
      next.current_state_id = first.id.clone();
      next.history.push(HistoryEntry::seed(first, at));
    }

    next
  }

  /// Patch a state in place. Current state and history are left alone.
  pub fn update_state(&self, id: &str, patch: &StatePatch) -> Self {
    if !self.states.contains(id) {
      warn!(state_id = %id, "update of unknown state ignored");
      return self.clone();
    }

    debug!(state_id = %id, "updating state");
    Self {
      states: self.states.update_state(id, patch),
      ..self.clone()
    }
  }

  /// Remove a state and every transition touching it.
  ///
  /// If it was current, the initial state (if any is left) becomes current,
  /// otherwise the workflow has no current state. History is never pruned.
  pub fn remove_state(&self, id: &str) -> Self {
    let states = self.states.remove_state(id);
    let transitions = self.transitions.remove_referencing(id);

    let current_state_id = if self.current_state_id == id {
      states.initial().map(|s| s.id.clone()).unwrap_or_default()
    } else {
      self.current_state_id.clone()
    };

    debug!(
      state_id = %id,
      removed_transitions = self.transitions.len() - transitions.len(),
      current = %current_state_id,
      "removed state"
    );

    Self {
      states,
      transitions,
      current_state_id,
      history: self.history.clone(),
    }
  }

  /// Flag `id` as the only initial state and jump the current pointer to it.
  ///
  /// The jump happens even mid-flow and writes no history entry. Unknown ids
  /// leave the workflow unchanged.
  pub fn set_initial_state(&self, id: &str) -> Self {
    if !self.states.contains(id) {
      warn!(state_id = %id, "cannot flag unknown state as initial");
      return self.clone();
    }

    debug!(state_id = %id, "setting initial state");
    Self {
      states: self.states.set_initial_state(id),
      current_state_id: id.to_string(),
      ..self.clone()
    }
  }

  /// Add an edge. Endpoints are not checked against the registry.
  pub fn add_transition(&self, transition: Transition) -> Self {
    debug!(
      transition_id = %transition.id,
      from = %transition.from,
      to = %transition.to,
      "adding transition"
    );
    Self {
      transitions: self.transitions.add_transition(transition),
      ..self.clone()
    }
  }

  pub fn remove_transition(&self, id: &str) -> Self {
    debug!(transition_id = %id, "removing transition");
    Self {
      transitions: self.transitions.remove_transition(id),
      ..self.clone()
    }
  }

  /// Whether an edge leads from the current state to `target_id`.
  pub fn can_transition_to(&self, target_id: &str) -> bool {
    self.transitions.can_reach(&self.current_state_id, target_id)
  }

  /// Edges leaving the current state, in insertion order.
  pub fn available_transitions(&self) -> Vec<&Transition> {
    self.transitions.outgoing_from(&self.current_state_id).collect()
  }

  /// Move to `target_id` and append a history entry.
  ///
  /// Fails with [`WorkflowError::IllegalTransition`] when no edge leads there
  /// from the current state, and with [`WorkflowError::UnknownState`] when the
  /// target names no state. On failure `self` is the unchanged snapshot.
  pub fn transition_to(
    &self,
    target_id: &str,
    context: TransitionContext,
    at: DateTime<Utc>,
  ) -> Result<Self, WorkflowError> {
    if !self.can_transition_to(target_id) {
      warn!(from = %self.current_state_id, to = %target_id, "rejected illegal transition");
      return Err(WorkflowError::IllegalTransition {
        from: self.current_state_id.clone(),
        to: target_id.to_string(),
      });
    }

    let target = self
      .states
      .get(target_id)
      .ok_or_else(|| WorkflowError::UnknownState(target_id.to_string()))?;

    info!(
      from = %self.current_state_id,
      to = %target.id,
      operator = context.operator.as_deref().unwrap_or(""),
      "transition committed"
    );

    let mut history = self.history.clone();
    history.push(HistoryEntry {
      state_id: target.id.clone(),
      state_name: target.name.clone(),
      timestamp: recorded_at(at),
      operator: context.operator,
      comment: context.comment,
      transition_id: context.transition_id,
    });

    Ok(Self {
      states: self.states.clone(),
      transitions: self.transitions.clone(),
      current_state_id: target.id.clone(),
      history,
    })
  }

  /// Fire a specific transition by id.
  ///
  /// The transition must leave the current state. The resulting history entry
  /// links back to it.
  pub fn execute_transition(
    &self,
    transition_id: &str,
    context: TransitionContext,
    at: DateTime<Utc>,
  ) -> Result<Self, WorkflowError> {
    let transition = self
      .transitions
      .get(transition_id)
      .ok_or_else(|| WorkflowError::UnknownTransition(transition_id.to_string()))?;

    if transition.from != self.current_state_id {
      warn!(
        transition_id = %transition_id,
        from = %transition.from,
        current = %self.current_state_id,
        "transition does not leave the current state"
      );
      return Err(WorkflowError::IllegalTransition {
        from: self.current_state_id.clone(),
        to: transition.to.clone(),
      });
    }

    self.transition_to(&transition.to, context.via(transition.id.clone()), at)
  }

  /// Whether the current state is flagged final. False when there is none.
  pub fn is_final_state(&self) -> bool {
    self.current_state().is_some_and(|s| s.is_final)
  }

  /// Display name for `id`, or [`UNKNOWN_STATE_NAME`].
  pub fn state_name(&self, id: &str) -> &str {
    self
      .states
      .get(id)
      .map(|s| s.name.as_str())
      .unwrap_or(UNKNOWN_STATE_NAME)
  }

  /// Display color for `id` (the current state when `None`), or the default.
  pub fn state_color(&self, id: Option<&str>) -> &str {
    let id = id.unwrap_or(self.current_state_id.as_str());
    self
      .states
      .get(id)
      .map(|s| s.color.as_str())
      .filter(|c| !c.is_empty())
      .unwrap_or(DEFAULT_STATE_COLOR)
  }

  /// Ensure both endpoints of `transition` are registered states.
  pub fn check_endpoints(&self, transition: &Transition) -> Result<(), WorkflowError> {
    for endpoint in [&transition.from, &transition.to] {
      if !self.states.contains(endpoint) {
        return Err(WorkflowError::UnknownState(endpoint.clone()));
      }
    }
    Ok(())
  }
}
