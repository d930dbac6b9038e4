//! Engine facade binding a clock, an id source and an integrity policy to the
//! pure [`Workflow`] operations.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::warn;

use crate::capability::{Clock, IdGenerator, SystemClock, UuidGenerator};
use crate::error::WorkflowError;
use crate::history::TransitionContext;
use crate::state::{DEFAULT_STATE_COLOR, State, StatePatch};
use crate::transition::Transition;
use crate::workflow::Workflow;

/// How strictly structural edits are checked against the registry.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ReferentialIntegrity {
  /// Edits are applied without checking ids; edits against unknown ids are no-ops.
  #[default]
  Lenient,
  /// Transition endpoints must resolve and edits must target existing ids.
  Strict,
}

/// Configuration for the workflow engine.
#[derive(Debug, Clone, Default)]
pub struct EngineConfig {
  pub integrity: ReferentialIntegrity,
}

/// A state to register. The engine generates the id when it is `None`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewState {
  pub id: Option<String>,
  pub name: String,
  pub description: String,
  pub is_initial: bool,
  pub is_final: bool,
  pub color: Option<String>,
}

/// A transition to register. The engine generates the id when it is `None`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewTransition {
  pub id: Option<String>,
  pub from: String,
  pub to: String,
  pub condition: String,
  pub action: Option<String>,
}

/// Applies workflow operations with injected time and identity sources.
#[derive(Clone)]
pub struct WorkflowEngine {
  config: EngineConfig,
  clock: Arc<dyn Clock>,
  ids: Arc<dyn IdGenerator>,
}

impl WorkflowEngine {
  /// Create an engine using the system clock and random UUIDs.
  pub fn new(config: EngineConfig) -> Self {
    Self {
      config,
      clock: Arc::new(SystemClock),
      ids: Arc::new(UuidGenerator),
    }
  }

  pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
    self.clock = Arc::new(clock);
    self
  }

  pub fn with_id_generator(mut self, ids: impl IdGenerator + 'static) -> Self {
    self.ids = Arc::new(ids);
    self
  }

  pub fn config(&self) -> &EngineConfig {
    &self.config
  }

  /// Current time according to the engine's clock.
  pub fn now(&self) -> DateTime<Utc> {
    self.clock.now()
  }

  pub fn create(
    &self,
    states: Vec<State>,
    transitions: Vec<Transition>,
    current_state_id: Option<&str>,
  ) -> Workflow {
    Workflow::create(states, transitions, current_state_id, self.now())
  }

  pub fn add_state(&self, workflow: &Workflow, new: NewState) -> Workflow {
    let state = State {
      id: new.id.unwrap_or_else(|| self.ids.generate()),
      name: new.name,
      description: new.description,
      is_initial: new.is_initial,
      is_final: new.is_final,
      color: new.color.unwrap_or_else(|| DEFAULT_STATE_COLOR.to_string()),
    };
    workflow.add_state(state, self.now())
  }

  pub fn update_state(
    &self,
    workflow: &Workflow,
    id: &str,
    patch: &StatePatch,
  ) -> Result<Workflow, WorkflowError> {
    self.require_state(workflow, id)?;
    Ok(workflow.update_state(id, patch))
  }

  pub fn remove_state(&self, workflow: &Workflow, id: &str) -> Result<Workflow, WorkflowError> {
    self.require_state(workflow, id)?;
    Ok(workflow.remove_state(id))
  }

  pub fn set_initial_state(&self, workflow: &Workflow, id: &str) -> Result<Workflow, WorkflowError> {
    self.require_state(workflow, id)?;
    Ok(workflow.set_initial_state(id))
  }

  pub fn add_transition(
    &self,
    workflow: &Workflow,
    new: NewTransition,
  ) -> Result<Workflow, WorkflowError> {
    let transition = Transition {
      id: new.id.unwrap_or_else(|| self.ids.generate()),
      from: new.from,
      to: new.to,
      condition: new.condition,
      action: new.action,
    };

    if self.is_strict() {
      workflow.check_endpoints(&transition)?;
    }
    Ok(workflow.add_transition(transition))
  }

  pub fn remove_transition(&self, workflow: &Workflow, id: &str) -> Result<Workflow, WorkflowError> {
    if self.is_strict() && workflow.transitions().get(id).is_none() {
      return Err(WorkflowError::UnknownTransition(id.to_string()));
    }
    Ok(workflow.remove_transition(id))
  }

  pub fn transition_to(
    &self,
    workflow: &Workflow,
    target_id: &str,
    context: TransitionContext,
  ) -> Result<Workflow, WorkflowError> {
    workflow.transition_to(target_id, context, self.now())
  }

  pub fn execute_transition(
    &self,
    workflow: &Workflow,
    transition_id: &str,
    context: TransitionContext,
  ) -> Result<Workflow, WorkflowError> {
    workflow.execute_transition(transition_id, context, self.now())
  }

  fn is_strict(&self) -> bool {
    self.config.integrity == ReferentialIntegrity::Strict
  }

  fn require_state(&self, workflow: &Workflow, id: &str) -> Result<(), WorkflowError> {
    if self.is_strict() && !workflow.states().contains(id) {
      warn!(state_id = %id, "strict engine rejected edit of unknown state");
      return Err(WorkflowError::UnknownState(id.to_string()));
    }
    Ok(())
  }
}

impl Default for WorkflowEngine {
  fn default() -> Self {
    Self::new(EngineConfig::default())
  }
}

#[cfg(test)]
mod tests {
  use chrono::TimeZone;

  use super::*;
  use crate::capability::{FixedClock, SequentialIds};

  fn engine(integrity: ReferentialIntegrity) -> WorkflowEngine {
    WorkflowEngine::new(EngineConfig { integrity })
      .with_clock(FixedClock::new(
        Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
      ))
      .with_id_generator(SequentialIds::new("id"))
  }

  fn named(name: &str) -> NewState {
    NewState {
      name: name.to_string(),
      ..Default::default()
    }
  }

  #[test]
  fn test_generated_ids_and_default_color() {
    let engine = engine(ReferentialIntegrity::Lenient);
    let workflow = engine.add_state(&Workflow::empty(), named("Draft"));
    let workflow = engine.add_state(&workflow, named("Review"));

    let ids: Vec<&str> = workflow.states().all().iter().map(|s| s.id.as_str()).collect();
    assert_eq!(ids, vec!["id-1", "id-2"]);
    assert_eq!(workflow.states().all()[0].color, DEFAULT_STATE_COLOR);
    assert_eq!(workflow.current_state_id(), "id-1");
    assert_eq!(
      workflow.history()[0].timestamp,
      Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()
    );
  }

  #[test]
  fn test_caller_supplied_ids_are_kept() {
    let engine = engine(ReferentialIntegrity::Lenient);
    let workflow = engine.add_state(
      &Workflow::empty(),
      NewState {
        id: Some("draft".to_string()),
        name: "Draft".to_string(),
        color: Some("#123456".to_string()),
        ..Default::default()
      },
    );
    assert_eq!(workflow.states().all()[0].id, "draft");
    assert_eq!(workflow.state_color(None), "#123456");
  }

  #[test]
  fn test_lenient_engine_accepts_dangling_transition() {
    let engine = engine(ReferentialIntegrity::Lenient);
    let workflow = engine.add_state(&Workflow::empty(), named("Draft"));
    let workflow = engine
      .add_transition(
        &workflow,
        NewTransition {
          from: "id-1".to_string(),
          to: "ghost".to_string(),
          condition: "Vanish".to_string(),
          ..Default::default()
        },
      )
      .unwrap();

    assert_eq!(workflow.transitions().len(), 1);
    assert!(engine.remove_transition(&workflow, "missing").is_ok());
    assert!(engine.remove_state(&workflow, "missing").is_ok());
  }

  #[test]
  fn test_strict_engine_rejects_unknown_ids() {
    let engine = engine(ReferentialIntegrity::Strict);
    let workflow = engine.add_state(&Workflow::empty(), named("Draft"));

    let err = engine
      .add_transition(
        &workflow,
        NewTransition {
          from: "id-1".to_string(),
          to: "ghost".to_string(),
          ..Default::default()
        },
      )
      .unwrap_err();
    assert_eq!(err, WorkflowError::UnknownState("ghost".to_string()));

    assert_eq!(
      engine.set_initial_state(&workflow, "ghost").unwrap_err(),
      WorkflowError::UnknownState("ghost".to_string())
    );
    assert_eq!(
      engine
        .update_state(&workflow, "ghost", &StatePatch::default())
        .unwrap_err(),
      WorkflowError::UnknownState("ghost".to_string())
    );
    assert_eq!(
      engine.remove_transition(&workflow, "t-missing").unwrap_err(),
      WorkflowError::UnknownTransition("t-missing".to_string())
    );
  }

  #[test]
  fn test_fixed_clock_nanoseconds_survive_round_trip() {
    let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
    let engine = engine(ReferentialIntegrity::Lenient)
      .with_clock(FixedClock::new(start + chrono::Duration::nanoseconds(7)));
    let workflow = engine.add_state(&Workflow::empty(), named("Draft"));

    assert_eq!(workflow.history()[0].timestamp, start);
    assert_eq!(Workflow::from_json(&workflow.to_json().unwrap()).unwrap(), workflow);
  }

  #[test]
  fn test_transition_uses_engine_clock() {
    let clock_time = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap();
    let engine = engine(ReferentialIntegrity::Strict);
    let workflow = engine.add_state(&Workflow::empty(), named("Draft"));
    let workflow = engine.add_state(&workflow, named("Done"));
    let workflow = engine
      .add_transition(
        &workflow,
        NewTransition {
          from: "id-1".to_string(),
          to: "id-2".to_string(),
          condition: "Finish".to_string(),
          ..Default::default()
        },
      )
      .unwrap();

    let engine = engine.with_clock(FixedClock::new(clock_time));
    let workflow = engine
      .execute_transition(&workflow, "id-3", TransitionContext::new().by("carol"))
      .unwrap();

    let entry = workflow.history().last().unwrap();
    assert_eq!(entry.timestamp, clock_time);
    assert_eq!(entry.transition_id.as_deref(), Some("id-3"));
  }
}
