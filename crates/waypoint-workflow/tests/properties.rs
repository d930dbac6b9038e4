//! Invariants that hold for any sequence of workflow operations.

use chrono::{DateTime, Duration, TimeZone, Utc};
use proptest::prelude::*;
use waypoint_workflow::{State, StatePatch, Transition, TransitionContext, Workflow};

const IDS: [&str; 5] = ["s0", "s1", "s2", "s3", "s4"];

#[derive(Debug, Clone)]
enum Op {
  AddState { id: usize, initial: bool, terminal: bool },
  UpdateInitial { id: usize },
  SetInitial { id: usize },
  RemoveState { id: usize },
  AddTransition { from: usize, to: usize },
  RemoveTransition { index: usize },
  TransitionTo { id: usize },
}

fn arb_op() -> impl Strategy<Value = Op> {
  prop_oneof![
    3 => (0..IDS.len(), any::<bool>(), any::<bool>())
      .prop_map(|(id, initial, terminal)| Op::AddState { id, initial, terminal }),
    1 => (0..IDS.len()).prop_map(|id| Op::UpdateInitial { id }),
    1 => (0..IDS.len()).prop_map(|id| Op::SetInitial { id }),
    1 => (0..IDS.len()).prop_map(|id| Op::RemoveState { id }),
    3 => (0..IDS.len(), 0..IDS.len()).prop_map(|(from, to)| Op::AddTransition { from, to }),
    1 => (0..8usize).prop_map(|index| Op::RemoveTransition { index }),
    3 => (0..IDS.len()).prop_map(|id| Op::TransitionTo { id }),
  ]
}

fn base() -> DateTime<Utc> {
  Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()
}

/// Apply one operation. State ids stay unique and transitions only join
/// registered states.
fn apply(workflow: &Workflow, op: &Op, step: usize) -> Workflow {
  let at = base() + Duration::nanoseconds(step as i64 * 1_000_123_457);
  match *op {
    Op::AddState { id, initial, terminal } => {
      if workflow.states().contains(IDS[id]) {
        return workflow.clone();
      }
      let mut state = State::new(IDS[id], format!("State {id}"));
      state.is_initial = initial;
      state.is_final = terminal;
      workflow.add_state(state, at)
    }
    Op::UpdateInitial { id } => workflow.update_state(
      IDS[id],
      &StatePatch {
        is_initial: Some(true),
        ..Default::default()
      },
    ),
    Op::SetInitial { id } => workflow.set_initial_state(IDS[id]),
    Op::RemoveState { id } => workflow.remove_state(IDS[id]),
    Op::AddTransition { from, to } => {
      if !workflow.states().contains(IDS[from]) || !workflow.states().contains(IDS[to]) {
        return workflow.clone();
      }
      let id = format!("t{step}");
      workflow.add_transition(Transition::new(id, IDS[from], IDS[to], "go"))
    }
    Op::RemoveTransition { index } => match workflow.transitions().all().get(index) {
      Some(t) => workflow.remove_transition(&t.id),
      None => workflow.clone(),
    },
    Op::TransitionTo { id } => workflow
      .transition_to(IDS[id], TransitionContext::new().by("prop"), at)
      .unwrap_or_else(|_| workflow.clone()),
  }
}

fn arb_workflow() -> impl Strategy<Value = Workflow> {
  prop::collection::vec(arb_op(), 0..40).prop_map(|ops| {
    ops
      .iter()
      .enumerate()
      .fold(Workflow::empty(), |w, (step, op)| apply(&w, op, step))
  })
}

proptest! {
  /// At most one state is flagged initial after any sequence of edits.
  #[test]
  fn test_single_initial_state(ops in prop::collection::vec(arb_op(), 0..40)) {
    let mut workflow = Workflow::empty();
    for (step, op) in ops.iter().enumerate() {
      workflow = apply(&workflow, op, step);
      let initial = workflow.states().all().iter().filter(|s| s.is_initial).count();
      prop_assert!(initial <= 1, "{initial} initial states after {op:?}");
    }
  }

  /// The current state is empty or a registered state.
  #[test]
  fn test_current_state_is_valid(ops in prop::collection::vec(arb_op(), 0..40)) {
    let mut workflow = Workflow::empty();
    for (step, op) in ops.iter().enumerate() {
      workflow = apply(&workflow, op, step);
      let current = workflow.current_state_id();
      prop_assert!(current.is_empty() || workflow.states().contains(current));
    }
  }

  /// A successful transition keeps the old history as a prefix and adds one entry.
  #[test]
  fn test_history_is_append_only(workflow in arb_workflow(), target in 0..IDS.len()) {
    if let Ok(next) = workflow.transition_to(IDS[target], TransitionContext::new(), base()) {
      prop_assert_eq!(next.history().len(), workflow.history().len() + 1);
      prop_assert_eq!(&next.history()[..workflow.history().len()], workflow.history());
      prop_assert_eq!(next.history().last().map(|e| e.state_id.as_str()), Some(IDS[target]));
    }
  }

  /// A transition succeeds exactly when an outgoing edge targets the state.
  #[test]
  fn test_transition_legality(workflow in arb_workflow(), target in 0..IDS.len()) {
    let reachable = workflow
      .transitions()
      .outgoing_from(workflow.current_state_id())
      .any(|t| t.to == IDS[target]);
    let result = workflow.transition_to(IDS[target], TransitionContext::new(), base());
    prop_assert_eq!(result.is_ok(), reachable);
  }

  /// Removing a state removes every transition touching it.
  #[test]
  fn test_cascade_delete(workflow in arb_workflow(), id in 0..IDS.len()) {
    let removed = workflow.remove_state(IDS[id]);
    prop_assert!(removed.transitions().all().iter().all(|t| t.from != IDS[id] && t.to != IDS[id]));
    prop_assert!(!removed.states().contains(IDS[id]));
    prop_assert_eq!(removed.history(), workflow.history());
  }

  /// Encoding then decoding yields an equal workflow, including history
  /// written at sub-millisecond instants.
  #[test]
  fn test_plain_round_trip(workflow in arb_workflow()) {
    let restored = Workflow::from_plain(workflow.to_plain()).unwrap();
    prop_assert_eq!(restored, workflow);
  }
}
