/// A labeled, directed edge between two states.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
  pub id: String,
  pub from: String,
  pub to: String,
  /// Describes when or why the transition fires.
  pub condition: String,
  /// Side-effect label. Never executed by the engine.
  pub action: Option<String>,
}

impl Transition {
  pub fn new(
    id: impl Into<String>,
    from: impl Into<String>,
    to: impl Into<String>,
    condition: impl Into<String>,
  ) -> Self {
    Self {
      id: id.into(),
      from: from.into(),
      to: to.into(),
      condition: condition.into(),
      action: None,
    }
  }

  pub fn with_action(mut self, action: impl Into<String>) -> Self {
    self.action = Some(action.into());
    self
  }

  /// Whether either endpoint is `state_id`.
  pub fn references(&self, state_id: &str) -> bool {
    self.from == state_id || self.to == state_id
  }
}

/// Directed edges in insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransitionTable {
  transitions: Vec<Transition>,
}

impl TransitionTable {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn from_transitions(transitions: Vec<Transition>) -> Self {
    Self { transitions }
  }

  pub fn add_transition(&self, transition: Transition) -> Self {
    let mut transitions = self.transitions.clone();
    transitions.push(transition);
    Self { transitions }
  }

  pub fn remove_transition(&self, id: &str) -> Self {
    self.retain(|t| t.id != id)
  }

  /// Drop every transition starting or ending at `state_id`.
  pub fn remove_referencing(&self, state_id: &str) -> Self {
    self.retain(|t| !t.references(state_id))
  }

  /// Transitions leaving `state_id`, in insertion order.
  pub fn outgoing_from<'a>(&'a self, state_id: &'a str) -> impl Iterator<Item = &'a Transition> {
    self.transitions.iter().filter(move |t| t.from == state_id)
  }

  /// One-hop check: is there an edge `from_id -> to_id`.
  pub fn can_reach(&self, from_id: &str, to_id: &str) -> bool {
    self.outgoing_from(from_id).any(|t| t.to == to_id)
  }

  pub fn get(&self, id: &str) -> Option<&Transition> {
    self.transitions.iter().find(|t| t.id == id)
  }

  pub fn all(&self) -> &[Transition] {
    &self.transitions
  }

  pub fn len(&self) -> usize {
    self.transitions.len()
  }

  pub fn is_empty(&self) -> bool {
    self.transitions.is_empty()
  }

  fn retain(&self, keep: impl Fn(&Transition) -> bool) -> Self {
    Self {
      transitions: self.transitions.iter().filter(|t| keep(t)).cloned().collect(),
    }
  }
}
