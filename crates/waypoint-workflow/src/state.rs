/// Color used when a state carries none, or an id does not resolve.
pub const DEFAULT_STATE_COLOR: &str = "#6c757d";

/// A named node of the workflow graph.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct State {
  pub id: String,
  pub name: String,
  pub description: String,
  /// At most one state of a workflow carries this flag.
  pub is_initial: bool,
  /// Advisory terminal marker. Transitions out of a final state are not blocked.
  pub is_final: bool,
  /// Display metadata, opaque to the engine.
  pub color: String,
}

impl State {
  pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
    Self {
      id: id.into(),
      name: name.into(),
      description: String::new(),
      is_initial: false,
      is_final: false,
      color: DEFAULT_STATE_COLOR.to_string(),
    }
  }

  pub fn with_description(mut self, description: impl Into<String>) -> Self {
    self.description = description.into();
    self
  }

  pub fn with_color(mut self, color: impl Into<String>) -> Self {
    self.color = color.into();
    self
  }

  pub fn initial(mut self) -> Self {
    self.is_initial = true;
    self
  }

  pub fn terminal(mut self) -> Self {
    self.is_final = true;
    self
  }
}

/// Partial update for a [`State`]. `None` fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StatePatch {
  pub name: Option<String>,
  pub description: Option<String>,
  pub is_initial: Option<bool>,
  pub is_final: Option<bool>,
  pub color: Option<String>,
}

impl StatePatch {
  pub(crate) fn apply(&self, state: &mut State) {
    if let Some(name) = &self.name {
      state.name = name.clone();
    }
    if let Some(description) = &self.description {
      state.description = description.clone();
    }
    if let Some(is_initial) = self.is_initial {
      state.is_initial = is_initial;
    }
    if let Some(is_final) = self.is_final {
      state.is_final = is_final;
    }
    if let Some(color) = &self.color {
      state.color = color.clone();
    }
  }

  /// Whether applying this patch flags its state as the initial one.
  pub(crate) fn promotes_initial(&self) -> bool {
    self.is_initial == Some(true)
  }
}

/// Ordered collection of states.
///
/// Every operation returns a new registry; `self` is never mutated. Ids are
/// not checked for uniqueness, lookups resolve to the first match.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StateRegistry {
  states: Vec<State>,
}

impl StateRegistry {
  pub fn new() -> Self {
    Self::default()
  }

  /// Wrap existing states as-is, without touching their flags.
  pub fn from_states(states: Vec<State>) -> Self {
    Self { states }
  }

  /// Append a state.
  ///
  /// The first state of an empty registry is always flagged initial. A state
  /// added with `is_initial` to a non-empty registry takes the flag over from
  /// the others.
  pub fn add_state(&self, mut state: State) -> Self {
    let mut states = self.states.clone();
    if states.is_empty() {
      state.is_initial = true;
    } else if state.is_initial {
      for existing in &mut states {
        existing.is_initial = false;
      }
    }
    states.push(state);
    Self { states }
  }

  /// Merge `patch` into every state with `id`. Unknown ids leave the registry unchanged.
  ///
  /// A patch promoting to initial flags only the first match and clears the
  /// flag everywhere else.
  pub fn update_state(&self, id: &str, patch: &StatePatch) -> Self {
    if !self.contains(id) {
      return self.clone();
    }

    let promote = patch.promotes_initial();
    let mut flagged = false;
    let states = self
      .states
      .iter()
      .map(|state| {
        let mut state = state.clone();
        if state.id == id {
          patch.apply(&mut state);
          if promote {
            state.is_initial = !flagged;
            flagged = true;
          }
        } else if promote {
          state.is_initial = false;
        }
        state
      })
      .collect();

    Self { states }
  }

  pub fn remove_state(&self, id: &str) -> Self {
    Self {
      states: self.states.iter().filter(|s| s.id != id).cloned().collect(),
    }
  }

  /// Flag the first state with `id` as initial and clear the flag everywhere else.
  pub fn set_initial_state(&self, id: &str) -> Self {
    let mut flagged = false;
    Self {
      states: self
        .states
        .iter()
        .map(|s| {
          let is_initial = !flagged && s.id == id;
          flagged |= is_initial;
          State {
            is_initial,
            ..s.clone()
          }
        })
        .collect(),
    }
  }

  pub fn get(&self, id: &str) -> Option<&State> {
    self.states.iter().find(|s| s.id == id)
  }

  pub fn find(&self, predicate: impl Fn(&State) -> bool) -> Option<&State> {
    self.states.iter().find(|s| predicate(s))
  }

  pub fn all(&self) -> &[State] {
    &self.states
  }

  pub fn initial(&self) -> Option<&State> {
    self.find(|s| s.is_initial)
  }

  pub fn contains(&self, id: &str) -> bool {
    self.get(id).is_some()
  }

  pub fn len(&self) -> usize {
    self.states.len()
  }

  pub fn is_empty(&self) -> bool {
    self.states.is_empty()
  }
}
