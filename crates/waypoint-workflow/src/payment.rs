//! Fixed payment workflow.
//!
//! Payments follow a predefined lifecycle instead of a user-authored one.
//! [`PaymentState`] names those states and [`payment_workflow`] builds the
//! equivalent dynamic [`Workflow`], so both are driven through the same engine.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};

use crate::state::State;
use crate::transition::Transition;
use crate::workflow::Workflow;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PaymentState {
  Pending,
  Approved,
  Rejected,
  Paid,
  Cancelled,
}

impl PaymentState {
  pub const ALL: [PaymentState; 5] = [
    PaymentState::Pending,
    PaymentState::Approved,
    PaymentState::Rejected,
    PaymentState::Paid,
    PaymentState::Cancelled,
  ];

  /// Stable id used as the state id in the dynamic workflow.
  pub fn as_str(self) -> &'static str {
    match self {
      PaymentState::Pending => "pending",
      PaymentState::Approved => "approved",
      PaymentState::Rejected => "rejected",
      PaymentState::Paid => "paid",
      PaymentState::Cancelled => "cancelled",
    }
  }

  pub fn label(self) -> &'static str {
    match self {
      PaymentState::Pending => "Pending approval",
      PaymentState::Approved => "Approved",
      PaymentState::Rejected => "Rejected",
      PaymentState::Paid => "Paid",
      PaymentState::Cancelled => "Cancelled",
    }
  }

  pub fn color(self) -> &'static str {
    match self {
      PaymentState::Pending => "#f0ad4e",
      PaymentState::Approved => "#0275d8",
      PaymentState::Rejected => "#d9534f",
      PaymentState::Paid => "#5cb85c",
      PaymentState::Cancelled => "#6c757d",
    }
  }

  pub fn is_final(self) -> bool {
    matches!(self, PaymentState::Paid | PaymentState::Cancelled)
  }

  /// States reachable in one step, with the label of the edge.
  pub fn allowed_next(self) -> &'static [(PaymentState, &'static str)] {
    match self {
      PaymentState::Pending => &[
        (PaymentState::Approved, "Approve"),
        (PaymentState::Rejected, "Reject"),
        (PaymentState::Cancelled, "Cancel"),
      ],
      PaymentState::Approved => &[
        (PaymentState::Paid, "Mark as paid"),
        (PaymentState::Cancelled, "Cancel"),
      ],
      PaymentState::Rejected => &[(PaymentState::Pending, "Resubmit")],
      PaymentState::Paid | PaymentState::Cancelled => &[],
    }
  }

  pub fn can_transition_to(self, next: PaymentState) -> bool {
    self.allowed_next().iter().any(|(state, _)| *state == next)
  }
}

impl fmt::Display for PaymentState {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown payment state: {0}")]
pub struct UnknownPaymentState(pub String);

impl FromStr for PaymentState {
  type Err = UnknownPaymentState;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    PaymentState::ALL
      .into_iter()
      .find(|state| state.as_str() == s)
      .ok_or_else(|| UnknownPaymentState(s.to_string()))
  }
}

/// Build the payment lifecycle as a dynamic workflow, starting at `Pending`.
///
/// Transition ids are `{from}-{to}`.
pub fn payment_workflow(at: DateTime<Utc>) -> Workflow {
  let states = PaymentState::ALL
    .into_iter()
    .map(|state| {
      let mut s = State::new(state.as_str(), state.label()).with_color(state.color());
      s.is_initial = state == PaymentState::Pending;
      s.is_final = state.is_final();
      s
    })
    .collect();

  let transitions = PaymentState::ALL
    .into_iter()
    .flat_map(|from| {
      from.allowed_next().iter().map(move |(to, condition)| {
        Transition::new(
          format!("{}-{}", from.as_str(), to.as_str()),
          from.as_str(),
          to.as_str(),
          *condition,
        )
      })
    })
    .collect();

  Workflow::create(states, transitions, None, at)
}
