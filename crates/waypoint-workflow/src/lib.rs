//! Waypoint Workflow
//!
//! A user-definable finite state machine for administrative records such as
//! contracts, budgets or payments. A [`Workflow`] holds:
//! - a [`StateRegistry`] with at most one initial state
//! - a [`TransitionTable`] of labeled, directed edges
//! - the current state
//! - an append-only execution history
//!
//! Workflows are immutable values: each operation returns a new snapshot.
//! [`WorkflowEngine`] binds a [`Clock`], an [`IdGenerator`] and a
//! [`ReferentialIntegrity`] policy to those operations. Persistence goes
//! through the plain form in `waypoint-config` via [`Workflow::to_plain`] and
//! [`Workflow::from_plain`].

mod capability;
mod codec;
mod engine;
mod error;
mod history;
mod payment;
mod state;
mod transition;
mod workflow;

pub use capability::{Clock, FixedClock, IdGenerator, SequentialIds, SystemClock, UuidGenerator};
pub use codec::{format_timestamp, parse_timestamp};
pub use engine::{EngineConfig, NewState, NewTransition, ReferentialIntegrity, WorkflowEngine};
pub use error::{DecodeError, WorkflowError};
pub use history::{HistoryEntry, INITIAL_STATE_COMMENT, SYSTEM_OPERATOR, TransitionContext};
pub use payment::{PaymentState, UnknownPaymentState, payment_workflow};
pub use state::{DEFAULT_STATE_COLOR, State, StatePatch, StateRegistry};
pub use transition::{Transition, TransitionTable};
pub use workflow::{UNKNOWN_STATE_NAME, Workflow};
