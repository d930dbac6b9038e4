//! Waypoint Config
//!
//! This crate contains the plain, JSON-safe representation of a Waypoint
//! workflow. It is the shape an external repository reads and writes when it
//! persists a workflow for a parent entity (a company's payment workflow, a
//! contract's approval flow, ...).
//!
//! The plain form is deliberately loose: every collection defaults to empty
//! and timestamps are ISO-8601 strings. `waypoint-workflow` decodes it into
//! the typed engine value and encodes it back.
//!
//! # Example
//!
//! ```json
//! {
//!   "states": [
//!     { "id": "s1", "name": "Draft", "description": "", "isInitial": true, "isFinal": false, "color": "#6c757d" }
//!   ],
//!   "transitions": [],
//!   "currentStateId": "s1",
//!   "executionHistory": [
//!     { "stateId": "s1", "stateName": "Draft", "timestamp": "2024-01-01T00:00:00.000Z", "operator": "System", "comment": "Initial state" }
//!   ]
//! }
//! ```

mod history;
mod state;
mod transition;
mod workflow;

pub use history::PlainHistoryEntry;
pub use state::PlainState;
pub use transition::PlainTransition;
pub use workflow::PlainWorkflow;
