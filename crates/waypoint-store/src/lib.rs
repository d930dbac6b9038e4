//! Waypoint Store
//!
//! This crate is the seam between the workflow engine and whatever persists
//! it. A workflow is stored in its plain form under the key of the entity it
//! belongs to (a company, a contract, ...).
//!
//! The [`WorkflowStore`] trait defines:
//! - loading the stored workflow and its version
//! - unconditional writes (last write wins)
//! - conditional writes that fail on a version mismatch
//!
//! [`WorkflowRepository`] runs one engine operation as a read-modify-write
//! cycle on top of a store, using the conditional write so that concurrent
//! editors surface as [`Error::Conflict`] instead of silently losing updates.

mod memory;
mod repository;

pub use memory::InMemoryWorkflowStore;
pub use repository::WorkflowRepository;

use async_trait::async_trait;
use waypoint_config::PlainWorkflow;
use waypoint_workflow::{DecodeError, WorkflowError};

/// Error type for storage operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
  /// No workflow is stored under the key.
  #[error("not found: {0}")]
  NotFound(String),

  /// The stored version moved since it was read.
  #[error("version conflict for '{key}': expected {expected}, found {actual}")]
  Conflict {
    key: String,
    expected: u64,
    actual: u64,
  },

  /// The stored workflow could not be decoded.
  #[error("stored workflow is invalid: {0}")]
  Decode(#[from] DecodeError),

  /// The requested workflow operation was rejected.
  #[error(transparent)]
  Workflow(#[from] WorkflowError),
}

/// A value together with the store version it was read at.
///
/// Versions start at 1 for the first write; 0 means "never written".
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Versioned<T> {
  pub version: u64,
  pub value: T,
}

/// Storage trait for workflows keyed by their owning entity.
#[async_trait]
pub trait WorkflowStore: Send + Sync {
  /// Load the workflow stored under `key`, if any.
  async fn load(&self, key: &str) -> Result<Option<Versioned<PlainWorkflow>>, Error>;

  /// Write unconditionally and return the new version.
  async fn save(&self, key: &str, workflow: &PlainWorkflow) -> Result<u64, Error>;

  /// Write only if the stored version equals `expected` (0 = nothing stored).
  async fn save_if_version(
    &self,
    key: &str,
    workflow: &PlainWorkflow,
    expected: u64,
  ) -> Result<u64, Error>;
}
