use tracing::{debug, warn};
use waypoint_workflow::Workflow;

use crate::{Error, Versioned, WorkflowStore};

/// Runs workflow operations as load-apply-save cycles against a store.
///
/// Each [`apply`](Self::apply) writes back with the version it read. If
/// another writer got in between, the cycle fails with [`Error::Conflict`]
/// and nothing is written; retrying is up to the caller.
pub struct WorkflowRepository<S: WorkflowStore> {
  store: S,
}

impl<S: WorkflowStore> WorkflowRepository<S> {
  pub fn new(store: S) -> Self {
    Self { store }
  }

  pub fn store(&self) -> &S {
    &self.store
  }

  /// Load and decode the workflow stored under `key`.
  pub async fn load(&self, key: &str) -> Result<Versioned<Workflow>, Error> {
    let stored = self
      .store
      .load(key)
      .await?
      .ok_or_else(|| Error::NotFound(key.to_string()))?;

    Ok(Versioned {
      version: stored.version,
      value: Workflow::from_plain(stored.value)?,
    })
  }

  /// Load the workflow (an empty one if none is stored), apply `op`, and
  /// write the result back if nobody else wrote in the meantime.
  pub async fn apply<F>(&self, key: &str, op: F) -> Result<Versioned<Workflow>, Error>
  where
    F: FnOnce(&Workflow) -> Result<Workflow, Error> + Send,
  {
    let (version, current) = match self.store.load(key).await? {
      Some(stored) => (stored.version, Workflow::from_plain(stored.value)?),
      None => (0, Workflow::empty()),
    };

    let next = op(&current)?;

    match self.store.save_if_version(key, &next.to_plain(), version).await {
      Ok(version) => {
        debug!(key = %key, version, "workflow saved");
        Ok(Versioned {
          version,
          value: next,
        })
      }
      Err(err) => {
        warn!(key = %key, error = %err, "workflow save rejected");
        Err(err)
      }
    }
  }
}
