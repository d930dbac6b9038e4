use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use waypoint_config::PlainWorkflow;

use crate::{Error, Versioned, WorkflowStore};

/// In-memory workflow store.
///
/// Suitable for tests and single-process use. Every write bumps the version
/// of its key.
#[derive(Debug, Default)]
pub struct InMemoryWorkflowStore {
  data: RwLock<HashMap<String, Versioned<PlainWorkflow>>>,
}

impl InMemoryWorkflowStore {
  pub fn new() -> Self {
    Self::default()
  }
}

#[async_trait]
impl WorkflowStore for InMemoryWorkflowStore {
  async fn load(&self, key: &str) -> Result<Option<Versioned<PlainWorkflow>>, Error> {
    Ok(self.data.read().await.get(key).cloned())
  }

  async fn save(&self, key: &str, workflow: &PlainWorkflow) -> Result<u64, Error> {
    let mut data = self.data.write().await;
    let version = data.get(key).map_or(0, |v| v.version) + 1;
    data.insert(
      key.to_string(),
      Versioned {
        version,
        value: workflow.clone(),
      },
    );
    Ok(version)
  }

  async fn save_if_version(
    &self,
    key: &str,
    workflow: &PlainWorkflow,
    expected: u64,
  ) -> Result<u64, Error> {
    let mut data = self.data.write().await;
    let actual = data.get(key).map_or(0, |v| v.version);
    if actual != expected {
      return Err(Error::Conflict {
        key: key.to_string(),
        expected,
        actual,
      });
    }

    let version = actual + 1;
    data.insert(
      key.to_string(),
      Versioned {
        version,
        value: workflow.clone(),
      },
    );
    Ok(version)
  }
}
