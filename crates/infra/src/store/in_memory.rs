use std::sync::RwLock;

use tradenet_core::ExpectedVersion;
use tradenet_network::{ChangeSet, NetworkSnapshot};

use super::{NetworkStore, StoreError};

/// In-memory network store.
///
/// Intended for tests/dev.
#[derive(Debug, Default)]
pub struct InMemoryNetworkStore {
    inner: RwLock<NetworkSnapshot>,
}

impl InMemoryNetworkStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait::async_trait]
impl NetworkStore for InMemoryNetworkStore {
    async fn snapshot(&self) -> Result<NetworkSnapshot, StoreError> {
        let inner = self
            .inner
            .read()
            .map_err(|_| StoreError::Backend("lock poisoned".to_string()))?;
        Ok(inner.clone())
    }

    async fn commit(&self, expected: ExpectedVersion, changes: ChangeSet) -> Result<u64, StoreError> {
        let mut inner = self
            .inner
            .write()
            .map_err(|_| StoreError::Backend("lock poisoned".to_string()))?;

        let current = inner.revision();
        if !expected.matches(current) {
            return Err(StoreError::Conflict(format!(
                "expected {expected:?}, found revision {current}"
            )));
        }

        inner.apply(&changes);
        Ok(inner.revision())
    }

    async fn clear(&self) -> Result<u64, StoreError> {
        let mut inner = self
            .inner
            .write()
            .map_err(|_| StoreError::Backend("lock poisoned".to_string()))?;
        inner.clear();
        Ok(inner.revision())
    }
}
