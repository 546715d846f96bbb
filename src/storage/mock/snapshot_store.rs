//! Mock SnapshotStore implementation for testing.

use std::collections::HashMap;
use std::marker::PhantomData;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::interfaces::{Result, SnapshotStore};
use crate::snapshot::Snapshot;

/// Mock snapshot store that stores snapshots in memory.
///
/// Keyed by (aggregate type, aggregate id); no collection routing.
pub struct MockSnapshotStore<T> {
    snapshots: RwLock<HashMap<(String, String), Snapshot<T>>>,
    _marker: PhantomData<fn() -> T>,
}

impl<T> Default for MockSnapshotStore<T> {
    fn default() -> Self {
        Self {
            snapshots: RwLock::new(HashMap::new()),
            _marker: PhantomData,
        }
    }
}

impl<T: Clone> MockSnapshotStore<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn get_stored(
        &self,
        aggregate_type: &str,
        aggregate_id: &str,
    ) -> Option<Snapshot<T>> {
        let key = (aggregate_type.to_string(), aggregate_id.to_string());
        self.snapshots.read().await.get(&key).cloned()
    }

    pub async fn stored_count(&self) -> usize {
        self.snapshots.read().await.len()
    }
}

#[async_trait]
impl<T> SnapshotStore for MockSnapshotStore<T>
where
    T: Clone + Send + Sync,
{
    type Payload = T;

    async fn get(
        &self,
        aggregate_type: &str,
        aggregate_id: &str,
    ) -> Result<Option<Snapshot<T>>> {
        let key = (aggregate_type.to_string(), aggregate_id.to_string());
        let store = self.snapshots.read().await;
        Ok(store.get(&key).cloned())
    }

    async fn save(&self, snapshots: &[Snapshot<T>]) -> Result<()> {
        let mut store = self.snapshots.write().await;
        for snapshot in snapshots {
            let key = (
                snapshot.aggregate_type.clone(),
                snapshot.aggregate_id.clone(),
            );
            store.insert(key, snapshot.clone());
        }
        Ok(())
    }

    async fn remove_all(&self, aggregate_type: &str) -> Result<()> {
        self.snapshots
            .write()
            .await
            .retain(|(stored_type, _), _| stored_type != aggregate_type);
        Ok(())
    }
}
