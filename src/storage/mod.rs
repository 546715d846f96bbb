//! Storage implementations.

use std::sync::Arc;

use tracing::info;

use crate::config::{Config, ConfigError, SnapshotStoreConfig, DEFAULT_STORE_ID};
use crate::interfaces::Connection;

pub mod arangodb;
pub mod codec;
pub mod router;

#[cfg(any(test, feature = "test-utils"))]
pub mod mock;

pub use arangodb::{ArangoSnapshotStore, HttpConnection};
pub use codec::{
    Base64Serializer, CodecError, JsonSerializer, PayloadSerializer, SnapshotCodec, StoredRecord,
};
pub use router::{CollectionRouter, DEFAULT_SNAPSHOT_COLLECTION};

#[cfg(any(test, feature = "test-utils"))]
pub use mock::{InMemoryConnection, MockSnapshotStore};

/// Builds snapshot stores from a named configuration block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnapshotStoreFactory {
    config_id: String,
}

impl SnapshotStoreFactory {
    pub fn new(config_id: impl Into<String>) -> Self {
        Self {
            config_id: config_id.into(),
        }
    }

    pub fn config_id(&self) -> &str {
        &self.config_id
    }

    /// Create a store with its own HTTP connection.
    pub fn create<S: PayloadSerializer>(
        &self,
        config: &Config,
        serializer: S,
    ) -> Result<ArangoSnapshotStore<S>, ConfigError> {
        let store_config = config.store(&self.config_id)?;
        let connection = Arc::new(HttpConnection::new(&store_config.connection)?);

        Ok(self.build(store_config, connection, serializer))
    }

    /// Create a store sharing an existing connection.
    pub fn create_with_connection<S: PayloadSerializer>(
        &self,
        config: &Config,
        connection: Arc<dyn Connection>,
        serializer: S,
    ) -> Result<ArangoSnapshotStore<S>, ConfigError> {
        let store_config = config.store(&self.config_id)?;

        Ok(self.build(store_config, connection, serializer))
    }

    fn build<S: PayloadSerializer>(
        &self,
        store_config: &SnapshotStoreConfig,
        connection: Arc<dyn Connection>,
        serializer: S,
    ) -> ArangoSnapshotStore<S> {
        info!(
            config_id = %self.config_id,
            default_collection = %store_config.default_collection,
            mapped_types = store_config.collection_map.len(),
            save_strategy = ?store_config.save_strategy,
            "Snapshot store configured"
        );

        ArangoSnapshotStore::with_serializer(
            connection,
            CollectionRouter::from_config(store_config),
            serializer,
        )
        .with_save_strategy(store_config.save_strategy)
    }
}

impl Default for SnapshotStoreFactory {
    fn default() -> Self {
        Self::new(DEFAULT_STORE_ID)
    }
}
