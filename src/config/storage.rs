//! Snapshot store configuration types.

use serde::Deserialize;

use crate::storage::DEFAULT_SNAPSHOT_COLLECTION;

/// How a save replaces an existing snapshot.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SaveStrategy {
    /// Delete the existing document, then insert the new one.
    #[default]
    DeleteThenInsert,
    /// Insert with `overwriteMode=replace`, a single server-side replace-or-insert.
    Replace,
}

/// Explicit route from an aggregate type to a collection.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CollectionMapping {
    pub aggregate_type: String,
    pub collection: String,
}

/// One named snapshot store.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct SnapshotStoreConfig {
    /// ArangoDB connection options.
    pub connection: ConnectionConfig,
    /// Aggregate types stored outside the default collection.
    ///
    /// A list rather than a map so aggregate type names keep their case.
    pub collection_map: Vec<CollectionMapping>,
    /// Collection for aggregate types without a mapping.
    pub default_collection: String,
    pub save_strategy: SaveStrategy,
}

impl Default for SnapshotStoreConfig {
    fn default() -> Self {
        Self {
            connection: ConnectionConfig::default(),
            collection_map: Vec::new(),
            default_collection: DEFAULT_SNAPSHOT_COLLECTION.to_string(),
            save_strategy: SaveStrategy::default(),
        }
    }
}

/// ArangoDB connection options.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ConnectionConfig {
    /// Server endpoint, e.g. `http://localhost:8529`.
    pub endpoint: String,
    /// Database name.
    pub database: String,
    /// Basic auth user. Empty disables authentication.
    pub username: String,
    pub password: String,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            endpoint: "http://arangodb:8529".to_string(),
            database: "snapshot_store".to_string(),
            username: String::new(),
            password: String::new(),
            timeout_secs: 3,
        }
    }
}
