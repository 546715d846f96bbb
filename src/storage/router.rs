//! Aggregate type to collection routing.

use std::collections::HashMap;

use crate::config::SnapshotStoreConfig;

/// Collection used when an aggregate type has no explicit mapping.
pub const DEFAULT_SNAPSHOT_COLLECTION: &str = "snapshots";

/// Maps aggregate types to the collection their snapshots live in.
///
/// Fixed at construction; the store never changes it afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectionRouter {
    mapping: HashMap<String, String>,
    default_collection: String,
}

impl CollectionRouter {
    pub fn new(default_collection: impl Into<String>) -> Self {
        Self {
            mapping: HashMap::new(),
            default_collection: default_collection.into(),
        }
    }

    /// Route `aggregate_type` to `collection`.
    pub fn with_mapping(
        mut self,
        aggregate_type: impl Into<String>,
        collection: impl Into<String>,
    ) -> Self {
        self.mapping.insert(aggregate_type.into(), collection.into());
        self
    }

    pub fn from_config(config: &SnapshotStoreConfig) -> Self {
        config.collection_map.iter().fold(
            Self::new(config.default_collection.clone()),
            |router, entry| router.with_mapping(&entry.aggregate_type, &entry.collection),
        )
    }

    /// Collection name for an aggregate type.
    pub fn resolve(&self, aggregate_type: &str) -> &str {
        self.mapping
            .get(aggregate_type)
            .map(String::as_str)
            .unwrap_or(&self.default_collection)
    }

    pub fn default_collection(&self) -> &str {
        &self.default_collection
    }
}

impl Default for CollectionRouter {
    fn default() -> Self {
        Self::new(DEFAULT_SNAPSHOT_COLLECTION)
    }
}
