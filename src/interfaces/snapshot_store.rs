//! Snapshot storage interface.

use std::fmt;

use async_trait::async_trait;

use super::connection::{ConnectionError, ServerError};
use crate::snapshot::Snapshot;
use crate::storage::CodecError;

/// Store operation, used to give errors context.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Get,
    Save,
    RemoveAll,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operation::Get => f.write_str("get"),
            Operation::Save => f.write_str("save"),
            Operation::RemoveAll => f.write_str("remove_all"),
        }
    }
}

/// Errors returned by snapshot stores.
#[derive(Debug, thiserror::Error)]
pub enum SnapshotStoreError {
    #[error("Snapshot store unavailable during {operation} on \"{collection}\": {source}")]
    StoreUnavailable {
        operation: Operation,
        collection: String,
        #[source]
        source: ConnectionError,
    },

    #[error(
        "Could not truncate \"{collection}\". Got HTTP status {} - {}",
        .source.status,
        .source.message
    )]
    TruncateCollectionFailed {
        collection: String,
        #[source]
        source: ServerError,
    },

    #[error("Failed to decode snapshot: {0}")]
    Decode(#[source] CodecError),

    #[error("Failed to encode snapshot: {0}")]
    Encode(#[source] CodecError),
}

pub type Result<T> = std::result::Result<T, SnapshotStoreError>;

/// Interface for snapshot persistence.
///
/// At most one snapshot is kept per (aggregate type, aggregate id); saving
/// replaces the previous one.
///
/// Implementations:
/// - `ArangoSnapshotStore`: ArangoDB storage
/// - `MockSnapshotStore`: in-memory storage for tests
#[async_trait]
pub trait SnapshotStore: Send + Sync {
    /// Aggregate payload carried by snapshots of this store.
    type Payload: Send + Sync;

    /// Retrieve the latest snapshot for an aggregate.
    ///
    /// Returns `None` if no snapshot exists.
    async fn get(
        &self,
        aggregate_type: &str,
        aggregate_id: &str,
    ) -> Result<Option<Snapshot<Self::Payload>>>;

    /// Store snapshots, replacing any existing snapshot for the same id.
    async fn save(&self, snapshots: &[Snapshot<Self::Payload>]) -> Result<()>;

    /// Delete every snapshot of an aggregate type.
    async fn remove_all(&self, aggregate_type: &str) -> Result<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_failed_message() {
        let err = SnapshotStoreError::TruncateCollectionFailed {
            collection: "snapshots".to_string(),
            source: ServerError::new(404, 1203, "collection or view not found"),
        };

        assert_eq!(
            err.to_string(),
            "Could not truncate \"snapshots\". Got HTTP status 404 - collection or view not found"
        );
    }

    #[test]
    fn test_store_unavailable_message() {
        let err = SnapshotStoreError::StoreUnavailable {
            operation: Operation::Get,
            collection: "users".to_string(),
            source: ConnectionError::Unavailable("refused".to_string()),
        };

        assert_eq!(
            err.to_string(),
            "Snapshot store unavailable during get on \"users\": Connection unavailable: refused"
        );
    }
}
