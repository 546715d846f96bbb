//! ArangoDB SnapshotStore implementation.

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::Method;
use serde_json::{Map, Value};
use tracing::{debug, warn};

use super::{
    document_collection_path, document_path, truncate_path, AGGREGATE_ID_BIND_VAR,
    COLLECTION_BIND_VAR, SNAPSHOT_QUERY,
};
use crate::config::SaveStrategy;
use crate::interfaces::{
    BatchPart, Connection, ConnectionError, Operation, Result, SnapshotStore, SnapshotStoreError,
};
use crate::snapshot::Snapshot;
use crate::storage::{CollectionRouter, JsonSerializer, PayloadSerializer, SnapshotCodec};

/// ArangoDB implementation of SnapshotStore.
///
/// Each snapshot is one document whose `_key` is the aggregate id, in the
/// collection the router picks for its aggregate type.
///
/// `get` returns the aggregate type recorded in the document, which differs
/// from the requested type when two types share a collection and an id.
///
/// With [`SaveStrategy::DeleteThenInsert`] a save is a delete followed by an
/// insert. The pair is not atomic: concurrent saves of the same id may
/// interleave, and whichever insert lands last wins. Reads therefore pick the
/// highest `last_version` if more than one document is returned.
pub struct ArangoSnapshotStore<S: PayloadSerializer> {
    connection: Arc<dyn Connection>,
    router: CollectionRouter,
    codec: SnapshotCodec<S>,
    save_strategy: SaveStrategy,
}

impl<T> ArangoSnapshotStore<JsonSerializer<T>>
where
    JsonSerializer<T>: PayloadSerializer<Payload = T>,
{
    /// Create a store whose payloads are stored as JSON.
    pub fn new(connection: Arc<dyn Connection>, router: CollectionRouter) -> Self {
        Self::with_serializer(connection, router, JsonSerializer::new())
    }
}

impl<S: PayloadSerializer> ArangoSnapshotStore<S> {
    /// Create a store with a custom payload serializer.
    pub fn with_serializer(
        connection: Arc<dyn Connection>,
        router: CollectionRouter,
        serializer: S,
    ) -> Self {
        Self {
            connection,
            router,
            codec: SnapshotCodec::new(serializer),
            save_strategy: SaveStrategy::default(),
        }
    }

    pub fn with_save_strategy(mut self, save_strategy: SaveStrategy) -> Self {
        self.save_strategy = save_strategy;
        self
    }

    pub fn router(&self) -> &CollectionRouter {
        &self.router
    }

    pub fn save_strategy(&self) -> SaveStrategy {
        self.save_strategy
    }

    /// Batch parts persisting one snapshot.
    fn save_parts(
        &self,
        snapshot: &Snapshot<S::Payload>,
        parts: &mut Vec<BatchPart>,
    ) -> Result<()> {
        let collection = self.router.resolve(&snapshot.aggregate_type);
        let record = self
            .codec
            .encode(snapshot)
            .map_err(SnapshotStoreError::Encode)?;
        let body = serde_json::to_string(&record)
            .map_err(|e| SnapshotStoreError::Encode(e.into()))?;

        match self.save_strategy {
            SaveStrategy::DeleteThenInsert => {
                parts.push(BatchPart::new(
                    Method::DELETE,
                    document_path(collection, &snapshot.aggregate_id),
                ));
                parts.push(
                    BatchPart::new(
                        Method::POST,
                        format!("{}?silent=true", document_collection_path(collection)),
                    )
                    .with_body(body),
                );
            }
            SaveStrategy::Replace => {
                parts.push(
                    BatchPart::new(
                        Method::POST,
                        format!(
                            "{}?silent=true&overwriteMode=replace",
                            document_collection_path(collection)
                        ),
                    )
                    .with_body(body),
                );
            }
        }

        Ok(())
    }
}

/// Pick the document with the greatest `last_version`.
///
/// Documents without a readable version rank lowest.
fn latest_version(documents: Vec<Value>) -> Option<Value> {
    documents
        .into_iter()
        .max_by_key(|doc| doc.get("last_version").and_then(Value::as_u64))
}

#[async_trait]
impl<S: PayloadSerializer> SnapshotStore for ArangoSnapshotStore<S> {
    type Payload = S::Payload;

    async fn get(
        &self,
        aggregate_type: &str,
        aggregate_id: &str,
    ) -> Result<Option<Snapshot<S::Payload>>> {
        let collection = self.router.resolve(aggregate_type);

        let mut bind_vars = Map::new();
        bind_vars.insert(COLLECTION_BIND_VAR.to_string(), Value::from(collection));
        bind_vars.insert(AGGREGATE_ID_BIND_VAR.to_string(), Value::from(aggregate_id));

        let documents = self
            .connection
            .query(SNAPSHOT_QUERY, bind_vars)
            .await
            .map_err(|source| SnapshotStoreError::StoreUnavailable {
                operation: Operation::Get,
                collection: collection.to_string(),
                source,
            })?;

        if documents.len() > 1 {
            warn!(
                collection = %collection,
                aggregate_id = %aggregate_id,
                count = documents.len(),
                "Multiple snapshots found, using highest version"
            );
        }

        let Some(document) = latest_version(documents) else {
            debug!(collection = %collection, aggregate_id = %aggregate_id, "No snapshot found");
            return Ok(None);
        };

        let snapshot = self
            .codec
            .decode_value(document)
            .map_err(SnapshotStoreError::Decode)?;

        debug!(
            collection = %collection,
            aggregate_id = %aggregate_id,
            last_version = snapshot.last_version,
            "Retrieved snapshot"
        );
        Ok(Some(snapshot))
    }

    async fn save(&self, snapshots: &[Snapshot<S::Payload>]) -> Result<()> {
        if snapshots.is_empty() {
            return Ok(());
        }

        let mut parts = Vec::with_capacity(snapshots.len() * 2);
        for snapshot in snapshots {
            self.save_parts(snapshot, &mut parts)?;
        }

        let mut collections: Vec<&str> = snapshots
            .iter()
            .map(|s| self.router.resolve(&s.aggregate_type))
            .collect();
        collections.sort_unstable();
        collections.dedup();

        let ack = self
            .connection
            .submit_batch(parts)
            .await
            .map_err(|source| SnapshotStoreError::StoreUnavailable {
                operation: Operation::Save,
                collection: collections.join(", "),
                source,
            })?;

        // Deletes of absent documents are counted as failed parts
        if ack.failed > 0 {
            debug!(
                collections = ?collections,
                parts = ack.parts,
                failed = ack.failed,
                "Snapshot batch completed with failed parts"
            );
        }

        debug!(
            collections = ?collections,
            snapshots = snapshots.len(),
            strategy = ?self.save_strategy,
            "Saved snapshots"
        );
        Ok(())
    }

    async fn remove_all(&self, aggregate_type: &str) -> Result<()> {
        let collection = self.router.resolve(aggregate_type);

        self.connection
            .admin_command(Method::PUT, &truncate_path(collection))
            .await
            .map_err(|err| match err {
                ConnectionError::Server(source) => SnapshotStoreError::TruncateCollectionFailed {
                    collection: collection.to_string(),
                    source,
                },
                source => SnapshotStoreError::StoreUnavailable {
                    operation: Operation::RemoveAll,
                    collection: collection.to_string(),
                    source,
                },
            })?;

        debug!(collection = %collection, "Truncated snapshot collection");
        Ok(())
    }
}
