//! In-memory storage integration tests.
//!
//! Run with: cargo test --test storage_memory --features test-utils
//!
//! Runs the ArangoDB snapshot store against the in-memory connection, so no
//! external dependencies are required.

mod storage;

use std::sync::Arc;

use serde_json::Value;

use snapshot_store_arangodb::interfaces::{Connection, SnapshotStoreError};
use snapshot_store_arangodb::storage::{
    ArangoSnapshotStore, CollectionRouter, InMemoryConnection, JsonSerializer, MockSnapshotStore,
};
use snapshot_store_arangodb::SnapshotStore;

use storage::snapshot_store_tests::{
    make_snapshot, DEFAULT_COLLECTION, MAPPED_COLLECTION, MAPPED_TYPE,
};

async fn connect() -> Arc<InMemoryConnection> {
    Arc::new(InMemoryConnection::with_collections(&[DEFAULT_COLLECTION, MAPPED_COLLECTION]).await)
}

fn router() -> CollectionRouter {
    CollectionRouter::new(DEFAULT_COLLECTION).with_mapping(MAPPED_TYPE, MAPPED_COLLECTION)
}

fn arango_store(connection: Arc<InMemoryConnection>) -> ArangoSnapshotStore<JsonSerializer<Value>> {
    let connection: Arc<dyn Connection> = connection;
    ArangoSnapshotStore::new(connection, router())
}

#[tokio::test]
async fn test_in_memory_arango_snapshot_store() {
    println!("=== In-memory ArangoSnapshotStore Tests ===");

    let store = arango_store(connect().await);

    run_snapshot_store_tests!(&store);

    println!("=== All in-memory ArangoSnapshotStore tests PASSED ===");
}

#[tokio::test]
async fn test_mock_snapshot_store() {
    println!("=== MockSnapshotStore Tests ===");

    let store = MockSnapshotStore::<Value>::new();

    run_snapshot_store_tests!(&store);

    println!("=== All MockSnapshotStore tests PASSED ===");
}

#[tokio::test]
async fn test_documents_land_in_routed_collections() {
    let connection = connect().await;
    let store = arango_store(connection.clone());

    store
        .save(&[
            make_snapshot(MAPPED_TYPE, "a", 1),
            make_snapshot("test_other", "b", 1),
            make_snapshot("test_other", "c", 1),
        ])
        .await
        .unwrap();

    assert_eq!(connection.count(MAPPED_COLLECTION).await, Some(1));
    assert_eq!(connection.count(DEFAULT_COLLECTION).await, Some(2));

    let documents = connection.documents(MAPPED_COLLECTION).await.unwrap();
    assert_eq!(documents[0]["_key"], "a");
    assert_eq!(documents[0]["aggregate_type"], MAPPED_TYPE);
    assert_eq!(documents[0]["last_version"], 1);
    assert!(documents[0]["aggregate_root"].is_string());
    assert!(documents[0]["created_at"].is_string());
}

#[tokio::test]
async fn test_remove_all_truncates_whole_collection() {
    let connection = connect().await;
    let store = arango_store(connection.clone());

    store
        .save(&[
            make_snapshot("test_first", "a", 1),
            make_snapshot("test_second", "b", 1),
        ])
        .await
        .unwrap();

    // Both types share the default collection
    store.remove_all("test_first").await.unwrap();

    assert_eq!(connection.count(DEFAULT_COLLECTION).await, Some(0));
    assert!(store.get("test_second", "b").await.unwrap().is_none());
}

#[tokio::test]
async fn test_remove_all_missing_collection() {
    let connection = connect().await;
    connection.drop_collection(MAPPED_COLLECTION).await;
    let store = arango_store(connection);

    let err = store.remove_all(MAPPED_TYPE).await.unwrap_err();

    assert!(matches!(
        err,
        SnapshotStoreError::TruncateCollectionFailed { ref collection, .. }
            if collection == MAPPED_COLLECTION
    ));
    assert!(err.to_string().starts_with(&format!(
        "Could not truncate \"{}\". Got HTTP status 404",
        MAPPED_COLLECTION
    )));
}

#[tokio::test]
async fn test_unavailable_connection() {
    let connection = connect().await;
    let store = arango_store(connection.clone());
    connection.set_unavailable(true).await;

    let get = store.get(MAPPED_TYPE, "a").await;
    let save = store.save(&[make_snapshot(MAPPED_TYPE, "a", 1)]).await;

    assert!(matches!(get, Err(SnapshotStoreError::StoreUnavailable { .. })));
    assert!(matches!(save, Err(SnapshotStoreError::StoreUnavailable { .. })));

    connection.set_unavailable(false).await;
    assert!(store.get(MAPPED_TYPE, "a").await.unwrap().is_none());
}
