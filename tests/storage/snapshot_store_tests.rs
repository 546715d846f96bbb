//! SnapshotStore interface tests.
//!
//! These tests verify the contract of the SnapshotStore trait.
//! Each storage implementation should run these tests.
//!
//! Stores under test must route [`MAPPED_TYPE`] to its own collection; every
//! other aggregate type lands in the default collection.

use chrono::{DateTime, SubsecRound, Utc};
use serde_json::{json, Value};
use uuid::Uuid;

use snapshot_store_arangodb::{Snapshot, SnapshotStore};

/// Aggregate type routed to a dedicated collection.
pub const MAPPED_TYPE: &str = "test_mapped";
/// Collection [`MAPPED_TYPE`] is routed to.
pub const MAPPED_COLLECTION: &str = "test_mapped_snapshots";
/// Collection every unmapped type is routed to.
pub const DEFAULT_COLLECTION: &str = "test_snapshots";

/// Stored timestamps keep microsecond precision.
pub fn now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(6)
}

/// Create a test snapshot at the given version.
pub fn make_snapshot(aggregate_type: &str, aggregate_id: &str, version: u64) -> Snapshot<Value> {
    Snapshot::new(
        aggregate_type,
        aggregate_id,
        json!({ "name": "Sascha", "version": version }),
        version,
        now(),
    )
}

fn new_id() -> String {
    Uuid::new_v4().to_string()
}

// =============================================================================
// SnapshotStore::get tests
// =============================================================================

pub async fn test_get_nonexistent<S: SnapshotStore<Payload = Value>>(store: &S) {
    let snapshot = store
        .get("test_get_none", &new_id())
        .await
        .expect("get should succeed");

    assert!(snapshot.is_none(), "nonexistent snapshot should be None");
}

pub async fn test_get_preserves_data<S: SnapshotStore<Payload = Value>>(store: &S) {
    let id = new_id();
    let snapshot = Snapshot::new(
        "test_get_data",
        id.as_str(),
        json!({
            "name": "Sascha",
            "tags": ["a", "b"],
            "nested": { "count": 3, "active": true },
        }),
        42,
        now(),
    );

    store
        .save(&[snapshot.clone()])
        .await
        .expect("save should succeed");

    let read = store
        .get("test_get_data", &id)
        .await
        .expect("get should succeed")
        .expect("snapshot should exist");

    assert_eq!(read, snapshot);
}

// =============================================================================
// SnapshotStore::save tests
// =============================================================================

pub async fn test_save_replaces_previous<S: SnapshotStore<Payload = Value>>(store: &S) {
    let id = new_id();

    store
        .save(&[make_snapshot("test_save_replace", &id, 1)])
        .await
        .expect("first save should succeed");

    let second = make_snapshot("test_save_replace", &id, 2);
    store
        .save(&[second.clone()])
        .await
        .expect("second save should succeed");

    let read = store
        .get("test_save_replace", &id)
        .await
        .expect("get should succeed")
        .expect("snapshot should exist");

    assert_eq!(read, second);
}

pub async fn test_save_multiple_versions<S: SnapshotStore<Payload = Value>>(store: &S) {
    let id = new_id();

    for version in [1, 5, 10, 20, 50] {
        store
            .save(&[make_snapshot("test_save_versions", &id, version)])
            .await
            .expect("save should succeed");

        let snapshot = store
            .get("test_save_versions", &id)
            .await
            .expect("get should succeed")
            .expect("snapshot should exist");

        assert_eq!(snapshot.last_version, version, "version should be {}", version);
    }
}

pub async fn test_save_batch<S: SnapshotStore<Payload = Value>>(store: &S) {
    let first = make_snapshot("test_save_batch", &new_id(), 1);
    let second = make_snapshot("test_save_batch", &new_id(), 2);
    let mapped = make_snapshot(MAPPED_TYPE, &new_id(), 3);

    store
        .save(&[first.clone(), second.clone(), mapped.clone()])
        .await
        .expect("batch save should succeed");

    for expected in [first, second, mapped] {
        let read = store
            .get(&expected.aggregate_type, &expected.aggregate_id)
            .await
            .expect("get should succeed");
        assert_eq!(read, Some(expected));
    }
}

pub async fn test_save_empty<S: SnapshotStore<Payload = Value>>(store: &S) {
    store.save(&[]).await.expect("empty save should succeed");
}

// =============================================================================
// Routing tests
// =============================================================================

pub async fn test_type_isolation<S: SnapshotStore<Payload = Value>>(store: &S) {
    let id = new_id();

    store
        .save(&[make_snapshot(MAPPED_TYPE, &id, 7)])
        .await
        .expect("save should succeed");

    let mapped = store.get(MAPPED_TYPE, &id).await.unwrap();
    let unmapped = store.get("test_unmapped", &id).await.unwrap();

    assert_eq!(mapped.map(|s| s.last_version), Some(7));
    assert!(unmapped.is_none(), "snapshot must not leak across collections");
}

// =============================================================================
// SnapshotStore::remove_all tests
// =============================================================================

pub async fn test_remove_all<S: SnapshotStore<Payload = Value>>(store: &S) {
    let mapped_id = new_id();
    let other_id = new_id();

    store
        .save(&[
            make_snapshot(MAPPED_TYPE, &mapped_id, 1),
            make_snapshot("test_remove_other", &other_id, 1),
        ])
        .await
        .unwrap();

    store
        .remove_all(MAPPED_TYPE)
        .await
        .expect("remove_all should succeed");

    assert!(store.get(MAPPED_TYPE, &mapped_id).await.unwrap().is_none());
    assert!(store
        .get("test_remove_other", &other_id)
        .await
        .unwrap()
        .is_some());
}

pub async fn test_remove_all_then_save<S: SnapshotStore<Payload = Value>>(store: &S) {
    let id = new_id();

    store.remove_all(MAPPED_TYPE).await.unwrap();
    store.remove_all(MAPPED_TYPE).await.unwrap();
    store
        .save(&[make_snapshot(MAPPED_TYPE, &id, 20)])
        .await
        .unwrap();

    let snapshot = store
        .get(MAPPED_TYPE, &id)
        .await
        .expect("get should succeed")
        .expect("saved snapshot should exist");

    assert_eq!(snapshot.last_version, 20);
}

// =============================================================================
// Test runner macro
// =============================================================================

/// Run all SnapshotStore interface tests against a store implementation.
#[macro_export]
macro_rules! run_snapshot_store_tests {
    ($store:expr) => {
        use $crate::storage::snapshot_store_tests::*;

        // get tests
        test_get_nonexistent($store).await;
        println!("  test_get_nonexistent: PASSED");

        test_get_preserves_data($store).await;
        println!("  test_get_preserves_data: PASSED");

        // save tests
        test_save_replaces_previous($store).await;
        println!("  test_save_replaces_previous: PASSED");

        test_save_multiple_versions($store).await;
        println!("  test_save_multiple_versions: PASSED");

        test_save_batch($store).await;
        println!("  test_save_batch: PASSED");

        test_save_empty($store).await;
        println!("  test_save_empty: PASSED");

        // routing tests
        test_type_isolation($store).await;
        println!("  test_type_isolation: PASSED");

        // remove_all tests
        test_remove_all($store).await;
        println!("  test_remove_all: PASSED");

        test_remove_all_then_save($store).await;
        println!("  test_remove_all_then_save: PASSED");
    };
}
