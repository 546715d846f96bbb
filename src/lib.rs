//! ArangoDB snapshot store.
//!
//! Persists the latest snapshot of an event-sourced aggregate in an
//! ArangoDB collection, keyed by aggregate id, and reads it back.
//! Aggregate types are routed to collections through a configurable
//! mapping with a default fallback.

pub mod config;
pub mod interfaces;
pub mod snapshot;
pub mod storage;
pub mod utils;

pub use interfaces::{Connection, SnapshotStore, SnapshotStoreError};
pub use snapshot::Snapshot;
pub use storage::{ArangoSnapshotStore, CollectionRouter, HttpConnection, SnapshotStoreFactory};
