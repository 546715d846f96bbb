//! Abstract interfaces.
//!
//! These traits define the contracts for:
//! - Snapshot storage (get / save / remove_all)
//! - The document database connection the ArangoDB store talks to

pub mod connection;
pub mod snapshot_store;

pub use connection::{BatchAck, BatchPart, Connection, ConnectionError, ServerError};
pub use snapshot_store::{Operation, Result, SnapshotStore, SnapshotStoreError};
