//! Mock storage implementations for testing.

mod connection;
mod snapshot_store;

pub use connection::InMemoryConnection;
pub use snapshot_store::MockSnapshotStore;
