//! Snapshot value type.

use chrono::{DateTime, Utc};

/// Point-in-time state of an aggregate.
///
/// `aggregate_root` is opaque to the store: it is handed to the configured
/// [`PayloadSerializer`](crate::storage::PayloadSerializer) on save and
/// produced by it on load.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot<T> {
    pub aggregate_type: String,
    pub aggregate_id: String,
    pub aggregate_root: T,
    pub last_version: u64,
    pub created_at: DateTime<Utc>,
}

impl<T> Snapshot<T> {
    pub fn new(
        aggregate_type: impl Into<String>,
        aggregate_id: impl Into<String>,
        aggregate_root: T,
        last_version: u64,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            aggregate_type: aggregate_type.into(),
            aggregate_id: aggregate_id.into(),
            aggregate_root,
            last_version,
            created_at,
        }
    }
}
