//! ArangoDB implementations of storage interfaces.

mod batch;
mod connection;
mod snapshot_store;

pub use connection::HttpConnection;
pub use snapshot_store::ArangoSnapshotStore;

pub(crate) use batch::{encode_batch_body, BATCH_BOUNDARY};

/// Query selecting the snapshot records of one aggregate id, newest version first.
pub const SNAPSHOT_QUERY: &str =
    "FOR s IN @@collection FILTER s._key == @aggregate_id SORT s.last_version DESC RETURN s";

/// Bind variable naming the collection in [`SNAPSHOT_QUERY`].
pub const COLLECTION_BIND_VAR: &str = "@collection";
/// Bind variable carrying the aggregate id in [`SNAPSHOT_QUERY`].
pub const AGGREGATE_ID_BIND_VAR: &str = "aggregate_id";

/// Response header carrying the number of failed batch parts.
pub const BATCH_ERRORS_HEADER: &str = "x-arango-errors";

/// Path of a collection's document API.
pub fn document_collection_path(collection: &str) -> String {
    format!("/_api/document/{}", urlencoding::encode(collection))
}

/// Path of a single document.
pub fn document_path(collection: &str, key: &str) -> String {
    format!(
        "{}/{}",
        document_collection_path(collection),
        urlencoding::encode(key)
    )
}

/// Path of the truncate command for a collection.
pub fn truncate_path(collection: &str) -> String {
    format!("/_api/collection/{}/truncate", urlencoding::encode(collection))
}
