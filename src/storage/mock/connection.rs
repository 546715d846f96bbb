//! In-memory Connection emulating the ArangoDB requests the store issues.

use std::collections::HashMap;

use async_trait::async_trait;
use reqwest::Method;
use serde_json::{Map, Value};
use tokio::sync::RwLock;

use crate::interfaces::{BatchAck, BatchPart, Connection, ConnectionError, ServerError};
use crate::storage::arangodb::{AGGREGATE_ID_BIND_VAR, COLLECTION_BIND_VAR};

const ERROR_COLLECTION_NOT_FOUND: i64 = 1203;
const ERROR_BIND_PARAMETER_MISSING: i64 = 1551;
const ERROR_BAD_PARAMETER: i64 = 10;

fn collection_not_found() -> ServerError {
    ServerError::new(404, ERROR_COLLECTION_NOT_FOUND, "collection or view not found")
}

/// In-memory document collections behind the [`Connection`] interface.
///
/// Supports the snapshot query (filter on `_key`, newest `last_version`
/// first), batched document deletes and inserts, and collection truncation.
/// Collections must be created before use, as on a server without
/// auto-creation. A batch is applied under one lock; failed parts are
/// counted in the acknowledgement like the server's `x-arango-errors`.
#[derive(Default)]
pub struct InMemoryConnection {
    collections: RwLock<HashMap<String, Vec<Value>>>,
    unavailable: RwLock<bool>,
    batches: RwLock<Vec<Vec<BatchPart>>>,
}

impl InMemoryConnection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a connection with the given empty collections.
    pub async fn with_collections(names: &[&str]) -> Self {
        let connection = Self::new();
        for name in names {
            connection.create_collection(name).await;
        }
        connection
    }

    pub async fn create_collection(&self, name: &str) {
        self.collections
            .write()
            .await
            .entry(name.to_string())
            .or_default();
    }

    /// Drop a collection. Returns whether it existed.
    pub async fn drop_collection(&self, name: &str) -> bool {
        self.collections.write().await.remove(name).is_some()
    }

    /// Insert a document as-is, bypassing key uniqueness.
    pub async fn insert_raw(&self, collection: &str, document: Value) {
        self.collections
            .write()
            .await
            .entry(collection.to_string())
            .or_default()
            .push(document);
    }

    /// Documents of a collection, or `None` if it does not exist.
    pub async fn documents(&self, collection: &str) -> Option<Vec<Value>> {
        self.collections.read().await.get(collection).cloned()
    }

    pub async fn count(&self, collection: &str) -> Option<usize> {
        self.collections.read().await.get(collection).map(Vec::len)
    }

    /// Make every request fail as if the server were unreachable.
    pub async fn set_unavailable(&self, unavailable: bool) {
        *self.unavailable.write().await = unavailable;
    }

    /// Batches submitted so far, in order.
    pub async fn batches(&self) -> Vec<Vec<BatchPart>> {
        self.batches.read().await.clone()
    }

    async fn ensure_available(&self) -> Result<(), ConnectionError> {
        if *self.unavailable.read().await {
            return Err(ConnectionError::Unavailable(
                "in-memory connection marked unavailable".to_string(),
            ));
        }
        Ok(())
    }
}

/// Split a request path into decoded segments and its query string.
fn split_path(path: &str) -> (Vec<String>, &str) {
    let (path, query) = path.split_once('?').unwrap_or((path, ""));
    let segments = path
        .split('/')
        .filter(|s| !s.is_empty())
        .map(|s| {
            urlencoding::decode(s)
                .map(|d| d.into_owned())
                .unwrap_or_else(|_| s.to_string())
        })
        .collect();
    (segments, query)
}

fn has_param(query: &str, param: &str) -> bool {
    query.split('&').any(|p| p == param)
}

fn bind_var<'a>(bind_vars: &'a Map<String, Value>, name: &str) -> Result<&'a str, ServerError> {
    bind_vars.get(name).and_then(Value::as_str).ok_or_else(|| {
        ServerError::new(
            400,
            ERROR_BIND_PARAMETER_MISSING,
            format!("bind parameter '{}' was not declared in the query", name),
        )
    })
}

fn document_key(document: &Value) -> Option<&str> {
    document.get("_key").and_then(Value::as_str)
}

/// Apply one batch part. Returns false if the server would report it failed.
fn apply_part(collections: &mut HashMap<String, Vec<Value>>, part: &BatchPart) -> bool {
    let (segments, query) = split_path(&part.path);
    let segments: Vec<&str> = segments.iter().map(String::as_str).collect();

    match (part.method.as_str(), segments.as_slice()) {
        ("DELETE", ["_api", "document", collection, key]) => {
            let Some(documents) = collections.get_mut(*collection) else {
                return false;
            };
            let before = documents.len();
            documents.retain(|doc| document_key(doc) != Some(*key));
            documents.len() < before
        }
        ("POST", ["_api", "document", collection]) => {
            let Some(documents) = collections.get_mut(*collection) else {
                return false;
            };
            let Some(mut document) = part
                .body
                .as_deref()
                .and_then(|body| serde_json::from_str::<Value>(body).ok())
            else {
                return false;
            };
            let Some(key) = document_key(&document).map(str::to_string) else {
                return false;
            };

            let exists = documents
                .iter()
                .any(|doc| document_key(doc) == Some(key.as_str()));
            if exists {
                if !has_param(query, "overwriteMode=replace") {
                    return false;
                }
                documents.retain(|doc| document_key(doc) != Some(key.as_str()));
            }

            if let Some(object) = document.as_object_mut() {
                object.insert(
                    "_id".to_string(),
                    Value::from(format!("{}/{}", collection, key)),
                );
            }
            documents.push(document);
            true
        }
        _ => false,
    }
}

#[async_trait]
impl Connection for InMemoryConnection {
    async fn query(
        &self,
        _query: &str,
        bind_vars: Map<String, Value>,
    ) -> Result<Vec<Value>, ConnectionError> {
        self.ensure_available().await?;

        let collection = bind_var(&bind_vars, COLLECTION_BIND_VAR)?;
        let aggregate_id = bind_var(&bind_vars, AGGREGATE_ID_BIND_VAR)?;

        let collections = self.collections.read().await;
        let documents = collections.get(collection).ok_or_else(collection_not_found)?;

        let mut matching: Vec<Value> = documents
            .iter()
            .filter(|doc| document_key(doc) == Some(aggregate_id))
            .cloned()
            .collect();
        matching.sort_by_key(|doc| {
            std::cmp::Reverse(doc.get("last_version").and_then(Value::as_u64))
        });

        Ok(matching)
    }

    async fn submit_batch(&self, parts: Vec<BatchPart>) -> Result<BatchAck, ConnectionError> {
        self.ensure_available().await?;

        let mut collections = self.collections.write().await;
        let failed = parts
            .iter()
            .filter(|part| !apply_part(&mut collections, part))
            .count();
        drop(collections);

        let ack = BatchAck {
            parts: parts.len(),
            failed,
        };
        self.batches.write().await.push(parts);
        Ok(ack)
    }

    async fn admin_command(&self, method: Method, path: &str) -> Result<(), ConnectionError> {
        self.ensure_available().await?;

        let (segments, _) = split_path(path);
        let segments: Vec<&str> = segments.iter().map(String::as_str).collect();

        match (method.as_str(), segments.as_slice()) {
            ("PUT", ["_api", "collection", collection, "truncate"]) => {
                let mut collections = self.collections.write().await;
                let documents = collections
                    .get_mut(*collection)
                    .ok_or_else(collection_not_found)?;
                documents.clear();
                Ok(())
            }
            _ => Err(ServerError::new(
                405,
                ERROR_BAD_PARAMETER,
                format!("unsupported admin command {} {}", method, path),
            )
            .into()),
        }
    }
}
