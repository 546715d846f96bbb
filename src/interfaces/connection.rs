//! Database connection interface.

use async_trait::async_trait;
use reqwest::Method;
use serde::Deserialize;
use serde_json::{Map, Value};

/// Error reported by the database server for a rejected request.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, thiserror::Error)]
#[error("HTTP status {status} (error {error_num}): {message}")]
pub struct ServerError {
    /// HTTP status code of the response.
    #[serde(rename = "code")]
    pub status: u16,
    /// ArangoDB error number.
    #[serde(rename = "errorNum", default)]
    pub error_num: i64,
    #[serde(rename = "errorMessage", default)]
    pub message: String,
}

impl ServerError {
    pub fn new(status: u16, error_num: i64, message: impl Into<String>) -> Self {
        Self {
            status,
            error_num,
            message: message.into(),
        }
    }
}

/// Errors that can occur talking to the database.
#[derive(Debug, thiserror::Error)]
pub enum ConnectionError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Server error: {0}")]
    Server(ServerError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Connection unavailable: {0}")]
    Unavailable(String),
}

impl From<ServerError> for ConnectionError {
    fn from(err: ServerError) -> Self {
        ConnectionError::Server(err)
    }
}

/// One request inside a batch submission.
#[derive(Debug, Clone, PartialEq)]
pub struct BatchPart {
    pub method: Method,
    /// Request path relative to the database, including any query string.
    pub path: String,
    pub body: Option<String>,
}

impl BatchPart {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            body: None,
        }
    }

    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self
    }
}

/// Acknowledgement of an accepted batch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchAck {
    /// Number of parts submitted.
    pub parts: usize,
    /// Number of parts the server reported as failed.
    pub failed: usize,
}

/// Interface to the document database.
///
/// The snapshot store never owns a connection; it shares one through `Arc`.
/// Timeouts belong to the implementation.
///
/// Implementations:
/// - `HttpConnection`: ArangoDB REST API over HTTP
/// - `InMemoryConnection`: in-process emulation for tests
#[async_trait]
pub trait Connection: Send + Sync {
    /// Execute a query and return every result document.
    async fn query(
        &self,
        query: &str,
        bind_vars: Map<String, Value>,
    ) -> Result<Vec<Value>, ConnectionError>;

    /// Submit several requests in a single round trip.
    ///
    /// Success means the batch was accepted; individual parts may still have
    /// failed, see [`BatchAck::failed`].
    async fn submit_batch(&self, parts: Vec<BatchPart>) -> Result<BatchAck, ConnectionError>;

    /// Issue a collection management command.
    ///
    /// A rejection by the server is reported as [`ConnectionError::Server`].
    async fn admin_command(&self, method: Method, path: &str) -> Result<(), ConnectionError>;
}
