//! ArangoDB HTTP connection.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use serde::Deserialize;
use serde_json::{json, Map, Value};
use tracing::{debug, info, warn};

use super::{encode_batch_body, BATCH_BOUNDARY, BATCH_ERRORS_HEADER};
use crate::config::ConnectionConfig;
use crate::interfaces::{BatchAck, BatchPart, Connection, ConnectionError, ServerError};

/// Page of results returned by the cursor API.
#[derive(Debug, Deserialize)]
struct CursorPage {
    #[serde(default)]
    result: Vec<Value>,
    #[serde(rename = "hasMore", default)]
    has_more: bool,
    #[serde(default)]
    id: Option<String>,
}

/// Connection to an ArangoDB database over its REST API.
///
/// Requests are scoped to a single database. The configured timeout applies
/// to every request; there is no retry.
pub struct HttpConnection {
    client: Client,
    base_url: String,
    credentials: Option<(String, String)>,
}

impl HttpConnection {
    /// Create a connection from configuration.
    pub fn new(config: &ConnectionConfig) -> Result<Self, ConnectionError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        let base_url = format!(
            "{}/_db/{}",
            config.endpoint.trim_end_matches('/'),
            urlencoding::encode(&config.database)
        );

        let credentials = if config.username.is_empty() {
            None
        } else {
            Some((config.username.clone(), config.password.clone()))
        };

        info!(
            endpoint = %config.endpoint,
            database = %config.database,
            "Configured ArangoDB connection"
        );

        Ok(Self {
            client,
            base_url,
            credentials,
        })
    }

    /// Base URL all request paths are appended to.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let builder = self
            .client
            .request(method, format!("{}{}", self.base_url, path));

        match &self.credentials {
            Some((username, password)) => builder.basic_auth(username, Some(password)),
            None => builder,
        }
    }

    /// Turn a non-success response into a server error.
    async fn check(response: Response) -> Result<Response, ConnectionError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = match response.text().await {
            Ok(body) => body,
            Err(err) => {
                warn!(status = %status, error = %err, "Failed to read error response body");
                String::new()
            }
        };
        Err(ConnectionError::Server(parse_server_error(
            status.as_u16(),
            &body,
        )))
    }

    async fn cursor_page(&self, request: RequestBuilder) -> Result<CursorPage, ConnectionError> {
        let response = Self::check(request.send().await?).await?;
        Ok(response.json::<CursorPage>().await?)
    }
}

/// Build a server error from an ArangoDB error body.
///
/// Bodies that are not ArangoDB errors keep their text as the message. An
/// empty message falls back to the status reason phrase.
fn parse_server_error(status: u16, body: &str) -> ServerError {
    let mut err = match serde_json::from_str::<ServerError>(body) {
        Ok(mut err) => {
            err.status = status;
            err
        }
        Err(_) => ServerError::new(status, 0, body.trim()),
    };

    if err.message.is_empty() {
        err.message = StatusCode::from_u16(status)
            .ok()
            .and_then(|code| code.canonical_reason())
            .unwrap_or_default()
            .to_string();
    }
    err
}

#[async_trait]
impl Connection for HttpConnection {
    async fn query(
        &self,
        query: &str,
        bind_vars: Map<String, Value>,
    ) -> Result<Vec<Value>, ConnectionError> {
        let body = json!({ "query": query, "bindVars": bind_vars });

        let mut page = self
            .cursor_page(self.request(Method::POST, "/_api/cursor").json(&body))
            .await?;
        let mut documents = std::mem::take(&mut page.result);

        while page.has_more {
            let id = page.id.take().ok_or_else(|| {
                ConnectionError::InvalidResponse("cursor has more results but no id".to_string())
            })?;

            page = self
                .cursor_page(self.request(Method::PUT, &format!("/_api/cursor/{}", id)))
                .await?;
            documents.append(&mut page.result);
        }

        debug!(documents = documents.len(), "Query completed");
        Ok(documents)
    }

    async fn submit_batch(&self, parts: Vec<BatchPart>) -> Result<BatchAck, ConnectionError> {
        if parts.is_empty() {
            return Ok(BatchAck::default());
        }

        let body = encode_batch_body(&parts, BATCH_BOUNDARY);
        let response = self
            .request(Method::POST, "/_api/batch")
            .header(
                reqwest::header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={}", BATCH_BOUNDARY),
            )
            .body(body)
            .send()
            .await?;
        let response = Self::check(response).await?;

        let failed = match response.headers().get(BATCH_ERRORS_HEADER) {
            Some(value) => value
                .to_str()
                .ok()
                .and_then(|v| v.trim().parse::<usize>().ok())
                .unwrap_or_else(|| {
                    warn!(header = ?value, "Unparseable batch error count");
                    0
                }),
            None => 0,
        };

        debug!(parts = parts.len(), failed, "Batch submitted");
        Ok(BatchAck {
            parts: parts.len(),
            failed,
        })
    }

    async fn admin_command(&self, method: Method, path: &str) -> Result<(), ConnectionError> {
        let response = self.request(method.clone(), path).send().await?;
        Self::check(response).await?;

        debug!(method = %method, path = %path, "Admin command accepted");
        Ok(())
    }
}
