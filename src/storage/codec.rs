//! Snapshot <-> stored record conversion.
//!
//! The record layout is fixed:
//!
//! | field            | content                                   |
//! |------------------|-------------------------------------------|
//! | `_key`           | aggregate id                              |
//! | `aggregate_type` | aggregate type                            |
//! | `last_version`   | version the snapshot represents           |
//! | `created_at`     | `YYYY-MM-DDTHH:mm:ss.uuuuuu`, UTC         |
//! | `aggregate_root` | payload as encoded by a [`PayloadSerializer`] |

use std::fmt;
use std::marker::PhantomData;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use chrono::{DateTime, NaiveDateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::snapshot::Snapshot;

/// Timestamp format of `created_at`, microsecond precision, no zone suffix.
pub const CREATED_AT_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.6f";

/// Errors converting between snapshots and stored records.
#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    #[error("Invalid created_at timestamp {value:?}: {source}")]
    InvalidTimestamp {
        value: String,
        #[source]
        source: chrono::ParseError,
    },

    #[error("Payload error: {0}")]
    Payload(#[source] Box<dyn std::error::Error + Send + Sync>),

    #[error("Malformed record: {0}")]
    Record(#[from] serde_json::Error),
}

/// Persisted representation of a snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredRecord {
    #[serde(rename = "_key")]
    pub key: String,
    pub aggregate_type: String,
    pub last_version: u64,
    pub created_at: String,
    pub aggregate_root: String,
}

/// Encodes aggregate payloads to the string stored in `aggregate_root`.
pub trait PayloadSerializer: Send + Sync {
    type Payload: Send + Sync;

    fn serialize(&self, payload: &Self::Payload) -> Result<String, CodecError>;

    fn deserialize(&self, data: &str) -> Result<Self::Payload, CodecError>;
}

/// Stores any serde type as a JSON string.
pub struct JsonSerializer<T> {
    _marker: PhantomData<fn() -> T>,
}

impl<T> JsonSerializer<T> {
    pub fn new() -> Self {
        Self {
            _marker: PhantomData,
        }
    }
}

impl<T> Default for JsonSerializer<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Clone for JsonSerializer<T> {
    fn clone(&self) -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for JsonSerializer<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("JsonSerializer")
    }
}

impl<T> PayloadSerializer for JsonSerializer<T>
where
    T: Serialize + DeserializeOwned + Send + Sync,
{
    type Payload = T;

    fn serialize(&self, payload: &T) -> Result<String, CodecError> {
        serde_json::to_string(payload).map_err(|e| CodecError::Payload(e.into()))
    }

    fn deserialize(&self, data: &str) -> Result<T, CodecError> {
        serde_json::from_str(data).map_err(|e| CodecError::Payload(e.into()))
    }
}

/// Stores raw payload bytes as standard base64.
#[derive(Debug, Clone, Copy, Default)]
pub struct Base64Serializer;

impl PayloadSerializer for Base64Serializer {
    type Payload = Vec<u8>;

    fn serialize(&self, payload: &Vec<u8>) -> Result<String, CodecError> {
        Ok(STANDARD.encode(payload))
    }

    fn deserialize(&self, data: &str) -> Result<Vec<u8>, CodecError> {
        STANDARD
            .decode(data)
            .map_err(|e| CodecError::Payload(e.into()))
    }
}

/// Converts snapshots to stored records and back.
#[derive(Debug, Clone, Default)]
pub struct SnapshotCodec<S> {
    serializer: S,
}

impl<S: PayloadSerializer> SnapshotCodec<S> {
    pub fn new(serializer: S) -> Self {
        Self { serializer }
    }

    pub fn encode(&self, snapshot: &Snapshot<S::Payload>) -> Result<StoredRecord, CodecError> {
        Ok(StoredRecord {
            key: snapshot.aggregate_id.clone(),
            aggregate_type: snapshot.aggregate_type.clone(),
            last_version: snapshot.last_version,
            created_at: format_created_at(&snapshot.created_at),
            aggregate_root: self.serializer.serialize(&snapshot.aggregate_root)?,
        })
    }

    pub fn decode(&self, record: StoredRecord) -> Result<Snapshot<S::Payload>, CodecError> {
        let created_at = parse_created_at(&record.created_at)?;
        let aggregate_root = self.serializer.deserialize(&record.aggregate_root)?;

        Ok(Snapshot {
            aggregate_type: record.aggregate_type,
            aggregate_id: record.key,
            aggregate_root,
            last_version: record.last_version,
            created_at,
        })
    }

    /// Decode a raw document as returned by a query.
    ///
    /// System attributes other than `_key` are ignored.
    pub fn decode_value(&self, document: Value) -> Result<Snapshot<S::Payload>, CodecError> {
        let record: StoredRecord = serde_json::from_value(document)?;
        self.decode(record)
    }
}

/// Format a timestamp the way `created_at` is stored.
///
/// Precision beyond microseconds is truncated.
pub fn format_created_at(created_at: &DateTime<Utc>) -> String {
    created_at.format(CREATED_AT_FORMAT).to_string()
}

/// Parse a stored `created_at`, interpreting it as UTC.
pub fn parse_created_at(value: &str) -> Result<DateTime<Utc>, CodecError> {
    NaiveDateTime::parse_from_str(value, CREATED_AT_FORMAT)
        .map(|naive| naive.and_utc())
        .map_err(|source| CodecError::InvalidTimestamp {
            value: value.to_string(),
            source,
        })
}
