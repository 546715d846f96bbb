//! Application configuration.
//!
//! Snapshot stores are configured as named blocks under `stores`, loaded
//! from YAML files or environment variables:
//!
//! ```yaml
//! stores:
//!   default:
//!     connection:
//!       endpoint: http://localhost:8529
//!       database: snapshot_store
//!     collection_map:
//!       - aggregate_type: User
//!         collection: user_snapshots
//!     default_collection: snapshots
//! ```

mod storage;

use std::collections::HashMap;

use serde::Deserialize;

pub use storage::{CollectionMapping, ConnectionConfig, SaveStrategy, SnapshotStoreConfig};

use crate::interfaces::ConnectionError;

/// Default configuration file name.
pub const DEFAULT_CONFIG_FILE: &str = "snapshot-store.yaml";
/// Environment variable for configuration file path.
pub const CONFIG_ENV_VAR: &str = "SNAPSHOT_STORE_CONFIG";
/// Prefix for configuration environment variables.
pub const CONFIG_ENV_PREFIX: &str = "SNAPSHOT_STORE";
/// Environment variable for logging configuration.
pub const LOG_ENV_VAR: &str = "SNAPSHOT_STORE_LOG";
/// Name of the store block used when none is given.
pub const DEFAULT_STORE_ID: &str = "default";

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    Load(#[from] ::config::ConfigError),

    #[error("No snapshot store configured under \"{0}\"")]
    MissingStore(String),

    #[error("Failed to create connection: {0}")]
    Connection(#[from] ConnectionError),
}

/// Main configuration.
///
/// Unknown root keys are rejected so a misnamed `stores` block cannot load
/// as an empty configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Snapshot stores by config id.
    pub stores: HashMap<String, SnapshotStoreConfig>,
}

impl Config {
    /// Load configuration from file and environment.
    ///
    /// Configuration sources (in order of priority, later overrides earlier):
    /// 1. `snapshot-store.yaml` in current directory (if exists)
    /// 2. File specified by `path` argument (if provided)
    /// 3. File specified by `CONFIG_ENV_VAR` environment variable (if set)
    /// 4. Environment variables with `CONFIG_ENV_PREFIX` prefix, e.g.
    ///    `SNAPSHOT_STORE__STORES__DEFAULT__CONNECTION__ENDPOINT`
    pub fn load(path: Option<&str>) -> Result<Self, ConfigError> {
        use ::config::{Config as ConfigLib, Environment, File, FileFormat};

        let mut builder = ConfigLib::builder()
            .add_source(File::new(DEFAULT_CONFIG_FILE, FileFormat::Yaml).required(false));

        if let Some(config_path) = path {
            builder = builder.add_source(File::new(config_path, FileFormat::Yaml).required(true));
        }

        if let Ok(config_path) = std::env::var(CONFIG_ENV_VAR) {
            builder = builder.add_source(File::new(&config_path, FileFormat::Yaml).required(true));
        }

        let config = builder
            .add_source(
                Environment::with_prefix(CONFIG_ENV_PREFIX)
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        Ok(config.try_deserialize()?)
    }

    /// Configuration with a single default store.
    pub fn single(store: SnapshotStoreConfig) -> Self {
        Self {
            stores: HashMap::from([(DEFAULT_STORE_ID.to_string(), store)]),
        }
    }

    /// Look up a named store block.
    pub fn store(&self, config_id: &str) -> Result<&SnapshotStoreConfig, ConfigError> {
        self.stores
            .get(config_id)
            .ok_or_else(|| ConfigError::MissingStore(config_id.to_string()))
    }
}
