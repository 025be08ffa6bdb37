//! Service Configuration Module
//!
//! Selects the store backend and log format. Configuration is loaded from
//! environment variables with defaults suitable for local development.

use std::path::PathBuf;

use nest_core::ConfigError;

const ENV_STORE_BACKEND: &str = "NEST_STORE_BACKEND";
const ENV_STORE_PATH: &str = "NEST_STORE_PATH";
const ENV_STORE_MAX_SIZE_MB: &str = "NEST_STORE_MAX_SIZE_MB";
const ENV_LOG_FORMAT: &str = "NEST_LOG_FORMAT";

/// Largest accepted LMDB map size (1 TiB).
pub const MAX_STORE_SIZE_MB: usize = 1024 * 1024;

// ============================================================================
// ENUMS
// ============================================================================

/// Which [`KeyValueStore`](nest_storage::KeyValueStore) the service runs on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    Lmdb,
    Memory,
}

impl StoreBackend {
    fn parse(value: &str) -> Result<Self, ConfigError> {
        match value.trim().to_lowercase().as_str() {
            "lmdb" => Ok(StoreBackend::Lmdb),
            "memory" => Ok(StoreBackend::Memory),
            _ => Err(ConfigError::InvalidValue {
                field: ENV_STORE_BACKEND.to_string(),
                value: value.to_string(),
                reason: "expected 'lmdb' or 'memory'".to_string(),
            }),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Pretty,
    Json,
}

impl LogFormat {
    fn parse(value: &str) -> Result<Self, ConfigError> {
        match value.trim().to_lowercase().as_str() {
            "pretty" => Ok(LogFormat::Pretty),
            "json" => Ok(LogFormat::Json),
            _ => Err(ConfigError::InvalidValue {
                field: ENV_LOG_FORMAT.to_string(),
                value: value.to_string(),
                reason: "expected 'pretty' or 'json'".to_string(),
            }),
        }
    }
}

// ============================================================================
// SERVICE CONFIGURATION
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceConfig {
    pub store_backend: StoreBackend,

    /// Directory holding the LMDB files. Ignored by the memory backend.
    pub store_path: PathBuf,

    /// LMDB map size in megabytes.
    pub store_max_size_mb: usize,

    pub log_format: LogFormat,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            store_backend: StoreBackend::Lmdb,
            store_path: PathBuf::from("./data/nestcrm"),
            store_max_size_mb: 256,
            log_format: LogFormat::Pretty,
        }
    }
}

impl ServiceConfig {
    /// Create ServiceConfig from environment variables.
    ///
    /// Environment variables:
    /// - `NEST_STORE_BACKEND`: "lmdb" or "memory" (default: lmdb)
    /// - `NEST_STORE_PATH`: LMDB directory (default: ./data/nestcrm)
    /// - `NEST_STORE_MAX_SIZE_MB`: LMDB map size (default: 256)
    /// - `NEST_LOG_FORMAT`: "pretty" or "json" (default: pretty)
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` for unparseable values or a configuration that
    /// fails [`validate`](Self::validate).
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a configuration from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let store_backend = match lookup(ENV_STORE_BACKEND) {
            Some(value) => StoreBackend::parse(&value)?,
            None => defaults.store_backend,
        };

        let store_path = lookup(ENV_STORE_PATH)
            .map(PathBuf::from)
            .unwrap_or(defaults.store_path);

        let store_max_size_mb = match lookup(ENV_STORE_MAX_SIZE_MB) {
            Some(value) => value
                .trim()
                .parse()
                .map_err(|_| ConfigError::InvalidValue {
                    field: ENV_STORE_MAX_SIZE_MB.to_string(),
                    value: value.clone(),
                    reason: "expected a whole number of megabytes".to_string(),
                })?,
            None => defaults.store_max_size_mb,
        };

        let log_format = match lookup(ENV_LOG_FORMAT) {
            Some(value) => LogFormat::parse(&value)?,
            None => defaults.log_format,
        };

        let config = Self {
            store_backend,
            store_path,
            store_max_size_mb,
            log_format,
        };
        config.validate()?;
        Ok(config)
    }

    /// Check settings that parse but cannot work.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.store_backend == StoreBackend::Lmdb {
            if self.store_path.as_os_str().is_empty() {
                return Err(ConfigError::MissingRequired {
                    field: ENV_STORE_PATH.to_string(),
                });
            }
            if self.store_max_size_mb == 0 {
                return Err(ConfigError::InvalidValue {
                    field: ENV_STORE_MAX_SIZE_MB.to_string(),
                    value: "0".to_string(),
                    reason: "map size must be at least 1 MB".to_string(),
                });
            }
            if self.store_max_size_mb > MAX_STORE_SIZE_MB {
                return Err(ConfigError::InvalidValue {
                    field: ENV_STORE_MAX_SIZE_MB.to_string(),
                    value: self.store_max_size_mb.to_string(),
                    reason: format!("map size must not exceed {MAX_STORE_SIZE_MB} MB"),
                });
            }
        }
        Ok(())
    }
}
