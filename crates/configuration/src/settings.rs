use crate::error::ConfigError;
use serde::Deserialize;
use std::time::Duration;

/// The root configuration structure for the entire application.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub source: SourceConfig,
    pub database: DatabaseConfig,
    pub importer: ImporterConfig,
    pub logging: LoggingConfig,
}

/// Where and how the remote catalog is fetched.
#[derive(Debug, Clone, Deserialize)]
pub struct SourceConfig {
    /// Base URL of the catalog, without a trailing `/products`.
    pub base_url: String,
    /// Per-request timeout in seconds. `0` disables the timeout.
    pub timeout_secs: u64,
    /// Total attempts per fetch, including the first one. `1` means no retry.
    pub retry_attempts: u32,
    /// Fixed pause between two attempts.
    pub retry_backoff_ms: u64,
}

impl SourceConfig {
    pub fn timeout(&self) -> Option<Duration> {
        (self.timeout_secs > 0).then(|| Duration::from_secs(self.timeout_secs))
    }

    pub fn retry_backoff(&self) -> Duration {
        Duration::from_millis(self.retry_backoff_ms)
    }
}

/// Contains the parameters for the local product store.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// A SQLite connection string, e.g. `sqlite://database.db`.
    pub url: String,
    /// Size of the connection pool. SQLite has a single writer, so the
    /// default of 1 is almost always what you want.
    pub max_connections: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ImporterConfig {
    /// Upper bound on the number of records processed at the same time.
    pub max_concurrency: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Default filter directive when `RUST_LOG` is not set (e.g. "info").
    pub level: String,
    /// When set, logs are also written to a daily-rolling file in this directory.
    pub directory: Option<String>,
}

impl Config {
    /// Rejects settings that would make the importer unusable.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.source.base_url.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "source.base_url must not be empty".to_string(),
            ));
        }
        if self.source.retry_attempts == 0 {
            return Err(ConfigError::ValidationError(
                "source.retry_attempts must be at least 1".to_string(),
            ));
        }
        if self.database.url.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "database.url must not be empty".to_string(),
            ));
        }
        if self.database.max_connections == 0 {
            return Err(ConfigError::ValidationError(
                "database.max_connections must be at least 1".to_string(),
            ));
        }
        if self.importer.max_concurrency == 0 {
            return Err(ConfigError::ValidationError(
                "importer.max_concurrency must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}
