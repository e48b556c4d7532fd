use crate::error::ConfigError;
use crate::settings::Config;
use std::path::Path;

// Declare the modules that make up this crate.
pub mod error;
pub mod logging;
pub mod settings;

// Re-export the core types to provide a clean public API.
pub use logging::init_tracing;
pub use settings::{DatabaseConfig, ImporterConfig, LoggingConfig, SourceConfig};

pub const DEFAULT_BASE_URL: &str = "https://fakestoreapi.com";
pub const DEFAULT_DATABASE_URL: &str = "sqlite://database.db";

/// Loads the application configuration.
///
/// Sources are layered, later ones winning:
/// 1. built-in defaults,
/// 2. `config.toml` in the working directory (optional), or the file at `path`
///    (required when given),
/// 3. environment variables such as `CATALOG__IMPORTER__MAX_CONCURRENCY`,
/// 4. `DATABASE_URL`, if set.
pub fn load_config(path: Option<&Path>) -> Result<Config, ConfigError> {
    let file = match path {
        Some(path) => config::File::from(path).required(true),
        None => config::File::with_name("config.toml").required(false),
    };

    let builder = config::Config::builder()
        .set_default("source.base_url", DEFAULT_BASE_URL)?
        .set_default("source.timeout_secs", 0)?
        .set_default("source.retry_attempts", 1)?
        .set_default("source.retry_backoff_ms", 500)?
        .set_default("database.url", DEFAULT_DATABASE_URL)?
        .set_default("database.max_connections", 1)?
        .set_default("importer.max_concurrency", 8)?
        .set_default("logging.level", "info")?
        .add_source(file)
        .add_source(
            config::Environment::with_prefix("CATALOG")
                .separator("__")
                .try_parsing(true),
        )
        .set_override_option("database.url", std::env::var("DATABASE_URL").ok())?
        .build()?;

    // Attempt to deserialize the entire configuration into our `Config` struct
    let config = builder.try_deserialize::<Config>()?;
    config.validate()?;

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_config(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn file_values_override_defaults() {
        let file = write_config(
            r#"
            [source]
            base_url = "http://localhost:9000"
            retry_attempts = 3

            [importer]
            max_concurrency = 2
            "#,
        );

        let config = load_config(Some(file.path())).unwrap();
        assert_eq!(config.source.base_url, "http://localhost:9000");
        assert_eq!(config.source.retry_attempts, 3);
        assert_eq!(config.source.timeout(), None);
        assert_eq!(config.importer.max_concurrency, 2);
        assert_eq!(config.logging.level, "info");
        assert!(config.logging.directory.is_none());
    }

    #[test]
    fn zero_concurrency_is_rejected() {
        let file = write_config("[importer]\nmax_concurrency = 0\n");

        let err = load_config(Some(file.path())).unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError(msg) if msg.contains("max_concurrency")));
    }

    #[test]
    fn zero_retry_attempts_are_rejected() {
        let file = write_config("[source]\nretry_attempts = 0\n");

        let err = load_config(Some(file.path())).unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError(_)));
    }

    #[test]
    fn explicit_path_must_exist() {
        let err = load_config(Some(Path::new("/definitely/not/here.toml"))).unwrap_err();
        assert!(matches!(err, ConfigError::LoadError(_)));
    }

    #[test]
    fn timeout_secs_become_a_duration() {
        let file = write_config("[source]\ntimeout_secs = 15\n");
        let config = load_config(Some(file.path())).unwrap();
        assert_eq!(config.source.timeout(), Some(std::time::Duration::from_secs(15)));
    }
}
