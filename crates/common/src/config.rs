//! Application configuration.

use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Application configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Server configuration.
    pub server: ServerConfig,
    /// Database configuration.
    pub database: DatabaseConfig,
    /// Upload storage configuration.
    #[serde(default)]
    pub storage: StorageSettings,
    /// Real-time broadcast configuration.
    #[serde(default)]
    pub streaming: StreamingConfig,
}

/// Server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Host to bind to.
    #[serde(default = "default_host")]
    pub host: String,
    /// Port to bind to.
    #[serde(default = "default_port")]
    pub port: u16,
    /// Public URL of this instance.
    pub url: String,
    /// Origin of the web client allowed by CORS. Any origin when unset.
    #[serde(default)]
    pub client_url: Option<String>,
}

/// Database connection configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// `PostgreSQL` connection URL.
    pub url: String,
    /// Maximum number of connections in the pool.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    /// Minimum number of connections in the pool.
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
}

/// Local upload storage configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct StorageSettings {
    /// Directory uploaded files are written to.
    #[serde(default = "default_storage_path")]
    pub base_path: PathBuf,
    /// URL prefix the files are served under.
    #[serde(default = "default_storage_url")]
    pub base_url: String,
    /// Upper bound for storing a single attachment.
    #[serde(default = "default_upload_timeout_secs")]
    pub upload_timeout_secs: u64,
}

/// Broadcast channel configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct StreamingConfig {
    /// Number of events a slow subscriber may fall behind before skipping.
    #[serde(default = "default_channel_capacity")]
    pub channel_capacity: usize,
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self {
            base_path: default_storage_path(),
            base_url: default_storage_url(),
            upload_timeout_secs: default_upload_timeout_secs(),
        }
    }
}

impl Default for StreamingConfig {
    fn default() -> Self {
        Self {
            channel_capacity: default_channel_capacity(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

const fn default_port() -> u16 {
    5000
}

const fn default_max_connections() -> u32 {
    20
}

const fn default_min_connections() -> u32 {
    2
}

fn default_storage_path() -> PathBuf {
    PathBuf::from("./uploads")
}

fn default_storage_url() -> String {
    "/uploads".to_string()
}

const fn default_upload_timeout_secs() -> u64 {
    20
}

const fn default_channel_capacity() -> usize {
    1000
}

impl Config {
    /// Load configuration from files and environment variables.
    ///
    /// Configuration is loaded in the following order:
    /// 1. `.env` (if present, into the process environment)
    /// 2. `config/default.toml`
    /// 3. `config/{environment}.toml` (based on `GOFARM_ENV`)
    /// 4. Environment variables with `GOFARM__` prefix
    pub fn load() -> Result<Self, config::ConfigError> {
        let _ = dotenvy::dotenv();
        let env = std::env::var("GOFARM_ENV").unwrap_or_else(|_| "development".to_string());

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{env}")).required(false))
            .add_source(
                config::Environment::with_prefix("GOFARM")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }

    /// Load configuration from a specific file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, config::ConfigError> {
        let config = config::Config::builder()
            .add_source(config::File::from(path.as_ref()))
            .add_source(
                config::Environment::with_prefix("GOFARM")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_fill_optional_sections() {
        let built = config::Config::builder()
            .set_override("server.url", "http://localhost:5000")
            .and_then(|b| b.set_override("database.url", "postgres://localhost/gofarm"))
            .and_then(|b| b.build())
            .unwrap_or_else(|e| panic!("config should build: {e}"));
        let config: Config = built
            .try_deserialize()
            .unwrap_or_else(|e| panic!("config should deserialize: {e}"));

        assert_eq!(config.server.port, 5000);
        assert_eq!(config.server.host, "0.0.0.0");
        assert!(config.server.client_url.is_none());
        assert_eq!(config.storage.base_url, "/uploads");
        assert_eq!(config.storage.upload_timeout_secs, 20);
        assert_eq!(config.streaming.channel_capacity, 1000);
        assert_eq!(config.database.max_connections, 20);
    }
}
