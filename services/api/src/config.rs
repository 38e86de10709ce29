//! Service configuration
//!
//! Read from `VELOCE_`-prefixed environment variables on top of built-in
//! defaults. Database settings live in [`common::DatabaseConfig`].

use config::{Config, ConfigError, Environment};
use serde::Deserialize;
use std::fmt;

/// Where records are stored
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    Postgres,
    Memory,
}

impl StorageBackend {
    pub fn as_str(&self) -> &'static str {
        match self {
            StorageBackend::Postgres => "postgres",
            StorageBackend::Memory => "memory",
        }
    }
}

impl fmt::Display for StorageBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Settings for the API service
///
/// # Environment Variables
/// - `VELOCE_HOST`: Bind address (default: 0.0.0.0)
/// - `VELOCE_PORT`: Listen port (default: 8000)
/// - `VELOCE_STORAGE`: `postgres` or `memory` (default: postgres)
/// - `VELOCE_LOG_LEVEL`: Tracing filter used when `RUST_LOG` is unset (default: info)
/// - `VELOCE_CORS_ORIGINS`: Comma-separated allowed origins; empty allows any
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub host: String,
    pub port: u16,
    pub storage: StorageBackend,
    pub log_level: String,
    cors_origins: String,
}

impl Settings {
    pub fn load() -> Result<Self, ConfigError> {
        Config::builder()
            .set_default("host", "0.0.0.0")?
            .set_default("port", 8000)?
            .set_default("storage", "postgres")?
            .set_default("log_level", "info")?
            .set_default("cors_origins", "")?
            .add_source(Environment::with_prefix("VELOCE").try_parsing(true))
            .build()?
            .try_deserialize()
    }

    /// Address to bind, as `host:port`
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn cors_origins(&self) -> Vec<String> {
        self.cors_origins
            .split(',')
            .map(str::trim)
            .filter(|origin| !origin.is_empty())
            .map(str::to_string)
            .collect()
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
            storage: StorageBackend::Postgres,
            log_level: "info".to_string(),
            cors_origins: String::new(),
        }
    }
}
