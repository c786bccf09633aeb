//! Application settings management
//!
//! This module defines the configuration structure and provides methods
//! for loading settings from TOML files and environment variables.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Main application configuration structure
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Settings {
    pub database: DatabaseConfig,
    pub logging: LoggingConfig,
}

/// Database configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
    pub acquire_timeout_seconds: u64,
    pub run_migrations: bool,
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    pub level: String,
    pub directory: Option<String>,
    pub file_prefix: String,
}

impl Settings {
    /// Load settings from configuration file and environment variables
    pub fn new() -> Result<Self, config::ConfigError> {
        Self::builder()?
            .add_source(config::File::with_name("config").required(false))
            .add_source(config::Environment::with_prefix("HACKCONF").prefix_separator("_").separator("__"))
            .build()?
            .try_deserialize()
    }

    /// Load settings from an explicit file, still honouring environment overrides
    pub fn from_file(path: &Path) -> Result<Self, config::ConfigError> {
        Self::builder()?
            .add_source(config::File::from(path))
            .add_source(config::Environment::with_prefix("HACKCONF").prefix_separator("_").separator("__"))
            .build()?
            .try_deserialize()
    }

    /// Builder seeded with the default values so partial files deserialize
    fn builder() -> Result<config::ConfigBuilder<config::builder::DefaultState>, config::ConfigError> {
        let defaults = Settings::default();
        config::Config::builder()
            .set_default("database.url", defaults.database.url)?
            .set_default("database.max_connections", defaults.database.max_connections as i64)?
            .set_default("database.min_connections", defaults.database.min_connections as i64)?
            .set_default("database.acquire_timeout_seconds", defaults.database.acquire_timeout_seconds as i64)?
            .set_default("database.run_migrations", defaults.database.run_migrations)?
            .set_default("logging.level", defaults.logging.level)?
            .set_default("logging.file_prefix", defaults.logging.file_prefix)
    }

    /// Validate configuration settings
    pub fn validate(&self) -> Result<(), crate::utils::errors::HackConfError> {
        super::validation::validate_settings(self)
    }
}

impl DatabaseConfig {
    pub fn acquire_timeout(&self) -> Duration {
        Duration::from_secs(self.acquire_timeout_seconds)
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            database: DatabaseConfig {
                url: "postgresql://localhost/hackconf".to_string(),
                max_connections: 10,
                min_connections: 1,
                acquire_timeout_seconds: 30,
                run_migrations: true,
            },
            logging: LoggingConfig {
                level: "info".to_string(),
                directory: None,
                file_prefix: "hackconf.log".to_string(),
            },
        }
    }
}
