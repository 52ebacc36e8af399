use config::{Config as ConfigBuilder, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub database: DatabaseConfig,
    pub logging: LoggingConfig,
    pub rooms: RoomConfig,
}

/// Postgres settings. An empty `url` selects the in-memory room store.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
    pub connect_timeout_seconds: u64,
    pub idle_timeout_seconds: u64,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            max_connections: 20,
            min_connections: 2,
            connect_timeout_seconds: 10,
            idle_timeout_seconds: 600,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub format: String, // "json" or "pretty"
    pub file_path: Option<String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
            file_path: None,
        }
    }
}

/// Limits applied by the room managers and the save retry loop
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RoomConfig {
    /// Default member capacity for rooms created without their own limit
    pub max_members: usize,
    /// Maximum number of pending tracks in a queue
    pub max_queue_len: usize,
    /// Total load-mutate-save attempts before a version conflict is surfaced
    pub max_save_attempts: u32,
    /// Base delay between attempts; 0 retries immediately
    pub retry_backoff_base_ms: u64,
}

impl Default for RoomConfig {
    fn default() -> Self {
        Self {
            max_members: 50,
            max_queue_len: 500,
            max_save_attempts: 5,
            retry_backoff_base_ms: 10,
        }
    }
}

impl Config {
    /// Load configuration from multiple sources with priority:
    /// 1. Environment variables (highest priority)
    /// 2. Config file (if provided)
    /// 3. Defaults (lowest priority)
    pub fn load(config_file: Option<&str>) -> Result<Self, ConfigError> {
        let mut builder = ConfigBuilder::builder();

        if let Some(path) = config_file {
            if Path::new(path).exists() {
                builder = builder.add_source(File::with_name(path));
            }
        }

        // SYNCQUEUE_ROOMS__MAX_MEMBERS=10 etc.
        builder = builder.add_source(
            Environment::with_prefix("SYNCQUEUE")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let config = builder.build()?;
        config.try_deserialize()
    }

    /// Load from environment variables only (for Docker/K8s)
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::load(None)
    }

    /// Load from file path
    pub fn from_file(path: &str) -> Result<Self, ConfigError> {
        Self::load(Some(path))
    }

    #[must_use]
    pub fn database_url(&self) -> &str {
        &self.database.url
    }

    /// Whether a Postgres store is configured
    #[must_use]
    pub fn uses_database(&self) -> bool {
        !self.database.url.trim().is_empty()
    }

    /// Check the configuration for values the services cannot run with.
    ///
    /// Returns every problem found rather than stopping at the first one.
    pub fn validate(&self) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();

        if self.rooms.max_members == 0 {
            errors.push("rooms.max_members must be at least 1".to_string());
        }
        if self.rooms.max_queue_len == 0 {
            errors.push("rooms.max_queue_len must be at least 1".to_string());
        }
        if self.rooms.max_save_attempts == 0 {
            errors.push("rooms.max_save_attempts must be at least 1".to_string());
        }
        if self.rooms.retry_backoff_base_ms > 1_000 {
            errors.push("rooms.retry_backoff_base_ms must not exceed 1000".to_string());
        }
        if !matches!(self.logging.format.as_str(), "json" | "pretty") {
            errors.push(format!(
                "logging.format must be \"json\" or \"pretty\", got \"{}\"",
                self.logging.format
            ));
        }
        if self.uses_database() {
            if !self.database.url.starts_with("postgres://")
                && !self.database.url.starts_with("postgresql://")
            {
                errors.push("database.url must be a postgres:// URL".to_string());
            }
            if self.database.min_connections > self.database.max_connections {
                errors.push(
                    "database.min_connections must not exceed database.max_connections".to_string(),
                );
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}
