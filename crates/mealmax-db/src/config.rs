//! Database configuration

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Schema script bundled with this crate.
pub const DEFAULT_SCHEMA_PATH: &str =
    concat!(env!("CARGO_MANIFEST_DIR"), "/sql/create_meal_table.sql");

/// Database configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// SQLite connection URL
    pub database_url: String,
    /// Maximum pooled connections
    pub max_connections: u32,
    /// Minimum pooled connections
    pub min_connections: u32,
    /// Connection acquire timeout in seconds
    pub acquire_timeout_secs: u64,
    /// Path of the SQL script that (re)creates the meals table
    pub schema_path: PathBuf,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            database_url: "sqlite::memory:".to_string(),
            max_connections: 1,
            min_connections: 1,
            acquire_timeout_secs: 30,
            schema_path: PathBuf::from(DEFAULT_SCHEMA_PATH),
        }
    }
}

impl DatabaseConfig {
    /// Create config from environment variables, loading `.env` first if present.
    ///
    /// Unset variables fall back to [`DatabaseConfig::default`].
    pub fn from_env() -> Self {
        let _ = dotenvy::dotenv();
        let defaults = Self::default();

        Self {
            database_url: std::env::var("DATABASE_URL").unwrap_or(defaults.database_url),
            max_connections: std::env::var("DB_MAX_CONNECTIONS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.max_connections),
            min_connections: std::env::var("DB_MIN_CONNECTIONS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.min_connections),
            acquire_timeout_secs: std::env::var("DB_ACQUIRE_TIMEOUT")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.acquire_timeout_secs),
            schema_path: std::env::var("SQL_CREATE_TABLE_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.schema_path),
        }
    }

    /// Whether the URL points at a private in-memory database.
    ///
    /// Every connection to `sqlite::memory:` opens its own empty database,
    /// so such pools must be capped at a single connection.
    pub fn is_in_memory(&self) -> bool {
        self.database_url.contains(":memory:") || self.database_url.contains("mode=memory")
    }

    /// Pool size actually used when connecting.
    pub fn effective_max_connections(&self) -> u32 {
        if self.is_in_memory() {
            1
        } else {
            self.max_connections.max(1)
        }
    }
}
