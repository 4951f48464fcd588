//! MealMax Database Layer
//!
//! SQLite persistence for the meal catalog: meal records with battle
//! counters, soft deletion, and leaderboard queries.
//!
//! # Repository Pattern
//!
//! [`MealRepo`] owns every query against the `meals` table. Each call checks
//! a connection out of the pool and returns it when the call finishes, on
//! success and on error alike.
//!
//! # Example
//!
//! ```ignore
//! use mealmax_db::{Database, DatabaseConfig, SortBy};
//!
//! let db = Database::connect(&DatabaseConfig::from_env()).await?;
//! db.reset().await?;
//!
//! let meals = db.meal_repo();
//! let pasta = meals.create("Pasta", "Italian", 12.5, "MED").await?;
//! let board = meals.get_leaderboard(SortBy::WinPct).await?;
//! ```

pub mod config;
pub mod error;
pub mod models;
pub mod repos;

use std::time::Duration;

use sqlx::sqlite::{SqlitePool, SqlitePoolOptions};
use tracing::info;

pub use config::DatabaseConfig;
pub use error::{DbError, DbResult};
pub use models::*;
pub use repos::*;

/// Database connection pool
pub struct Database {
    /// SQLite connection pool
    pub pool: SqlitePool,
    config: DatabaseConfig,
}

impl Database {
    /// Open the connection pool
    pub async fn connect(config: &DatabaseConfig) -> DbResult<Self> {
        info!("Connecting to SQLite: {}", config.database_url);

        let pool = SqlitePoolOptions::new()
            .max_connections(config.effective_max_connections())
            .min_connections(config.min_connections.min(config.effective_max_connections()))
            .acquire_timeout(Duration::from_secs(config.acquire_timeout_secs))
            // An in-memory database lives only as long as its connection.
            .idle_timeout(None)
            .max_lifetime(None)
            .connect(&config.database_url)
            .await
            .map_err(|e| DbError::Connection(format!("SQLite: {}", e)))?;

        info!("Connected to SQLite");

        Ok(Self {
            pool,
            config: config.clone(),
        })
    }

    /// Recreate the meals table from the configured schema script
    pub async fn reset(&self) -> DbResult<()> {
        self.meal_repo().reset_all(&self.config.schema_path).await
    }

    /// Health check
    pub async fn health_check(&self) -> DbResult<HealthStatus> {
        let sqlite = sqlx::query("SELECT 1").fetch_one(&self.pool).await.is_ok();

        Ok(HealthStatus {
            sqlite,
            healthy: sqlite,
        })
    }

    /// Create repository instances
    pub fn meal_repo(&self) -> MealRepo {
        MealRepo::new(self.pool.clone())
    }

    pub fn config(&self) -> &DatabaseConfig {
        &self.config
    }
}

/// Health status of the database connection
#[derive(Debug, Clone)]
pub struct HealthStatus {
    pub sqlite: bool,
    pub healthy: bool,
}
