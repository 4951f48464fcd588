//! Meal repository

use std::path::Path;

use sqlx::{Executor, SqliteConnection, SqlitePool};
use tracing::{debug, info, warn};

use crate::models::validate_price;
use crate::{DbError, DbResult, Difficulty, LeaderboardEntry, Meal, Outcome, SortBy};

const MEAL_COLUMNS: &str = "id, name, cuisine, price, difficulty, battles, wins, deleted";

/// Meal repository: catalog CRUD, battle stats and leaderboard
#[derive(Clone)]
pub struct MealRepo {
    pool: SqlitePool,
}

impl MealRepo {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    // =========================================================================
    // Catalog Operations
    // =========================================================================

    /// Create a new meal
    ///
    /// `difficulty` must be one of `LOW`, `MED` or `HIGH`. Nothing is written
    /// when validation fails.
    pub async fn create(
        &self,
        name: &str,
        cuisine: &str,
        price: f64,
        difficulty: &str,
    ) -> DbResult<Meal> {
        validate_price(price)?;
        let difficulty: Difficulty = difficulty.parse()?;

        let meal = sqlx::query_as::<_, Meal>(&format!(
            r#"
            INSERT INTO meals (name, cuisine, price, difficulty)
            VALUES (?, ?, ?, ?)
            RETURNING {MEAL_COLUMNS}
            "#
        ))
        .bind(name)
        .bind(cuisine)
        .bind(price)
        .bind(difficulty.as_str())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(ref db_err) = e {
                if db_err.is_unique_violation() {
                    warn!(name, "rejected duplicate meal");
                    return DbError::Duplicate(format!("Meal with name '{}' already exists", name));
                }
            }
            DbError::Query(e)
        })?;

        info!(id = meal.id, name, "meal created");
        Ok(meal)
    }

    /// Soft-delete a meal
    pub async fn delete(&self, id: i64) -> DbResult<()> {
        let mut conn = self.pool.acquire().await?;
        ensure_active(&mut conn, id).await?;

        sqlx::query("UPDATE meals SET deleted = TRUE WHERE id = ?")
            .bind(id)
            .execute(&mut *conn)
            .await?;

        info!(id, "meal deleted");
        Ok(())
    }

    /// Find a meal by ID
    ///
    /// A soft-deleted meal is reported as [`DbError::Deleted`], distinct from a
    /// meal that never existed.
    pub async fn get_by_id(&self, id: i64) -> DbResult<Meal> {
        let meal = sqlx::query_as::<_, Meal>(&format!(
            "SELECT {MEAL_COLUMNS} FROM meals WHERE id = ?"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        match meal {
            None => Err(not_found(id)),
            Some(meal) if meal.deleted => Err(deleted(id)),
            Some(meal) => Ok(meal),
        }
    }

    /// Find a meal by name
    ///
    /// Unlike [`MealRepo::get_by_id`], soft-deleted meals are simply not found.
    pub async fn get_by_name(&self, name: &str) -> DbResult<Meal> {
        sqlx::query_as::<_, Meal>(&format!(
            "SELECT {MEAL_COLUMNS} FROM meals WHERE name = ? AND deleted = FALSE"
        ))
        .bind(name)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| DbError::NotFound(format!("Meal with name {} not found", name)))
    }

    // =========================================================================
    // Battle Stats
    // =========================================================================

    /// Record one battle result for a meal
    pub async fn update_stats(&self, id: i64, outcome: Outcome) -> DbResult<()> {
        let mut conn = self.pool.acquire().await?;
        apply_outcome(&mut conn, id, outcome).await
    }

    /// Record a finished battle for both meals in a single transaction
    pub async fn record_battle(&self, winner_id: i64, loser_id: i64) -> DbResult<()> {
        let mut tx = self.pool.begin().await?;
        apply_outcome(&mut tx, winner_id, Outcome::Win).await?;
        apply_outcome(&mut tx, loser_id, Outcome::Loss).await?;
        tx.commit().await?;
        Ok(())
    }

    /// Non-deleted meals ranked by wins or win percentage, best first
    pub async fn get_leaderboard(&self, sort_by: SortBy) -> DbResult<Vec<LeaderboardEntry>> {
        let order = match sort_by {
            SortBy::Wins => "wins DESC",
            SortBy::WinPct => "win_ratio DESC",
        };

        let entries = sqlx::query_as::<_, LeaderboardEntry>(&format!(
            r#"
            SELECT id, name, cuisine, price, difficulty, battles, wins,
                CASE WHEN battles > 0 THEN wins * 1.0 / battles ELSE 0.0 END AS win_ratio
            FROM meals
            WHERE deleted = FALSE
            ORDER BY {order}, id ASC
            "#
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(entries)
    }

    // =========================================================================
    // Maintenance
    // =========================================================================

    /// Drop and recreate the meals table from a schema script
    pub async fn reset_all(&self, schema_path: &Path) -> DbResult<()> {
        let script = tokio::fs::read_to_string(schema_path)
            .await
            .map_err(|e| DbError::Schema(format!("{}: {}", schema_path.display(), e)))?;

        self.pool
            .execute(script.as_str())
            .await
            .map_err(|e| DbError::Schema(e.to_string()))?;

        info!(schema = %schema_path.display(), "meals table reset");
        Ok(())
    }
}

fn not_found(id: i64) -> DbError {
    DbError::NotFound(format!("Meal with ID {} not found", id))
}

fn deleted(id: i64) -> DbError {
    DbError::Deleted(format!("Meal with ID {} has been deleted", id))
}

/// Fails unless the meal exists and is not soft-deleted
async fn ensure_active(conn: &mut SqliteConnection, id: i64) -> DbResult<()> {
    let flag: Option<bool> = sqlx::query_scalar("SELECT deleted FROM meals WHERE id = ?")
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?;

    match flag {
        None => Err(not_found(id)),
        Some(true) => {
            warn!(id, "operation on deleted meal");
            Err(deleted(id))
        }
        Some(false) => Ok(()),
    }
}

async fn apply_outcome(conn: &mut SqliteConnection, id: i64, outcome: Outcome) -> DbResult<()> {
    ensure_active(conn, id).await?;

    let won = i64::from(outcome == Outcome::Win);
    sqlx::query("UPDATE meals SET battles = battles + 1, wins = wins + ? WHERE id = ?")
        .bind(won)
        .bind(id)
        .execute(&mut *conn)
        .await?;

    debug!(id, %outcome, "meal stats updated");
    Ok(())
}
