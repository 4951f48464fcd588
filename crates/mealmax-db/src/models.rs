//! Database models - mapped from the `meals` table

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use sqlx::sqlite::SqliteRow;
use sqlx::{FromRow, Row};

use crate::{DbError, DbResult};

// ============================================================================
// Enumerations
// ============================================================================

/// How hard a meal is to prepare
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Difficulty {
    Low,
    Med,
    High,
}

impl Difficulty {
    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Low => "LOW",
            Difficulty::Med => "MED",
            Difficulty::High => "HIGH",
        }
    }
}

impl FromStr for Difficulty {
    type Err = DbError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "LOW" => Ok(Difficulty::Low),
            "MED" => Ok(Difficulty::Med),
            "HIGH" => Ok(Difficulty::High),
            other => Err(DbError::InvalidInput(format!(
                "Invalid difficulty level: {}. Must be 'LOW', 'MED', or 'HIGH'.",
                other
            ))),
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of a single battle for one meal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    Win,
    Loss,
}

impl FromStr for Outcome {
    type Err = DbError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "win" => Ok(Outcome::Win),
            "loss" => Ok(Outcome::Loss),
            other => Err(DbError::InvalidInput(format!(
                "Invalid result: {}. Expected 'win' or 'loss'.",
                other
            ))),
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Win => f.write_str("win"),
            Outcome::Loss => f.write_str("loss"),
        }
    }
}

/// Leaderboard ordering
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortBy {
    #[default]
    Wins,
    WinPct,
}

impl FromStr for SortBy {
    type Err = DbError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "wins" => Ok(SortBy::Wins),
            "win_pct" => Ok(SortBy::WinPct),
            other => Err(DbError::InvalidInput(format!(
                "Invalid sort_by parameter: {}",
                other
            ))),
        }
    }
}

// ============================================================================
// Meal Models
// ============================================================================

/// A meal row as handed to callers.
///
/// Values are copies of the stored row and go stale once the store changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Meal {
    pub id: i64,
    pub name: String,
    pub cuisine: String,
    pub price: f64,
    pub difficulty: Difficulty,
    pub battles: i64,
    pub wins: i64,
    pub deleted: bool,
}

impl Meal {
    /// Build a fresh, never-battled meal value, validating price.
    pub fn new(
        id: i64,
        name: impl Into<String>,
        cuisine: impl Into<String>,
        price: f64,
        difficulty: Difficulty,
    ) -> DbResult<Self> {
        validate_price(price)?;
        Ok(Self {
            id,
            name: name.into(),
            cuisine: cuisine.into(),
            price,
            difficulty,
            battles: 0,
            wins: 0,
            deleted: false,
        })
    }
}

pub(crate) fn validate_price(price: f64) -> DbResult<()> {
    if !price.is_finite() || price <= 0.0 {
        return Err(DbError::InvalidInput(format!(
            "Invalid price: {}. Price must be a positive number.",
            price
        )));
    }
    Ok(())
}

fn decode_difficulty(row: &SqliteRow) -> Result<Difficulty, sqlx::Error> {
    let raw: String = row.try_get("difficulty")?;
    raw.parse().map_err(|e: DbError| sqlx::Error::ColumnDecode {
        index: "difficulty".to_string(),
        source: Box::new(e),
    })
}

impl<'r> FromRow<'r, SqliteRow> for Meal {
    fn from_row(row: &'r SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            name: row.try_get("name")?,
            cuisine: row.try_get("cuisine")?,
            price: row.try_get("price")?,
            difficulty: decode_difficulty(row)?,
            battles: row.try_get("battles")?,
            wins: row.try_get("wins")?,
            deleted: row.try_get("deleted")?,
        })
    }
}

// ============================================================================
// Leaderboard Models
// ============================================================================

/// Public leaderboard view of a non-deleted meal
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    pub id: i64,
    pub name: String,
    pub cuisine: String,
    pub price: f64,
    pub difficulty: Difficulty,
    pub battles: i64,
    pub wins: i64,
    /// wins / battles * 100, rounded to one decimal; 0 when never battled
    pub win_pct: f64,
}

impl<'r> FromRow<'r, SqliteRow> for LeaderboardEntry {
    fn from_row(row: &'r SqliteRow) -> Result<Self, sqlx::Error> {
        let ratio: f64 = row.try_get("win_ratio")?;
        Ok(Self {
            id: row.try_get("id")?,
            name: row.try_get("name")?,
            cuisine: row.try_get("cuisine")?,
            price: row.try_get("price")?,
            difficulty: decode_difficulty(row)?,
            battles: row.try_get("battles")?,
            wins: row.try_get("wins")?,
            win_pct: (ratio * 1000.0).round() / 10.0,
        })
    }
}
