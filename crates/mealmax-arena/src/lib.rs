//! MealMax Arena - meal battles
//!
//! Two meals are staged as combatants, each gets a deterministic battle
//! score, and a random draw weighted by the score gap picks the winner.
//! Results are written back to the meal store.
//!
//! # Example
//!
//! ```ignore
//! use mealmax_arena::BattleArena;
//!
//! let mut arena = BattleArena::new(db.meal_repo());
//! arena.prep(meals.get_by_name("Pasta").await?)?;
//! arena.prep(meals.get_by_name("Sushi").await?)?;
//!
//! let outcome = arena.battle().await?;
//! println!("{} wins", outcome.winner_name());
//! ```

pub mod draw;
pub mod scoring;

use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

pub use draw::RandomSource;
pub use mealmax_db::{DbError, Meal, MealRepo};

use scoring::{battle_score, favored_wins, normalized_delta};

/// Combatants needed for a battle
pub const MAX_COMBATANTS: usize = 2;

/// Arena errors
#[derive(Debug, Error)]
pub enum ArenaError {
    #[error("Combatant list is full, cannot add more combatants")]
    Full,

    #[error("Two combatants must be prepped for a battle, found {0}")]
    InsufficientCombatants(usize),

    #[error("Store error: {0}")]
    Store(#[from] DbError),
}

/// Result type for arena operations
pub type ArenaResult<T> = Result<T, ArenaError>;

/// Result of a resolved battle
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BattleOutcome {
    pub winner: Meal,
    pub loser: Meal,
    pub winner_score: f64,
    pub loser_score: f64,
    /// Normalized score gap in `[0, 1]`
    pub delta: f64,
    /// The random draw that settled the battle
    pub draw: f64,
}

impl BattleOutcome {
    pub fn winner_name(&self) -> &str {
        &self.winner.name
    }
}

/// Staging area and arbiter for meal battles
///
/// Each arena owns its own combatant list. Staged meals are copies and are
/// not refreshed from the store.
pub struct BattleArena<R = StdRng> {
    meals: MealRepo,
    combatants: Vec<Meal>,
    rng: R,
}

impl BattleArena<StdRng> {
    /// Arena drawing from an entropy-seeded RNG
    pub fn new(meals: MealRepo) -> Self {
        Self::with_rng(meals, StdRng::from_entropy())
    }
}

impl<R: RandomSource> BattleArena<R> {
    /// Arena drawing from the given source
    pub fn with_rng(meals: MealRepo, rng: R) -> Self {
        Self {
            meals,
            combatants: Vec::with_capacity(MAX_COMBATANTS),
            rng,
        }
    }

    /// Stage a meal for the next battle
    pub fn prep(&mut self, meal: Meal) -> ArenaResult<()> {
        if self.combatants.len() >= MAX_COMBATANTS {
            return Err(ArenaError::Full);
        }
        debug!(id = meal.id, name = %meal.name, "combatant prepped");
        self.combatants.push(meal);
        Ok(())
    }

    /// Remove all staged combatants
    pub fn clear(&mut self) {
        debug!("combatants cleared");
        self.combatants.clear();
    }

    /// Currently staged combatants, in prep order
    pub fn combatants(&self) -> &[Meal] {
        &self.combatants
    }

    /// Fight the two staged meals and persist the result
    ///
    /// The higher-scoring meal (the first one on a tie) is favored. Staging is
    /// cleared once the result is stored; if storing fails the combatants stay
    /// staged and neither meal's stats change.
    pub async fn battle(&mut self) -> ArenaResult<BattleOutcome> {
        let (a, b) = match self.combatants.as_slice() {
            [a, b] => (a.clone(), b.clone()),
            staged => return Err(ArenaError::InsufficientCombatants(staged.len())),
        };

        let score_a = battle_score(&a);
        let score_b = battle_score(&b);
        let delta = normalized_delta(score_a, score_b);
        let draw = self.rng.draw();

        let a_favored = score_a >= score_b;
        let a_wins = a_favored == favored_wins(delta, draw);

        let outcome = if a_wins {
            BattleOutcome {
                winner: a,
                loser: b,
                winner_score: score_a,
                loser_score: score_b,
                delta,
                draw,
            }
        } else {
            BattleOutcome {
                winner: b,
                loser: a,
                winner_score: score_b,
                loser_score: score_a,
                delta,
                draw,
            }
        };

        self.meals
            .record_battle(outcome.winner.id, outcome.loser.id)
            .await?;
        self.combatants.clear();

        info!(
            winner = %outcome.winner.name,
            loser = %outcome.loser.name,
            delta,
            draw,
            "battle resolved"
        );
        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mealmax_db::{Database, DatabaseConfig, SortBy};

    /// Replays a fixed list of draws
    struct FixedDraws(Vec<f64>);

    impl RandomSource for FixedDraws {
        fn draw(&mut self) -> f64 {
            self.0.remove(0)
        }
    }

    async fn seeded_store() -> (MealRepo, Meal, Meal) {
        let db = Database::connect(&DatabaseConfig::default()).await.unwrap();
        db.reset().await.unwrap();
        let repo = db.meal_repo();
        // Pasta scores 60.5, Sushi scores 99.0: delta 0.385, favored odds 0.6925
        let pasta = repo.create("Pasta", "Italian", 12.5, "MED").await.unwrap();
        let sushi = repo.create("Sushi", "Japanese", 20.0, "HIGH").await.unwrap();
        (repo, pasta, sushi)
    }

    #[tokio::test]
    async fn test_prep_limit() {
        let (repo, pasta, sushi) = seeded_store().await;
        let mut arena = BattleArena::with_rng(repo, FixedDraws(vec![]));

        arena.prep(pasta.clone()).unwrap();
        arena.prep(sushi).unwrap();
        assert!(matches!(arena.prep(pasta), Err(ArenaError::Full)));
        assert_eq!(arena.combatants().len(), 2);
    }

    #[tokio::test]
    async fn test_battle_needs_two_combatants() {
        let (repo, pasta, _) = seeded_store().await;
        let mut arena = BattleArena::with_rng(repo, FixedDraws(vec![]));

        assert!(matches!(
            arena.battle().await,
            Err(ArenaError::InsufficientCombatants(0))
        ));
        arena.prep(pasta).unwrap();
        assert!(matches!(
            arena.battle().await,
            Err(ArenaError::InsufficientCombatants(1))
        ));
    }

    #[tokio::test]
    async fn test_clear() {
        let (repo, pasta, sushi) = seeded_store().await;
        let mut arena = BattleArena::with_rng(repo, FixedDraws(vec![]));
        arena.clear();

        arena.prep(pasta).unwrap();
        arena.prep(sushi).unwrap();
        arena.clear();
        assert!(arena.combatants().is_empty());
    }

    #[tokio::test]
    async fn test_favored_meal_wins_low_draw() {
        let (repo, pasta, sushi) = seeded_store().await;
        let mut arena = BattleArena::with_rng(repo.clone(), FixedDraws(vec![0.6]));
        arena.prep(pasta.clone()).unwrap();
        arena.prep(sushi.clone()).unwrap();

        let outcome = arena.battle().await.unwrap();
        assert_eq!(outcome.winner_name(), "Sushi");
        assert_eq!(outcome.winner_score, 99.0);
        assert_eq!(outcome.loser_score, 60.5);
        assert_eq!(outcome.delta, 0.385);
        assert!(arena.combatants().is_empty());

        let winner = repo.get_by_id(sushi.id).await.unwrap();
        let loser = repo.get_by_id(pasta.id).await.unwrap();
        assert_eq!((winner.battles, winner.wins), (1, 1));
        assert_eq!((loser.battles, loser.wins), (1, 0));
    }

    #[tokio::test]
    async fn test_underdog_wins_high_draw() {
        let (repo, pasta, sushi) = seeded_store().await;
        let mut arena = BattleArena::with_rng(repo.clone(), FixedDraws(vec![0.7]));
        arena.prep(sushi).unwrap();
        arena.prep(pasta).unwrap();

        let outcome = arena.battle().await.unwrap();
        assert_eq!(outcome.winner_name(), "Pasta");
        assert_eq!(outcome.draw, 0.7);

        let board = repo.get_leaderboard(SortBy::Wins).await.unwrap();
        assert_eq!(board[0].name, "Pasta");
        assert_eq!(board[0].win_pct, 100.0);
        assert_eq!(board[1].win_pct, 0.0);
    }

    #[tokio::test]
    async fn test_equal_scores_favor_first_combatant() {
        let (repo, _, _) = seeded_store().await;
        let a = repo.create("Ramen", "Japanese", 10.0, "MED").await.unwrap();
        let b = repo.create("Pizza", "Italian", 10.0, "MED").await.unwrap();

        let mut arena = BattleArena::with_rng(repo.clone(), FixedDraws(vec![0.49, 0.5]));
        arena.prep(a.clone()).unwrap();
        arena.prep(b.clone()).unwrap();
        assert_eq!(arena.battle().await.unwrap().winner.id, a.id);

        arena.prep(a).unwrap();
        arena.prep(b.clone()).unwrap();
        assert_eq!(arena.battle().await.unwrap().winner.id, b.id);
    }

    #[tokio::test]
    async fn test_saturated_gap_always_favors_stronger() {
        let (repo, _, _) = seeded_store().await;
        let feast = repo.create("Banquet", "French", 50.0, "HIGH").await.unwrap();
        let snack = repo.create("Chip", "British", 1.0, "LOW").await.unwrap();

        let mut arena = BattleArena::with_rng(repo, FixedDraws(vec![0.999_999]));
        arena.prep(snack).unwrap();
        arena.prep(feast).unwrap();

        let outcome = arena.battle().await.unwrap();
        assert_eq!(outcome.delta, 1.0);
        assert_eq!(outcome.winner_name(), "Banquet");
    }

    #[tokio::test]
    async fn test_failed_store_keeps_combatants() {
        let (repo, pasta, sushi) = seeded_store().await;
        repo.delete(sushi.id).await.unwrap();

        let mut arena = BattleArena::with_rng(repo.clone(), FixedDraws(vec![0.1]));
        arena.prep(pasta.clone()).unwrap();
        arena.prep(sushi).unwrap();

        let err = arena.battle().await.unwrap_err();
        assert!(matches!(err, ArenaError::Store(DbError::Deleted(_))));
        assert_eq!(arena.combatants().len(), 2);

        let pasta = repo.get_by_id(pasta.id).await.unwrap();
        assert_eq!(pasta.battles, 0);
    }

    #[tokio::test]
    async fn test_arenas_do_not_share_staging() {
        let (repo, pasta, _) = seeded_store().await;
        let mut first = BattleArena::new(repo.clone());
        let second = BattleArena::new(repo);

        first.prep(pasta).unwrap();
        assert_eq!(first.combatants().len(), 1);
        assert!(second.combatants().is_empty());
    }

    #[tokio::test]
    async fn test_seeded_battles_keep_counters_consistent() {
        let (repo, pasta, sushi) = seeded_store().await;
        let mut arena = BattleArena::with_rng(repo.clone(), StdRng::seed_from_u64(42));

        for _ in 0..20 {
            arena.prep(pasta.clone()).unwrap();
            arena.prep(sushi.clone()).unwrap();
            arena.battle().await.unwrap();
        }

        let pasta = repo.get_by_id(pasta.id).await.unwrap();
        let sushi = repo.get_by_id(sushi.id).await.unwrap();
        assert_eq!(pasta.battles, 20);
        assert_eq!(sushi.battles, 20);
        assert_eq!(pasta.wins + sushi.wins, 20);
    }
}
