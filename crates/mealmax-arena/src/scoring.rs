//! Battle scoring
//!
//! A meal's battle score is `price * name length - difficulty penalty`.
//! Easier meals carry the larger penalty.

use mealmax_db::{Difficulty, Meal};

/// Score gap at which the favored meal is certain to win
pub const SATURATION_GAP: f64 = 100.0;

/// Points subtracted from a meal's score for its difficulty
pub fn difficulty_penalty(difficulty: Difficulty) -> f64 {
    match difficulty {
        Difficulty::Low => 3.0,
        Difficulty::Med => 2.0,
        Difficulty::High => 1.0,
    }
}

/// Deterministic battle score of a meal
pub fn battle_score(meal: &Meal) -> f64 {
    let name_len = meal.name.chars().count() as f64;
    meal.price * name_len - difficulty_penalty(meal.difficulty)
}

/// Normalized advantage of the stronger side, in `[0, 1]`
pub fn normalized_delta(score_a: f64, score_b: f64) -> f64 {
    let delta = (score_a - score_b).abs() / SATURATION_GAP;
    if delta.is_nan() {
        return 0.0;
    }
    delta.clamp(0.0, 1.0)
}

/// Probability that the higher-scoring meal wins: 50% at equal scores,
/// rising linearly to certainty at [`SATURATION_GAP`].
pub fn favored_win_probability(delta: f64) -> f64 {
    (1.0 + delta.clamp(0.0, 1.0)) / 2.0
}

/// Whether a draw in `[0, 1)` goes to the favored side
pub fn favored_wins(delta: f64, draw: f64) -> bool {
    draw < favored_win_probability(delta)
}
