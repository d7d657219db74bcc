//! Pairwise Elo math
//!
//! Thin layer over the skillratings Elo implementation. The replay engine and
//! the query layer both go through [`expected_score`], so win probabilities
//! served to readers always agree with the ratings the engine produced.

use skillratings::elo::{self, EloConfig, EloRating};
use skillratings::Outcomes;

/// Probability that a competitor rated `ra` beats one rated `rb`
pub fn expected_score(ra: f64, rb: f64) -> f64 {
    let (expected_a, _) = elo::expected_score(&EloRating { rating: ra }, &EloRating { rating: rb });
    expected_a
}

/// New ratings for A and B after a match with `outcome` (from A's side) and weighting `k`
///
/// The update is zero-sum: whatever A gains, B loses.
pub fn update_ratings(ra: f64, rb: f64, outcome: Outcomes, k: f64) -> (f64, f64) {
    let (new_a, new_b) = elo::elo(
        &EloRating { rating: ra },
        &EloRating { rating: rb },
        &outcome,
        &EloConfig { k },
    );
    (new_a.rating, new_b.rating)
}
