//! Dual-track Elo rating engine
//!
//! This module provides the pairwise Elo math, the adaptive weighting policy,
//! the chronological replay engine and the storage interface for its output.

pub mod math;
pub mod replay;
pub mod storage;
pub mod weighting;

// Re-export commonly used types
pub use math::{expected_score, update_ratings};
pub use replay::{RatingKey, RatingState, ReplayEngine, ReplayOutput};
pub use storage::{InMemoryRatingStore, JsonFileRatingStore, RatingSnapshot, RatingStore};
pub use weighting::{classify_method, WeightingPolicy};
