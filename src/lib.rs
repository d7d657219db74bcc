//! fightrank - Elo ratings for combat-sports match histories
//!
//! This crate replays a chronological match history into two rating tracks
//! per competitor (one across all categories, one per category) and keeps the
//! full before/after history of every rating change.

pub mod config;
pub mod error;
pub mod metrics;
pub mod query;
pub mod rating;
pub mod service;
pub mod source;
pub mod types;
pub mod utils;

// Re-export commonly used types and traits
pub use error::{RatingError, Result};
pub use types::*;

// Re-export key components
pub use query::RatingQueries;
pub use rating::{ReplayEngine, RatingStore};
pub use service::RatingService;
pub use source::MatchSource;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
