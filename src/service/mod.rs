//! Service layer for fightrank
//!
//! Coordinates loading match history, replaying it and persisting the result.

pub mod app;

pub use app::RatingService;
