//! Error types for the rating engine
//!
//! Domain failures are modelled as `RatingError` variants and travel through
//! the crate as `anyhow` errors, so callers can `downcast_ref` when they need
//! to branch on a specific failure.

/// Result type alias for convenience
pub type Result<T> = anyhow::Result<T>;

/// Custom error types for specific rating scenarios
#[derive(Debug, thiserror::Error)]
pub enum RatingError {
    #[error("Invalid match record #{index}: {reason}")]
    InvalidMatchRecord { index: usize, reason: String },

    #[error("Match source unavailable: {message}")]
    SourceUnavailable { message: String },

    #[error("Competitor not found: {competitor} (track={track})")]
    CompetitorNotFound { competitor: String, track: String },

    #[error("No ratings have been computed yet")]
    NoSnapshot,

    #[error("Replay cancelled after {processed} processed matches")]
    ReplayCancelled { processed: u64 },

    #[error("Storage error: {message}")]
    StorageError { message: String },

    #[error("Configuration error: {message}")]
    ConfigurationError { message: String },
}
