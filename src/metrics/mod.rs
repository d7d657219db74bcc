//! Metrics for replay runs
//!
//! Run counts and sizes are exported through a Prometheus registry so a
//! scheduler running periodic replays can scrape or log them.

pub mod collector;

pub use collector::{MetricsCollector, ReplayMetrics};
