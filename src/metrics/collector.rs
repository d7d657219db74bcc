//! Metrics collection using Prometheus
//!
//! Counters and gauges describing replay runs, registered on a dedicated
//! registry so several collectors can coexist (one per test, for instance).

use crate::types::ReplaySummary;
use anyhow::Result;
use prometheus::{
    Encoder, Histogram, HistogramOpts, IntCounter, IntCounterVec, IntGauge, Opts, Registry,
    TextEncoder,
};
use std::sync::Arc;
use std::time::Duration;

/// Main metrics collector for the rating engine
#[derive(Clone)]
pub struct MetricsCollector {
    /// Prometheus registry
    registry: Arc<Registry>,

    replay_metrics: ReplayMetrics,
}

/// Replay-level metrics
#[derive(Clone)]
pub struct ReplayMetrics {
    /// Matches that changed ratings
    pub matches_processed_total: IntCounter,

    /// No-contest and unknown-outcome matches
    pub matches_skipped_total: IntCounter,

    /// Replay runs by status (completed, failed)
    pub runs_total: IntCounterVec,

    /// Competitors rated by the latest run
    pub competitors_rated: IntGauge,

    /// Tracks produced by the latest run
    pub tracks_produced: IntGauge,

    /// Wall time of a replay run including storage
    pub replay_duration: Histogram,
}

impl ReplayMetrics {
    fn new(registry: &Registry) -> Result<Self> {
        let matches_processed_total = IntCounter::with_opts(Opts::new(
            "fightrank_matches_processed_total",
            "Matches that changed ratings",
        ))?;
        let matches_skipped_total = IntCounter::with_opts(Opts::new(
            "fightrank_matches_skipped_total",
            "Matches skipped because of a no-contest or unknown outcome",
        ))?;
        let runs_total = IntCounterVec::new(
            Opts::new("fightrank_replay_runs_total", "Replay runs by status"),
            &["status"],
        )?;
        let competitors_rated = IntGauge::with_opts(Opts::new(
            "fightrank_competitors_rated",
            "Distinct competitors rated by the latest replay",
        ))?;
        let tracks_produced = IntGauge::with_opts(Opts::new(
            "fightrank_tracks_produced",
            "Distinct rating tracks produced by the latest replay",
        ))?;
        let replay_duration = Histogram::with_opts(
            HistogramOpts::new(
                "fightrank_replay_duration_seconds",
                "Duration of a full replay run",
            )
            .buckets(vec![0.01, 0.05, 0.1, 0.5, 1.0, 5.0, 10.0, 30.0]),
        )?;

        registry.register(Box::new(matches_processed_total.clone()))?;
        registry.register(Box::new(matches_skipped_total.clone()))?;
        registry.register(Box::new(runs_total.clone()))?;
        registry.register(Box::new(competitors_rated.clone()))?;
        registry.register(Box::new(tracks_produced.clone()))?;
        registry.register(Box::new(replay_duration.clone()))?;

        Ok(Self {
            matches_processed_total,
            matches_skipped_total,
            runs_total,
            competitors_rated,
            tracks_produced,
            replay_duration,
        })
    }
}

impl MetricsCollector {
    /// Create a new metrics collector with default registry
    pub fn new() -> Result<Self> {
        let registry = Arc::new(Registry::new());
        Self::with_registry(registry)
    }

    /// Create a new metrics collector with custom registry
    pub fn with_registry(registry: Arc<Registry>) -> Result<Self> {
        let replay_metrics = ReplayMetrics::new(&registry)?;
        Ok(Self {
            registry,
            replay_metrics,
        })
    }

    /// Get the Prometheus registry
    pub fn registry(&self) -> Arc<Registry> {
        self.registry.clone()
    }

    /// Get replay metrics
    pub fn replay(&self) -> &ReplayMetrics {
        &self.replay_metrics
    }

    /// Record a completed replay run
    pub fn record_replay(&self, summary: &ReplaySummary, duration: Duration) {
        self.replay_metrics
            .matches_processed_total
            .inc_by(summary.matches_processed);
        self.replay_metrics
            .matches_skipped_total
            .inc_by(summary.matches_skipped);
        self.replay_metrics
            .competitors_rated
            .set(summary.competitors_rated as i64);
        self.replay_metrics
            .tracks_produced
            .set(summary.tracks_produced as i64);
        self.replay_metrics
            .runs_total
            .with_label_values(&["completed"])
            .inc();
        self.replay_metrics
            .replay_duration
            .observe(duration.as_secs_f64());
    }

    /// Record a replay run that did not replace the stored ratings
    pub fn record_failure(&self) {
        self.replay_metrics
            .runs_total
            .with_label_values(&["failed"])
            .inc();
    }

    /// Render all metrics in the Prometheus text exposition format
    pub fn gather_text(&self) -> Result<String> {
        let mut buffer = Vec::new();
        TextEncoder::new().encode(&self.registry.gather(), &mut buffer)?;
        Ok(String::from_utf8(buffer)?)
    }
}
