//! Rating service coordination
//!
//! Wires a match source, the replay engine and a rating store together. A run
//! either swaps in a complete new snapshot or leaves the stored one untouched.

use crate::config::AppConfig;
use crate::error::{RatingError, Result};
use crate::metrics::MetricsCollector;
use crate::rating::replay::ReplayEngine;
use crate::rating::storage::{JsonFileRatingStore, RatingSnapshot, RatingStore};
use crate::source::{JsonFileMatchSource, MatchSource};
use crate::types::ReplaySummary;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use std::time::Instant;
use tracing::{error, info};

/// Batch rating service
pub struct RatingService {
    source: Arc<dyn MatchSource>,
    store: Arc<dyn RatingStore>,
    engine: ReplayEngine,
    metrics: Arc<MetricsCollector>,
}

impl RatingService {
    pub fn new(
        source: Arc<dyn MatchSource>,
        store: Arc<dyn RatingStore>,
        engine: ReplayEngine,
        metrics: Arc<MetricsCollector>,
    ) -> Self {
        Self {
            source,
            store,
            engine,
            metrics,
        }
    }

    /// Build a service reading and writing the JSON files named in `config`
    pub fn from_config(config: &AppConfig) -> Result<Self> {
        let source = Arc::new(JsonFileMatchSource::new(&config.storage.matches_path));
        let store = Arc::new(JsonFileRatingStore::new(&config.storage.snapshot_path));
        let engine = ReplayEngine::new(config.rating.clone())?;
        let metrics = Arc::new(MetricsCollector::new()?);
        Ok(Self::new(source, store, engine, metrics))
    }

    pub fn engine(&self) -> &ReplayEngine {
        &self.engine
    }

    pub fn metrics(&self) -> Arc<MetricsCollector> {
        self.metrics.clone()
    }

    /// Name of the cross-category track
    pub fn universal_track(&self) -> &str {
        &self.engine.config().universal_track
    }

    /// Recompute every rating from the full match history and replace the stored snapshot
    pub fn run_replay(&self) -> Result<ReplaySummary> {
        self.run_replay_with_cancel(&AtomicBool::new(false))
    }

    /// Like [`run_replay`](Self::run_replay), but stops between matches once `cancel` is set
    pub fn run_replay_with_cancel(&self, cancel: &AtomicBool) -> Result<ReplaySummary> {
        let start_time = Instant::now();

        match self.replay_and_store(cancel) {
            Ok(summary) => {
                self.metrics.record_replay(&summary, start_time.elapsed());
                info!(
                    "Replay finished in {:?}: {} processed, {} skipped",
                    start_time.elapsed(),
                    summary.matches_processed,
                    summary.matches_skipped
                );
                Ok(summary)
            }
            Err(e) => {
                self.metrics.record_failure();
                error!("Replay failed, stored ratings left untouched: {}", e);
                Err(e)
            }
        }
    }

    fn replay_and_store(&self, cancel: &AtomicBool) -> Result<ReplaySummary> {
        let records = self.source.load()?;
        let output = self.engine.replay_with_cancel(&records, cancel)?;
        let snapshot = RatingSnapshot::new(output);
        let summary = snapshot.summary.clone();

        info!("Replacing stored ratings with snapshot {}", snapshot.run_id);
        self.store.replace(snapshot)?;
        Ok(summary)
    }

    /// The stored snapshot; an error if no replay has completed yet
    pub fn snapshot(&self) -> Result<Arc<RatingSnapshot>> {
        self.store
            .current()?
            .ok_or_else(|| RatingError::NoSnapshot.into())
    }
}
