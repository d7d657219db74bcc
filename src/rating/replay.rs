//! Chronological replay of a match history
//!
//! The engine walks every match in (date, insertion order), updates the
//! universal track and the match's category track for both competitors, and
//! records a before/after history entry for each of them. Ratings are path
//! dependent, so the ordering here is load-bearing.

use crate::config::RatingConfig;
use crate::error::{RatingError, Result};
use crate::rating::math;
use crate::rating::weighting::{classify_method, WeightingPolicy};
use crate::types::{CompetitorId, HistoryEntry, MatchRecord, ReplaySummary, Standing, TrackName};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap, HashSet};
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{debug, info, trace, warn};

/// Composite key of the replay state
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RatingKey {
    pub competitor: CompetitorId,
    pub track: TrackName,
}

impl RatingKey {
    pub fn new(competitor: &str, track: &str) -> Self {
        Self {
            competitor: competitor.to_string(),
            track: track.to_string(),
        }
    }
}

/// Rating of one competitor in one track while a replay is running
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RatingState {
    pub rating: f64,
    pub match_count: u32,
}

/// Everything a replay run produces
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReplayOutput {
    pub history: Vec<HistoryEntry>,
    pub standings: Vec<Standing>,
    pub summary: ReplaySummary,
}

/// Batch rating engine
#[derive(Debug, Clone)]
pub struct ReplayEngine {
    config: RatingConfig,
    policy: WeightingPolicy,
}

impl ReplayEngine {
    /// Create a new engine, rejecting invalid tunings
    pub fn new(config: RatingConfig) -> Result<Self> {
        config.validate()?;
        let policy = WeightingPolicy::new(config.clone());
        Ok(Self { config, policy })
    }

    pub fn config(&self) -> &RatingConfig {
        &self.config
    }

    pub fn policy(&self) -> &WeightingPolicy {
        &self.policy
    }

    /// Replay the full match history
    pub fn replay(&self, records: &[MatchRecord]) -> Result<ReplayOutput> {
        self.replay_with_cancel(records, &AtomicBool::new(false))
    }

    /// Replay the full match history, aborting between matches once `cancel` is set
    ///
    /// A cancelled run returns [`RatingError::ReplayCancelled`] and produces no output.
    pub fn replay_with_cancel(
        &self,
        records: &[MatchRecord],
        cancel: &AtomicBool,
    ) -> Result<ReplayOutput> {
        self.validate(records)?;

        let mut ordered: Vec<&MatchRecord> = records.iter().collect();
        ordered.sort_by_key(|record| (record.date, record.id));

        info!(
            "Replaying {} match records (base K {}, initial rating {})",
            ordered.len(),
            self.config.base_k,
            self.config.initial_rating
        );

        let mut run = ReplayRun::new(self);
        for record in ordered {
            if cancel.load(Ordering::Relaxed) {
                warn!("Replay cancelled after {} processed matches", run.processed);
                return Err(RatingError::ReplayCancelled {
                    processed: run.processed,
                }
                .into());
            }
            run.apply(record);
        }

        let output = run.finish();
        info!(
            "Replay complete: {} processed, {} skipped, {} competitors, {} tracks",
            output.summary.matches_processed,
            output.summary.matches_skipped,
            output.summary.competitors_rated,
            output.summary.tracks_produced
        );
        Ok(output)
    }

    /// Reject structurally invalid records before any state is touched
    pub fn validate(&self, records: &[MatchRecord]) -> Result<()> {
        let mut seen_ids = HashSet::with_capacity(records.len());
        for (index, record) in records.iter().enumerate() {
            let reason = if !seen_ids.insert(record.id) {
                Some(format!("duplicate match id {}", record.id))
            } else if record.competitor_a.trim().is_empty()
                || record.competitor_b.trim().is_empty()
            {
                Some("missing competitor".to_string())
            } else if record.competitor_a == record.competitor_b {
                Some(format!("{} is listed on both sides", record.competitor_a))
            } else if record.finish_round == Some(0) {
                Some("finish round must be positive".to_string())
            } else if record.category.trim() == self.config.universal_track {
                Some(format!(
                    "category collides with the universal track '{}'",
                    self.config.universal_track
                ))
            } else {
                None
            };

            if let Some(reason) = reason {
                warn!("Rejecting match {} ({}): {}", record.id, record.event_name, reason);
                return Err(RatingError::InvalidMatchRecord { index, reason }.into());
            }
        }
        Ok(())
    }

    /// Track named after the match's category, or the fallback for unlabelled matches
    pub fn category_track<'a>(&'a self, record: &'a MatchRecord) -> &'a str {
        let category = record.category.trim();
        if category.is_empty() {
            &self.config.fallback_category
        } else {
            category
        }
    }
}

/// Working state of a single replay pass
struct ReplayRun<'e> {
    engine: &'e ReplayEngine,
    states: HashMap<RatingKey, RatingState>,
    history: Vec<HistoryEntry>,
    processed: u64,
    skipped: u64,
}

impl<'e> ReplayRun<'e> {
    fn new(engine: &'e ReplayEngine) -> Self {
        Self {
            engine,
            states: HashMap::new(),
            history: Vec::new(),
            processed: 0,
            skipped: 0,
        }
    }

    /// Unseen (competitor, track) pairs start at the initial rating. Only the
    /// replay seeds defaults; readers never do.
    fn state(&mut self, competitor: &str, track: &str) -> RatingState {
        let initial_rating = self.engine.config.initial_rating;
        *self
            .states
            .entry(RatingKey::new(competitor, track))
            .or_insert(RatingState {
                rating: initial_rating,
                match_count: 0,
            })
    }

    fn store(&mut self, competitor: &str, track: &str, rating: f64) {
        if let Some(state) = self.states.get_mut(&RatingKey::new(competitor, track)) {
            state.rating = rating;
            state.match_count += 1;
        }
    }

    fn apply(&mut self, record: &MatchRecord) {
        let (Some(outcome), Some(result_a)) = (record.outcome.rated(), record.outcome.result_a())
        else {
            trace!("Skipping match {} with outcome {}", record.id, record.outcome);
            self.skipped += 1;
            return;
        };

        let k = self.engine.policy.for_match(record);
        let method_class = classify_method(&record.method);

        let universal = self.engine.config.universal_track.clone();
        let category = self.engine.category_track(record).to_string();

        for track in [universal, category] {
            let before_a = self.state(&record.competitor_a, &track).rating;
            let before_b = self.state(&record.competitor_b, &track).rating;

            let (after_a, after_b) = math::update_ratings(before_a, before_b, outcome, k);

            self.store(&record.competitor_a, &track, after_a);
            self.store(&record.competitor_b, &track, after_b);

            self.history.push(HistoryEntry {
                competitor: record.competitor_a.clone(),
                opponent: record.competitor_b.clone(),
                match_id: record.id,
                track: track.clone(),
                rating_before: before_a,
                rating_after: after_a,
                date: record.date,
                result: result_a,
                method_class,
            });
            self.history.push(HistoryEntry {
                competitor: record.competitor_b.clone(),
                opponent: record.competitor_a.clone(),
                match_id: record.id,
                track,
                rating_before: before_b,
                rating_after: after_b,
                date: record.date,
                result: result_a.reversed(),
                method_class,
            });
        }

        trace!(
            "Match {} ({} vs {}) rated with K {:.2}",
            record.id,
            record.competitor_a,
            record.competitor_b,
            k
        );
        self.processed += 1;
    }

    fn finish(self) -> ReplayOutput {
        let mut keys: Vec<&RatingKey> = self.states.keys().collect();
        keys.sort();

        let standings: Vec<Standing> = keys
            .into_iter()
            .map(|key| {
                let state = &self.states[key];
                Standing {
                    competitor: key.competitor.clone(),
                    track: key.track.clone(),
                    rating: state.rating,
                    match_count: state.match_count,
                }
            })
            .collect();

        let competitors: BTreeSet<&str> = self
            .states
            .keys()
            .map(|key| key.competitor.as_str())
            .collect();
        let tracks: BTreeSet<&str> = self.states.keys().map(|key| key.track.as_str()).collect();

        let summary = ReplaySummary {
            matches_processed: self.processed,
            matches_skipped: self.skipped,
            competitors_rated: competitors.len(),
            tracks_produced: tracks.len(),
        };
        debug!(
            "Built {} history rows and {} standings",
            self.history.len(),
            standings.len()
        );

        ReplayOutput {
            history: self.history,
            standings,
            summary,
        }
    }
}
