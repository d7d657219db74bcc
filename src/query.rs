//! Read-only queries over a stored rating snapshot
//!
//! Lookups never fall back to the initial rating: a competitor without a
//! standing in a track is reported as missing.

use crate::error::{RatingError, Result};
use crate::rating::math::expected_score;
use crate::rating::storage::RatingSnapshot;
use crate::types::{HistoryEntry, MatchResult, MethodClass, Standing};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Number of recent ratings attached to each leaderboard row
const SPARKLINE_LEN: usize = 10;

/// Maximum number of names returned by a search
const SEARCH_LIMIT: usize = 20;

/// One row of a leaderboard
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    pub rank: usize,
    pub competitor: String,
    pub rating: f64,
    pub match_count: u32,
    /// Post-match ratings of the most recent matches, oldest first
    pub sparkline: Vec<f64>,
}

/// A point of a rating trajectory
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrajectoryPoint {
    pub date: NaiveDate,
    pub rating: f64,
}

/// One side of a prediction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionSide {
    pub competitor: String,
    pub rating: f64,
    pub match_count: u32,
    pub win_probability: f64,
}

/// Win probabilities for a hypothetical match
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    pub track: String,
    pub competitor_a: PredictionSide,
    pub competitor_b: PredictionSide,
}

/// A category track and how many competitors hold a rating in it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackInfo {
    pub name: String,
    pub competitors: usize,
}

/// Win/loss record in the universal track
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompetitorRecord {
    pub wins: u32,
    pub losses: u32,
    pub draws: u32,
    /// Wins by KO, TKO or submission
    pub finishes: u32,
}

/// Everything known about one competitor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompetitorProfile {
    pub competitor: String,
    pub ratings: BTreeMap<String, Standing>,
    pub record: CompetitorRecord,
    pub peak_rating: Option<f64>,
    pub history: Vec<HistoryEntry>,
}

/// Query facade over a snapshot
#[derive(Debug, Clone, Copy)]
pub struct RatingQueries<'a> {
    snapshot: &'a RatingSnapshot,
    universal_track: &'a str,
}

impl<'a> RatingQueries<'a> {
    pub fn new(snapshot: &'a RatingSnapshot, universal_track: &'a str) -> Self {
        Self {
            snapshot,
            universal_track,
        }
    }

    /// Ranked standings of a track with at least `min_matches` matches, best first
    pub fn leaderboard(
        &self,
        track: &str,
        min_matches: u32,
        limit: usize,
    ) -> Vec<LeaderboardEntry> {
        let mut rows: Vec<&Standing> = self
            .snapshot
            .standings
            .iter()
            .filter(|s| s.track == track && s.match_count >= min_matches)
            .collect();
        rows.sort_by(|a, b| {
            b.rating
                .partial_cmp(&a.rating)
                .unwrap_or(std::cmp::Ordering::Equal)
        });

        rows.into_iter()
            .take(limit)
            .enumerate()
            .map(|(i, standing)| {
                let history = self.trajectory(&standing.competitor, track);
                let start = history.len().saturating_sub(SPARKLINE_LEN);
                LeaderboardEntry {
                    rank: i + 1,
                    competitor: standing.competitor.clone(),
                    rating: standing.rating,
                    match_count: standing.match_count,
                    sparkline: history[start..].iter().map(|h| h.rating_after).collect(),
                }
            })
            .collect()
    }

    /// History of a competitor in a track, in replay order
    pub fn trajectory(&self, competitor: &str, track: &str) -> Vec<&'a HistoryEntry> {
        self.snapshot
            .history
            .iter()
            .filter(|h| h.competitor == competitor && h.track == track)
            .collect()
    }

    /// Trajectory as chart points: the first pre-match rating, then every post-match rating
    pub fn trajectory_points(&self, competitor: &str, track: &str) -> Vec<TrajectoryPoint> {
        let history = self.trajectory(competitor, track);
        let Some(first) = history.first() else {
            return Vec::new();
        };

        std::iter::once(TrajectoryPoint {
            date: first.date,
            rating: first.rating_before,
        })
        .chain(history.iter().map(|h| TrajectoryPoint {
            date: h.date,
            rating: h.rating_after,
        }))
        .collect()
    }

    /// Win probabilities from the current ratings of two competitors
    pub fn predict(
        &self,
        competitor_a: &str,
        competitor_b: &str,
        track: &str,
    ) -> Result<Prediction> {
        let a = self.require(competitor_a, track)?;
        let b = self.require(competitor_b, track)?;
        let probability_a = expected_score(a.rating, b.rating);

        Ok(Prediction {
            track: track.to_string(),
            competitor_a: PredictionSide {
                competitor: a.competitor.clone(),
                rating: a.rating,
                match_count: a.match_count,
                win_probability: probability_a,
            },
            competitor_b: PredictionSide {
                competitor: b.competitor.clone(),
                rating: b.rating,
                match_count: b.match_count,
                win_probability: 1.0 - probability_a,
            },
        })
    }

    /// Category tracks with ratings, sorted by name
    pub fn tracks(&self) -> Vec<TrackInfo> {
        let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
        for standing in &self.snapshot.standings {
            if standing.track != self.universal_track {
                *counts.entry(standing.track.as_str()).or_default() += 1;
            }
        }

        counts
            .into_iter()
            .map(|(name, competitors)| TrackInfo {
                name: name.to_string(),
                competitors,
            })
            .collect()
    }

    /// Competitor names containing `query`, case-insensitively
    pub fn search(&self, query: &str) -> Vec<String> {
        let needle = query.trim().to_lowercase();
        if needle.is_empty() {
            return Vec::new();
        }

        let mut names: Vec<&str> = self
            .snapshot
            .standings
            .iter()
            .filter(|s| s.track == self.universal_track)
            .map(|s| s.competitor.as_str())
            .filter(|name| name.to_lowercase().contains(&needle))
            .collect();
        names.sort_unstable();
        names.dedup();
        names.truncate(SEARCH_LIMIT);
        names.into_iter().map(str::to_string).collect()
    }

    /// Ratings, record and universal-track history of a competitor
    pub fn profile(&self, competitor: &str) -> Option<CompetitorProfile> {
        let ratings: BTreeMap<String, Standing> = self
            .snapshot
            .standings
            .iter()
            .filter(|s| s.competitor == competitor)
            .map(|s| (s.track.clone(), s.clone()))
            .collect();
        if ratings.is_empty() {
            return None;
        }

        let history: Vec<HistoryEntry> = self
            .trajectory(competitor, self.universal_track)
            .into_iter()
            .cloned()
            .collect();

        let mut record = CompetitorRecord::default();
        for entry in &history {
            match entry.result {
                MatchResult::Win => {
                    record.wins += 1;
                    if entry.method_class == MethodClass::Finish {
                        record.finishes += 1;
                    }
                }
                MatchResult::Loss => record.losses += 1,
                MatchResult::Draw => record.draws += 1,
            }
        }

        let peak_rating = history.iter().map(|h| h.rating_after).reduce(f64::max);

        Some(CompetitorProfile {
            competitor: competitor.to_string(),
            ratings,
            record,
            peak_rating,
            history,
        })
    }

    fn require(&self, competitor: &str, track: &str) -> Result<&'a Standing> {
        self.snapshot.standing(competitor, track).ok_or_else(|| {
            RatingError::CompetitorNotFound {
                competitor: competitor.to_string(),
                track: track.to_string(),
            }
            .into()
        })
    }
}
