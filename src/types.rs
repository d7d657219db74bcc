//! Common types used throughout the rating engine

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use skillratings::Outcomes;

/// Unique identifier for competitors (resolved upstream by name)
pub type CompetitorId = String;

/// Name of a rating track: the universal track or a category label
pub type TrackName = String;

/// Identifier of a match, in original insertion order
pub type MatchId = u64;

/// Outcome of a match, oriented relative to competitor A
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MatchOutcome {
    #[serde(rename = "win_a")]
    AWins,
    #[serde(rename = "win_b")]
    BWins,
    #[serde(rename = "draw")]
    Draw,
    #[serde(rename = "nc")]
    NoContest,
    #[serde(rename = "unknown")]
    Unknown,
}

impl MatchOutcome {
    /// Elo outcome from A's point of view, or `None` if the match is not rated
    pub fn rated(self) -> Option<Outcomes> {
        match self {
            MatchOutcome::AWins => Some(Outcomes::WIN),
            MatchOutcome::BWins => Some(Outcomes::LOSS),
            MatchOutcome::Draw => Some(Outcomes::DRAW),
            MatchOutcome::NoContest | MatchOutcome::Unknown => None,
        }
    }

    /// Result for competitor A, or `None` if the match is not rated
    pub fn result_a(self) -> Option<MatchResult> {
        match self {
            MatchOutcome::AWins => Some(MatchResult::Win),
            MatchOutcome::BWins => Some(MatchResult::Loss),
            MatchOutcome::Draw => Some(MatchResult::Draw),
            MatchOutcome::NoContest | MatchOutcome::Unknown => None,
        }
    }
}

impl std::fmt::Display for MatchOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MatchOutcome::AWins => write!(f, "win_a"),
            MatchOutcome::BWins => write!(f, "win_b"),
            MatchOutcome::Draw => write!(f, "draw"),
            MatchOutcome::NoContest => write!(f, "nc"),
            MatchOutcome::Unknown => write!(f, "unknown"),
        }
    }
}

/// How a match ended, for weighting purposes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MethodClass {
    Finish,
    Decision,
}

/// Result of a match from one competitor's perspective
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchResult {
    Win,
    Loss,
    Draw,
}

impl MatchResult {
    /// Flip the perspective to the opponent
    pub fn reversed(self) -> Self {
        match self {
            MatchResult::Win => MatchResult::Loss,
            MatchResult::Loss => MatchResult::Win,
            MatchResult::Draw => MatchResult::Draw,
        }
    }
}

/// A validated match record, ready for replay
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchRecord {
    pub id: MatchId,
    pub event_name: String,
    pub date: NaiveDate,
    pub competitor_a: CompetitorId,
    pub competitor_b: CompetitorId,
    pub outcome: MatchOutcome,
    /// Category label (weight division); also the name of the category track
    pub category: String,
    pub title_match: bool,
    pub method: String,
    pub method_detail: Option<String>,
    pub finish_round: Option<u32>,
    /// Carried through for consumers, never used for rating
    pub finish_time: Option<String>,
}

/// One competitor's rating change in one track for one match
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub competitor: CompetitorId,
    pub opponent: CompetitorId,
    pub match_id: MatchId,
    pub track: TrackName,
    pub rating_before: f64,
    pub rating_after: f64,
    pub date: NaiveDate,
    pub result: MatchResult,
    pub method_class: MethodClass,
}

impl HistoryEntry {
    /// Signed rating change caused by this match
    pub fn delta(&self) -> f64 {
        self.rating_after - self.rating_before
    }
}

/// Final rating of a competitor in one track
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Standing {
    pub competitor: CompetitorId,
    pub track: TrackName,
    pub rating: f64,
    pub match_count: u32,
}

/// Counts reported by every replay run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplaySummary {
    pub matches_processed: u64,
    pub matches_skipped: u64,
    pub competitors_rated: usize,
    pub tracks_produced: usize,
}

impl ReplaySummary {
    pub fn total_matches(&self) -> u64 {
        self.matches_processed + self.matches_skipped
    }
}
