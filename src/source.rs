//! Match record sources
//!
//! Records arrive in the raw shape produced by the scraper and are validated
//! into [`MatchRecord`]s here. Any structural problem aborts the whole load.

use crate::error::{RatingError, Result};
use crate::types::{MatchId, MatchOutcome, MatchRecord};
use anyhow::Context;
use chrono::NaiveDate;
use std::collections::HashSet;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// A match as stored by the data source
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawMatchRecord {
    /// Source-assigned id; defaults to position in the input
    #[serde(default)]
    pub id: Option<MatchId>,
    #[serde(default)]
    pub event_name: String,
    pub event_date: String,
    pub fighter_a: String,
    pub fighter_b: String,
    pub result: String,
    #[serde(default)]
    pub weight_class: Option<String>,
    #[serde(default)]
    pub is_title_fight: bool,
    #[serde(default)]
    pub method: Option<String>,
    #[serde(default)]
    pub method_detail: Option<String>,
    #[serde(default)]
    pub finish_round: Option<u32>,
    #[serde(default)]
    pub finish_time: Option<String>,
}

impl RawMatchRecord {
    /// Validate into a replayable record; `index` is the position in the input
    pub fn validate(self, index: usize) -> Result<MatchRecord> {
        let invalid = |reason: String| RatingError::InvalidMatchRecord { index, reason };

        let competitor_a = self.fighter_a.trim().to_string();
        let competitor_b = self.fighter_b.trim().to_string();
        if competitor_a.is_empty() || competitor_b.is_empty() {
            return Err(invalid("missing competitor".to_string()).into());
        }

        let date = NaiveDate::parse_from_str(self.event_date.trim(), "%Y-%m-%d")
            .map_err(|e| invalid(format!("unparseable date '{}': {e}", self.event_date)))?;

        let outcome = parse_outcome(&self.result)
            .ok_or_else(|| invalid(format!("unknown result '{}'", self.result)))?;

        if self.finish_round == Some(0) {
            return Err(invalid("finish round must be positive".to_string()).into());
        }

        Ok(MatchRecord {
            id: self.id.unwrap_or(index as MatchId + 1),
            event_name: self.event_name,
            date,
            competitor_a,
            competitor_b,
            outcome,
            category: self.weight_class.unwrap_or_default().trim().to_string(),
            title_match: self.is_title_fight,
            method: self.method.unwrap_or_default(),
            method_detail: self.method_detail,
            finish_round: self.finish_round,
            finish_time: self.finish_time,
        })
    }
}

fn parse_outcome(result: &str) -> Option<MatchOutcome> {
    match result.trim().to_lowercase().as_str() {
        "win_a" => Some(MatchOutcome::AWins),
        "win_b" => Some(MatchOutcome::BWins),
        "draw" => Some(MatchOutcome::Draw),
        "nc" | "no_contest" => Some(MatchOutcome::NoContest),
        "unknown" | "" => Some(MatchOutcome::Unknown),
        _ => None,
    }
}

/// Validate a batch of raw records, failing on the first bad one
///
/// Source ids are all-or-nothing: a record without an id takes its 1-based
/// position, which could collide with an explicit id elsewhere in the batch.
pub fn validate_records(raw: Vec<RawMatchRecord>) -> Result<Vec<MatchRecord>> {
    let with_id = raw.iter().filter(|record| record.id.is_some()).count();
    if with_id != 0 && with_id != raw.len() {
        let index = raw
            .iter()
            .position(|record| record.id.is_none())
            .unwrap_or_default();
        return Err(RatingError::InvalidMatchRecord {
            index,
            reason: format!("{with_id} of {} records carry a match id", raw.len()),
        }
        .into());
    }

    let mut seen_ids = HashSet::with_capacity(raw.len());
    raw.into_iter()
        .enumerate()
        .map(|(index, record)| -> Result<MatchRecord> {
            let record = record.validate(index)?;
            if !seen_ids.insert(record.id) {
                return Err(RatingError::InvalidMatchRecord {
                    index,
                    reason: format!("duplicate match id {}", record.id),
                }
                .into());
            }
            Ok(record)
        })
        .collect()
}

/// Anything that can hand the engine the full match history
#[cfg_attr(test, mockall::automock)]
pub trait MatchSource: Send + Sync {
    fn load(&self) -> Result<Vec<MatchRecord>>;
}

/// Match history read from a JSON array of raw records
#[derive(Debug, Clone)]
pub struct JsonFileMatchSource {
    path: PathBuf,
}

impl JsonFileMatchSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl MatchSource for JsonFileMatchSource {
    fn load(&self) -> Result<Vec<MatchRecord>> {
        let file = File::open(&self.path).map_err(|e| RatingError::SourceUnavailable {
            message: format!("{}: {e}", self.path.display()),
        })?;
        let raw: Vec<RawMatchRecord> = serde_json::from_reader(BufReader::new(file))
            .with_context(|| format!("Failed to parse match records in {}", self.path.display()))?;

        debug!("Read {} raw match records", raw.len());
        let records = validate_records(raw)?;
        info!(
            "Loaded {} match records from {}",
            records.len(),
            self.path.display()
        );
        Ok(records)
    }
}

/// Fixed, in-memory match history
#[derive(Debug, Clone, Default)]
pub struct StaticMatchSource {
    records: Vec<MatchRecord>,
}

impl StaticMatchSource {
    pub fn new(records: Vec<MatchRecord>) -> Self {
        Self { records }
    }

    /// Build from raw records, validating each one
    pub fn from_raw(raw: Vec<RawMatchRecord>) -> Result<Self> {
        Ok(Self::new(validate_records(raw)?))
    }
}

impl MatchSource for StaticMatchSource {
    fn load(&self) -> Result<Vec<MatchRecord>> {
        Ok(self.records.clone())
    }
}
