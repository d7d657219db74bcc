//! Test fixtures and helper implementations for integration testing

#![allow(dead_code)]

use chrono::NaiveDate;
use fightrank::error::Result;
use fightrank::rating::{RatingSnapshot, RatingStore};
use fightrank::source::RawMatchRecord;
use fightrank::types::{MatchOutcome, MatchRecord};
use std::sync::{Arc, Mutex};

/// Builder for validated match records
#[derive(Debug, Clone)]
pub struct MatchBuilder {
    record: MatchRecord,
}

impl MatchBuilder {
    pub fn new(id: u64, date: &str, a: &str, b: &str) -> Self {
        Self {
            record: MatchRecord {
                id,
                event_name: format!("Event {id}"),
                date: NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap(),
                competitor_a: a.to_string(),
                competitor_b: b.to_string(),
                outcome: MatchOutcome::AWins,
                category: "Lightweight".to_string(),
                title_match: false,
                method: "U-DEC".to_string(),
                method_detail: None,
                finish_round: None,
                finish_time: None,
            },
        }
    }

    pub fn outcome(mut self, outcome: MatchOutcome) -> Self {
        self.record.outcome = outcome;
        self
    }

    pub fn category(mut self, category: &str) -> Self {
        self.record.category = category.to_string();
        self
    }

    pub fn title(mut self) -> Self {
        self.record.title_match = true;
        self
    }

    pub fn finish(mut self, method: &str, round: Option<u32>) -> Self {
        self.record.method = method.to_string();
        self.record.finish_round = round;
        self
    }

    pub fn build(self) -> MatchRecord {
        self.record
    }
}

/// Raw record as the scraper would emit it
pub fn raw_record(date: &str, a: &str, b: &str, result: &str, class: &str) -> RawMatchRecord {
    RawMatchRecord {
        event_name: "UFC Fight Night".to_string(),
        event_date: date.to_string(),
        fighter_a: a.to_string(),
        fighter_b: b.to_string(),
        result: result.to_string(),
        weight_class: Some(class.to_string()),
        method: Some("U-DEC".to_string()),
        ..RawMatchRecord::default()
    }
}

/// Store that keeps every snapshot it was handed
#[derive(Debug, Default)]
pub struct RecordingStore {
    replaced: Mutex<Vec<Arc<RatingSnapshot>>>,
}

impl RecordingStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn replace_count(&self) -> usize {
        self.replaced.lock().map(|r| r.len()).unwrap_or_default()
    }
}

impl RatingStore for RecordingStore {
    fn replace(&self, snapshot: RatingSnapshot) -> Result<()> {
        if let Ok(mut replaced) = self.replaced.lock() {
            replaced.push(Arc::new(snapshot));
        }
        Ok(())
    }

    fn current(&self) -> Result<Option<Arc<RatingSnapshot>>> {
        Ok(self
            .replaced
            .lock()
            .ok()
            .and_then(|replaced| replaced.last().cloned()))
    }
}

/// Assert two ratings agree to within a small tolerance
pub fn assert_rating(actual: f64, expected: f64) {
    assert!(
        (actual - expected).abs() < 1e-2,
        "expected rating {expected}, got {actual}"
    );
}
