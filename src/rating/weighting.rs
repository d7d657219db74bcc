//! Adaptive K-factor
//!
//! Finishes, title matches and early stoppages move ratings more than a
//! routine decision. Multipliers stack multiplicatively on top of the base K.

use crate::config::RatingConfig;
use crate::types::{MatchRecord, MethodClass};

const FINISH_PREFIXES: [&str; 3] = ["KO", "TKO", "SUB"];

/// Classify a free-text method as a finish or a decision
///
/// Anything that does not start with KO, TKO or SUB (case-insensitive) is a
/// decision, including disqualifications, empty strings and methods with
/// leading whitespace.
pub fn classify_method(method: &str) -> MethodClass {
    let method = method.to_uppercase();
    if FINISH_PREFIXES
        .iter()
        .any(|prefix| method.starts_with(prefix))
    {
        MethodClass::Finish
    } else {
        MethodClass::Decision
    }
}

/// Computes the weighting factor of a match
#[derive(Debug, Clone)]
pub struct WeightingPolicy {
    config: RatingConfig,
}

impl WeightingPolicy {
    pub fn new(config: RatingConfig) -> Self {
        Self { config }
    }

    /// Weighting factor for a match ending by `method`, optionally a title fight
    /// and optionally finished in `finish_round`
    pub fn weighting_factor(
        &self,
        method: &str,
        title_match: bool,
        finish_round: Option<u32>,
    ) -> f64 {
        let mut k = self.config.base_k;
        let is_finish = classify_method(method) == MethodClass::Finish;

        if is_finish {
            k *= self.config.finish_multiplier;
        }

        if title_match {
            k *= self.config.title_multiplier;
        }

        if let (true, Some(round)) = (is_finish, finish_round) {
            k *= self.round_multiplier(round);
        }

        k
    }

    /// Weighting factor for a validated match record
    pub fn for_match(&self, record: &MatchRecord) -> f64 {
        self.weighting_factor(&record.method, record.title_match, record.finish_round)
    }

    /// Round decay: 1.3 in round 1, falling by 0.1 per round down to 1.0
    fn round_multiplier(&self, round: u32) -> f64 {
        let rounds_after_first = f64::from(round.saturating_sub(1));
        (self.config.round_decay_start - self.config.round_decay_step * rounds_after_first)
            .max(self.config.round_decay_floor)
    }
}

impl Default for WeightingPolicy {
    fn default() -> Self {
        Self::new(RatingConfig::default())
    }
}
