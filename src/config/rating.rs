//! Rating system configuration

use crate::error::{RatingError, Result};
use serde::{Deserialize, Serialize};

/// Tuning for the weighting policy and replay defaults
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RatingConfig {
    /// Weighting factor of a non-title decision
    pub base_k: f64,
    /// Rating seeded for a competitor the first time they appear in a track
    pub initial_rating: f64,
    pub finish_multiplier: f64,
    pub title_multiplier: f64,
    /// Round-decay multiplier of a first-round finish
    pub round_decay_start: f64,
    /// Decay per additional round
    pub round_decay_step: f64,
    /// Lower bound of the round-decay multiplier
    pub round_decay_floor: f64,
    /// Name of the cross-category track
    pub universal_track: String,
    /// Track used for records without a category label
    pub fallback_category: String,
}

impl Default for RatingConfig {
    fn default() -> Self {
        Self {
            base_k: 32.0,
            initial_rating: 1500.0,
            finish_multiplier: 1.5,
            title_multiplier: 1.25,
            round_decay_start: 1.3,
            round_decay_step: 0.1,
            round_decay_floor: 1.0,
            universal_track: "unified".to_string(),
            fallback_category: "Unknown".to_string(),
        }
    }
}

impl RatingConfig {
    /// Validate configuration parameters
    pub fn validate(&self) -> Result<()> {
        let positive = [
            ("Base K", self.base_k),
            ("Finish multiplier", self.finish_multiplier),
            ("Title multiplier", self.title_multiplier),
            ("Round decay start", self.round_decay_start),
            ("Round decay floor", self.round_decay_floor),
        ];
        for (name, value) in positive {
            if !(value.is_finite() && value > 0.0) {
                return Err(RatingError::ConfigurationError {
                    message: format!("{name} must be positive, got {value}"),
                }
                .into());
            }
        }

        if !(self.round_decay_step.is_finite() && self.round_decay_step >= 0.0) {
            return Err(RatingError::ConfigurationError {
                message: "Round decay step must be non-negative".to_string(),
            }
            .into());
        }

        if !self.initial_rating.is_finite() {
            return Err(RatingError::ConfigurationError {
                message: "Initial rating must be finite".to_string(),
            }
            .into());
        }

        if self.universal_track.trim().is_empty() {
            return Err(RatingError::ConfigurationError {
                message: "Universal track name cannot be empty".to_string(),
            }
            .into());
        }

        if self.fallback_category.trim().is_empty() {
            return Err(RatingError::ConfigurationError {
                message: "Fallback category cannot be empty".to_string(),
            }
            .into());
        }

        if self.fallback_category == self.universal_track {
            return Err(RatingError::ConfigurationError {
                message: "Fallback category must differ from the universal track".to_string(),
            }
            .into());
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rating_config_default() {
        let config = RatingConfig::default();
        assert_eq!(config.base_k, 32.0);
        assert_eq!(config.initial_rating, 1500.0);
        assert_eq!(config.universal_track, "unified");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_rating_config_validation() {
        let mut config = RatingConfig::default();
        config.base_k = 0.0;
        assert!(config.validate().is_err());

        config = RatingConfig::default();
        config.round_decay_step = -0.1;
        assert!(config.validate().is_err());

        config = RatingConfig::default();
        config.initial_rating = f64::NAN;
        assert!(config.validate().is_err());

        config = RatingConfig::default();
        config.universal_track = "  ".to_string();
        assert!(config.validate().is_err());

        config = RatingConfig::default();
        config.fallback_category = "unified".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config: RatingConfig = toml::from_str("base_k = 24.0").unwrap();
        assert_eq!(config.base_k, 24.0);
        assert_eq!(config.title_multiplier, 1.25);
    }
}
