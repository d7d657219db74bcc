//! Main application configuration
//!
//! This module defines the primary configuration structures for fightrank,
//! including environment variable loading, TOML files and validation.

use crate::config::RatingConfig;
use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::{Path, PathBuf};

/// Main application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub service: ServiceSettings,
    pub storage: StorageSettings,
    pub rating: RatingConfig,
}

/// Service-level settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceSettings {
    /// Service name for logging and metrics
    pub name: String,
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,
}

/// Where match records are read from and rating snapshots are written to
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageSettings {
    /// JSON file of raw match records
    pub matches_path: PathBuf,
    /// JSON file holding the current rating snapshot
    pub snapshot_path: PathBuf,
}

impl Default for ServiceSettings {
    fn default() -> Self {
        Self {
            name: "fightrank".to_string(),
            log_level: "info".to_string(),
        }
    }
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self {
            matches_path: PathBuf::from("matches.json"),
            snapshot_path: PathBuf::from("ratings.json"),
        }
    }
}

impl AppConfig {
    /// Load configuration from environment variables with fallback to defaults
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();
        config.apply_env()?;
        validate_config(&config)?;
        Ok(config)
    }

    /// Load configuration from a TOML file; environment variables still override it
    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let mut config: AppConfig = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;
        config.apply_env()?;
        validate_config(&config)?;
        Ok(config)
    }

    fn apply_env(&mut self) -> Result<()> {
        // Service settings
        if let Ok(name) = env::var("SERVICE_NAME") {
            self.service.name = name;
        }
        if let Ok(log_level) = env::var("LOG_LEVEL") {
            self.service.log_level = log_level;
        }

        // Storage settings
        if let Ok(path) = env::var("MATCHES_PATH") {
            self.storage.matches_path = PathBuf::from(path);
        }
        if let Ok(path) = env::var("SNAPSHOT_PATH") {
            self.storage.snapshot_path = PathBuf::from(path);
        }

        // Rating settings
        if let Ok(base_k) = env::var("BASE_K") {
            self.rating.base_k = base_k
                .parse()
                .map_err(|_| anyhow!("Invalid BASE_K value: {}", base_k))?;
        }
        if let Ok(initial) = env::var("INITIAL_RATING") {
            self.rating.initial_rating = initial
                .parse()
                .map_err(|_| anyhow!("Invalid INITIAL_RATING value: {}", initial))?;
        }
        if let Ok(track) = env::var("UNIVERSAL_TRACK") {
            self.rating.universal_track = track;
        }

        Ok(())
    }
}

/// Validate configuration values
pub fn validate_config(config: &AppConfig) -> Result<()> {
    match config.service.log_level.to_lowercase().as_str() {
        "trace" | "debug" | "info" | "warn" | "error" => {}
        _ => return Err(anyhow!("Invalid log level: {}", config.service.log_level)),
    }

    if config.storage.matches_path.as_os_str().is_empty() {
        return Err(anyhow!("Matches path cannot be empty"));
    }
    if config.storage.snapshot_path.as_os_str().is_empty() {
        return Err(anyhow!("Snapshot path cannot be empty"));
    }

    config.rating.validate()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = AppConfig::default();
        assert_eq!(config.service.log_level, "info");
        assert_eq!(config.storage.snapshot_path, PathBuf::from("ratings.json"));
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_invalid_log_level() {
        let mut config = AppConfig::default();
        config.service.log_level = "loud".to_string();
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_invalid_rating_section_is_rejected() {
        let mut config = AppConfig::default();
        config.rating.base_k = -4.0;
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_from_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("fightrank.toml");
        std::fs::write(
            &path,
            r#"
[storage]
matches_path = "data/fights.json"

[rating]
base_k = 40.0
universal_track = "p4p"
"#,
        )
        .unwrap();

        let config = AppConfig::from_file(&path).unwrap();
        assert_eq!(config.storage.matches_path, PathBuf::from("data/fights.json"));
        assert_eq!(config.storage.snapshot_path, PathBuf::from("ratings.json"));
        assert_eq!(config.rating.universal_track, "p4p");
        assert_eq!(config.service.name, "fightrank");
    }

    #[test]
    fn test_from_file_missing() {
        let result = AppConfig::from_file(Path::new("/definitely/not/here.toml"));
        assert!(result.is_err());
    }
}
