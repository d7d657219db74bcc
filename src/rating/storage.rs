//! Rating storage interface and implementations
//!
//! A store holds exactly one rating snapshot: the history and standings of
//! the latest successful replay. Replacing it is atomic, so readers see
//! either the previous snapshot or the new one and never a partial write.

use crate::error::{RatingError, Result};
use crate::rating::replay::ReplayOutput;
use crate::types::{HistoryEntry, ReplaySummary, Standing};
use anyhow::Context;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};
use tempfile::NamedTempFile;
use tracing::{debug, info};
use uuid::Uuid;

/// The persisted result of one replay run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RatingSnapshot {
    /// Unique identifier of the run that produced this snapshot
    pub run_id: Uuid,
    pub computed_at: DateTime<Utc>,
    pub summary: ReplaySummary,
    pub history: Vec<HistoryEntry>,
    pub standings: Vec<Standing>,
}

impl RatingSnapshot {
    /// Stamp a replay result with a fresh run id
    pub fn new(output: ReplayOutput) -> Self {
        Self {
            run_id: Uuid::new_v4(),
            computed_at: Utc::now(),
            summary: output.summary,
            history: output.history,
            standings: output.standings,
        }
    }

    /// Current standing of a competitor in a track, if they have one
    pub fn standing(&self, competitor: &str, track: &str) -> Option<&Standing> {
        self.standings
            .iter()
            .find(|s| s.competitor == competitor && s.track == track)
    }
}

/// Trait for rating storage operations
#[cfg_attr(test, mockall::automock)]
pub trait RatingStore: Send + Sync {
    /// Atomically replace the stored snapshot
    fn replace(&self, snapshot: RatingSnapshot) -> Result<()>;

    /// The stored snapshot, or `None` if no replay has completed yet
    fn current(&self) -> Result<Option<Arc<RatingSnapshot>>>;
}

/// In-memory rating store
#[derive(Debug, Default)]
pub struct InMemoryRatingStore {
    snapshot: RwLock<Option<Arc<RatingSnapshot>>>,
}

impl InMemoryRatingStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl RatingStore for InMemoryRatingStore {
    fn replace(&self, snapshot: RatingSnapshot) -> Result<()> {
        let snapshot = Arc::new(snapshot);
        let mut current = self
            .snapshot
            .write()
            .map_err(|_| RatingError::StorageError {
                message: "Failed to acquire snapshot write lock".to_string(),
            })?;

        debug!("Swapping in snapshot {}", snapshot.run_id);
        *current = Some(snapshot);
        Ok(())
    }

    fn current(&self) -> Result<Option<Arc<RatingSnapshot>>> {
        let current = self
            .snapshot
            .read()
            .map_err(|_| RatingError::StorageError {
                message: "Failed to acquire snapshot read lock".to_string(),
            })?;

        Ok(current.clone())
    }
}

/// Rating store backed by a single JSON file
///
/// Each snapshot is written to its own uniquely named file next to the live
/// one and renamed over it, so concurrent writers never share a staging file.
#[derive(Debug, Clone)]
pub struct JsonFileRatingStore {
    path: PathBuf,
}

impl JsonFileRatingStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Directory the staging file must live in for the rename to stay atomic
    fn staging_dir(&self) -> &Path {
        match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        }
    }
}

impl RatingStore for JsonFileRatingStore {
    fn replace(&self, snapshot: RatingSnapshot) -> Result<()> {
        let staging_dir = self.staging_dir();
        let staging = NamedTempFile::new_in(staging_dir).with_context(|| {
            format!("Failed to create staging file in {}", staging_dir.display())
        })?;

        let mut writer = BufWriter::new(staging);
        serde_json::to_writer(&mut writer, &snapshot).map_err(|e| RatingError::StorageError {
            message: format!("Failed to serialize snapshot: {e}"),
        })?;
        writer.flush()?;
        let staging = writer.into_inner().map_err(|e| RatingError::StorageError {
            message: format!("Failed to flush snapshot: {e}"),
        })?;
        staging.as_file().sync_all()?;

        staging
            .persist(&self.path)
            .map_err(|e| RatingError::StorageError {
                message: format!("Failed to move snapshot over {}: {e}", self.path.display()),
            })?;

        info!(
            "Stored snapshot {} at {} ({} history rows, {} standings)",
            snapshot.run_id,
            self.path.display(),
            snapshot.history.len(),
            snapshot.standings.len()
        );
        Ok(())
    }

    fn current(&self) -> Result<Option<Arc<RatingSnapshot>>> {
        if !self.path.exists() {
            return Ok(None);
        }

        let file = File::open(&self.path)
            .with_context(|| format!("Failed to open {}", self.path.display()))?;
        let snapshot: RatingSnapshot =
            serde_json::from_reader(BufReader::new(file)).map_err(|e| {
                RatingError::StorageError {
                    message: format!("Corrupt snapshot {}: {e}", self.path.display()),
                }
            })?;

        Ok(Some(Arc::new(snapshot)))
    }
}
