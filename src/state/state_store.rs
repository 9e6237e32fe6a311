//! Durable alert state.
//!
//! Four independent JSON records under the state directory:
//! - `seen_goals.json`   goal identity keys already alerted (sorted list)
//! - `score_state.json`  `{fixture_id: {home, away}}` last seen scoreline
//! - `seen_corners.json` `{fixture_id: {home, away}}` last seen corner counts
//! - `meta.json`         `{"loop": n}` cycle sequence number
//!
//! Loading is per-record tolerant: a missing or unreadable record becomes its
//! empty default and never blocks the others. Saving overwrites each record
//! through a temp file and a rename.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, warn};

use crate::data::models::{CornerCount, GoalKey, Score};

const SEEN_GOALS_FILE: &str = "seen_goals.json";
const SCORE_STATE_FILE: &str = "score_state.json";
const CORNERS_FILE: &str = "seen_corners.json";
const META_FILE: &str = "meta.json";

#[derive(Error, Debug)]
pub enum StateError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}

// =============================================================================
// State types
// =============================================================================

/// Cycle sequence number. Bumped once per load.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CycleMeta {
    #[serde(rename = "loop", default)]
    pub loop_count: u64,
}

/// Everything the alert logic remembers between runs.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AlertState {
    pub seen_goals: BTreeSet<String>,
    pub scores: BTreeMap<String, Score>,
    pub corners: BTreeMap<String, CornerCount>,
    pub meta: CycleMeta,
}

impl AlertState {
    #[cfg(test)]
    pub fn is_seen(&self, key: &GoalKey) -> bool {
        self.seen_goals.contains(&key.to_string())
    }

    /// Record a goal key. Returns `true` only the first time.
    pub fn mark_seen(&mut self, key: &GoalKey) -> bool {
        self.seen_goals.insert(key.to_string())
    }

    pub fn score(&self, fixture_id: i64) -> Option<Score> {
        self.scores.get(&fixture_id.to_string()).copied()
    }

    pub fn set_score(&mut self, fixture_id: i64, score: Score) {
        self.scores.insert(fixture_id.to_string(), score);
    }

    pub fn corners(&self, fixture_id: i64) -> Option<CornerCount> {
        self.corners.get(&fixture_id.to_string()).copied()
    }

    pub fn set_corners(&mut self, fixture_id: i64, corners: CornerCount) {
        self.corners.insert(fixture_id.to_string(), corners);
    }
}

// =============================================================================
// State Store
// =============================================================================

/// File-backed store for `AlertState`.
#[derive(Debug, Clone)]
pub struct StateStore {
    dir: PathBuf,
}

impl StateStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Load all records and advance the cycle counter by one.
    pub fn load(&self) -> AlertState {
        let mut meta: CycleMeta = load_or_default(&self.dir.join(META_FILE));
        meta.loop_count += 1;

        AlertState {
            seen_goals: load_or_default(&self.dir.join(SEEN_GOALS_FILE)),
            scores: load_or_default(&self.dir.join(SCORE_STATE_FILE)),
            corners: load_or_default(&self.dir.join(CORNERS_FILE)),
            meta,
        }
    }

    /// Persist only the cycle counter.
    pub fn save_meta(&self, meta: &CycleMeta) -> Result<(), StateError> {
        write_atomic(&self.dir.join(META_FILE), meta)
    }

    /// Overwrite every record. Each write is attempted even if an earlier
    /// one failed; the last failure is returned.
    pub fn save(&self, state: &AlertState) -> Result<(), StateError> {
        let results = [
            write_atomic(&self.dir.join(SEEN_GOALS_FILE), &state.seen_goals),
            write_atomic(&self.dir.join(SCORE_STATE_FILE), &state.scores),
            write_atomic(&self.dir.join(CORNERS_FILE), &state.corners),
            write_atomic(&self.dir.join(META_FILE), &state.meta),
        ];

        let mut outcome = Ok(());
        for result in results {
            if let Err(e) = result {
                warn!(error = %e, "State record write failed");
                outcome = Err(e);
            }
        }
        outcome
    }
}

// =============================================================================
// Helpers
// =============================================================================

fn load_or_default<T: DeserializeOwned + Default>(path: &Path) -> T {
    let text = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return T::default(),
        Err(e) => {
            warn!(path = %path.display(), error = %e, "Unreadable state record, starting empty");
            return T::default();
        }
    };

    match serde_json::from_str(&text) {
        Ok(value) => value,
        Err(e) => {
            warn!(path = %path.display(), error = %e, "Corrupt state record, starting empty");
            T::default()
        }
    }
}

/// Write to `<path>.tmp`, fsync, then rename over `path`.
fn write_atomic<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<(), StateError> {
    let io_err = |source| StateError::Io {
        path: path.display().to_string(),
        source,
    };

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(io_err)?;
    }

    let data = serde_json::to_vec(value)?;
    let temp_path = path.with_extension("json.tmp");

    {
        let mut file = File::create(&temp_path).map_err(io_err)?;
        file.write_all(&data).map_err(io_err)?;
        file.sync_all().map_err(io_err)?;
    }

    fs::rename(&temp_path, path).map_err(io_err)?;

    debug!(path = %path.display(), bytes = data.len(), "State record saved");
    Ok(())
}

// =============================================================================
// Tests
// =============================================================================
