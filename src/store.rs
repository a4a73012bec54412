//! Score Store
//!
//! JSON persistence for the question bank and the leaderboard. Leaderboard
//! writes go to a sibling temp file that atomically replaces the target, so
//! a crash mid-write never leaves a truncated leaderboard behind.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, warn};

use crate::config::PathsConfig;
use crate::game::leaderboard::ScoreEntry;
use crate::game::quiz::Question;

/// Persistence errors.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Filesystem failure.
    #[error("I/O error on {path}: {source}")]
    Io {
        /// File involved.
        path: PathBuf,
        /// Underlying error.
        source: std::io::Error,
    },

    /// Serialization failure.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Deserialize)]
struct QuestionFile {
    #[serde(default)]
    questions: Vec<Value>,
}

#[derive(Deserialize)]
struct LeaderboardFile {
    #[serde(default)]
    scores: Vec<Value>,
}

#[derive(Serialize)]
struct LeaderboardFileRef<'a> {
    scores: &'a [ScoreEntry],
}

#[derive(Serialize)]
struct LeaderboardRows<'a> {
    scores: &'a [Value],
}

/// Reads the question bank and reads/writes the leaderboard.
#[derive(Debug, Clone)]
pub struct ScoreStore {
    questions_path: PathBuf,
    leaderboard_path: PathBuf,
}

impl ScoreStore {
    /// Store over explicit file paths.
    pub fn new(questions_path: impl Into<PathBuf>, leaderboard_path: impl Into<PathBuf>) -> Self {
        Self {
            questions_path: questions_path.into(),
            leaderboard_path: leaderboard_path.into(),
        }
    }

    /// Store over the configured paths.
    pub fn from_config(paths: &PathsConfig) -> Self {
        Self::new(&paths.questions_file, &paths.leaderboard_file)
    }

    /// Question bank location.
    pub fn questions_path(&self) -> &Path {
        &self.questions_path
    }

    /// Leaderboard location.
    pub fn leaderboard_path(&self) -> &Path {
        &self.leaderboard_path
    }

    /// Load the question bank.
    ///
    /// A missing or malformed file yields an empty bank. Individual questions
    /// that fail validation are skipped.
    pub fn load_questions(&self) -> Vec<Question> {
        let Some(file) = read_json::<QuestionFile>(&self.questions_path) else {
            return Vec::new();
        };

        let mut bank = Vec::with_capacity(file.questions.len());
        for (i, raw) in file.questions.into_iter().enumerate() {
            match serde_json::from_value::<Question>(raw) {
                Ok(q) => match q.validate() {
                    Ok(()) => bank.push(q),
                    Err(e) => warn!("Skipping question #{}: {}", i, e),
                },
                Err(e) => warn!("Skipping question #{}: {}", i, e),
            }
        }
        debug!("Loaded {} questions from {}", bank.len(), self.questions_path.display());
        bank
    }

    /// Load every persisted score. Missing or malformed file yields none.
    ///
    /// Rows that do not parse as a [`ScoreEntry`] are skipped here but stay
    /// in the file.
    pub fn load_leaderboard(&self) -> Vec<ScoreEntry> {
        typed_entries(&self.load_rows())
    }

    fn load_rows(&self) -> Vec<Value> {
        read_json::<LeaderboardFile>(&self.leaderboard_path)
            .map(|file| file.scores)
            .unwrap_or_default()
    }

    /// Replace the leaderboard file with `scores`.
    ///
    /// Writes `<file>.tmp`, flushes it, then renames it over the target. On
    /// failure the temp file is removed and the old leaderboard is untouched.
    pub fn save_leaderboard(&self, scores: &[ScoreEntry]) -> Result<(), StoreError> {
        let target = &self.leaderboard_path;
        let temp = temp_sibling(target);

        let result = write_then_replace(&temp, target, &LeaderboardFileRef { scores });
        if result.is_err() && temp.exists() {
            if let Err(e) = fs::remove_file(&temp) {
                warn!("Could not remove {}: {}", temp.display(), e);
            }
        }
        result
    }

    /// Append one entry and persist. Returns every readable entry, new one included.
    ///
    /// Existing rows are written back as they were read, so rows this build
    /// cannot parse are never dropped from the file.
    pub fn append_score(&self, entry: ScoreEntry) -> Result<Vec<ScoreEntry>, StoreError> {
        let mut rows = self.load_rows();
        rows.push(serde_json::to_value(&entry)?);

        let target = &self.leaderboard_path;
        let temp = temp_sibling(target);
        let result = write_then_replace(&temp, target, &LeaderboardRows { scores: &rows });
        if result.is_err() && temp.exists() {
            if let Err(e) = fs::remove_file(&temp) {
                warn!("Could not remove {}: {}", temp.display(), e);
            }
        }
        result?;
        Ok(typed_entries(&rows))
    }
}

fn typed_entries(rows: &[Value]) -> Vec<ScoreEntry> {
    rows.iter()
        .enumerate()
        .filter_map(|(i, raw)| match ScoreEntry::deserialize(raw) {
            Ok(entry) => Some(entry),
            Err(e) => {
                warn!("Skipping leaderboard entry #{}: {}", i, e);
                None
            }
        })
        .collect()
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Option<T> {
    let text = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(e) => {
            warn!("Could not read {}: {}", path.display(), e);
            return None;
        }
    };
    match serde_json::from_str(&text) {
        Ok(value) => Some(value),
        Err(e) => {
            warn!("Could not parse {}: {}", path.display(), e);
            None
        }
    }
}

fn temp_sibling(target: &Path) -> PathBuf {
    let mut name = target.as_os_str().to_os_string();
    name.push(".tmp");
    PathBuf::from(name)
}

fn write_then_replace<T: Serialize>(temp: &Path, target: &Path, value: &T) -> Result<(), StoreError> {
    let io_err = |path: &Path| {
        let path = path.to_path_buf();
        move |source| StoreError::Io { path, source }
    };

    if let Some(parent) = target.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(io_err(parent))?;
    }

    let json = serde_json::to_vec_pretty(value)?;
    let mut file = fs::File::create(temp).map_err(io_err(temp))?;
    file.write_all(&json).map_err(io_err(temp))?;
    file.sync_all().map_err(io_err(temp))?;
    drop(file);

    fs::rename(temp, target).map_err(io_err(target))
}

#[cfg(test)]
pub(crate) fn scratch_dir(tag: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("stand-game-{}-{}", tag, uuid::Uuid::new_v4()));
    fs::create_dir_all(&dir).unwrap();
    dir
}
