//! High Score Persistence
//!
//! A tiny key-value capability scoped to this game: read and write one
//! integer. Callers treat any read failure as "no high score yet".

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use chrono::{DateTime, Utc};
use serde::{Serialize, Deserialize};

/// Storage errors.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Filesystem failure.
    #[error("Storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Stored data is not a valid record.
    #[error("Corrupt high score record: {0}")]
    Corrupt(#[from] serde_json::Error),

    /// Shared in-memory cell was poisoned.
    #[error("Store lock poisoned")]
    Poisoned,
}

/// Persistent high score.
///
/// The engine calls these synchronously, once at construction and at most
/// once per game over. Under a [`GameSession`](crate::session::GameSession)
/// they run on the session task, so implementations must stay quick.
pub trait HighScoreStore: Send {
    /// Read the stored score. `Ok(None)` when nothing was stored yet.
    fn load(&self) -> Result<Option<u32>, StoreError>;

    /// Overwrite the stored score.
    fn save(&mut self, score: u32) -> Result<(), StoreError>;
}

// =============================================================================
// IN-MEMORY STORE
// =============================================================================

/// Process-local store. Clones share the same cell.
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    value: Arc<Mutex<Option<u32>>>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store holding `score`.
    pub fn with_score(score: u32) -> Self {
        Self {
            value: Arc::new(Mutex::new(Some(score))),
        }
    }
}

impl HighScoreStore for MemoryStore {
    fn load(&self) -> Result<Option<u32>, StoreError> {
        self.value.lock().map(|v| *v).map_err(|_| StoreError::Poisoned)
    }

    fn save(&mut self, score: u32) -> Result<(), StoreError> {
        let mut value = self.value.lock().map_err(|_| StoreError::Poisoned)?;
        *value = Some(score);
        Ok(())
    }
}

// =============================================================================
// JSON FILE STORE
// =============================================================================

/// On-disk record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HighScoreRecord {
    /// Best score
    pub high_score: u32,
    /// When it was set
    pub updated_at: DateTime<Utc>,
}

/// Store backed by a small JSON file; survives process restarts.
///
/// Uses blocking `std::fs` calls. A save is one write plus one rename of a
/// file under a hundred bytes, which briefly blocks the session task it
/// runs on.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    /// Use `path` for the record. The file is created on first save.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Location of the record.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the full record, including its timestamp.
    pub fn load_record(&self) -> Result<Option<HighScoreRecord>, StoreError> {
        let text = match std::fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        let record = serde_json::from_str(&text)?;
        Ok(Some(record))
    }
}

impl HighScoreStore for JsonFileStore {
    fn load(&self) -> Result<Option<u32>, StoreError> {
        Ok(self.load_record()?.map(|r| r.high_score))
    }

    fn save(&mut self, score: u32) -> Result<(), StoreError> {
        let record = HighScoreRecord {
            high_score: score,
            updated_at: Utc::now(),
        };
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        // Atomic replace
        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, serde_json::to_vec_pretty(&record)?)?;
        std::fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}
