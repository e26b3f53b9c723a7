//! Storage layer for goaltrack
//!
//! All records live in one JSON snapshot next to a lock file:
//!
//! ```text
//! .goaltrack/
//!   store.json      # {schema_version, generated_at, goals[], tasks[]}
//!   store.lock      # advisory lock held across read-modify-write
//! ```
//!
//! The location defaults to the working directory; `--global` switches to
//! the per-user data directory.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use directories::ProjectDirs;
use serde::{de::DeserializeOwned, Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::lock;
use crate::model::{Goal, Task};

/// Name of the directory holding the store
pub const DATA_DIR: &str = ".goaltrack";

/// File name of the snapshot inside the data directory
pub const STORE_FILE: &str = "store.json";

pub const STORE_SCHEMA_VERSION: &str = "goaltrack.store.v1";

/// On-disk document holding every goal and task
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreSnapshot {
    pub schema_version: String,
    pub generated_at: DateTime<Utc>,
    #[serde(default)]
    pub goals: Vec<Goal>,
    #[serde(default)]
    pub tasks: Vec<Task>,
}

impl StoreSnapshot {
    pub fn empty() -> Self {
        Self {
            schema_version: STORE_SCHEMA_VERSION.to_string(),
            generated_at: Utc::now(),
            goals: Vec::new(),
            tasks: Vec::new(),
        }
    }

    fn validate(&self) -> Result<()> {
        if self.schema_version != STORE_SCHEMA_VERSION {
            return Err(Error::OperationFailed(format!(
                "unsupported store schema '{}' (expected {})",
                self.schema_version, STORE_SCHEMA_VERSION
            )));
        }
        Ok(())
    }
}

/// Paths and file I/O for the snapshot
#[derive(Debug, Clone)]
pub struct Storage {
    store_path: PathBuf,
}

impl Storage {
    /// Storage rooted at an explicit snapshot path
    pub fn new(store_path: PathBuf) -> Self {
        Self { store_path }
    }

    /// Storage under `<dir>/.goaltrack/store.json`
    pub fn in_dir(dir: &Path) -> Self {
        Self::new(dir.join(DATA_DIR).join(STORE_FILE))
    }

    /// Storage in the per-user data directory
    pub fn global() -> Result<Self> {
        let dirs = ProjectDirs::from("", "", "goaltrack").ok_or_else(|| {
            Error::OperationFailed("no home directory available for --global".to_string())
        })?;
        Ok(Self::new(dirs.data_dir().join(STORE_FILE)))
    }

    pub fn store_path(&self) -> &Path {
        &self.store_path
    }

    pub fn lock_path(&self) -> PathBuf {
        self.store_path.with_extension("lock")
    }

    pub fn is_initialized(&self) -> bool {
        self.store_path.exists()
    }

    /// Create the data directory and an empty snapshot if none exists.
    /// Returns true when a new snapshot was written.
    pub fn init(&self) -> Result<bool> {
        if let Some(parent) = self.store_path.parent() {
            fs::create_dir_all(parent)?;
        }
        if self.is_initialized() {
            return Ok(false);
        }
        self.write_snapshot(&StoreSnapshot::empty())?;
        Ok(true)
    }

    /// Read the snapshot; a missing file reads as empty.
    pub fn read_snapshot(&self) -> Result<StoreSnapshot> {
        if !self.is_initialized() {
            return Ok(StoreSnapshot::empty());
        }
        let snapshot: StoreSnapshot = self.read_json(&self.store_path)?;
        snapshot.validate()?;
        Ok(snapshot)
    }

    /// Write the snapshot atomically. Callers hold the store lock.
    pub fn write_snapshot(&self, snapshot: &StoreSnapshot) -> Result<()> {
        self.write_json(&self.store_path, snapshot)
    }

    pub fn write_json<T: Serialize>(&self, path: &Path, data: &T) -> Result<()> {
        let json = serde_json::to_string_pretty(data)?;
        lock::write_atomic(path, json.as_bytes())
    }

    pub fn read_json<T: DeserializeOwned>(&self, path: &Path) -> Result<T> {
        let content = fs::read_to_string(path)?;
        let data: T = serde_json::from_str(&content)?;
        Ok(data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn init_writes_empty_snapshot_once() {
        let dir = tempdir().expect("tempdir");
        let storage = Storage::in_dir(dir.path());
        assert!(!storage.is_initialized());

        assert!(storage.init().expect("init"));
        assert!(!storage.init().expect("second init"));

        let snapshot = storage.read_snapshot().expect("read");
        assert_eq!(snapshot.schema_version, STORE_SCHEMA_VERSION);
        assert!(snapshot.goals.is_empty());
        assert!(snapshot.tasks.is_empty());
        assert_eq!(
            storage.lock_path(),
            dir.path().join(DATA_DIR).join("store.lock")
        );
    }

    #[test]
    fn missing_snapshot_reads_empty() {
        let dir = tempdir().expect("tempdir");
        let storage = Storage::in_dir(dir.path());
        let snapshot = storage.read_snapshot().expect("read");
        assert!(snapshot.tasks.is_empty());
    }

    #[test]
    fn unknown_schema_is_rejected() {
        let dir = tempdir().expect("tempdir");
        let storage = Storage::in_dir(dir.path());
        let mut snapshot = StoreSnapshot::empty();
        snapshot.schema_version = "other.v9".to_string();
        storage.write_snapshot(&snapshot).expect("write");

        let err = storage.read_snapshot().expect_err("schema");
        assert!(matches!(err, Error::OperationFailed(_)));
    }
}
