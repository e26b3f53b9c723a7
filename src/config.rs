//! Configuration loading and management
//!
//! Handles parsing of `.goaltrack.toml` configuration files.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::daily::MAX_HISTORY_DAYS;
use crate::error::{Error, Result};
use crate::lock::DEFAULT_LOCK_TIMEOUT_MS;
use crate::model::{Difficulty, Priority, DEFAULT_ESTIMATED_SESSIONS};
use crate::storage::{DATA_DIR, STORE_FILE};

/// File name looked up in the working directory
pub const CONFIG_FILE: &str = ".goaltrack.toml";

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Config {
    /// Store location and locking
    #[serde(default)]
    pub store: StoreConfig,

    /// Defaults applied to new tasks
    #[serde(default)]
    pub tasks: TasksConfig,

    /// Daily tracker settings
    #[serde(default)]
    pub daily: DailyConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StoreConfig {
    /// Snapshot path, relative to the config file's directory
    #[serde(default = "default_store_path")]
    pub path: PathBuf,

    /// How long to wait for the store lock
    #[serde(default = "default_lock_timeout_ms")]
    pub lock_timeout_ms: u64,
}

fn default_store_path() -> PathBuf {
    PathBuf::from(DATA_DIR).join(STORE_FILE)
}

fn default_lock_timeout_ms() -> u64 {
    DEFAULT_LOCK_TIMEOUT_MS
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            path: default_store_path(),
            lock_timeout_ms: default_lock_timeout_ms(),
        }
    }
}

/// Tasks configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TasksConfig {
    #[serde(default)]
    pub default_priority: Priority,

    #[serde(default)]
    pub default_difficulty: Difficulty,

    #[serde(default = "default_estimated_sessions")]
    pub default_estimated_sessions: u32,

    /// Whether `task list` shows done tasks unless told otherwise
    #[serde(default = "default_true")]
    pub include_completed: bool,
}

fn default_estimated_sessions() -> u32 {
    DEFAULT_ESTIMATED_SESSIONS
}

fn default_true() -> bool {
    true
}

impl Default for TasksConfig {
    fn default() -> Self {
        Self {
            default_priority: Priority::default(),
            default_difficulty: Difficulty::default(),
            default_estimated_sessions: default_estimated_sessions(),
            include_completed: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DailyConfig {
    /// Days covered by `daily history` when `--days` is not given
    #[serde(default = "default_history_days")]
    pub history_days: u32,
}

fn default_history_days() -> u32 {
    7
}

impl Default for DailyConfig {
    fn default() -> Self {
        Self {
            history_days: default_history_days(),
        }
    }
}

impl Config {
    /// Load configuration from a `.goaltrack.toml` file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load `.goaltrack.toml` from `dir`, or return defaults when absent
    pub fn load_from_dir(dir: &Path) -> Result<Self> {
        let config_path = dir.join(CONFIG_FILE);
        if config_path.exists() {
            Self::load(&config_path)
        } else {
            Ok(Self::default())
        }
    }

    /// Save configuration to a file
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if self.store.path.as_os_str().is_empty() {
            return Err(Error::InvalidConfig(
                "store.path cannot be empty".to_string(),
            ));
        }
        if self.store.lock_timeout_ms == 0 {
            return Err(Error::InvalidConfig(
                "store.lock_timeout_ms must be > 0".to_string(),
            ));
        }
        if self.tasks.default_estimated_sessions == 0 {
            return Err(Error::InvalidConfig(
                "tasks.default_estimated_sessions must be >= 1".to_string(),
            ));
        }
        if self.daily.history_days == 0 || self.daily.history_days > MAX_HISTORY_DAYS {
            return Err(Error::InvalidConfig(format!(
                "daily.history_days must be between 1 and {MAX_HISTORY_DAYS}"
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn defaults_are_expected() {
        let cfg = Config::default();
        assert_eq!(cfg.store.path, PathBuf::from(".goaltrack/store.json"));
        assert_eq!(cfg.store.lock_timeout_ms, 5000);
        assert_eq!(cfg.tasks.default_priority, Priority::Medium);
        assert_eq!(cfg.tasks.default_difficulty, Difficulty::Medium);
        assert_eq!(cfg.tasks.default_estimated_sessions, 1);
        assert!(cfg.tasks.include_completed);
        assert_eq!(cfg.daily.history_days, 7);
        cfg.validate().expect("defaults validate");
    }

    #[test]
    fn load_parses_overrides() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join(CONFIG_FILE);
        let content = r#"
[store]
path = "data/goals.json"
lock_timeout_ms = 250

[tasks]
default_priority = "high"
default_difficulty = "hard"
default_estimated_sessions = 3
include_completed = false

[daily]
history_days = 30
"#;
        fs::write(&path, content.trim()).expect("write config");

        let cfg = Config::load(&path).expect("load config");
        assert_eq!(cfg.store.path, PathBuf::from("data/goals.json"));
        assert_eq!(cfg.store.lock_timeout_ms, 250);
        assert_eq!(cfg.tasks.default_priority, Priority::High);
        assert_eq!(cfg.tasks.default_difficulty, Difficulty::Hard);
        assert_eq!(cfg.tasks.default_estimated_sessions, 3);
        assert!(!cfg.tasks.include_completed);
        assert_eq!(cfg.daily.history_days, 30);
    }

    #[test]
    fn invalid_values_rejected() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join(CONFIG_FILE);
        for content in [
            "[store]\nlock_timeout_ms = 0",
            "[tasks]\ndefault_estimated_sessions = 0",
            "[daily]\nhistory_days = 400",
        ] {
            fs::write(&path, content).expect("write config");
            let err = Config::load(&path).expect_err("invalid config");
            match err {
                Error::InvalidConfig(_) => {}
                other => panic!("unexpected error: {other:?}"),
            }
        }
    }

    #[test]
    fn unknown_priority_is_a_parse_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join(CONFIG_FILE);
        fs::write(&path, "[tasks]\ndefault_priority = \"urgent\"").expect("write config");
        let err = Config::load(&path).expect_err("bad priority");
        assert!(matches!(err, Error::TomlParse(_)));
    }

    #[test]
    fn load_from_dir_defaults_when_missing() {
        let dir = tempfile::tempdir().expect("tempdir");
        let cfg = Config::load_from_dir(dir.path()).expect("defaults");
        assert_eq!(cfg, Config::default());
    }

    #[test]
    fn save_round_trips() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("out.toml");
        let mut cfg = Config::default();
        cfg.daily.history_days = 14;
        cfg.save(&path).expect("save config");

        let written = fs::read_to_string(&path).expect("read config");
        assert!(written.contains("history_days = 14"));
        assert_eq!(Config::load(&path).expect("reload"), cfg);
    }
}
