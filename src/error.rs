//! Error types for goaltrack
//!
//! Exit codes:
//! - 0: Success
//! - 2: User error (bad input, unknown goal or task)
//! - 3: Blocked by a rule (unmet dependencies, cycles, invalid nesting)
//! - 4: Operation failed (store I/O, lock contention)

use std::path::PathBuf;
use thiserror::Error;

/// Exit codes for the gt CLI
pub mod exit_codes {
    pub const SUCCESS: i32 = 0;
    pub const USER_ERROR: i32 = 2;
    pub const RULE_BLOCKED: i32 = 3;
    pub const OPERATION_FAILED: i32 = 4;
}

/// Main error type for goaltrack operations
#[derive(Error, Debug)]
pub enum Error {
    // User errors (exit code 2)
    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Goal not found: {0}")]
    GoalNotFound(String),

    #[error("Task not found: {0}")]
    TaskNotFound(String),

    #[error("Ambiguous id '{input}': {}", .matches.join(", "))]
    AmbiguousId { input: String, matches: Vec<String> },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // Rule blocks (exit code 3)
    #[error("Task {task} is blocked by: {}", .blockers.join(", "))]
    Blocked { task: String, blockers: Vec<String> },

    #[error("Dependency on {via} would create a cycle for task {task}")]
    DependencyCycle { task: String, via: String },

    #[error("Invalid parent: {0}")]
    InvalidParent(String),

    // Operation failures (exit code 4)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    #[error("Lock acquisition failed: {0}")]
    LockFailed(PathBuf),

    #[error("Operation failed: {0}")]
    OperationFailed(String),
}

impl Error {
    /// Get the exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            // User errors
            Error::Validation(_)
            | Error::GoalNotFound(_)
            | Error::TaskNotFound(_)
            | Error::AmbiguousId { .. }
            | Error::InvalidConfig(_) => exit_codes::USER_ERROR,

            // Rule blocks
            Error::Blocked { .. } | Error::DependencyCycle { .. } | Error::InvalidParent(_) => {
                exit_codes::RULE_BLOCKED
            }

            // Operation failures
            Error::Io(_)
            | Error::Json(_)
            | Error::TomlParse(_)
            | Error::TomlSerialize(_)
            | Error::LockFailed(_)
            | Error::OperationFailed(_) => exit_codes::OPERATION_FAILED,
        }
    }

    /// Whether this error means the referenced record does not exist
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::GoalNotFound(_) | Error::TaskNotFound(_))
    }

    /// Structured details for JSON error output
    pub fn details(&self) -> Option<serde_json::Value> {
        match self {
            Error::Blocked { task, blockers } => Some(serde_json::json!({
                "task": task,
                "blockers": blockers,
            })),
            Error::DependencyCycle { task, via } => Some(serde_json::json!({
                "task": task,
                "via": via,
            })),
            Error::AmbiguousId { input, matches } => Some(serde_json::json!({
                "input": input,
                "matches": matches,
            })),
            Error::GoalNotFound(id) => Some(serde_json::json!({ "goal": id })),
            Error::TaskNotFound(id) => Some(serde_json::json!({ "task": id })),
            Error::Validation(message) | Error::InvalidConfig(message) => {
                Some(serde_json::json!({ "message": message }))
            }
            Error::LockFailed(path) => Some(serde_json::json!({
                "path": path.to_string_lossy(),
            })),
            _ => None,
        }
    }
}

/// Result type alias for goaltrack operations
pub type Result<T> = std::result::Result<T, Error>;

/// Wrapper for displaying errors in JSON format
#[derive(serde::Serialize)]
pub struct JsonError {
    pub error: String,
    pub code: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl From<&Error> for JsonError {
    fn from(err: &Error) -> Self {
        JsonError {
            error: err.to_string(),
            code: err.exit_code(),
            details: err.details(),
        }
    }
}
