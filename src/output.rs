//! Output for gt commands.
//!
//! With `--json` every invocation prints exactly one pretty-printed
//! envelope on stdout:
//!
//! ```text
//! {schema_version, command, status: "success", data, warnings?, next_steps?}
//! {schema_version, command, status: "error", error: {message, code, kind, details?}, next_steps?}
//! ```
//!
//! Otherwise commands render a [`HumanOutput`]: a header line followed by
//! optional summary, detail, warning and next-step sections.

use std::fmt;

use serde::Serialize;

use crate::error::{exit_codes, Error, Result};

pub const SCHEMA_VERSION: &str = "goaltrack.v1";

#[derive(Debug, Clone, Copy, Default)]
pub struct OutputOptions {
    pub json: bool,
    pub quiet: bool,
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
enum Status {
    Success,
    Error,
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    UserError,
    RuleBlocked,
    OperationFailed,
}

impl ErrorKind {
    pub fn of(err: &Error) -> Self {
        match err.exit_code() {
            exit_codes::USER_ERROR => ErrorKind::UserError,
            exit_codes::RULE_BLOCKED => ErrorKind::RuleBlocked,
            _ => ErrorKind::OperationFailed,
        }
    }
}

#[derive(Serialize)]
struct ErrorBody {
    message: String,
    code: i32,
    kind: ErrorKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<serde_json::Value>,
}

#[derive(Serialize)]
struct Envelope<'a, T: Serialize> {
    schema_version: &'static str,
    command: &'a str,
    status: Status,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<&'a T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<ErrorBody>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    warnings: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    next_steps: Vec<String>,
}

impl<'a, T: Serialize> Envelope<'a, T> {
    fn print(&self) -> Result<()> {
        println!("{}", serde_json::to_string_pretty(self)?);
        Ok(())
    }
}

/// Human-readable result of one command
#[derive(Debug, Clone)]
pub struct HumanOutput {
    header: String,
    summary: Vec<(String, String)>,
    details: Vec<String>,
    warnings: Vec<String>,
    next_steps: Vec<String>,
}

impl HumanOutput {
    pub fn new(header: impl Into<String>) -> Self {
        Self {
            header: header.into(),
            summary: Vec::new(),
            details: Vec::new(),
            warnings: Vec::new(),
            next_steps: Vec::new(),
        }
    }

    /// Add a `key: value` line; an empty value prints the key alone.
    pub fn push_summary(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.summary.push((key.into(), value.into()));
    }

    pub fn push_detail(&mut self, value: impl Into<String>) {
        self.details.push(value.into());
    }

    pub fn push_warning(&mut self, value: impl Into<String>) {
        self.warnings.push(value.into());
    }

    pub fn push_next_step(&mut self, value: impl Into<String>) {
        self.next_steps.push(value.into());
    }
}

impl fmt::Display for HumanOutput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.header)?;

        if !self.summary.is_empty() {
            f.write_str("\n\nSummary:")?;
            for (key, value) in &self.summary {
                if value.is_empty() {
                    write!(f, "\n- {key}")?;
                } else {
                    write!(f, "\n- {key}: {value}")?;
                }
            }
        }

        for (title, items) in [
            ("Details", &self.details),
            ("Warnings", &self.warnings),
            ("Next steps", &self.next_steps),
        ] {
            if items.is_empty() {
                continue;
            }
            write!(f, "\n\n{title}:")?;
            for item in items {
                write!(f, "\n- {item}")?;
            }
        }
        Ok(())
    }
}

/// Print a successful result in the mode selected by `options`.
pub fn emit_success<T: Serialize>(
    options: OutputOptions,
    command: &str,
    data: &T,
    human: Option<&HumanOutput>,
) -> Result<()> {
    if options.json {
        return Envelope {
            schema_version: SCHEMA_VERSION,
            command,
            status: Status::Success,
            data: Some(data),
            error: None,
            warnings: human.map(|h| h.warnings.clone()).unwrap_or_default(),
            next_steps: human.map(|h| h.next_steps.clone()).unwrap_or_default(),
        }
        .print();
    }

    if options.quiet {
        return Ok(());
    }
    if let Some(human) = human {
        println!("{human}");
    }
    Ok(())
}

/// Report a failed command: a JSON envelope on stdout, or `error:` and
/// `hint:` lines on stderr.
pub fn emit_error(command: &str, err: &Error, json: bool) -> Result<()> {
    let next_steps = recovery_steps(err);
    if json {
        return Envelope::<()> {
            schema_version: SCHEMA_VERSION,
            command,
            status: Status::Error,
            data: None,
            error: Some(ErrorBody {
                message: err.to_string(),
                code: err.exit_code(),
                kind: ErrorKind::of(err),
                details: err.details(),
            }),
            warnings: Vec::new(),
            next_steps,
        }
        .print();
    }

    eprintln!("error: {err}");
    if let Some(step) = next_steps.first() {
        eprintln!("hint: {step}");
    }
    Ok(())
}

fn recovery_steps(err: &Error) -> Vec<String> {
    match err {
        Error::Blocked { .. } => vec!["finish the blocking tasks first, then retry".to_string()],
        Error::DependencyCycle { task, .. } => vec![format!("gt task show {task}")],
        Error::InvalidParent(_) => vec!["gt task update <id> --root".to_string()],
        Error::GoalNotFound(_) => vec!["gt goal list".to_string()],
        Error::TaskNotFound(_) => vec!["gt task list".to_string()],
        Error::AmbiguousId { .. } => vec!["use a longer id prefix".to_string()],
        Error::InvalidConfig(_) => vec!["fix .goaltrack.toml then retry".to_string()],
        Error::LockFailed(_) => vec!["retry once the other gt process finishes".to_string()],
        _ => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_kind_follows_exit_code() {
        let blocked = Error::Blocked {
            task: "t-1".to_string(),
            blockers: vec!["Buy paint".to_string()],
        };
        assert_eq!(ErrorKind::of(&blocked), ErrorKind::RuleBlocked);
        assert_eq!(
            ErrorKind::of(&Error::TaskNotFound("t-2".to_string())),
            ErrorKind::UserError
        );
        assert_eq!(
            ErrorKind::of(&Error::OperationFailed("disk".to_string())),
            ErrorKind::OperationFailed
        );
    }

    #[test]
    fn error_envelope_has_no_data() {
        let envelope = Envelope::<()> {
            schema_version: SCHEMA_VERSION,
            command: "task done",
            status: Status::Error,
            data: None,
            error: Some(ErrorBody {
                message: "blocked".to_string(),
                code: 3,
                kind: ErrorKind::RuleBlocked,
                details: None,
            }),
            warnings: Vec::new(),
            next_steps: recovery_steps(&Error::GoalNotFound("g-1".to_string())),
        };
        let value = serde_json::to_value(&envelope).expect("serialize");
        assert_eq!(value["status"], "error");
        assert_eq!(value["error"]["kind"], "rule_blocked");
        assert_eq!(value["next_steps"][0], "gt goal list");
        assert!(value.get("data").is_none());
        assert!(value.get("warnings").is_none());
    }
}
