//! Record identifiers.
//!
//! Ids are a kind prefix plus a lowercase ULID (`g-01h…` for goals,
//! `t-01h…` for tasks). Callers may refer to a record by any unique prefix
//! of the ULID part, with or without the kind prefix.

use ulid::Ulid;

use crate::error::{Error, Result};

pub const GOAL_PREFIX: &str = "g";
pub const TASK_PREFIX: &str = "t";
const ID_DELIMS: [char; 2] = ['-', '/'];

pub fn new_goal_id() -> String {
    format!("{}-{}", GOAL_PREFIX, Ulid::new().to_string().to_lowercase())
}

pub fn new_task_id() -> String {
    format!("{}-{}", TASK_PREFIX, Ulid::new().to_string().to_lowercase())
}

fn normalize_id(value: &str) -> String {
    value.trim().to_ascii_lowercase()
}

fn suffix_from_id(id_norm: &str) -> &str {
    match id_norm.find(ID_DELIMS) {
        Some(idx) => &id_norm[idx + 1..],
        None => id_norm,
    }
}

/// Resolve user input against a set of known ids.
///
/// An exact id or exact suffix wins; otherwise the input must be a prefix
/// of exactly one suffix. `not_found` builds the error for zero matches.
pub fn resolve<'a, I, F>(input: &str, known: I, not_found: F) -> Result<String>
where
    I: IntoIterator<Item = &'a str>,
    F: FnOnce(String) -> Error,
{
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(Error::Validation("id cannot be empty".to_string()));
    }

    let input_norm = normalize_id(trimmed);
    let candidate = suffix_from_id(&input_norm).to_string();
    if candidate.is_empty() {
        return Err(Error::Validation("id cannot be empty".to_string()));
    }

    let mut exact = Vec::new();
    let mut matches = Vec::new();
    for id in known {
        let id_norm = normalize_id(id);
        let suffix = suffix_from_id(&id_norm);
        if id_norm == input_norm || suffix == input_norm {
            exact.push(id.to_string());
        } else if suffix.starts_with(&candidate) {
            matches.push(id.to_string());
        }
    }

    if exact.len() == 1 {
        return Ok(exact.remove(0));
    }
    if exact.len() > 1 {
        return Err(Error::AmbiguousId {
            input: trimmed.to_string(),
            matches: exact,
        });
    }

    matches.sort();
    matches.dedup();
    match matches.len() {
        0 => Err(not_found(trimmed.to_string())),
        1 => Ok(matches.remove(0)),
        _ => Err(Error::AmbiguousId {
            input: trimmed.to_string(),
            matches,
        }),
    }
}
