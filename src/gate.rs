//! Completion gate.
//!
//! Task status moves freely between `todo`, `in_progress` and `done`, with
//! one guard: a task may not enter `done` while any dependency is unmet.

use chrono::{DateTime, Utc};

use crate::deps::{self, TaskIndex};
use crate::error::{Error, Result};
use crate::model::{Task, TaskStatus};

/// What a status change did to a task.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    Unchanged,
    Completed,
    Reopened,
    Moved,
}

/// Fail with [`Error::Blocked`] if `task` cannot enter `done` right now.
///
/// `index` is the task's goal scope; blockers are listed by title.
pub fn ensure_can_complete(task: &Task, index: &TaskIndex<'_>) -> Result<()> {
    let blockers = deps::blocking_tasks(task, index);
    if blockers.is_empty() {
        return Ok(());
    }
    tracing::debug!(
        task = %task.id,
        blockers = blockers.len(),
        "completion rejected by unmet dependencies"
    );
    Err(Error::Blocked {
        task: task.id.clone(),
        blockers: blockers.into_iter().map(|b| b.title).collect(),
    })
}

/// Move `task` to `next`, guarding entry into `done`.
///
/// `completed_at` is stamped only the first time the task is completed and
/// survives reopening; use [`clear_completed_at`] to reset it.
pub fn transition(
    task: &mut Task,
    next: TaskStatus,
    index: &TaskIndex<'_>,
    now: DateTime<Utc>,
) -> Result<Transition> {
    let current = task.status;
    if current == next {
        return Ok(Transition::Unchanged);
    }

    if next.is_done() {
        ensure_can_complete(task, index)?;
        if task.completed_at.is_none() {
            task.completed_at = Some(now);
        }
    }

    task.status = next;
    task.updated_at = now;

    Ok(match (current.is_done(), next.is_done()) {
        (false, true) => Transition::Completed,
        (true, false) => Transition::Reopened,
        _ => Transition::Moved,
    })
}

pub fn clear_completed_at(task: &mut Task) {
    task.completed_at = None;
}
