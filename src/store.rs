//! Record store for goals and tasks.
//!
//! The engine talks to storage only through [`Store`]: point lookups,
//! filtered queries, single-record writes, and a [`Store::transaction`]
//! scope that either applies every write of a multi-step sequence or none.

use std::collections::BTreeMap;

use chrono::{NaiveDate, Utc};

use crate::error::{Error, Result};
use crate::lock::{FileLock, DEFAULT_LOCK_TIMEOUT_MS};
use crate::model::{Goal, Task};
use crate::storage::{Storage, StoreSnapshot, STORE_SCHEMA_VERSION};

pub trait Store {
    fn goal(&self, id: &str) -> Result<Option<Goal>>;
    fn goals(&self) -> Result<Vec<Goal>>;
    fn insert_goal(&mut self, goal: Goal) -> Result<()>;
    fn update_goal(&mut self, goal: Goal) -> Result<()>;
    fn delete_goal(&mut self, id: &str) -> Result<bool>;

    fn task(&self, id: &str) -> Result<Option<Task>>;
    /// Every task, ordered by id.
    fn tasks(&self) -> Result<Vec<Task>>;
    fn insert_task(&mut self, task: Task) -> Result<()>;
    fn update_task(&mut self, task: Task) -> Result<()>;
    fn delete_task(&mut self, id: &str) -> Result<bool>;

    /// Run `f` as one unit: on `Err` no write made inside `f` survives.
    fn transaction<T, F>(&mut self, f: F) -> Result<T>
    where
        Self: Sized,
        F: FnOnce(&mut Self) -> Result<T>;

    /// Tasks owned by `goal_id`; `None` selects standalone tasks.
    fn tasks_for_goal(&self, goal_id: Option<&str>) -> Result<Vec<Task>> {
        Ok(self
            .tasks()?
            .into_iter()
            .filter(|task| task.in_scope(goal_id))
            .collect())
    }

    /// Direct children of `parent_id`.
    fn children_of(&self, parent_id: &str) -> Result<Vec<Task>> {
        Ok(self
            .tasks()?
            .into_iter()
            .filter(|task| task.parent_task_id.as_deref() == Some(parent_id))
            .collect())
    }

    /// Tasks whose `completion_date` falls in `from..=to`.
    fn tasks_completed_between(&self, from: NaiveDate, to: NaiveDate) -> Result<Vec<Task>> {
        Ok(self
            .tasks()?
            .into_iter()
            .filter(|task| {
                task.completion_date
                    .map(|date| date >= from && date <= to)
                    .unwrap_or(false)
            })
            .collect())
    }

    fn count_tasks_for_goal(&self, goal_id: &str) -> Result<usize> {
        Ok(self.tasks_for_goal(Some(goal_id))?.len())
    }
}

/// Keyed record maps shared by both store implementations
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Records {
    goals: BTreeMap<String, Goal>,
    tasks: BTreeMap<String, Task>,
}

impl Records {
    pub fn from_snapshot(snapshot: StoreSnapshot) -> Self {
        Self {
            goals: snapshot
                .goals
                .into_iter()
                .map(|goal| (goal.id.clone(), goal))
                .collect(),
            tasks: snapshot
                .tasks
                .into_iter()
                .map(|task| (task.id.clone(), task))
                .collect(),
        }
    }

    pub fn to_snapshot(&self) -> StoreSnapshot {
        StoreSnapshot {
            schema_version: STORE_SCHEMA_VERSION.to_string(),
            generated_at: Utc::now(),
            goals: self.goals.values().cloned().collect(),
            tasks: self.tasks.values().cloned().collect(),
        }
    }

    fn insert_goal(&mut self, goal: Goal) -> Result<()> {
        if self.goals.contains_key(&goal.id) {
            return Err(Error::Validation(format!("goal already exists: {}", goal.id)));
        }
        self.goals.insert(goal.id.clone(), goal);
        Ok(())
    }

    fn update_goal(&mut self, goal: Goal) -> Result<()> {
        let slot = self
            .goals
            .get_mut(&goal.id)
            .ok_or_else(|| Error::GoalNotFound(goal.id.clone()))?;
        *slot = goal;
        Ok(())
    }

    fn insert_task(&mut self, task: Task) -> Result<()> {
        if self.tasks.contains_key(&task.id) {
            return Err(Error::Validation(format!("task already exists: {}", task.id)));
        }
        self.tasks.insert(task.id.clone(), task);
        Ok(())
    }

    fn update_task(&mut self, task: Task) -> Result<()> {
        let slot = self
            .tasks
            .get_mut(&task.id)
            .ok_or_else(|| Error::TaskNotFound(task.id.clone()))?;
        *slot = task;
        Ok(())
    }
}

/// In-process store; rollback restores a clone taken at transaction start.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    records: Records,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_snapshot(snapshot: StoreSnapshot) -> Self {
        Self {
            records: Records::from_snapshot(snapshot),
        }
    }
}

impl Store for MemoryStore {
    fn goal(&self, id: &str) -> Result<Option<Goal>> {
        Ok(self.records.goals.get(id).cloned())
    }

    fn goals(&self) -> Result<Vec<Goal>> {
        Ok(self.records.goals.values().cloned().collect())
    }

    fn insert_goal(&mut self, goal: Goal) -> Result<()> {
        self.records.insert_goal(goal)
    }

    fn update_goal(&mut self, goal: Goal) -> Result<()> {
        self.records.update_goal(goal)
    }

    fn delete_goal(&mut self, id: &str) -> Result<bool> {
        Ok(self.records.goals.remove(id).is_some())
    }

    fn task(&self, id: &str) -> Result<Option<Task>> {
        Ok(self.records.tasks.get(id).cloned())
    }

    fn tasks(&self) -> Result<Vec<Task>> {
        Ok(self.records.tasks.values().cloned().collect())
    }

    fn insert_task(&mut self, task: Task) -> Result<()> {
        self.records.insert_task(task)
    }

    fn update_task(&mut self, task: Task) -> Result<()> {
        self.records.update_task(task)
    }

    fn delete_task(&mut self, id: &str) -> Result<bool> {
        Ok(self.records.tasks.remove(id).is_some())
    }

    fn transaction<T, F>(&mut self, f: F) -> Result<T>
    where
        F: FnOnce(&mut Self) -> Result<T>,
    {
        let backup = self.records.clone();
        match f(self) {
            Ok(value) => Ok(value),
            Err(err) => {
                tracing::debug!(error = %err, "rolling back memory store transaction");
                self.records = backup;
                Err(err)
            }
        }
    }
}

/// Store backed by the JSON snapshot on disk.
///
/// Outside a transaction each write is its own lock, reload, apply, write
/// cycle. Inside a transaction the lock is held throughout and the snapshot
/// is written once when the closure succeeds.
#[derive(Debug)]
pub struct FileStore {
    storage: Storage,
    records: Records,
    lock_timeout_ms: u64,
    in_transaction: bool,
    dirty: bool,
}

impl FileStore {
    pub fn open(storage: Storage) -> Result<Self> {
        Self::open_with_timeout(storage, DEFAULT_LOCK_TIMEOUT_MS)
    }

    pub fn open_with_timeout(storage: Storage, lock_timeout_ms: u64) -> Result<Self> {
        let records = Records::from_snapshot(storage.read_snapshot()?);
        Ok(Self {
            storage,
            records,
            lock_timeout_ms,
            in_transaction: false,
            dirty: false,
        })
    }

    pub fn storage(&self) -> &Storage {
        &self.storage
    }

    /// Re-read the snapshot, discarding in-memory state.
    pub fn reload(&mut self) -> Result<()> {
        self.records = Records::from_snapshot(self.storage.read_snapshot()?);
        Ok(())
    }

    fn write_through<T, F>(&mut self, apply: F) -> Result<T>
    where
        F: FnOnce(&mut Records) -> Result<T>,
    {
        if self.in_transaction {
            let value = apply(&mut self.records)?;
            self.dirty = true;
            return Ok(value);
        }

        let _lock = FileLock::acquire(self.storage.lock_path(), self.lock_timeout_ms)?;
        self.reload()?;
        let value = apply(&mut self.records)?;
        self.storage.write_snapshot(&self.records.to_snapshot())?;
        Ok(value)
    }
}

impl Store for FileStore {
    fn goal(&self, id: &str) -> Result<Option<Goal>> {
        Ok(self.records.goals.get(id).cloned())
    }

    fn goals(&self) -> Result<Vec<Goal>> {
        Ok(self.records.goals.values().cloned().collect())
    }

    fn insert_goal(&mut self, goal: Goal) -> Result<()> {
        self.write_through(|records| records.insert_goal(goal))
    }

    fn update_goal(&mut self, goal: Goal) -> Result<()> {
        self.write_through(|records| records.update_goal(goal))
    }

    fn delete_goal(&mut self, id: &str) -> Result<bool> {
        self.write_through(|records| Ok(records.goals.remove(id).is_some()))
    }

    fn task(&self, id: &str) -> Result<Option<Task>> {
        Ok(self.records.tasks.get(id).cloned())
    }

    fn tasks(&self) -> Result<Vec<Task>> {
        Ok(self.records.tasks.values().cloned().collect())
    }

    fn insert_task(&mut self, task: Task) -> Result<()> {
        self.write_through(|records| records.insert_task(task))
    }

    fn update_task(&mut self, task: Task) -> Result<()> {
        self.write_through(|records| records.update_task(task))
    }

    fn delete_task(&mut self, id: &str) -> Result<bool> {
        self.write_through(|records| Ok(records.tasks.remove(id).is_some()))
    }

    fn transaction<T, F>(&mut self, f: F) -> Result<T>
    where
        F: FnOnce(&mut Self) -> Result<T>,
    {
        if self.in_transaction {
            return f(self);
        }

        let _lock = FileLock::acquire(self.storage.lock_path(), self.lock_timeout_ms)?;
        self.reload()?;
        let backup = self.records.clone();
        self.in_transaction = true;
        self.dirty = false;
        let result = f(self);
        self.in_transaction = false;

        let outcome = match result {
            Ok(value) if self.dirty => self
                .storage
                .write_snapshot(&self.records.to_snapshot())
                .map(|()| value),
            Ok(value) => Ok(value),
            Err(err) => Err(err),
        };
        self.dirty = false;

        if let Err(err) = &outcome {
            tracing::warn!(error = %err, "store transaction rolled back");
            self.records = backup;
        }
        outcome
    }
}
