//! Goal and task operations.
//!
//! [`Engine`] is the single entry point for callers. Every mutation runs in
//! one [`Store::transaction`], ends with [`on_task_mutated`] for the goal it
//! touched, and records domain events only once the transaction committed.

use std::collections::{BTreeSet, HashSet};

use chrono::{Duration, NaiveDate, Utc};
use serde::Serialize;

use crate::config::TasksConfig;
use crate::daily::{self, DailyCompletion, DailyScope, DailyView};
use crate::deps;
use crate::error::{Error, Result};
use crate::events::{Event, EventKind};
use crate::gate::{self, Transition};
use crate::hierarchy;
use crate::ids;
use crate::model::{
    Difficulty, Goal, GoalStatus, Priority, Task, TaskStatus, TaskView, DEFAULT_ESTIMATED_SESSIONS,
};
use crate::progress::{self, Counts};
use crate::store::Store;

/// Values applied to new tasks when the caller leaves them out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TaskDefaults {
    pub priority: Priority,
    pub difficulty: Difficulty,
    pub estimated_sessions: u32,
}

impl Default for TaskDefaults {
    fn default() -> Self {
        Self {
            priority: Priority::default(),
            difficulty: Difficulty::default(),
            estimated_sessions: DEFAULT_ESTIMATED_SESSIONS,
        }
    }
}

impl From<&TasksConfig> for TaskDefaults {
    fn from(config: &TasksConfig) -> Self {
        Self {
            priority: config.default_priority,
            difficulty: config.default_difficulty,
            estimated_sessions: config.default_estimated_sessions,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct NewGoal {
    pub title: String,
    pub description: Option<String>,
    pub category: Option<String>,
    pub target_date: Option<NaiveDate>,
    pub status: Option<GoalStatus>,
}

impl NewGoal {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }
}

/// Partial goal update. `Some(None)` clears an optional field.
#[derive(Debug, Clone, Default)]
pub struct GoalPatch {
    pub title: Option<String>,
    pub description: Option<Option<String>>,
    pub category: Option<Option<String>>,
    pub target_date: Option<Option<NaiveDate>>,
    pub status: Option<GoalStatus>,
    /// Direct override; replaced on the next task mutation.
    pub progress: Option<u8>,
}

#[derive(Debug, Clone, Default)]
pub struct NewTask {
    pub title: String,
    pub description: Option<String>,
    pub goal_id: Option<String>,
    pub parent_task_id: Option<String>,
    pub depends_on: BTreeSet<String>,
    pub status: Option<TaskStatus>,
    pub priority: Option<Priority>,
    pub difficulty: Option<Difficulty>,
    pub due_date: Option<NaiveDate>,
    pub estimated_sessions: Option<u32>,
    pub order_index: Option<i64>,
    pub completion_date: Option<NaiveDate>,
    pub tags: Vec<String>,
}

impl NewTask {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }

    pub fn in_goal(mut self, goal_id: impl Into<String>) -> Self {
        self.goal_id = Some(goal_id.into());
        self
    }

    pub fn under(mut self, parent_task_id: impl Into<String>) -> Self {
        self.parent_task_id = Some(parent_task_id.into());
        self
    }

    pub fn depends_on<I, T>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        self.depends_on.extend(ids.into_iter().map(Into::into));
        self
    }
}

/// Partial task update. `Some(None)` clears an optional field; a
/// `parent_task_id` of `Some(..)` moves the task.
#[derive(Debug, Clone, Default)]
pub struct TaskPatch {
    pub title: Option<String>,
    pub description: Option<Option<String>>,
    pub status: Option<TaskStatus>,
    pub priority: Option<Priority>,
    pub difficulty: Option<Difficulty>,
    pub parent_task_id: Option<Option<String>>,
    pub depends_on: Option<BTreeSet<String>>,
    pub due_date: Option<Option<NaiveDate>>,
    pub estimated_sessions: Option<u32>,
    pub order_index: Option<i64>,
    pub completion_date: Option<Option<NaiveDate>>,
    pub tags: Option<Vec<String>>,
    /// Forget the first-completion timestamp before applying `status`.
    pub clear_completed_at: bool,
}

impl TaskPatch {
    pub fn status(status: TaskStatus) -> Self {
        Self {
            status: Some(status),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReorderEntry {
    pub id: String,
    pub order_index: i64,
    /// `Some(..)` also moves the task; `Some(None)` makes it a root.
    pub parent_task_id: Option<Option<String>>,
}

/// A goal with its task counts.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct GoalSummary {
    #[serde(flatten)]
    pub goal: Goal,
    pub total_tasks: usize,
    pub done_tasks: usize,
}

/// What a task deletion removed or moved.
#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq)]
pub struct DeleteOutcome {
    /// Deleted ids, children before parents.
    pub deleted: Vec<String>,
    /// Former direct children moved up one level.
    pub reparented: Vec<String>,
    /// Tasks whose `depends_on` lost a deleted id.
    pub pruned: Vec<String>,
}

pub struct Engine<S: Store> {
    store: S,
    defaults: TaskDefaults,
    events: Vec<Event>,
}

impl<S: Store> Engine<S> {
    pub fn new(store: S) -> Self {
        Self::with_defaults(store, TaskDefaults::default())
    }

    pub fn with_defaults(store: S, defaults: TaskDefaults) -> Self {
        Self {
            store,
            defaults,
            events: Vec::new(),
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }

    /// Drain events recorded by committed mutations.
    pub fn take_events(&mut self) -> Vec<Event> {
        std::mem::take(&mut self.events)
    }

    fn commit<T, F>(&mut self, f: F) -> Result<T>
    where
        F: FnOnce(&mut S, &mut Vec<Event>) -> Result<T>,
    {
        let mut pending = Vec::new();
        let value = self.store.transaction(|store| f(store, &mut pending))?;
        self.events.append(&mut pending);
        Ok(value)
    }

    pub fn resolve_goal_id(&self, input: &str) -> Result<String> {
        let goals = self.store.goals()?;
        ids::resolve(
            input,
            goals.iter().map(|goal| goal.id.as_str()),
            Error::GoalNotFound,
        )
    }

    pub fn resolve_task_id(&self, input: &str) -> Result<String> {
        let tasks = self.store.tasks()?;
        ids::resolve(
            input,
            tasks.iter().map(|task| task.id.as_str()),
            Error::TaskNotFound,
        )
    }

    pub fn create_goal(&mut self, new: NewGoal) -> Result<Goal> {
        let title = required_title(&new.title)?;
        let now = Utc::now();
        let goal = Goal {
            id: ids::new_goal_id(),
            title,
            description: non_empty(new.description),
            category: non_empty(new.category),
            target_date: new.target_date,
            status: new.status.unwrap_or_default(),
            progress: 0,
            created_at: now,
            updated_at: now,
        };

        self.commit(|store, events| {
            store.insert_goal(goal.clone())?;
            events.push(Event::new(EventKind::GoalCreated).with_data(&goal)?);
            Ok(())
        })?;
        tracing::info!(goal = %goal.id, "goal created");
        Ok(goal)
    }

    pub fn update_goal(&mut self, goal_id: &str, patch: GoalPatch) -> Result<Goal> {
        let title = patch.title.as_deref().map(required_title).transpose()?;
        if let Some(progress) = patch.progress {
            if progress > 100 {
                return Err(Error::Validation(format!(
                    "progress must be between 0 and 100, got {progress}"
                )));
            }
        }

        self.commit(|store, events| {
            let mut goal = require_goal(store, goal_id)?;
            if let Some(title) = title {
                goal.title = title;
            }
            if let Some(description) = patch.description {
                goal.description = non_empty(description);
            }
            if let Some(category) = patch.category {
                goal.category = non_empty(category);
            }
            if let Some(target_date) = patch.target_date {
                goal.target_date = target_date;
            }
            if let Some(status) = patch.status {
                goal.status = status;
            }
            if let Some(progress) = patch.progress {
                goal.progress = progress;
            }
            goal.updated_at = Utc::now();
            store.update_goal(goal.clone())?;
            events.push(Event::new(EventKind::GoalUpdated).with_data(&goal)?);
            Ok(goal)
        })
    }

    /// Delete a goal and every task it owns. Returns the number of tasks
    /// removed.
    pub fn delete_goal(&mut self, goal_id: &str) -> Result<usize> {
        let removed = self.commit(|store, events| {
            require_goal(store, goal_id)?;
            let owned = store.tasks_for_goal(Some(goal_id))?;
            for task in &owned {
                store.delete_task(&task.id)?;
            }
            store.delete_goal(goal_id)?;
            events.push(Event::new(EventKind::GoalDeleted).with_data(serde_json::json!({
                "goal": goal_id,
                "tasks_deleted": owned.len(),
            }))?);
            Ok(owned.len())
        })?;
        tracing::info!(goal = goal_id, tasks = removed, "goal deleted");
        Ok(removed)
    }

    /// Goals ordered by creation time.
    pub fn list_goals(&self) -> Result<Vec<GoalSummary>> {
        let mut goals = self.store.goals()?;
        goals.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        goals
            .into_iter()
            .map(|goal| summarize(&self.store, goal))
            .collect()
    }

    pub fn get_goal(&self, goal_id: &str) -> Result<GoalSummary> {
        let goal = require_goal(&self.store, goal_id)?;
        summarize(&self.store, goal)
    }

    pub fn create_task(&mut self, new: NewTask) -> Result<Task> {
        let title = required_title(&new.title)?;
        let estimated_sessions = new
            .estimated_sessions
            .unwrap_or(self.defaults.estimated_sessions);
        check_sessions(estimated_sessions)?;
        let defaults = self.defaults;

        let task = self.commit(|store, events| {
            let goal_id = new.goal_id.as_deref();
            if let Some(goal_id) = goal_id {
                require_goal(store, goal_id)?;
            }
            let scope = store.tasks_for_goal(goal_id)?;
            let id = ids::new_task_id();

            if let Some(parent_id) = new.parent_task_id.as_deref() {
                check_parent(store, &id, parent_id, &scope)?;
            }
            deps::validate_dependencies(&id, &new.depends_on, &scope)?;

            let order_index = match new.order_index {
                Some(order_index) => order_index,
                None => next_order_index(&scope, new.parent_task_id.as_deref()),
            };
            let now = Utc::now();
            let mut task = Task {
                id,
                title,
                description: non_empty(new.description),
                status: TaskStatus::Todo,
                priority: new.priority.unwrap_or(defaults.priority),
                difficulty: new.difficulty.unwrap_or(defaults.difficulty),
                goal_id: new.goal_id.clone(),
                parent_task_id: new.parent_task_id.clone(),
                depends_on: new.depends_on,
                due_date: new.due_date,
                estimated_sessions,
                order_index,
                completed_at: None,
                completion_date: new.completion_date,
                tags: new.tags,
                created_at: now,
                updated_at: now,
            };
            if let Some(status) = new.status {
                gate::transition(&mut task, status, &deps::index(&scope), now)?;
            }

            store.insert_task(task.clone())?;
            events.push(Event::new(EventKind::TaskCreated).with_data(&task)?);
            on_task_mutated(store, task.goal_id.as_deref(), events)?;
            Ok(task)
        })?;
        tracing::info!(task = %task.id, goal = ?task.goal_id, "task created");
        Ok(task)
    }

    /// Task forest for `goal_id` (`None` = standalone tasks).
    pub fn list_tasks_for_goal(
        &self,
        goal_id: Option<&str>,
        include_completed: bool,
    ) -> Result<Vec<TaskView>> {
        if let Some(goal_id) = goal_id {
            require_goal(&self.store, goal_id)?;
        }
        let mut tasks = self.store.tasks_for_goal(goal_id)?;
        if !include_completed {
            tasks.retain(|task| !task.status.is_done());
        }
        Ok(hierarchy::resolve_hierarchy(tasks))
    }

    /// One task with its blocking state and subtree.
    pub fn get_task(&self, task_id: &str) -> Result<TaskView> {
        let task = require_task(&self.store, task_id)?;
        let scope = self.store.tasks_for_goal(task.goal_id.as_deref())?;
        let forest = hierarchy::resolve_hierarchy(scope.clone());
        if let Some(view) = forest.iter().find_map(|root| root.find(task_id)) {
            return Ok(view.clone());
        }

        let blocking_tasks = deps::blocking_tasks(&task, &deps::index(&scope));
        Ok(TaskView {
            task,
            is_blocked: !blocking_tasks.is_empty(),
            blocking_tasks,
            subtasks: Vec::new(),
        })
    }

    /// Apply `patch` to a task. With `goal_id` set, the task must belong
    /// to that goal.
    pub fn update_task(
        &mut self,
        goal_id: Option<&str>,
        task_id: &str,
        patch: TaskPatch,
    ) -> Result<Task> {
        let title = patch.title.as_deref().map(required_title).transpose()?;
        if let Some(sessions) = patch.estimated_sessions {
            check_sessions(sessions)?;
        }

        let task = self.commit(|store, events| {
            let mut task = require_task_in(store, goal_id, task_id)?;
            let scope = store.tasks_for_goal(task.goal_id.as_deref())?;
            let now = Utc::now();

            if let Some(parent) = &patch.parent_task_id {
                if let Some(parent_id) = parent.as_deref() {
                    check_parent(store, task_id, parent_id, &scope)?;
                }
                task.parent_task_id = parent.clone();
            }
            let depends_changed = patch.depends_on.is_some();
            if let Some(depends_on) = patch.depends_on {
                deps::validate_dependencies(task_id, &depends_on, &scope)?;
                task.depends_on = depends_on;
            }
            if let Some(title) = title {
                task.title = title;
            }
            if let Some(description) = patch.description {
                task.description = non_empty(description);
            }
            if let Some(priority) = patch.priority {
                task.priority = priority;
            }
            if let Some(difficulty) = patch.difficulty {
                task.difficulty = difficulty;
            }
            if let Some(due_date) = patch.due_date {
                task.due_date = due_date;
            }
            if let Some(sessions) = patch.estimated_sessions {
                task.estimated_sessions = sessions;
            }
            if let Some(order_index) = patch.order_index {
                task.order_index = order_index;
            }
            if let Some(completion_date) = patch.completion_date {
                task.completion_date = completion_date;
            }
            if let Some(tags) = patch.tags {
                task.tags = tags;
            }
            if patch.clear_completed_at {
                gate::clear_completed_at(&mut task);
            }

            let transition = match patch.status {
                Some(status) => gate::transition(&mut task, status, &deps::index(&scope), now)?,
                None => Transition::Unchanged,
            };
            // A done task may not take on dependencies that are still open.
            if depends_changed && task.status.is_done() {
                gate::ensure_can_complete(&task, &deps::index(&scope))?;
            }
            task.updated_at = now;

            store.update_task(task.clone())?;
            events.push(Event::new(EventKind::TaskUpdated).with_data(&task)?);
            match transition {
                Transition::Completed => events.push(task_event(EventKind::TaskCompleted, &task)?),
                Transition::Reopened => events.push(task_event(EventKind::TaskReopened, &task)?),
                Transition::Unchanged | Transition::Moved => {}
            }
            on_task_mutated(store, task.goal_id.as_deref(), events)?;
            Ok(task)
        })?;
        tracing::debug!(task = %task.id, status = %task.status, "task updated");
        Ok(task)
    }

    /// Mark a task complete for `date`, or clear its completion date when
    /// `date` is `None`. Status is left alone.
    pub fn complete_for_day(&mut self, task_id: &str, date: Option<NaiveDate>) -> Result<Task> {
        self.commit(|store, events| {
            let mut task = require_task(store, task_id)?;
            if date.is_some() {
                let scope = store.tasks_for_goal(task.goal_id.as_deref())?;
                gate::ensure_can_complete(&task, &deps::index(&scope))?;
            }
            task.completion_date = date;
            task.updated_at = Utc::now();
            store.update_task(task.clone())?;
            events.push(Event::new(EventKind::TaskCompletedForDay).with_data(
                serde_json::json!({ "task": task.id, "completion_date": date }),
            )?);
            on_task_mutated(store, task.goal_id.as_deref(), events)?;
            Ok(task)
        })
    }

    /// Delete a task.
    ///
    /// With `cascade` the whole subtree goes, deepest first. Without it only
    /// the direct children move up to the deleted task's parent; deeper
    /// descendants keep their parents. Deleted ids are pruned from the
    /// `depends_on` of the remaining tasks.
    pub fn delete_task(
        &mut self,
        goal_id: Option<&str>,
        task_id: &str,
        cascade: bool,
    ) -> Result<DeleteOutcome> {
        let outcome = self.commit(|store, events| {
            let task = require_task_in(store, goal_id, task_id)?;
            let mut outcome = DeleteOutcome::default();
            let now = Utc::now();

            if cascade {
                let mut visited = HashSet::new();
                collect_subtree(store, &task.id, &mut visited, &mut outcome.deleted)?;
                for id in &outcome.deleted {
                    store.delete_task(id)?;
                }
            } else {
                for mut child in store.children_of(&task.id)? {
                    child.parent_task_id = task.parent_task_id.clone();
                    child.updated_at = now;
                    outcome.reparented.push(child.id.clone());
                    store.update_task(child)?;
                }
                store.delete_task(&task.id)?;
                outcome.deleted.push(task.id.clone());
            }

            let removed: HashSet<&str> = outcome.deleted.iter().map(String::as_str).collect();
            for mut other in store.tasks_for_goal(task.goal_id.as_deref())? {
                let before = other.depends_on.len();
                other.depends_on.retain(|dep| !removed.contains(dep.as_str()));
                if other.depends_on.len() != before {
                    other.updated_at = now;
                    outcome.pruned.push(other.id.clone());
                    store.update_task(other)?;
                }
            }

            events.push(Event::new(EventKind::TaskDeleted).with_data(serde_json::json!({
                "task": task.id,
                "goal": task.goal_id,
                "cascade": cascade,
                "deleted": outcome.deleted,
                "reparented": outcome.reparented,
            }))?);
            on_task_mutated(store, task.goal_id.as_deref(), events)?;
            Ok(outcome)
        })?;
        tracing::info!(
            task = task_id,
            cascade,
            deleted = outcome.deleted.len(),
            reparented = outcome.reparented.len(),
            pruned = outcome.pruned.len(),
            "task deleted"
        );
        Ok(outcome)
    }

    /// Apply new order indexes (and optional moves) in entry order.
    pub fn reorder_tasks(&mut self, entries: Vec<ReorderEntry>) -> Result<usize> {
        self.commit(|store, events| {
            let mut goals: BTreeSet<Option<String>> = BTreeSet::new();
            let now = Utc::now();
            for entry in &entries {
                let mut task = require_task(store, &entry.id)?;
                if let Some(parent) = &entry.parent_task_id {
                    if let Some(parent_id) = parent.as_deref() {
                        let scope = store.tasks_for_goal(task.goal_id.as_deref())?;
                        check_parent(store, &task.id, parent_id, &scope)?;
                    }
                    task.parent_task_id = parent.clone();
                }
                task.order_index = entry.order_index;
                task.updated_at = now;
                goals.insert(task.goal_id.clone());
                store.update_task(task)?;
            }

            let moved: Vec<&str> = entries.iter().map(|entry| entry.id.as_str()).collect();
            events.push(
                Event::new(EventKind::TasksReordered)
                    .with_data(serde_json::json!({ "tasks": moved }))?,
            );
            for goal_id in &goals {
                on_task_mutated(store, goal_id.as_deref(), events)?;
            }
            Ok(entries.len())
        })
    }

    /// Recompute progress for `goal_id` outside any other mutation.
    pub fn on_task_mutated(&mut self, goal_id: Option<&str>) -> Result<()> {
        self.commit(|store, events| on_task_mutated(store, goal_id, events))
    }

    pub fn daily_view(&self, scope: &DailyScope, today: NaiveDate) -> Result<DailyView> {
        let yesterday = today
            .checked_sub_signed(Duration::days(1))
            .ok_or_else(|| Error::Validation(format!("no day before {today}")))?;
        let tasks = self.scoped_tasks(scope)?;
        Ok(daily::daily_view(tasks, today, yesterday))
    }

    pub fn completion_history(
        &self,
        scope: &DailyScope,
        days: u32,
        today: NaiveDate,
    ) -> Result<Vec<DailyCompletion>> {
        let tasks = self.scoped_tasks(scope)?;
        daily::completion_history(&tasks, days, today)
    }

    fn scoped_tasks(&self, scope: &DailyScope) -> Result<Vec<Task>> {
        if let DailyScope::Goal(goal_id) = scope {
            require_goal(&self.store, goal_id)?;
        }
        let mut tasks: Vec<Task> = self
            .store
            .tasks()?
            .into_iter()
            .filter(|task| scope.includes(task))
            .collect();
        tasks.sort_by(|a, b| {
            (a.order_index, a.created_at, &a.id).cmp(&(b.order_index, b.created_at, &b.id))
        });
        Ok(tasks)
    }
}

/// Bring a goal's progress in line with its tasks after a mutation.
///
/// Standalone tasks (`None`) and goals without tasks are left alone.
pub fn on_task_mutated<S: Store>(
    store: &mut S,
    goal_id: Option<&str>,
    events: &mut Vec<Event>,
) -> Result<()> {
    let Some(goal_id) = goal_id else {
        return Ok(());
    };
    let Some(mut goal) = store.goal(goal_id)? else {
        return Ok(());
    };
    let counts = Counts::of(&store.tasks_for_goal(Some(goal_id))?);
    if progress::recompute(&mut goal, counts, Utc::now()) {
        events.push(Event::new(EventKind::GoalProgressChanged).with_data(serde_json::json!({
            "goal": goal.id,
            "progress": goal.progress,
            "status": goal.status,
        }))?);
        store.update_goal(goal)?;
    }
    Ok(())
}

fn task_event(kind: EventKind, task: &Task) -> Result<Event> {
    Event::new(kind).with_data(serde_json::json!({
        "task": task.id,
        "goal": task.goal_id,
        "completed_at": task.completed_at,
    }))
}

fn summarize<S: Store>(store: &S, goal: Goal) -> Result<GoalSummary> {
    let counts = Counts::of(&store.tasks_for_goal(Some(goal.id.as_str()))?);
    Ok(GoalSummary {
        goal,
        total_tasks: counts.total,
        done_tasks: counts.done,
    })
}

fn require_goal<S: Store>(store: &S, goal_id: &str) -> Result<Goal> {
    store
        .goal(goal_id)?
        .ok_or_else(|| Error::GoalNotFound(goal_id.to_string()))
}

fn require_task<S: Store>(store: &S, task_id: &str) -> Result<Task> {
    store
        .task(task_id)?
        .ok_or_else(|| Error::TaskNotFound(task_id.to_string()))
}

/// Look up a task, treating one outside `goal_id` as missing.
fn require_task_in<S: Store>(store: &S, goal_id: Option<&str>, task_id: &str) -> Result<Task> {
    let task = require_task(store, task_id)?;
    match goal_id {
        Some(goal_id) if task.goal_id.as_deref() != Some(goal_id) => {
            Err(Error::TaskNotFound(task_id.to_string()))
        }
        _ => Ok(task),
    }
}

fn check_parent<S: Store>(store: &S, task_id: &str, parent_id: &str, scope: &[Task]) -> Result<()> {
    if !scope.iter().any(|task| task.id == parent_id) {
        require_task(store, parent_id)?;
    }
    hierarchy::validate_parent(task_id, parent_id, scope)
}

fn next_order_index(scope: &[Task], parent_id: Option<&str>) -> i64 {
    scope
        .iter()
        .filter(|task| task.parent_task_id.as_deref() == parent_id)
        .map(|task| task.order_index)
        .max()
        .map_or(0, |max| max + 1)
}

/// Post-order walk: every descendant lands in `out` before its parent.
fn collect_subtree<S: Store>(
    store: &S,
    task_id: &str,
    visited: &mut HashSet<String>,
    out: &mut Vec<String>,
) -> Result<()> {
    if !visited.insert(task_id.to_string()) {
        return Ok(());
    }
    for child in store.children_of(task_id)? {
        collect_subtree(store, &child.id, visited, out)?;
    }
    out.push(task_id.to_string());
    Ok(())
}

fn required_title(raw: &str) -> Result<String> {
    let title = raw.trim();
    if title.is_empty() {
        return Err(Error::Validation("title is required".to_string()));
    }
    Ok(title.to_string())
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn check_sessions(sessions: u32) -> Result<()> {
    if sessions == 0 {
        return Err(Error::Validation(
            "estimated_sessions must be at least 1".to_string(),
        ));
    }
    Ok(())
}
