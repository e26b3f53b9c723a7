//! Dependency evaluation and write-time dependency checks.
//!
//! A task is blocked while any task it depends on is not done. Only direct
//! dependencies are inspected: a dependency that is itself blocked cannot be
//! done, so blocking propagates along chains without a closure computation.

use std::collections::{BTreeSet, HashMap, HashSet, VecDeque};

use crate::error::{Error, Result};
use crate::model::{BlockingTask, Task};

/// Tasks of one scope keyed by id.
pub type TaskIndex<'a> = HashMap<&'a str, &'a Task>;

pub fn index(tasks: &[Task]) -> TaskIndex<'_> {
    tasks.iter().map(|task| (task.id.as_str(), task)).collect()
}

/// Unmet dependencies of `task`, in dependency id order.
///
/// Ids that do not resolve inside `index` are ignored.
pub fn blocking_tasks(task: &Task, index: &TaskIndex<'_>) -> Vec<BlockingTask> {
    task.depends_on
        .iter()
        .filter_map(|dep_id| index.get(dep_id.as_str()))
        .filter(|dep| !dep.status.is_done())
        .map(|dep| BlockingTask {
            id: dep.id.clone(),
            title: dep.title.clone(),
        })
        .collect()
}

/// Check a proposed `depends_on` set for `task_id` against its scope.
///
/// `scope` holds every task sharing the task's goal (the task itself may or
/// may not be present yet). Rejects self references, ids outside the scope,
/// and any edge that would close a cycle.
pub fn validate_dependencies(
    task_id: &str,
    depends_on: &BTreeSet<String>,
    scope: &[Task],
) -> Result<()> {
    if depends_on.is_empty() {
        return Ok(());
    }
    let scope_index = index(scope);

    for dep_id in depends_on {
        if dep_id == task_id {
            return Err(Error::Validation(format!(
                "task {task_id} cannot depend on itself"
            )));
        }
        if !scope_index.contains_key(dep_id.as_str()) {
            return Err(Error::Validation(format!(
                "dependency {dep_id} is not a task in the same goal"
            )));
        }
    }

    for dep_id in depends_on {
        if reaches(dep_id, task_id, &scope_index) {
            tracing::debug!(task = task_id, via = %dep_id, "rejecting dependency cycle");
            return Err(Error::DependencyCycle {
                task: task_id.to_string(),
                via: dep_id.clone(),
            });
        }
    }

    Ok(())
}

/// Breadth-first walk of stored dependency edges from `start`.
///
/// Reaching `target` means a new edge `target -> start` closes a cycle.
fn reaches(start: &str, target: &str, scope_index: &TaskIndex<'_>) -> bool {
    let mut visited: HashSet<&str> = HashSet::new();
    let mut queue: VecDeque<&str> = VecDeque::new();
    queue.push_back(start);

    while let Some(current) = queue.pop_front() {
        if current == target {
            return true;
        }
        if !visited.insert(current) {
            continue;
        }

        if let Some(task) = scope_index.get(current) {
            for next in &task.depends_on {
                if !visited.contains(next.as_str()) {
                    queue.push_back(next.as_str());
                }
            }
        }
    }

    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Difficulty, Priority, TaskStatus};
    use chrono::Utc;

    fn task(id: &str, status: TaskStatus, deps: &[&str]) -> Task {
        let now = Utc::now();
        Task {
            id: id.to_string(),
            title: format!("Title {id}"),
            description: None,
            status,
            priority: Priority::Medium,
            difficulty: Difficulty::Medium,
            goal_id: Some("g-1".to_string()),
            parent_task_id: None,
            depends_on: deps.iter().map(|d| d.to_string()).collect(),
            due_date: None,
            estimated_sessions: 1,
            order_index: 0,
            completed_at: None,
            completion_date: None,
            tags: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    fn deps(ids: &[&str]) -> BTreeSet<String> {
        ids.iter().map(|d| d.to_string()).collect()
    }

    #[test]
    fn blocked_by_unfinished_dependency() {
        let tasks = vec![
            task("a", TaskStatus::Todo, &["b", "c"]),
            task("b", TaskStatus::InProgress, &[]),
            task("c", TaskStatus::Done, &[]),
        ];
        let idx = index(&tasks);
        let blockers = blocking_tasks(&tasks[0], &idx);
        assert_eq!(
            blockers,
            vec![BlockingTask {
                id: "b".to_string(),
                title: "Title b".to_string()
            }]
        );
        assert!(!blocking_tasks(&tasks[0], &idx).is_empty());
        assert!(blocking_tasks(&tasks[1], &idx).is_empty());
    }

    #[test]
    fn blocking_is_visible_along_chains() {
        // a -> b -> c, c unfinished: b cannot be done, so a sees b as unmet.
        let tasks = vec![
            task("a", TaskStatus::Todo, &["b"]),
            task("b", TaskStatus::Todo, &["c"]),
            task("c", TaskStatus::Todo, &[]),
        ];
        let idx = index(&tasks);
        assert!(!blocking_tasks(&tasks[0], &idx).is_empty());
        assert!(!blocking_tasks(&tasks[1], &idx).is_empty());
        assert!(blocking_tasks(&tasks[2], &idx).is_empty());
    }

    #[test]
    fn unresolved_dependencies_do_not_block() {
        let tasks = vec![task("a", TaskStatus::Todo, &["gone"])];
        let idx = index(&tasks);
        assert!(blocking_tasks(&tasks[0], &idx).is_empty());
    }

    #[test]
    fn self_dependency_rejected() {
        let tasks = vec![task("a", TaskStatus::Todo, &[])];
        let err = validate_dependencies("a", &deps(&["a"]), &tasks).unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
    }

    #[test]
    fn dependency_outside_scope_rejected() {
        let tasks = vec![task("a", TaskStatus::Todo, &[])];
        let err = validate_dependencies("a", &deps(&["elsewhere"]), &tasks).unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
    }

    #[test]
    fn cycle_rejected_at_write_time() {
        // b -> c -> a already stored; a -> b would close the loop.
        let tasks = vec![
            task("a", TaskStatus::Todo, &[]),
            task("b", TaskStatus::Todo, &["c"]),
            task("c", TaskStatus::Todo, &["a"]),
        ];
        let err = validate_dependencies("a", &deps(&["b"]), &tasks).unwrap_err();
        assert!(
            matches!(err, Error::DependencyCycle { ref task, ref via } if task == "a" && via == "b")
        );
    }

    #[test]
    fn diamond_is_not_a_cycle() {
        let tasks = vec![
            task("a", TaskStatus::Todo, &[]),
            task("b", TaskStatus::Todo, &["d"]),
            task("c", TaskStatus::Todo, &["d"]),
            task("d", TaskStatus::Todo, &[]),
        ];
        validate_dependencies("a", &deps(&["b", "c"]), &tasks).expect("diamond ok");
    }
}
