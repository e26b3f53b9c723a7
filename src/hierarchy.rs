//! Flat task lists to parent/child trees.

use std::collections::HashMap;

use crate::deps;
use crate::error::{Error, Result};
use crate::model::{BlockingTask, Task, TaskView};

/// Build the task forest for one goal.
///
/// Roots are tasks without a parent or whose parent is not in `tasks`.
/// Every node carries its blocking state, evaluated against `tasks`.
/// Siblings are ordered by `order_index`, then creation time.
pub fn resolve_hierarchy(tasks: Vec<Task>) -> Vec<TaskView> {
    let blocking: Vec<Vec<BlockingTask>> = {
        let index = deps::index(&tasks);
        tasks
            .iter()
            .map(|task| deps::blocking_tasks(task, &index))
            .collect()
    };

    let position: HashMap<&str, usize> = tasks
        .iter()
        .enumerate()
        .map(|(pos, task)| (task.id.as_str(), pos))
        .collect();

    let mut roots = Vec::new();
    let mut children: Vec<Vec<usize>> = vec![Vec::new(); tasks.len()];
    for (pos, task) in tasks.iter().enumerate() {
        match task
            .parent_task_id
            .as_deref()
            .and_then(|parent| position.get(parent))
        {
            Some(&parent_pos) if parent_pos != pos => children[parent_pos].push(pos),
            _ => roots.push(pos),
        }
    }

    let sort_key = |pos: &usize| {
        let task = &tasks[*pos];
        (task.order_index, task.created_at, task.id.clone())
    };
    roots.sort_by_key(sort_key);
    for list in &mut children {
        list.sort_by_key(sort_key);
    }

    let mut slots: Vec<Option<(Task, Vec<BlockingTask>)>> =
        tasks.into_iter().zip(blocking).map(Some).collect();
    roots
        .into_iter()
        .filter_map(|pos| build(pos, &children, &mut slots))
        .collect()
}

// Each slot is taken once, so a parent loop among non-roots is never
// reached and cannot recurse forever.
fn build(
    pos: usize,
    children: &[Vec<usize>],
    slots: &mut [Option<(Task, Vec<BlockingTask>)>],
) -> Option<TaskView> {
    let (task, blocking_tasks) = slots[pos].take()?;
    let subtasks = children[pos]
        .iter()
        .filter_map(|&child| build(child, children, slots))
        .collect();
    Some(TaskView {
        task,
        is_blocked: !blocking_tasks.is_empty(),
        blocking_tasks,
        subtasks,
    })
}

/// Check that `task_id` may be nested under `parent_id`.
///
/// `scope` is the goal's task set. The parent must be in it, and must be
/// neither the task itself nor one of its descendants.
pub fn validate_parent(task_id: &str, parent_id: &str, scope: &[Task]) -> Result<()> {
    if parent_id == task_id {
        return Err(Error::InvalidParent(format!(
            "task {task_id} cannot be its own parent"
        )));
    }
    let parents: HashMap<&str, Option<&str>> = scope
        .iter()
        .map(|task| (task.id.as_str(), task.parent_task_id.as_deref()))
        .collect();
    if !parents.contains_key(parent_id) {
        return Err(Error::InvalidParent(format!(
            "parent {parent_id} is not a task in the same goal"
        )));
    }

    // Walk up from the proposed parent; meeting the task means a loop.
    let mut current = Some(parent_id);
    let mut steps = 0;
    while let Some(id) = current {
        if id == task_id {
            return Err(Error::InvalidParent(format!(
                "{parent_id} is a descendant of {task_id}"
            )));
        }
        steps += 1;
        if steps > parents.len() {
            break;
        }
        current = parents.get(id).copied().flatten();
    }
    Ok(())
}

/// Depth-first flattening of a forest, parents before children.
pub fn flatten(views: &[TaskView]) -> Vec<&TaskView> {
    let mut out = Vec::new();
    let mut stack: Vec<&TaskView> = views.iter().rev().collect();
    while let Some(view) = stack.pop() {
        out.push(view);
        stack.extend(view.subtasks.iter().rev());
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Difficulty, Priority, TaskStatus};
    use chrono::{Duration, Utc};

    fn task(id: &str, parent: Option<&str>, order: i64) -> Task {
        let now = Utc::now();
        Task {
            id: id.to_string(),
            title: id.to_uppercase(),
            description: None,
            status: TaskStatus::Todo,
            priority: Priority::Medium,
            difficulty: Difficulty::Medium,
            goal_id: Some("g-1".to_string()),
            parent_task_id: parent.map(str::to_string),
            depends_on: Default::default(),
            due_date: None,
            estimated_sessions: 1,
            order_index: order,
            completed_at: None,
            completion_date: None,
            tags: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    fn ids(views: &[TaskView]) -> Vec<&str> {
        views.iter().map(|v| v.task.id.as_str()).collect()
    }

    #[test]
    fn nests_children_under_parents() {
        let tasks = vec![
            task("c", Some("b"), 0),
            task("a", None, 0),
            task("b", Some("a"), 0),
            task("d", None, 1),
        ];
        let forest = resolve_hierarchy(tasks);
        assert_eq!(ids(&forest), vec!["a", "d"]);
        assert_eq!(ids(&forest[0].subtasks), vec!["b"]);
        assert_eq!(ids(&forest[0].subtasks[0].subtasks), vec!["c"]);
        assert_eq!(flatten(&forest[..1]).len(), 3);
    }

    #[test]
    fn missing_parent_makes_a_root() {
        let forest = resolve_hierarchy(vec![task("orphan", Some("gone"), 0)]);
        assert_eq!(ids(&forest), vec!["orphan"]);
    }

    #[test]
    fn siblings_sorted_by_order_then_creation() {
        let mut early = task("early", Some("p"), 2);
        let mut late = task("late", Some("p"), 2);
        early.created_at = Utc::now() - Duration::minutes(5);
        late.created_at = Utc::now();
        let tasks = vec![
            task("p", None, 0),
            late,
            task("first", Some("p"), 1),
            early,
        ];
        let forest = resolve_hierarchy(tasks);
        assert_eq!(ids(&forest[0].subtasks), vec!["first", "early", "late"]);
    }

    #[test]
    fn blocked_flags_are_attached_at_every_level() {
        let mut child = task("child", Some("root"), 0);
        child.depends_on.insert("dep".to_string());
        let forest = resolve_hierarchy(vec![task("root", None, 0), child, task("dep", None, 1)]);

        let child_view = forest[0].find("child").expect("child present");
        assert!(child_view.is_blocked);
        assert_eq!(child_view.blocking_tasks[0].title, "DEP");
        assert!(!forest[0].is_blocked);
    }

    #[test]
    fn parent_loop_does_not_recurse() {
        let tasks = vec![task("x", Some("y"), 0), task("y", Some("x"), 0), task("r", None, 0)];
        let forest = resolve_hierarchy(tasks);
        assert_eq!(ids(&forest), vec!["r"]);
    }

    #[test]
    fn parent_must_not_be_self_or_descendant() {
        let scope = vec![
            task("a", None, 0),
            task("b", Some("a"), 0),
            task("c", Some("b"), 0),
            task("d", None, 1),
        ];
        validate_parent("c", "d", &scope).expect("sibling subtree is fine");
        validate_parent("new", "c", &scope).expect("new task under leaf");

        for (child, parent) in [("a", "a"), ("a", "c"), ("b", "c"), ("a", "elsewhere")] {
            let err = validate_parent(child, parent, &scope).unwrap_err();
            assert!(matches!(err, Error::InvalidParent(_)), "{child} under {parent}");
        }
    }

    #[test]
    fn flatten_is_preorder() {
        let tasks = vec![
            task("a", None, 0),
            task("a1", Some("a"), 0),
            task("a2", Some("a"), 1),
            task("b", None, 1),
        ];
        let forest = resolve_hierarchy(tasks);
        let order: Vec<_> = flatten(&forest).iter().map(|v| v.task.id.as_str()).collect();
        assert_eq!(order, vec!["a", "a1", "a2", "b"]);
    }
}
