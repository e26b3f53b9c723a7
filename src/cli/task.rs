//! gt task command implementations.

use std::collections::BTreeSet;

use crate::cli::goal::{clearable, push_event_warning};
use crate::cli::{parse_date, Context, GlobalOptions, TaskCommands};
use crate::engine::{NewTask, ReorderEntry, TaskPatch};
use crate::error::{Error, Result};
use crate::hierarchy::flatten;
use crate::model::{Difficulty, Priority, Task, TaskStatus, TaskView};
use crate::output::{emit_success, HumanOutput};

pub fn run(command: TaskCommands, global: GlobalOptions) -> Result<()> {
    let mut ctx = Context::open(&global)?;
    match command {
        TaskCommands::New {
            title,
            goal,
            parent,
            depends_on,
            description,
            status,
            priority,
            difficulty,
            due,
            sessions,
            order,
            tags,
        } => {
            let new = NewTask {
                title,
                description,
                goal_id: goal
                    .as_deref()
                    .map(|id| ctx.engine.resolve_goal_id(id))
                    .transpose()?,
                parent_task_id: parent
                    .as_deref()
                    .map(|id| ctx.engine.resolve_task_id(id))
                    .transpose()?,
                depends_on: resolve_tasks(&ctx, &depends_on)?,
                status: parse_opt::<TaskStatus>(status.as_deref())?,
                priority: parse_opt::<Priority>(priority.as_deref())?,
                difficulty: parse_opt::<Difficulty>(difficulty.as_deref())?,
                due_date: due.as_deref().map(parse_date).transpose()?,
                estimated_sessions: sessions,
                order_index: order,
                completion_date: None,
                tags,
            };
            let task = ctx.engine.create_task(new)?;
            let mut human = task_human("Task created", &task);
            push_event_warning(&mut ctx, &mut human);
            emit_success(global.output(), "task new", &task, Some(&human))
        }
        TaskCommands::List {
            goal,
            include_completed,
            hide_completed,
        } => {
            let goal_id = goal
                .as_deref()
                .map(|id| ctx.engine.resolve_goal_id(id))
                .transpose()?;
            let include = if include_completed {
                true
            } else if hide_completed {
                false
            } else {
                ctx.config.tasks.include_completed
            };
            let tasks = ctx.engine.list_tasks_for_goal(goal_id.as_deref(), include)?;

            let scope = goal_id.as_deref().unwrap_or("standalone");
            let total = flatten(&tasks).len();
            let mut human = HumanOutput::new(format!("{total} task(s) in {scope}"));
            push_tree(&mut human, &tasks);
            emit_success(global.output(), "task list", &tasks, Some(&human))
        }
        TaskCommands::Show { id } => {
            let task_id = ctx.engine.resolve_task_id(&id)?;
            let view = ctx.engine.get_task(&task_id)?;
            let mut human = task_human(&view.task.title, &view.task);
            if view.is_blocked {
                let titles: Vec<&str> = view
                    .blocking_tasks
                    .iter()
                    .map(|b| b.title.as_str())
                    .collect();
                human.push_summary("Blocked by", titles.join(", "));
            }
            push_tree(&mut human, &view.subtasks);
            emit_success(global.output(), "task show", &view, Some(&human))
        }
        TaskCommands::Update {
            id,
            goal,
            title,
            description,
            clear_description,
            status,
            priority,
            difficulty,
            parent,
            root,
            depends_on,
            no_deps,
            due,
            clear_due,
            sessions,
            order,
            tags,
            clear_completed_at,
        } => {
            let task_id = ctx.engine.resolve_task_id(&id)?;
            let goal_id = resolve_goal_opt(&ctx, goal.as_deref())?;
            let parent_task_id = match (parent, root) {
                (Some(parent), _) => Some(Some(ctx.engine.resolve_task_id(&parent)?)),
                (None, true) => Some(None),
                (None, false) => None,
            };
            let depends_on = if no_deps {
                Some(BTreeSet::new())
            } else if depends_on.is_empty() {
                None
            } else {
                Some(resolve_tasks(&ctx, &depends_on)?)
            };
            let patch = TaskPatch {
                title,
                description: clearable(description, clear_description),
                status: parse_opt::<TaskStatus>(status.as_deref())?,
                priority: parse_opt::<Priority>(priority.as_deref())?,
                difficulty: parse_opt::<Difficulty>(difficulty.as_deref())?,
                parent_task_id,
                depends_on,
                due_date: match (due, clear_due) {
                    (Some(raw), _) => Some(Some(parse_date(&raw)?)),
                    (None, true) => Some(None),
                    (None, false) => None,
                },
                estimated_sessions: sessions,
                order_index: order,
                completion_date: None,
                tags: if tags.is_empty() { None } else { Some(tags) },
                clear_completed_at,
            };
            let task = ctx
                .engine
                .update_task(goal_id.as_deref(), &task_id, patch)?;
            let mut human = task_human("Task updated", &task);
            push_event_warning(&mut ctx, &mut human);
            emit_success(global.output(), "task update", &task, Some(&human))
        }
        TaskCommands::Done { id, goal } => {
            let task_id = ctx.engine.resolve_task_id(&id)?;
            let goal_id = resolve_goal_opt(&ctx, goal.as_deref())?;
            let task = ctx.engine.update_task(
                goal_id.as_deref(),
                &task_id,
                TaskPatch::status(TaskStatus::Done),
            )?;
            let mut human = task_human("Task done", &task);
            push_goal_progress(&ctx, &mut human, &task)?;
            push_event_warning(&mut ctx, &mut human);
            emit_success(global.output(), "task done", &task, Some(&human))
        }
        TaskCommands::Reopen {
            id,
            goal,
            in_progress,
            clear_completed_at,
        } => {
            let task_id = ctx.engine.resolve_task_id(&id)?;
            let goal_id = resolve_goal_opt(&ctx, goal.as_deref())?;
            let status = if in_progress {
                TaskStatus::InProgress
            } else {
                TaskStatus::Todo
            };
            let patch = TaskPatch {
                clear_completed_at,
                ..TaskPatch::status(status)
            };
            let task = ctx.engine.update_task(goal_id.as_deref(), &task_id, patch)?;
            let mut human = task_human("Task reopened", &task);
            push_goal_progress(&ctx, &mut human, &task)?;
            push_event_warning(&mut ctx, &mut human);
            emit_success(global.output(), "task reopen", &task, Some(&human))
        }
        TaskCommands::Rm { id, goal, cascade } => {
            let task_id = ctx.engine.resolve_task_id(&id)?;
            let goal_id = resolve_goal_opt(&ctx, goal.as_deref())?;
            let outcome = ctx
                .engine
                .delete_task(goal_id.as_deref(), &task_id, cascade)?;

            let mut human = HumanOutput::new("Task deleted");
            human.push_summary("ID", task_id);
            human.push_summary("Deleted", outcome.deleted.len().to_string());
            if !outcome.reparented.is_empty() {
                human.push_summary("Moved up", outcome.reparented.join(", "));
            }
            if !outcome.pruned.is_empty() {
                human.push_summary("Dependencies pruned from", outcome.pruned.join(", "));
            }
            push_event_warning(&mut ctx, &mut human);
            emit_success(global.output(), "task rm", &outcome, Some(&human))
        }
        TaskCommands::Reorder { entries } => {
            let parsed = entries
                .iter()
                .map(|raw| parse_reorder_entry(&ctx, raw))
                .collect::<Result<Vec<_>>>()?;
            let count = ctx.engine.reorder_tasks(parsed)?;

            #[derive(serde::Serialize)]
            struct ReorderOutput {
                reordered: usize,
            }
            let mut human = HumanOutput::new("Tasks reordered");
            human.push_summary("Count", count.to_string());
            push_event_warning(&mut ctx, &mut human);
            emit_success(
                global.output(),
                "task reorder",
                &ReorderOutput { reordered: count },
                Some(&human),
            )
        }
    }
}

/// Render a task forest as indented detail lines.
pub(super) fn push_tree(human: &mut HumanOutput, views: &[TaskView]) {
    fn walk(human: &mut HumanOutput, views: &[TaskView], depth: usize) {
        for view in views {
            human.push_detail(format_task_line(view, depth));
            walk(human, &view.subtasks, depth + 1);
        }
    }
    walk(human, views, 0);
}

fn format_task_line(view: &TaskView, depth: usize) -> String {
    let task = &view.task;
    let marker = match task.status {
        TaskStatus::Todo => "[ ]",
        TaskStatus::InProgress => "[~]",
        TaskStatus::Done => "[x]",
    };
    let mut line = format!("{}{marker} {} {}", "  ".repeat(depth), task.id, task.title);
    if view.is_blocked {
        let titles: Vec<&str> = view
            .blocking_tasks
            .iter()
            .map(|b| b.title.as_str())
            .collect();
        line.push_str(&format!(" (blocked by: {})", titles.join(", ")));
    }
    line
}

fn task_human(header: &str, task: &Task) -> HumanOutput {
    let mut human = HumanOutput::new(header);
    human.push_summary("ID", task.id.clone());
    human.push_summary("Title", task.title.clone());
    human.push_summary("Status", task.status.to_string());
    human.push_summary("Priority", task.priority.to_string());
    human.push_summary("Difficulty", task.difficulty.to_string());
    if let Some(goal_id) = &task.goal_id {
        human.push_summary("Goal", goal_id.clone());
    }
    if let Some(parent) = &task.parent_task_id {
        human.push_summary("Parent", parent.clone());
    }
    if !task.depends_on.is_empty() {
        let deps: Vec<&str> = task.depends_on.iter().map(String::as_str).collect();
        human.push_summary("Depends on", deps.join(", "));
    }
    if let Some(due) = task.due_date {
        human.push_summary("Due", due.to_string());
    }
    if !task.tags.is_empty() {
        human.push_summary("Tags", task.tags.join(", "));
    }
    if let Some(description) = &task.description {
        human.push_detail(description.clone());
    }
    human
}

fn push_goal_progress(ctx: &Context, human: &mut HumanOutput, task: &Task) -> Result<()> {
    if let Some(goal_id) = &task.goal_id {
        let goal = ctx.engine.get_goal(goal_id)?.goal;
        human.push_summary(
            "Goal progress",
            format!("{}% ({})", goal.progress, goal.status),
        );
    }
    Ok(())
}

fn parse_opt<T>(raw: Option<&str>) -> Result<Option<T>>
where
    T: std::str::FromStr<Err = Error>,
{
    raw.map(str::parse::<T>).transpose()
}

fn resolve_goal_opt(ctx: &Context, raw: Option<&str>) -> Result<Option<String>> {
    raw.map(|id| ctx.engine.resolve_goal_id(id)).transpose()
}

fn resolve_tasks(ctx: &Context, raw: &[String]) -> Result<BTreeSet<String>> {
    raw.iter()
        .map(|id| ctx.engine.resolve_task_id(id))
        .collect()
}

/// `TASK=ORDER`, `TASK=ORDER@PARENT` or `TASK=ORDER@root`.
fn parse_reorder_entry(ctx: &Context, raw: &str) -> Result<ReorderEntry> {
    let invalid = || {
        Error::Validation(format!(
            "invalid reorder entry '{raw}' (expected TASK=ORDER[@PARENT|@root])"
        ))
    };
    let (task, rest) = raw.split_once('=').ok_or_else(invalid)?;
    let (order, parent) = match rest.split_once('@') {
        Some((order, parent)) => (order, Some(parent.trim())),
        None => (rest, None),
    };
    let order_index = order.trim().parse::<i64>().map_err(|_| invalid())?;
    let parent_task_id = match parent {
        None => None,
        Some("") => return Err(invalid()),
        Some(parent) if parent.eq_ignore_ascii_case("root") => Some(None),
        Some(parent) => Some(Some(ctx.engine.resolve_task_id(parent)?)),
    };
    Ok(ReorderEntry {
        id: ctx.engine.resolve_task_id(task)?,
        order_index,
        parent_task_id,
    })
}
