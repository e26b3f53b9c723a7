//! gt goal command implementations.

use crate::cli::task::push_tree;
use crate::cli::{parse_date, Context, GlobalOptions, GoalCommands};
use crate::engine::{GoalPatch, GoalSummary, NewGoal};
use crate::error::Result;
use crate::model::{Goal, GoalStatus, TaskView};
use crate::output::{emit_success, HumanOutput};

pub fn run(command: GoalCommands, global: GlobalOptions) -> Result<()> {
    let mut ctx = Context::open(&global)?;
    match command {
        GoalCommands::New {
            title,
            description,
            category,
            target,
            status,
        } => {
            let new = NewGoal {
                title,
                description,
                category,
                target_date: target.as_deref().map(parse_date).transpose()?,
                status: status.as_deref().map(str::parse::<GoalStatus>).transpose()?,
            };
            let goal = ctx.engine.create_goal(new)?;
            let mut human = goal_human("Goal created", &goal);
            push_event_warning(&mut ctx, &mut human);
            human.push_next_step(format!("gt task new \"<title>\" --goal {}", goal.id));
            emit_success(global.output(), "goal new", &goal, Some(&human))
        }
        GoalCommands::List => {
            let goals = ctx.engine.list_goals()?;
            let mut human = HumanOutput::new(format!("{} goal(s)", goals.len()));
            for summary in &goals {
                human.push_detail(format_goal_line(summary));
            }
            emit_success(global.output(), "goal list", &goals, Some(&human))
        }
        GoalCommands::Show { id, hide_completed } => {
            let goal_id = ctx.engine.resolve_goal_id(&id)?;
            let summary = ctx.engine.get_goal(&goal_id)?;
            let tasks = ctx
                .engine
                .list_tasks_for_goal(Some(goal_id.as_str()), !hide_completed)?;

            let mut human = goal_human(&summary.goal.title, &summary.goal);
            human.push_summary(
                "Tasks",
                format!("{}/{} done", summary.done_tasks, summary.total_tasks),
            );
            push_tree(&mut human, &tasks);

            #[derive(serde::Serialize)]
            struct GoalShowOutput<'a> {
                #[serde(flatten)]
                goal: &'a GoalSummary,
                tasks: &'a [TaskView],
            }
            let output = GoalShowOutput {
                goal: &summary,
                tasks: &tasks,
            };
            emit_success(global.output(), "goal show", &output, Some(&human))
        }
        GoalCommands::Update {
            id,
            title,
            description,
            clear_description,
            category,
            clear_category,
            target,
            clear_target,
            status,
            progress,
        } => {
            let goal_id = ctx.engine.resolve_goal_id(&id)?;
            let patch = GoalPatch {
                title,
                description: clearable(description, clear_description),
                category: clearable(category, clear_category),
                target_date: match (target, clear_target) {
                    (Some(raw), _) => Some(Some(parse_date(&raw)?)),
                    (None, true) => Some(None),
                    (None, false) => None,
                },
                status: status.as_deref().map(str::parse::<GoalStatus>).transpose()?,
                progress,
            };
            let goal = ctx.engine.update_goal(&goal_id, patch)?;
            let mut human = goal_human("Goal updated", &goal);
            push_event_warning(&mut ctx, &mut human);
            emit_success(global.output(), "goal update", &goal, Some(&human))
        }
        GoalCommands::Rm { id } => {
            let goal_id = ctx.engine.resolve_goal_id(&id)?;
            let tasks_deleted = ctx.engine.delete_goal(&goal_id)?;

            #[derive(serde::Serialize)]
            struct GoalDeletedOutput {
                id: String,
                tasks_deleted: usize,
            }
            let mut human = HumanOutput::new("Goal deleted");
            human.push_summary("ID", goal_id.clone());
            human.push_summary("Tasks deleted", tasks_deleted.to_string());
            push_event_warning(&mut ctx, &mut human);
            let output = GoalDeletedOutput {
                id: goal_id,
                tasks_deleted,
            };
            emit_success(global.output(), "goal rm", &output, Some(&human))
        }
    }
}

fn goal_human(header: &str, goal: &Goal) -> HumanOutput {
    let mut human = HumanOutput::new(header);
    human.push_summary("ID", goal.id.clone());
    human.push_summary("Title", goal.title.clone());
    human.push_summary("Status", goal.status.to_string());
    human.push_summary("Progress", format!("{}%", goal.progress));
    if let Some(category) = &goal.category {
        human.push_summary("Category", category.clone());
    }
    if let Some(target) = goal.target_date {
        human.push_summary("Target", target.to_string());
    }
    if let Some(description) = &goal.description {
        human.push_detail(description.clone());
    }
    human
}

fn format_goal_line(summary: &GoalSummary) -> String {
    let goal = &summary.goal;
    format!(
        "{} [{}] {:>3}% {} ({}/{} tasks)",
        goal.id, goal.status, goal.progress, goal.title, summary.done_tasks, summary.total_tasks
    )
}

pub(super) fn clearable(value: Option<String>, clear: bool) -> Option<Option<String>> {
    match (value, clear) {
        (Some(value), _) => Some(Some(value)),
        (None, true) => Some(None),
        (None, false) => None,
    }
}

pub(super) fn push_event_warning(ctx: &mut Context, human: &mut HumanOutput) {
    if let Some(warning) = ctx.flush_events() {
        human.push_warning(warning);
    }
}
