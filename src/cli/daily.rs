//! gt daily command implementations.

use crate::cli::goal::push_event_warning;
use crate::cli::{date_or_today, Context, DailyCommands, GlobalOptions, ScopeArgs};
use crate::daily::{current_streak, DailyCompletion, DailyScope};
use crate::error::Result;
use crate::model::Task;
use crate::output::{emit_success, HumanOutput};

pub fn run(command: DailyCommands, global: GlobalOptions) -> Result<()> {
    let mut ctx = Context::open(&global)?;
    match command {
        DailyCommands::View { scope, date } => {
            let scope = resolve_scope(&ctx, &scope)?;
            let today = date_or_today(date.as_deref())?;
            let view = ctx.engine.daily_view(&scope, today)?;

            let mut human = HumanOutput::new(format!("Daily tasks for {today}"));
            human.push_summary("Today", view.today.len().to_string());
            human.push_summary("Yesterday", view.yesterday.len().to_string());
            human.push_summary("All", view.all.len().to_string());
            for task in &view.today {
                human.push_detail(format_daily_line("today", task));
            }
            for task in &view.yesterday {
                human.push_detail(format_daily_line("yesterday", task));
            }
            emit_success(global.output(), "daily view", &view, Some(&human))
        }
        DailyCommands::History { scope, days, date } => {
            let scope = resolve_scope(&ctx, &scope)?;
            let today = date_or_today(date.as_deref())?;
            let days = days.unwrap_or(ctx.config.daily.history_days);
            let history = ctx.engine.completion_history(&scope, days, today)?;
            let streak = current_streak(&history);

            #[derive(serde::Serialize)]
            struct HistoryOutput<'a> {
                days: &'a [DailyCompletion],
                current_streak: usize,
            }

            let mut human = HumanOutput::new(format!(
                "Completion history ({} day(s) to {today})",
                history.len()
            ));
            human.push_summary("Current streak", format!("{streak} day(s)"));
            for day in &history {
                human.push_detail(format!(
                    "{} {:>3}% ({}/{})",
                    day.date, day.completion_rate, day.completed_tasks, day.total_tasks
                ));
            }
            let output = HistoryOutput {
                days: &history,
                current_streak: streak,
            };
            emit_success(global.output(), "daily history", &output, Some(&human))
        }
        DailyCommands::Done { id, date, undo } => {
            let task_id = ctx.engine.resolve_task_id(&id)?;
            let date = if undo {
                None
            } else {
                Some(date_or_today(date.as_deref())?)
            };
            let task = ctx.engine.complete_for_day(&task_id, date)?;

            let header = if undo {
                "Daily completion cleared"
            } else {
                "Task completed for the day"
            };
            let mut human = HumanOutput::new(header);
            human.push_summary("ID", task.id.clone());
            human.push_summary("Title", task.title.clone());
            if let Some(day) = task.completion_date {
                human.push_summary("Date", day.to_string());
            }
            push_event_warning(&mut ctx, &mut human);
            emit_success(global.output(), "daily done", &task, Some(&human))
        }
    }
}

fn resolve_scope(ctx: &Context, args: &ScopeArgs) -> Result<DailyScope> {
    if args.all {
        return Ok(DailyScope::All);
    }
    match args.goal.as_deref() {
        Some(goal) => Ok(DailyScope::Goal(ctx.engine.resolve_goal_id(goal)?)),
        None => Ok(DailyScope::Standalone),
    }
}

fn format_daily_line(bucket: &str, task: &Task) -> String {
    let mark = if task.completion_date.is_some() { "x" } else { " " };
    format!("{bucket}: [{mark}] {} {}", task.id, task.title)
}
