//! Daily completion tracking.
//!
//! Daily buckets key off `completion_date`, which is independent of task
//! status. Nothing here is persisted: buckets, history and streaks are all
//! recomputed from the task list on every read.

use chrono::{Duration, NaiveDate};
use serde::Serialize;

use crate::error::{Error, Result};
use crate::model::Task;

/// Longest history `completion_history` will build.
pub const MAX_HISTORY_DAYS: u32 = 365;

/// Which tasks daily operations look at.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum DailyScope {
    /// Tasks without a goal.
    #[default]
    Standalone,
    Goal(String),
    All,
}

impl DailyScope {
    pub fn includes(&self, task: &Task) -> bool {
        match self {
            DailyScope::Standalone => task.goal_id.is_none(),
            DailyScope::Goal(goal_id) => task.goal_id.as_deref() == Some(goal_id.as_str()),
            DailyScope::All => true,
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct DailyView {
    pub today: Vec<Task>,
    pub yesterday: Vec<Task>,
    pub all: Vec<Task>,
}

/// One day of completion history.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub struct DailyCompletion {
    pub date: NaiveDate,
    pub completed_tasks: usize,
    pub total_tasks: usize,
    pub completion_rate: u32,
}

/// Bucket tasks into today and yesterday.
///
/// Tasks with no `completion_date` are still pending and land in today.
pub fn daily_view(tasks: Vec<Task>, today: NaiveDate, yesterday: NaiveDate) -> DailyView {
    let today_bucket = tasks
        .iter()
        .filter(|task| task.completion_date.map_or(true, |date| date == today))
        .cloned()
        .collect();
    let yesterday_bucket = tasks
        .iter()
        .filter(|task| task.completion_date == Some(yesterday))
        .cloned()
        .collect();
    DailyView {
        today: today_bucket,
        yesterday: yesterday_bucket,
        all: tasks,
    }
}

/// Per-day completion counts for the `days` days ending at `today`,
/// oldest first.
///
/// A task is active on a day if it is not done and either has no
/// completion date or was completed that day or later. `days` must be in
/// `1..=MAX_HISTORY_DAYS`.
pub fn completion_history(
    tasks: &[Task],
    days: u32,
    today: NaiveDate,
) -> Result<Vec<DailyCompletion>> {
    if days == 0 || days > MAX_HISTORY_DAYS {
        return Err(Error::Validation(format!(
            "days must be between 1 and {MAX_HISTORY_DAYS}"
        )));
    }

    let mut history = Vec::with_capacity(days as usize);
    for offset in (0..i64::from(days)).rev() {
        let date = today
            .checked_sub_signed(Duration::days(offset))
            .ok_or_else(|| Error::Validation(format!("history before {today} is out of range")))?;
        let completed_tasks = tasks
            .iter()
            .filter(|task| task.completion_date == Some(date))
            .count();
        let total_tasks = tasks
            .iter()
            .filter(|task| {
                !task.status.is_done() && task.completion_date.map_or(true, |d| d >= date)
            })
            .count();
        history.push(DailyCompletion {
            date,
            completed_tasks,
            total_tasks,
            completion_rate: rate(completed_tasks, total_tasks),
        });
    }
    Ok(history)
}

fn rate(completed: usize, active: usize) -> u32 {
    if active == 0 {
        return 0;
    }
    (100.0 * completed as f64 / active as f64).round() as u32
}

/// Consecutive fully completed days, counted back from the newest entry.
pub fn current_streak(history: &[DailyCompletion]) -> usize {
    history
        .iter()
        .rev()
        .take_while(|day| day.completion_rate == 100 && day.total_tasks > 0)
        .count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Difficulty, Priority, TaskStatus};
    use chrono::Utc;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, d).unwrap()
    }

    fn task(id: &str, status: TaskStatus, completion: Option<NaiveDate>) -> Task {
        let now = Utc::now();
        Task {
            id: id.to_string(),
            title: id.to_string(),
            description: None,
            status,
            priority: Priority::Medium,
            difficulty: Difficulty::Medium,
            goal_id: None,
            parent_task_id: None,
            depends_on: Default::default(),
            due_date: None,
            estimated_sessions: 1,
            order_index: 0,
            completed_at: None,
            completion_date: completion,
            tags: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    fn entry(rate: u32, total: usize) -> DailyCompletion {
        DailyCompletion {
            date: day(1),
            completed_tasks: 0,
            total_tasks: total,
            completion_rate: rate,
        }
    }

    #[test]
    fn buckets_by_completion_date() {
        let tasks = vec![
            task("today", TaskStatus::Todo, Some(day(10))),
            task("yesterday", TaskStatus::Todo, Some(day(9))),
            task("pending", TaskStatus::Todo, None),
            task("older", TaskStatus::Todo, Some(day(2))),
        ];
        let view = daily_view(tasks, day(10), day(9));
        let ids = |list: &[Task]| list.iter().map(|t| t.id.clone()).collect::<Vec<_>>();
        assert_eq!(ids(&view.today), vec!["today", "pending"]);
        assert_eq!(ids(&view.yesterday), vec!["yesterday"]);
        assert_eq!(view.all.len(), 4);
    }

    #[test]
    fn history_is_oldest_first_and_counts_active() {
        let tasks = vec![
            task("a", TaskStatus::Todo, Some(day(9))),
            task("b", TaskStatus::Todo, Some(day(10))),
            task("c", TaskStatus::Todo, None),
            task("closed", TaskStatus::Done, None),
        ];
        let history = completion_history(&tasks, 3, day(10)).expect("history");
        let dates: Vec<_> = history.iter().map(|h| h.date).collect();
        assert_eq!(dates, vec![day(8), day(9), day(10)]);

        assert_eq!((history[0].completed_tasks, history[0].total_tasks), (0, 3));
        assert_eq!((history[1].completed_tasks, history[1].total_tasks), (1, 3));
        assert_eq!(history[1].completion_rate, 33);
        assert_eq!((history[2].completed_tasks, history[2].total_tasks), (1, 2));
        assert_eq!(history[2].completion_rate, 50);
    }

    #[test]
    fn no_active_tasks_means_zero_rate() {
        let tasks = vec![task("closed", TaskStatus::Done, Some(day(1)))];
        let history = completion_history(&tasks, 2, day(5)).expect("history");
        assert!(history.iter().all(|h| h.completion_rate == 0 && h.total_tasks == 0));
    }

    #[test]
    fn history_length_is_bounded() {
        let tasks = vec![task("a", TaskStatus::Todo, None)];
        for days in [0, MAX_HISTORY_DAYS + 1, u32::MAX] {
            assert!(matches!(
                completion_history(&tasks, days, day(5)),
                Err(Error::Validation(_))
            ));
        }
        let history = completion_history(&tasks, MAX_HISTORY_DAYS, day(5)).expect("history");
        assert_eq!(history.len(), MAX_HISTORY_DAYS as usize);
        assert_eq!(history.last().map(|h| h.date), Some(day(5)));
    }

    #[test]
    fn history_before_the_first_date_is_rejected() {
        let tasks = vec![task("a", TaskStatus::Todo, None)];
        assert!(matches!(
            completion_history(&tasks, 2, NaiveDate::MIN),
            Err(Error::Validation(_))
        ));
        let history = completion_history(&tasks, 1, NaiveDate::MIN).expect("history");
        assert_eq!(history[0].date, NaiveDate::MIN);
    }

    #[test]
    fn streak_stops_at_first_incomplete_day() {
        let history = vec![entry(100, 2), entry(100, 1), entry(80, 5), entry(100, 3)];
        assert_eq!(current_streak(&history), 1);

        let history = vec![entry(80, 5), entry(100, 1), entry(100, 3)];
        assert_eq!(current_streak(&history), 2);
    }

    #[test]
    fn empty_days_break_the_streak() {
        let history = vec![entry(100, 1), entry(0, 0)];
        assert_eq!(current_streak(&history), 0);
        assert_eq!(current_streak(&[]), 0);
    }

    #[test]
    fn scope_selects_tasks() {
        let mut owned = task("owned", TaskStatus::Todo, None);
        owned.goal_id = Some("g-1".to_string());
        let free = task("free", TaskStatus::Todo, None);

        assert!(DailyScope::Standalone.includes(&free));
        assert!(!DailyScope::Standalone.includes(&owned));
        assert!(DailyScope::Goal("g-1".to_string()).includes(&owned));
        assert!(DailyScope::All.includes(&owned) && DailyScope::All.includes(&free));
    }
}
