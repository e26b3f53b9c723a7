//! Goal progress aggregation.

use chrono::{DateTime, Utc};

use crate::model::{Goal, GoalStatus, Task};

/// Completion counts for one goal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Counts {
    pub total: usize,
    pub done: usize,
}

impl Counts {
    pub fn of(tasks: &[Task]) -> Self {
        Self {
            total: tasks.len(),
            done: tasks.iter().filter(|t| t.status.is_done()).count(),
        }
    }

    /// `round(100 * done / total)`, or `None` when there are no tasks.
    pub fn percent(self) -> Option<u8> {
        if self.total == 0 {
            return None;
        }
        let pct = (100.0 * self.done as f64 / self.total as f64).round();
        Some(pct.clamp(0.0, 100.0) as u8)
    }
}

/// Recompute `goal.progress` and its active/completed status.
///
/// With no tasks the goal is left untouched. Otherwise any status,
/// including paused or abandoned, is replaced by active or completed.
/// Returns true when progress or status changed.
pub fn recompute(goal: &mut Goal, counts: Counts, now: DateTime<Utc>) -> bool {
    let Some(progress) = counts.percent() else {
        return false;
    };
    let status = if progress >= 100 {
        GoalStatus::Completed
    } else {
        GoalStatus::Active
    };
    if goal.progress == progress && goal.status == status {
        return false;
    }

    tracing::debug!(
        goal = %goal.id,
        done = counts.done,
        total = counts.total,
        progress,
        status = %status,
        "goal progress recomputed"
    );
    goal.progress = progress;
    goal.status = status;
    goal.updated_at = now;
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    fn goal(status: GoalStatus, progress: u8) -> Goal {
        let now = Utc::now();
        Goal {
            id: "g-1".to_string(),
            title: "Ship".to_string(),
            description: None,
            category: None,
            target_date: None,
            status,
            progress,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn rounds_to_nearest_percent() {
        assert_eq!(Counts { total: 3, done: 2 }.percent(), Some(67));
        assert_eq!(Counts { total: 3, done: 1 }.percent(), Some(33));
        assert_eq!(Counts { total: 8, done: 1 }.percent(), Some(13));
        assert_eq!(Counts { total: 0, done: 0 }.percent(), None);
    }

    #[test]
    fn empty_goal_is_untouched() {
        let mut g = goal(GoalStatus::Paused, 40);
        assert!(!recompute(&mut g, Counts::default(), Utc::now()));
        assert_eq!(g.progress, 40);
        assert_eq!(g.status, GoalStatus::Paused);
    }

    #[test]
    fn full_completion_marks_goal_completed() {
        let mut g = goal(GoalStatus::Active, 0);
        assert!(recompute(&mut g, Counts { total: 2, done: 2 }, Utc::now()));
        assert_eq!(g.progress, 100);
        assert_eq!(g.status, GoalStatus::Completed);

        assert!(recompute(&mut g, Counts { total: 3, done: 2 }, Utc::now()));
        assert_eq!(g.status, GoalStatus::Active);
    }

    #[test]
    fn paused_goal_is_overwritten() {
        let mut g = goal(GoalStatus::Paused, 0);
        recompute(&mut g, Counts { total: 4, done: 1 }, Utc::now());
        assert_eq!(g.status, GoalStatus::Active);
        assert_eq!(g.progress, 25);
    }
}
