//! Completion, period progress, and streak statistics over a task's sparse
//! history map.
//!
//! Every computation takes an explicit `as_of` date so results are
//! deterministic under test; the `*_today` wrappers bind the local clock.

use chrono::{Days, NaiveDate};
use habit::{TaskDefinition, TaskKind};
use serde::Serialize;

use crate::calendar::{self, DateRange};

/// Streak and lifetime totals for one task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TaskStats {
    /// Consecutive completed days ending at `as_of` or the day before.
    pub streak: u32,
    /// Number of dates with a truthy history entry.
    pub total: u32,
}

/// Cumulative progress against a period-count target.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PeriodSummary {
    pub progress: f64,
    pub target: u32,
    pub satisfied: bool,
}

/// Whether `task` counts as completed on `date`.
///
/// Quantitative tasks compare the recorded amount against the daily target;
/// everything else is truthiness of the entry. Mis-typed history values are
/// coerced, not rejected.
pub fn is_completed_on(task: &TaskDefinition, date: NaiveDate) -> bool {
    let Some(entry) = task.entry_on(date) else {
        return false;
    };
    match (task.kind, task.daily_target) {
        (TaskKind::Quantitative, Some(target)) => entry.amount() >= target,
        _ => entry.is_truthy(),
    }
}

/// Sum of recorded amounts inside the current week or month, for tasks on a
/// weekly or monthly rule. A stored `true` counts as 1, a number as itself,
/// `false` as nothing.
///
/// The `daily_limit` flag is a recording-time rule enforced by the caller;
/// it does not change this sum.
pub fn period_progress(task: &TaskDefinition, as_of: NaiveDate) -> f64 {
    let Some(range) = period_range(task, as_of) else {
        return 0.0;
    };
    task.history
        .iter()
        .filter(|(date, value)| range.contains(**date) && value.is_truthy())
        .map(|(_, value)| value.amount())
        .sum()
}

pub fn period_progress_today(task: &TaskDefinition) -> f64 {
    period_progress(task, calendar::today())
}

/// [`period_progress`] paired with the rule's target. `None` when the task
/// has no period-count rule.
pub fn period_summary(task: &TaskDefinition, as_of: NaiveDate) -> Option<PeriodSummary> {
    let target = task.recurrence.as_ref()?.pattern.period_target()?;
    let progress = period_progress(task, as_of);
    Some(PeriodSummary {
        progress,
        target,
        satisfied: progress >= f64::from(target),
    })
}

/// Streak and total for `task`, evaluated as of the given date.
///
/// The streak anchors on `as_of` when that day is complete, otherwise on the
/// day before - an in-progress day never zeroes a streak. From the anchor it
/// walks backward one day at a time while each day is complete.
pub fn stats(task: &TaskDefinition, as_of: NaiveDate) -> TaskStats {
    let total = task.history.values().filter(|value| value.is_truthy()).count() as u32;

    let anchor = if is_completed_on(task, as_of) {
        Some(as_of)
    } else {
        as_of
            .checked_sub_days(Days::new(1))
            .filter(|yesterday| is_completed_on(task, *yesterday))
    };

    let mut streak = 0;
    if let Some(anchor) = anchor {
        let mut day = anchor;
        while is_completed_on(task, day) {
            streak += 1;
            match day.checked_sub_days(Days::new(1)) {
                Some(previous) => day = previous,
                None => break,
            }
        }
    }

    TaskStats { streak, total }
}

pub fn stats_today(task: &TaskDefinition) -> TaskStats {
    stats(task, calendar::today())
}

/// Completed and total subtask counts for a checklist task.
pub fn checklist_progress(task: &TaskDefinition) -> (u32, u32) {
    let total = task.subtasks.len() as u32;
    let done = task
        .subtasks
        .iter()
        .filter(|subtask| subtask.completed)
        .count() as u32;
    (done, total)
}

fn period_range(task: &TaskDefinition, as_of: NaiveDate) -> Option<DateRange> {
    let pattern = &task.recurrence.as_ref()?.pattern;
    if pattern.is_weekly() {
        Some(calendar::week_range(as_of))
    } else if pattern.is_monthly() {
        Some(calendar::month_range(as_of))
    } else {
        None
    }
}
