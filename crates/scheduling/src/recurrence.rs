//! Decides whether a task is due on a given calendar date.

use chrono::{Datelike, NaiveDate};
use habit::{MonthAnchor, RecurrencePattern, RecurrenceRule, TaskDefinition};

use crate::calendar::{self, DateRange};

/// Whether `task` is due on `date`.
///
/// Period-count tasks are never due on a specific day; they are tracked
/// through cumulative progress instead (see [`crate::progress`]). A task
/// without a recurrence rule is due every day, so malformed legacy rows stay
/// visible instead of silently disappearing.
pub fn is_due(task: &TaskDefinition, date: NaiveDate) -> bool {
    match &task.recurrence {
        Some(rule) => rule_is_due(rule, task.start_date, date),
        None => true,
    }
}

pub fn is_due_today(task: &TaskDefinition) -> bool {
    is_due(task, calendar::today())
}

/// All due dates of `task` within an inclusive range, in ascending order.
pub fn due_dates_between(task: &TaskDefinition, range: DateRange) -> Vec<NaiveDate> {
    range.iter().filter(|date| is_due(task, *date)).collect()
}

fn rule_is_due(rule: &RecurrenceRule, start_date: NaiveDate, date: NaiveDate) -> bool {
    if rule.ended_by(date) {
        return false;
    }

    match &rule.pattern {
        RecurrencePattern::WeeklyPeriod { .. } | RecurrencePattern::MonthlyPeriod { .. } => false,
        RecurrencePattern::Once => date == start_date,
        // No interval concept: every day matches.
        RecurrencePattern::Daily => true,
        RecurrencePattern::Weekly { week_days } => {
            let weekday = calendar::weekday_index(date);
            week_days.iter().any(|day| u32::from(*day) == weekday)
        }
        RecurrencePattern::Monthly {
            month_anchor: MonthAnchor::Date,
        } => {
            // Literal day-of-month equality: a task anchored on the 31st is
            // simply not due in shorter months.
            date.day() == start_date.day()
        }
        RecurrencePattern::Monthly {
            month_anchor: MonthAnchor::Day,
        } => {
            let anchor = calendar::nth_weekday_info(start_date);
            let candidate = calendar::nth_weekday_info(date);
            // Raw occurrence-number comparison. A month with a fifth
            // occurrence can miss an anchor that only had four; `is_last`
            // is deliberately not consulted.
            candidate.week_num == anchor.week_num && candidate.weekday == anchor.weekday
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use habit::RecurrenceEnd;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn task_with(rule: Option<RecurrenceRule>, start: NaiveDate) -> TaskDefinition {
        TaskDefinition {
            id: "t".to_string(),
            title: "Test task".to_string(),
            kind: habit::TaskKind::Binary,
            category: None,
            frequency: None,
            start_date: start,
            time: None,
            daily_target: None,
            unit: None,
            step_value: None,
            subtasks: Vec::new(),
            recurrence: rule,
            history: std::collections::BTreeMap::new(),
        }
    }

    #[test]
    fn test_missing_rule_is_always_due() {
        let task = task_with(None, date(2024, 1, 1));
        assert!(is_due(&task, date(2023, 6, 1)));
        assert!(is_due(&task, date(2024, 1, 1)));
        assert!(is_due(&task, date(2030, 12, 31)));
    }

    #[test]
    fn test_once_due_only_on_start_date() {
        let task = task_with(Some(RecurrenceRule::once()), date(2024, 2, 10));
        assert!(is_due(&task, date(2024, 2, 10)));
        assert!(!is_due(&task, date(2024, 2, 9)));
        assert!(!is_due(&task, date(2024, 2, 11)));
    }

    #[test]
    fn test_daily_rule_every_day() {
        let task = task_with(Some(RecurrenceRule::daily()), date(2024, 1, 1));
        for offset in [0u64, 1, 30, 365] {
            let day = date(2024, 1, 1)
                .checked_add_days(chrono::Days::new(offset))
                .unwrap();
            assert!(is_due(&task, day));
        }
    }

    #[test]
    fn test_end_date_is_inclusive() {
        let rule = RecurrenceRule::daily().until(date(2024, 3, 3));
        let task = task_with(Some(rule), date(2024, 3, 1));
        assert!(is_due(&task, date(2024, 3, 3)));
        assert!(!is_due(&task, date(2024, 3, 4)));
        assert_eq!(
            task.recurrence.as_ref().unwrap().end,
            RecurrenceEnd::Until(date(2024, 3, 3))
        );
    }

    #[test]
    fn test_monthly_day_anchor_matches_same_slot() {
        // 2024-01-12 is the second Friday of January.
        let rule = RecurrenceRule::monthly(MonthAnchor::Day);
        let task = task_with(Some(rule), date(2024, 1, 12));

        // 2024-02-09 is the second Friday of February.
        assert!(is_due(&task, date(2024, 2, 9)));
        // First and third Fridays do not match.
        assert!(!is_due(&task, date(2024, 2, 2)));
        assert!(!is_due(&task, date(2024, 2, 16)));
        // Same occurrence slot on a different weekday does not match.
        assert!(!is_due(&task, date(2024, 2, 8)));
    }

    #[test]
    fn test_due_dates_between_sweep() {
        let task = task_with(Some(RecurrenceRule::weekly(vec![2])), date(2024, 1, 1));
        let dates = due_dates_between(
            &task,
            DateRange::new(date(2024, 1, 1), date(2024, 1, 31)),
        );
        // Tuesdays of January 2024.
        assert_eq!(
            dates,
            vec![
                date(2024, 1, 2),
                date(2024, 1, 9),
                date(2024, 1, 16),
                date(2024, 1, 23),
                date(2024, 1, 30),
            ]
        );
    }
}
