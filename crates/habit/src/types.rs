use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};

use crate::recurrence::RecurrenceRule;

/// How completion of a task is recorded.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum TaskKind {
    /// Done or not done for the day.
    #[default]
    Binary,
    /// Numeric amount accumulated against a daily target.
    Quantitative,
    /// A set of named subtasks, each independently completable.
    Checklist,
}

/// One recorded history entry. The persisted value is either a completion
/// flag or a numeric amount; which one is legal depends on the task kind,
/// but this layer coerces rather than validates (the persistence layer owns
/// well-typedness).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum HistoryValue {
    Flag(bool),
    Count(f64),
}

impl HistoryValue {
    /// Numeric weight of the entry: `true` counts as 1, `false` as 0,
    /// a number as itself.
    pub fn amount(&self) -> f64 {
        match self {
            HistoryValue::Flag(true) => 1.0,
            HistoryValue::Flag(false) => 0.0,
            HistoryValue::Count(n) => *n,
        }
    }

    pub fn is_truthy(&self) -> bool {
        match self {
            HistoryValue::Flag(flag) => *flag,
            HistoryValue::Count(n) => *n != 0.0,
        }
    }
}

impl From<bool> for HistoryValue {
    fn from(flag: bool) -> Self {
        HistoryValue::Flag(flag)
    }
}

impl From<f64> for HistoryValue {
    fn from(count: f64) -> Self {
        HistoryValue::Count(count)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subtask {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub completed: bool,
}

/// One user-facing habit instance, in the shape the persistence layer loads
/// and stores it.
///
/// `history` is sparse: only dates with recorded activity carry an entry.
/// A `BTreeMap` keeps serialization order deterministic regardless of
/// insertion order.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskDefinition {
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(rename = "type", default)]
    pub kind: TaskKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    /// Legacy field from older persisted rows; the recurrence rule is
    /// authoritative.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub frequency: Option<String>,
    /// The date (inclusive) from which the recurrence is evaluated.
    #[serde(rename = "date")]
    pub start_date: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub daily_target: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub step_value: Option<f64>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub subtasks: Vec<Subtask>,
    /// `None` for malformed or legacy rows; such tasks are treated as due
    /// every day rather than rejected.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recurrence: Option<RecurrenceRule>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub history: BTreeMap<NaiveDate, HistoryValue>,
}

impl TaskDefinition {
    pub fn entry_on(&self, date: NaiveDate) -> Option<&HistoryValue> {
        self.history.get(&date)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_task_kind_wire_strings() {
        assert_eq!(
            serde_json::to_string(&TaskKind::Quantitative).unwrap(),
            "\"quantitative\""
        );
        let kind: TaskKind = serde_json::from_str("\"checklist\"").unwrap();
        assert_eq!(kind, TaskKind::Checklist);
        assert_eq!(TaskKind::Binary.to_string(), "binary");
    }

    #[test]
    fn test_history_value_coercion() {
        assert_eq!(HistoryValue::Flag(true).amount(), 1.0);
        assert_eq!(HistoryValue::Flag(false).amount(), 0.0);
        assert_eq!(HistoryValue::Count(2.5).amount(), 2.5);

        assert!(HistoryValue::Flag(true).is_truthy());
        assert!(!HistoryValue::Flag(false).is_truthy());
        assert!(HistoryValue::Count(3.0).is_truthy());
        assert!(!HistoryValue::Count(0.0).is_truthy());
    }

    #[test]
    fn test_history_value_untagged_wire() {
        let flag: HistoryValue = serde_json::from_str("true").unwrap();
        assert_eq!(flag, HistoryValue::Flag(true));

        let count: HistoryValue = serde_json::from_str("4").unwrap();
        assert_eq!(count, HistoryValue::Count(4.0));
    }

    #[test]
    fn test_task_definition_round_trip() {
        let raw = r#"{
            "id": "task-1",
            "title": "Drink water",
            "type": "quantitative",
            "category": "health",
            "date": "2024-01-05",
            "dailyTarget": 8.0,
            "unit": "glasses",
            "stepValue": 1.0,
            "history": {"2024-01-05": 8, "2024-01-06": true}
        }"#;

        let task: TaskDefinition = serde_json::from_str(raw).unwrap();
        assert_eq!(task.kind, TaskKind::Quantitative);
        assert_eq!(
            task.start_date,
            NaiveDate::from_ymd_opt(2024, 1, 5).unwrap()
        );
        assert_eq!(task.daily_target, Some(8.0));
        assert_eq!(task.history.len(), 2);

        let json = serde_json::to_value(&task).unwrap();
        assert_eq!(json["type"], "quantitative");
        assert_eq!(json["date"], "2024-01-05");
        assert_eq!(json["history"]["2024-01-06"], true);
    }

    #[test]
    fn test_task_definition_minimal_row() {
        // Oldest rows carry only an id and a date.
        let task: TaskDefinition =
            serde_json::from_str(r#"{"id": "t", "date": "2024-03-01"}"#).unwrap();
        assert_eq!(task.kind, TaskKind::Binary);
        assert!(task.recurrence.is_none());
        assert!(task.history.is_empty());
        assert!(task.subtasks.is_empty());
    }
}
