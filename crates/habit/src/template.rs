use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::recurrence::RecurrenceRule;
use crate::types::{Subtask, TaskKind};

/// Duration assumed for a phase that omits `days`.
pub const DEFAULT_PHASE_DAYS: u32 = 7;

/// An un-instantiated task belonging to a phase. It has no start date and no
/// history; both are bound at expansion time.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct TaskBlueprint {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(rename = "type", default)]
    pub kind: TaskKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(range(min = 0.0))]
    pub daily_target: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub step_value: Option<f64>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub subtasks: Vec<Subtask>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recurrence: Option<RecurrenceRule>,
}

/// An ordered, day-bounded segment of a multi-stage plan template.
///
/// Phases are contiguous: each one starts exactly where the previous one
/// ends, so only the duration is stored.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct Phase {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
    /// Duration in days. Omitted in older templates; treated as one week.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(range(min = 1))]
    pub days: Option<u32>,
    #[serde(default)]
    #[validate(nested)]
    pub tasks: Vec<TaskBlueprint>,
}

impl Phase {
    pub fn duration_days(&self) -> u32 {
        self.days.unwrap_or(DEFAULT_PHASE_DAYS)
    }

    /// The single phase a legacy flat task array collapses into.
    pub fn implicit(tasks: Vec<TaskBlueprint>) -> Self {
        Phase {
            id: "default".to_string(),
            name: String::new(),
            days: None,
            tasks,
        }
    }
}

/// The versioned template layout with explicit ordered phases.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VersionedTemplate {
    pub version: String,
    #[serde(default)]
    pub phases: Vec<Phase>,
}

/// The two accepted wire layouts for a template's `tasks` column.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TemplateTasks {
    /// Older templates persisted a flat list of blueprints.
    Legacy(Vec<TaskBlueprint>),
    /// `{version: "2.0", phases: [...]}`.
    Versioned(VersionedTemplate),
}

impl TemplateTasks {
    /// Collapse both accepted layouts into the canonical phase list, so the
    /// expander only ever sees one shape. A legacy flat array becomes a
    /// single implicit phase.
    pub fn normalize(self) -> Vec<Phase> {
        match self {
            TemplateTasks::Legacy(tasks) => vec![Phase::implicit(tasks)],
            TemplateTasks::Versioned(template) => template.phases,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_legacy_flat_array_parses() {
        let raw = r#"[{"title": "Stretch", "type": "binary"}]"#;
        let template: TemplateTasks = serde_json::from_str(raw).unwrap();

        let phases = template.normalize();
        assert_eq!(phases.len(), 1);
        assert_eq!(phases[0].id, "default");
        assert_eq!(phases[0].duration_days(), DEFAULT_PHASE_DAYS);
        assert_eq!(phases[0].tasks.len(), 1);
        assert_eq!(phases[0].tasks[0].title, "Stretch");
    }

    #[test]
    fn test_versioned_template_parses() {
        let raw = r#"{
            "version": "2.0",
            "phases": [
                {"id": "p1", "name": "Foundation", "days": 14, "tasks": []},
                {"id": "p2", "name": "Build", "tasks": []}
            ]
        }"#;
        let template: TemplateTasks = serde_json::from_str(raw).unwrap();

        let phases = template.normalize();
        assert_eq!(phases.len(), 2);
        assert_eq!(phases[0].duration_days(), 14);
        // Omitted days falls back to one week.
        assert_eq!(phases[1].duration_days(), DEFAULT_PHASE_DAYS);
    }

    #[test]
    fn test_empty_phase_list_normalizes_to_empty() {
        let raw = r#"{"version": "2.0", "phases": []}"#;
        let template: TemplateTasks = serde_json::from_str(raw).unwrap();
        assert!(template.normalize().is_empty());
    }

    #[test]
    fn test_zero_day_phase_fails_validation() {
        use validator::Validate;

        let phase: Phase =
            serde_json::from_str(r#"{"id": "p", "name": "Bad", "days": 0, "tasks": []}"#).unwrap();
        assert!(phase.validate().is_err());
    }

    #[test]
    fn test_negative_daily_target_fails_validation() {
        use validator::Validate;

        let raw = r#"{"id": "p", "name": "Hydrate", "tasks": [
            {"title": "Water", "type": "quantitative", "dailyTarget": -2.0}
        ]}"#;
        let phase: Phase = serde_json::from_str(raw).unwrap();
        assert!(phase.validate().is_err());
    }
}
