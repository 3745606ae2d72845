//! Expands a plan template's ordered phases into concrete task instances
//! when a user enrolls.
//!
//! Phases are contiguous: each starts exactly where the previous one ends,
//! so instance dates come from cumulative day offsets against the enrollment
//! date. Expansion is deterministic - identical phases and enrollment date
//! always produce identical output - which is what makes caller-side retries
//! safe. Fresh row identifiers are the persistence layer's job.

use chrono::{Days, NaiveDate};
use habit::{
    Phase, RecurrencePattern, RecurrenceRule, Subtask, TaskBlueprint, TaskKind, TemplateTasks,
};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::error::TemplateError;

/// A task blueprint bound to concrete dates by phase expansion, in the shape
/// the caller persists.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskInstance {
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
    pub daily_target: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub step_value: Option<f64>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub subtasks: Vec<Subtask>,
    /// The phase's computed start date.
    #[serde(rename = "date")]
    pub start_date: NaiveDate,
    /// The blueprint's rule, terminated at the phase boundary.
    pub recurrence: RecurrenceRule,
    pub phase_id: String,
    pub phase_name: String,
    pub phase_order: u32,
    pub phase_days: u32,
    pub phase_start_date: NaiveDate,
    pub phase_end_date: NaiveDate,
}

/// Instantiate every blueprint of every phase against an enrollment date.
///
/// Each phase starts at `enrollment_start` plus the durations of all phases
/// before it and ends `days - 1` later (inclusive). Every instance's
/// recurrence is truncated to the phase boundary: the phase duration wins
/// even over a blueprint rule that says "never end". An empty phase list
/// yields an empty vector.
pub fn expand(phases: &[Phase], enrollment_start: NaiveDate) -> Vec<TaskInstance> {
    let mut instances = Vec::new();
    let mut cumulative_days = 0u64;

    for (order, phase) in phases.iter().enumerate() {
        let days = phase.duration_days();
        let phase_start = add_days(enrollment_start, cumulative_days);
        let phase_end = add_days(phase_start, u64::from(days.saturating_sub(1)));

        for blueprint in &phase.tasks {
            instances.push(instantiate(
                blueprint,
                phase,
                order as u32,
                days,
                phase_start,
                phase_end,
            ));
        }

        cumulative_days += u64::from(days);
    }

    tracing::debug!(
        phases = phases.len(),
        instances = instances.len(),
        total_days = cumulative_days,
        "expanded plan phases"
    );

    instances
}

/// Parse a template's raw `tasks` value (either accepted layout), validate
/// it, and expand it. The boundary entry point for enrollment handlers.
pub fn expand_template(
    raw: &serde_json::Value,
    enrollment_start: NaiveDate,
) -> Result<Vec<TaskInstance>, TemplateError> {
    let template: TemplateTasks = serde_json::from_value(raw.clone())?;
    if matches!(template, TemplateTasks::Legacy(_)) {
        tracing::trace!("legacy flat task array, wrapping in a single implicit phase");
    }

    let phases = template.normalize();
    for phase in &phases {
        phase.validate()?;
    }

    Ok(expand(&phases, enrollment_start))
}

fn instantiate(
    blueprint: &TaskBlueprint,
    phase: &Phase,
    phase_order: u32,
    phase_days: u32,
    phase_start: NaiveDate,
    phase_end: NaiveDate,
) -> TaskInstance {
    // Phase duration wins over whatever terminator the blueprint carried. A
    // blueprint without a rule gains a daily one so the boundary still holds.
    let recurrence = match &blueprint.recurrence {
        Some(rule) => RecurrenceRule::new(rule.pattern.clone()).until(phase_end),
        None => RecurrenceRule::new(RecurrencePattern::Daily).until(phase_end),
    };

    TaskInstance {
        id: blueprint.id.clone(),
        title: blueprint.title.clone(),
        kind: blueprint.kind,
        category: blueprint.category.clone(),
        time: blueprint.time.clone(),
        daily_target: blueprint.daily_target,
        unit: blueprint.unit.clone(),
        step_value: blueprint.step_value,
        subtasks: blueprint.subtasks.clone(),
        start_date: phase_start,
        recurrence,
        phase_id: phase.id.clone(),
        phase_name: phase.name.clone(),
        phase_order,
        phase_days,
        phase_start_date: phase_start,
        phase_end_date: phase_end,
    }
}

fn add_days(date: NaiveDate, days: u64) -> NaiveDate {
    date.checked_add_days(Days::new(days)).unwrap_or(NaiveDate::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn phase(id: &str, days: Option<u32>, titles: &[&str]) -> Phase {
        Phase {
            id: id.to_string(),
            name: format!("Phase {id}"),
            days,
            tasks: titles
                .iter()
                .map(|title| TaskBlueprint {
                    id: format!("bp-{title}"),
                    title: title.to_string(),
                    kind: TaskKind::Binary,
                    category: None,
                    time: None,
                    daily_target: None,
                    unit: None,
                    step_value: None,
                    subtasks: Vec::new(),
                    recurrence: None,
                })
                .collect(),
        }
    }

    #[test]
    fn test_empty_phases_yield_no_instances() {
        assert!(expand(&[], date(2024, 1, 1)).is_empty());
    }

    #[test]
    fn test_phase_dates_accumulate() {
        let phases = vec![phase("p1", Some(7), &["A"]), phase("p2", Some(10), &["B"])];
        let instances = expand(&phases, date(2024, 1, 1));

        assert_eq!(instances.len(), 2);
        assert_eq!(instances[0].phase_start_date, date(2024, 1, 1));
        assert_eq!(instances[0].phase_end_date, date(2024, 1, 7));
        assert_eq!(instances[1].phase_start_date, date(2024, 1, 8));
        assert_eq!(instances[1].phase_end_date, date(2024, 1, 17));
        assert_eq!(instances[1].phase_order, 1);
    }

    #[test]
    fn test_omitted_days_default_to_a_week() {
        let phases = vec![phase("p1", None, &["A"]), phase("p2", Some(3), &["B"])];
        let instances = expand(&phases, date(2024, 6, 1));

        assert_eq!(instances[0].phase_days, 7);
        assert_eq!(instances[1].phase_start_date, date(2024, 6, 8));
    }

    #[test]
    fn test_blueprint_without_rule_gains_bounded_daily() {
        let phases = vec![phase("p1", Some(3), &["A"])];
        let instances = expand(&phases, date(2024, 3, 1));

        let rule = &instances[0].recurrence;
        assert_eq!(rule.pattern, RecurrencePattern::Daily);
        assert_eq!(rule.end, habit::RecurrenceEnd::Until(date(2024, 3, 3)));
    }
}
