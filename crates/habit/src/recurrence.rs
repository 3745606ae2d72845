use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};

use crate::error::{HabitError, HabitResult};

/// How a monthly recurrence anchors to its start date.
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
pub enum MonthAnchor {
    /// Same day-of-month as the start date.
    #[default]
    Date,
    /// Same nth-weekday-of-month as the start date ("first Friday").
    Day,
}

/// When a recurrence stops applying. `Until` is inclusive.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum RecurrenceEnd {
    #[default]
    Never,
    Until(NaiveDate),
}

/// The schedule a task follows. Each variant carries only the fields it
/// needs, so consumers match instead of probing optional fields.
///
/// The period variants are not pinned to calendar days: completion is a
/// cumulative count within the rolling week or month, and they are never
/// "due" on a specific date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum RecurrencePattern {
    Once,
    Daily,
    Weekly {
        /// Weekday indices, 0 = Sunday through 6 = Saturday.
        week_days: Vec<u8>,
    },
    WeeklyPeriod {
        period_target: u32,
        daily_limit: bool,
    },
    Monthly {
        month_anchor: MonthAnchor,
    },
    MonthlyPeriod {
        period_target: u32,
        daily_limit: bool,
    },
}

impl RecurrencePattern {
    pub fn is_period_count(&self) -> bool {
        matches!(
            self,
            RecurrencePattern::WeeklyPeriod { .. } | RecurrencePattern::MonthlyPeriod { .. }
        )
    }

    /// Count required per period, for the period variants.
    pub fn period_target(&self) -> Option<u32> {
        match self {
            RecurrencePattern::WeeklyPeriod { period_target, .. }
            | RecurrencePattern::MonthlyPeriod { period_target, .. } => Some(*period_target),
            _ => None,
        }
    }

    /// Whether at most one count increment per calendar day applies toward
    /// the period target. Enforced by the recording layer, carried here.
    pub fn daily_limit(&self) -> bool {
        match self {
            RecurrencePattern::WeeklyPeriod { daily_limit, .. }
            | RecurrencePattern::MonthlyPeriod { daily_limit, .. } => *daily_limit,
            _ => false,
        }
    }

    pub fn is_weekly(&self) -> bool {
        matches!(
            self,
            RecurrencePattern::Weekly { .. } | RecurrencePattern::WeeklyPeriod { .. }
        )
    }

    pub fn is_monthly(&self) -> bool {
        matches!(
            self,
            RecurrencePattern::Monthly { .. } | RecurrencePattern::MonthlyPeriod { .. }
        )
    }
}

/// A task's full recurrence rule.
///
/// On the wire this is the flat legacy object
/// `{type, mode, weekDays, monthType, periodTarget, dailyLimit, endType,
/// endDate}`; conversion and validation happen exactly once here, so the
/// rest of the codebase only ever sees well-formed rules.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RecurrenceWire", into = "RecurrenceWire")]
pub struct RecurrenceRule {
    pub pattern: RecurrencePattern,
    pub end: RecurrenceEnd,
}

impl RecurrenceRule {
    pub fn new(pattern: RecurrencePattern) -> Self {
        RecurrenceRule {
            pattern,
            end: RecurrenceEnd::Never,
        }
    }

    pub fn once() -> Self {
        Self::new(RecurrencePattern::Once)
    }

    pub fn daily() -> Self {
        Self::new(RecurrencePattern::Daily)
    }

    pub fn weekly(week_days: Vec<u8>) -> Self {
        Self::new(RecurrencePattern::Weekly { week_days })
    }

    pub fn weekly_count(period_target: u32, daily_limit: bool) -> Self {
        Self::new(RecurrencePattern::WeeklyPeriod {
            period_target,
            daily_limit,
        })
    }

    pub fn monthly(month_anchor: MonthAnchor) -> Self {
        Self::new(RecurrencePattern::Monthly { month_anchor })
    }

    pub fn monthly_count(period_target: u32, daily_limit: bool) -> Self {
        Self::new(RecurrencePattern::MonthlyPeriod {
            period_target,
            daily_limit,
        })
    }

    /// Terminate the rule at `end_date` (inclusive).
    pub fn until(mut self, end_date: NaiveDate) -> Self {
        self.end = RecurrenceEnd::Until(end_date);
        self
    }

    /// True once `date` is past an inclusive end date.
    pub fn ended_by(&self, date: NaiveDate) -> bool {
        match self.end {
            RecurrenceEnd::Never => false,
            RecurrenceEnd::Until(end_date) => date > end_date,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
enum WireKind {
    Once,
    #[default]
    Daily,
    Weekly,
    Monthly,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
enum WireMode {
    /// Fixed calendar days.
    #[default]
    Days,
    /// Cumulative count per rolling period.
    Count,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
enum WireEnd {
    #[default]
    Never,
    Date,
}

/// The flat persisted shape, optional fields and all.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RecurrenceWire {
    #[serde(rename = "type", default)]
    kind: WireKind,
    #[serde(default)]
    mode: WireMode,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    week_days: Vec<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    month_type: Option<MonthAnchor>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    period_target: Option<u32>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    daily_limit: bool,
    #[serde(default)]
    end_type: WireEnd,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    end_date: Option<NaiveDate>,
}

impl TryFrom<RecurrenceWire> for RecurrenceRule {
    type Error = HabitError;

    fn try_from(wire: RecurrenceWire) -> Result<Self, Self::Error> {
        let end = match (wire.end_type, wire.end_date) {
            (WireEnd::Never, _) => RecurrenceEnd::Never,
            (WireEnd::Date, Some(end_date)) => RecurrenceEnd::Until(end_date),
            (WireEnd::Date, None) => {
                return Err(HabitError::InvalidRecurrence(
                    "endType is \"date\" but endDate is missing".into(),
                ));
            }
        };

        let pattern = match (wire.kind, wire.mode) {
            (WireKind::Once, WireMode::Days) => RecurrencePattern::Once,
            (WireKind::Daily, WireMode::Days) => RecurrencePattern::Daily,
            (WireKind::Weekly, WireMode::Days) => {
                if let Some(bad) = wire.week_days.iter().find(|d| **d > 6) {
                    return Err(HabitError::InvalidWeekday(*bad));
                }
                RecurrencePattern::Weekly {
                    week_days: wire.week_days,
                }
            }
            (WireKind::Monthly, WireMode::Days) => RecurrencePattern::Monthly {
                month_anchor: wire.month_type.unwrap_or_default(),
            },
            (WireKind::Weekly, WireMode::Count) => RecurrencePattern::WeeklyPeriod {
                period_target: required_target(wire.period_target)?,
                daily_limit: wire.daily_limit,
            },
            (WireKind::Monthly, WireMode::Count) => RecurrencePattern::MonthlyPeriod {
                period_target: required_target(wire.period_target)?,
                daily_limit: wire.daily_limit,
            },
            (WireKind::Once, WireMode::Count) | (WireKind::Daily, WireMode::Count) => {
                return Err(HabitError::InvalidRecurrence(
                    "count mode requires a weekly or monthly recurrence".into(),
                ));
            }
        };

        Ok(RecurrenceRule { pattern, end })
    }
}

fn required_target(period_target: Option<u32>) -> HabitResult<u32> {
    match period_target {
        Some(0) => Err(HabitError::InvalidRecurrence(
            "periodTarget must be at least 1".into(),
        )),
        Some(target) => Ok(target),
        None => Err(HabitError::InvalidRecurrence(
            "count mode requires periodTarget".into(),
        )),
    }
}

impl From<RecurrenceRule> for RecurrenceWire {
    fn from(rule: RecurrenceRule) -> Self {
        let (end_type, end_date) = match rule.end {
            RecurrenceEnd::Never => (WireEnd::Never, None),
            RecurrenceEnd::Until(end_date) => (WireEnd::Date, Some(end_date)),
        };

        let mut wire = RecurrenceWire {
            kind: WireKind::Daily,
            mode: WireMode::Days,
            week_days: Vec::new(),
            month_type: None,
            period_target: None,
            daily_limit: false,
            end_type,
            end_date,
        };

        match rule.pattern {
            RecurrencePattern::Once => wire.kind = WireKind::Once,
            RecurrencePattern::Daily => wire.kind = WireKind::Daily,
            RecurrencePattern::Weekly { week_days } => {
                wire.kind = WireKind::Weekly;
                wire.week_days = week_days;
            }
            RecurrencePattern::WeeklyPeriod {
                period_target,
                daily_limit,
            } => {
                wire.kind = WireKind::Weekly;
                wire.mode = WireMode::Count;
                wire.period_target = Some(period_target);
                wire.daily_limit = daily_limit;
            }
            RecurrencePattern::Monthly { month_anchor } => {
                wire.kind = WireKind::Monthly;
                wire.month_type = Some(month_anchor);
            }
            RecurrencePattern::MonthlyPeriod {
                period_target,
                daily_limit,
            } => {
                wire.kind = WireKind::Monthly;
                wire.mode = WireMode::Count;
                wire.period_target = Some(period_target);
                wire.daily_limit = daily_limit;
            }
        }

        wire
    }
}
