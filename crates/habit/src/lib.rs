pub mod error;
pub mod recurrence;
pub mod template;
pub mod types;

pub use error::{HabitError, HabitResult};
pub use recurrence::{MonthAnchor, RecurrenceEnd, RecurrencePattern, RecurrenceRule};
pub use template::{Phase, TaskBlueprint, TemplateTasks, VersionedTemplate, DEFAULT_PHASE_DAYS};
pub use types::{HistoryValue, Subtask, TaskDefinition, TaskKind};
