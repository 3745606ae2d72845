pub mod calendar;
pub mod error;
pub mod expansion;
pub mod progress;
pub mod recurrence;

pub use calendar::{DateRange, NthWeekdayInfo};
pub use error::TemplateError;
pub use expansion::{expand, expand_template, TaskInstance};
pub use progress::{PeriodSummary, TaskStats};
pub use recurrence::{due_dates_between, is_due, is_due_today};
