use thiserror::Error;

pub type HabitResult<T> = Result<T, HabitError>;

#[derive(Error, Debug)]
pub enum HabitError {
    #[error("Invalid recurrence rule: {0}")]
    InvalidRecurrence(String),

    #[error("Invalid weekday index {0} - expected 0 (Sunday) through 6 (Saturday)")]
    InvalidWeekday(u8),
}
