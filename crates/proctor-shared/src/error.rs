use thiserror::Error;

/// A string did not name any variant of a closed enum.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Invalid {kind}: {value}")]
pub struct ParseEnumError {
    /// Human-readable name of the enum, e.g. "resource type".
    pub kind: &'static str,
    /// The rejected input.
    pub value: String,
}

impl ParseEnumError {
    pub fn new(kind: &'static str, value: impl Into<String>) -> Self {
        Self {
            kind,
            value: value.into(),
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ScheduleError {
    #[error("Invalid day: {0} (expected YYYY-MM-DD)")]
    InvalidDay(String),

    #[error("Slot index {0} is outside the day")]
    SlotOutOfRange(u32),

    #[error("Local time does not exist in the schedule time zone")]
    NonexistentLocalTime,
}
