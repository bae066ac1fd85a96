use thiserror::Error;

/// Top-level error type for aide.
#[derive(Debug, Error)]
pub enum AideError {
    /// Caller-supplied data failed validation.
    #[error("validation error: {0}")]
    Validation(#[from] ValidationError),

    /// A referenced record does not exist for this owner.
    #[error("not found: {0}")]
    NotFound(String),

    /// Storage error.
    #[error("memory error: {0}")]
    Memory(String),

    /// Error from a notification channel.
    #[error("channel error: {0}")]
    Channel(String),

    /// Configuration error.
    #[error("config error: {0}")]
    Config(String),

    /// I/O error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// A structured, human-readable validation failure.
///
/// These never escape as faults: callers always get them back inside a
/// `Result` and can show the message to the user.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("recurrence type '{kind}' requires '{field}'")]
    MissingRecurrenceField {
        kind: &'static str,
        field: &'static str,
    },

    #[error("invalid recurrence: {0}")]
    InvalidRecurrence(String),

    #[error("invalid time of day '{0}', expected HH:MM")]
    InvalidTime(String),

    #[error("invalid weekday {0}, expected 0 (Sunday) to 6 (Saturday)")]
    InvalidWeekday(u8),

    #[error("invalid day of month {0}, expected 1 to 31")]
    InvalidDayOfMonth(u8),

    #[error("invalid interval '{0}'")]
    InvalidInterval(String),

    #[error("nudge interval must be at least 1 minute, got '{0}'")]
    IntervalTooShort(String),

    #[error("nudge reminders are not supported here")]
    NudgeNotSupported,

    #[error("unknown timezone '{0}'")]
    InvalidTimezone(String),

    #[error("invalid timestamp '{0}'")]
    InvalidTimestamp(String),

    #[error("a task cannot have both a one-time reminder and a recurring reminder")]
    ConflictingReminderModes,

    #[error("a due date can only be combined with a 'nudge' recurrence, not '{0}'")]
    DueDateWithRecurrence(&'static str),

    #[error("a reminder interval requires a due date")]
    ReminderWithoutDueDate,

    #[error("next reminder would fall after the recurrence end ({0})")]
    PastUntil(String),

    #[error("refusing to {0} without a filter; pass a filter or use preview")]
    UnfilteredBulkOperation(&'static str),

    #[error("unknown domain '{0}'")]
    UnknownDomain(String),

    #[error("{0}")]
    Other(String),
}
