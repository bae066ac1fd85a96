//! Reminder-mode normalization for task writes.
//!
//! A task carries either a one-time reminder (`due_date` + `reminder`
//! offset) or a recurring one (`reminder_recurrence`), never both. The only
//! overlap allowed is a `nudge` recurrence anchored on a `due_date`.

use super::{calculate_one_time_reminder_at, RecurrenceKind, ReminderRecurrence};
use crate::error::ValidationError;
use crate::interval::DEFAULT_REMINDER_OFFSET;
use chrono::{DateTime, Utc};
use serde::Deserialize;

/// Reminder-related fields as supplied by a caller.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReminderPayload {
    #[serde(default, alias = "due_date")]
    pub due_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub reminder: Option<String>,
    #[serde(default, alias = "reminder_recurrence")]
    pub reminder_recurrence: Option<ReminderRecurrence>,
}

/// The single reminder mode a task is in after normalization.
#[derive(Debug, Clone, PartialEq)]
pub enum ReminderMode {
    None,
    OneTime {
        due_date: DateTime<Utc>,
        offset: String,
    },
    Recurring {
        recurrence: ReminderRecurrence,
        /// Due date carried by a nudge, used as its first fire time.
        anchor: Option<DateTime<Utc>>,
    },
}

impl ReminderMode {
    pub fn due_date(&self) -> Option<DateTime<Utc>> {
        match self {
            Self::None => None,
            Self::OneTime { due_date, .. } => Some(*due_date),
            Self::Recurring { anchor, .. } => *anchor,
        }
    }

    pub fn reminder(&self) -> Option<&str> {
        match self {
            Self::OneTime { offset, .. } => Some(offset),
            _ => None,
        }
    }

    pub fn recurrence(&self) -> Option<&ReminderRecurrence> {
        match self {
            Self::Recurring { recurrence, .. } => Some(recurrence),
            _ => None,
        }
    }
}

/// Enforce reminder-mode exclusivity before any timestamp math runs.
///
/// - `reminder` together with `reminder_recurrence` is rejected.
/// - `due_date` together with a non-nudge recurrence is rejected.
/// - A `due_date` with neither gets the default 30-minute one-time offset.
pub fn normalize_reminder_payload(payload: ReminderPayload) -> Result<ReminderMode, ValidationError> {
    let ReminderPayload {
        due_date,
        reminder,
        reminder_recurrence,
    } = payload;

    if let Some(recurrence) = reminder_recurrence {
        if reminder.is_some() {
            return Err(ValidationError::ConflictingReminderModes);
        }
        if due_date.is_some() && recurrence.kind != RecurrenceKind::Nudge {
            return Err(ValidationError::DueDateWithRecurrence(recurrence.kind.as_str()));
        }
        recurrence.schedule()?;
        return Ok(ReminderMode::Recurring {
            recurrence,
            anchor: due_date,
        });
    }

    match (due_date, reminder) {
        (None, None) => Ok(ReminderMode::None),
        (None, Some(_)) => Err(ValidationError::ReminderWithoutDueDate),
        (Some(due_date), reminder) => {
            let offset = reminder.unwrap_or_else(|| DEFAULT_REMINDER_OFFSET.to_string());
            calculate_one_time_reminder_at(due_date, &offset)?;
            Ok(ReminderMode::OneTime { due_date, offset })
        }
    }
}
