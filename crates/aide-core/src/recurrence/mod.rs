//! Reminder recurrence: the persisted payload shape and the next-fire math.
//!
//! Weekday numbers follow the Sunday-start week used by the window
//! resolver: 0 = Sunday … 6 = Saturday. Calendar times (`HH:MM`) are taken
//! in the recurrence's own timezone, falling back to the engine default.

mod payload;

#[cfg(test)]
mod tests;

pub use payload::{normalize_reminder_payload, ReminderMode, ReminderPayload};

use crate::error::ValidationError;
use crate::interval::{parse_interval, parse_nudge_interval, DEFAULT_NUDGE_INTERVAL};
use chrono::{DateTime, Datelike, Days, Duration, Months, NaiveDate, NaiveTime, TimeZone, Timelike, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecurrenceKind {
    Daily,
    Weekly,
    Monthly,
    Nudge,
}

impl RecurrenceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Daily => "daily",
            Self::Weekly => "weekly",
            Self::Monthly => "monthly",
            Self::Nudge => "nudge",
        }
    }
}

/// Recurrence document stored alongside a task (`reminder_recurrence`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReminderRecurrence {
    #[serde(rename = "type")]
    pub kind: RecurrenceKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub days: Option<Vec<u8>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub day_of_month: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interval: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub until: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timezone: Option<String>,
}

impl ReminderRecurrence {
    /// Bare recurrence of the given kind; callers fill in the fields.
    pub fn new(kind: RecurrenceKind) -> Self {
        Self {
            kind,
            time: None,
            days: None,
            day_of_month: None,
            interval: None,
            until: None,
            timezone: None,
        }
    }

    /// Validate the required fields for this kind and produce a schedule.
    pub fn schedule(&self) -> Result<Schedule, ValidationError> {
        let kind = self.kind.as_str();
        let time = || -> Result<NaiveTime, ValidationError> {
            let raw = self
                .time
                .as_deref()
                .ok_or(ValidationError::MissingRecurrenceField { kind, field: "time" })?;
            parse_time_of_day(raw)
        };

        match self.kind {
            RecurrenceKind::Daily => Ok(Schedule::Daily { time: time()? }),
            RecurrenceKind::Weekly => {
                let days = self.days.as_deref().unwrap_or_default();
                if days.is_empty() {
                    return Err(ValidationError::MissingRecurrenceField { kind, field: "days" });
                }
                if let Some(bad) = days.iter().find(|d| **d > 6) {
                    return Err(ValidationError::InvalidWeekday(*bad));
                }
                Ok(Schedule::Weekly {
                    days: days.iter().copied().collect(),
                    time: time()?,
                })
            }
            RecurrenceKind::Monthly => {
                let day = self.day_of_month.ok_or(ValidationError::MissingRecurrenceField {
                    kind,
                    field: "dayOfMonth",
                })?;
                if !(1..=31).contains(&day) {
                    return Err(ValidationError::InvalidDayOfMonth(day));
                }
                Ok(Schedule::Monthly {
                    day: u32::from(day),
                    time: time()?,
                })
            }
            RecurrenceKind::Nudge => {
                let raw = self.interval.as_deref().unwrap_or(DEFAULT_NUDGE_INTERVAL);
                Ok(Schedule::Nudge {
                    every: parse_nudge_interval(raw)?,
                })
            }
        }
    }

    /// Resolve the recurrence timezone, or `default` when unset.
    pub fn tz(&self, default: Tz) -> Result<Tz, ValidationError> {
        match self.timezone.as_deref() {
            None | Some("") => Ok(default),
            Some(name) => name
                .parse::<Tz>()
                .map_err(|_| ValidationError::InvalidTimezone(name.to_string())),
        }
    }

    /// True once `until` lies in the past.
    pub fn has_ended(&self, now: DateTime<Utc>) -> bool {
        self.until.is_some_and(|until| until < now)
    }
}

/// A validated recurrence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Schedule {
    Daily { time: NaiveTime },
    Weekly { days: BTreeSet<u8>, time: NaiveTime },
    Monthly { day: u32, time: NaiveTime },
    Nudge { every: Duration },
}

/// Parse `HH:MM` (seconds tolerated).
pub fn parse_time_of_day(raw: &str) -> Result<NaiveTime, ValidationError> {
    let raw = raw.trim();
    NaiveTime::parse_from_str(raw, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(raw, "%H:%M:%S"))
        .map_err(|_| ValidationError::InvalidTime(raw.to_string()))
}

/// Next-fire computation for recurring and one-time reminders.
///
/// One implementation serves both the full task flow and callers that must
/// not produce nudges (`without_nudge`).
#[derive(Debug, Clone, Copy)]
pub struct RecurrenceEngine {
    default_tz: Tz,
    allow_nudge: bool,
}

impl Default for RecurrenceEngine {
    fn default() -> Self {
        Self::new(Tz::UTC)
    }
}

impl RecurrenceEngine {
    pub fn new(default_tz: Tz) -> Self {
        Self {
            default_tz,
            allow_nudge: true,
        }
    }

    /// Disable the `nudge` kind: such recurrences fail validation.
    pub fn without_nudge(mut self) -> Self {
        self.allow_nudge = false;
        self
    }

    pub fn default_tz(&self) -> Tz {
        self.default_tz
    }

    /// Next absolute fire time strictly after `now`.
    ///
    /// Fails when required fields are missing or when the result would fall
    /// after `until`.
    pub fn next_reminder_at(
        &self,
        recurrence: &ReminderRecurrence,
        now: DateTime<Utc>,
    ) -> Result<DateTime<Utc>, ValidationError> {
        let schedule = recurrence.schedule()?;
        let tz = recurrence.tz(self.default_tz)?;

        let next = match schedule {
            Schedule::Daily { time } => next_daily(tz, time, now),
            Schedule::Weekly { days, time } => next_weekly(tz, &days, time, now),
            Schedule::Monthly { day, time } => next_monthly(tz, day, time, now),
            Schedule::Nudge { every } => {
                if !self.allow_nudge {
                    return Err(ValidationError::NudgeNotSupported);
                }
                truncate_to_minute(now)
                    .checked_add_signed(every)
                    .ok_or_else(|| ValidationError::InvalidInterval(format!("{} minutes", every.num_minutes())))?
            }
        };

        match recurrence.until {
            Some(until) if next > until => Err(ValidationError::PastUntil(
                crate::format_timestamp(&until),
            )),
            _ => Ok(next),
        }
    }

    /// Next fire time for whichever reminder mode a task carries.
    ///
    /// A recurrence that has run past `until` yields `None` rather than an
    /// error: the task simply stops reminding.
    pub fn next_for_mode(
        &self,
        mode: &ReminderMode,
        now: DateTime<Utc>,
    ) -> Result<Option<DateTime<Utc>>, ValidationError> {
        match mode {
            ReminderMode::None => Ok(None),
            ReminderMode::OneTime { due_date, offset } => {
                calculate_one_time_reminder_at(*due_date, offset).map(Some)
            }
            ReminderMode::Recurring { recurrence, anchor } => {
                // A nudge may start at its due date.
                if let Some(anchor) = anchor.filter(|a| *a > now) {
                    recurrence.schedule()?;
                    if recurrence.until.is_some_and(|until| anchor > until) {
                        return Ok(None);
                    }
                    return Ok(Some(anchor));
                }
                match self.next_reminder_at(recurrence, now) {
                    Ok(next) => Ok(Some(next)),
                    Err(ValidationError::PastUntil(_)) => Ok(None),
                    Err(e) => Err(e),
                }
            }
        }
    }
}

/// Next fire time using UTC for calendar times without an explicit zone.
pub fn calculate_next_reminder_at(
    recurrence: &ReminderRecurrence,
    now: DateTime<Utc>,
) -> Result<DateTime<Utc>, ValidationError> {
    RecurrenceEngine::default().next_reminder_at(recurrence, now)
}

/// `due_date - offset`, with the offset parsed from the interval vocabulary.
pub fn calculate_one_time_reminder_at(
    due_date: DateTime<Utc>,
    offset: &str,
) -> Result<DateTime<Utc>, ValidationError> {
    due_date
        .checked_sub_signed(parse_interval(offset)?)
        .ok_or_else(|| ValidationError::InvalidInterval(offset.to_string()))
}

fn truncate_to_minute(ts: DateTime<Utc>) -> DateTime<Utc> {
    ts.with_second(0)
        .and_then(|t| t.with_nanosecond(0))
        .unwrap_or(ts)
}

/// `date` at `time` in `tz`. Times skipped by a DST jump move forward to the
/// first valid instant.
fn at_local(tz: Tz, date: NaiveDate, time: NaiveTime) -> DateTime<Utc> {
    let mut naive = date.and_time(time);
    for _ in 0..4 {
        if let Some(ts) = tz.from_local_datetime(&naive).earliest() {
            return ts.with_timezone(&Utc);
        }
        naive += Duration::minutes(30);
    }
    naive.and_utc()
}

fn next_daily(tz: Tz, time: NaiveTime, now: DateTime<Utc>) -> DateTime<Utc> {
    let today = now.with_timezone(&tz).date_naive();
    let candidate = at_local(tz, today, time);
    if candidate > now {
        candidate
    } else {
        at_local(tz, today + Days::new(1), time)
    }
}

fn next_weekly(tz: Tz, days: &BTreeSet<u8>, time: NaiveTime, now: DateTime<Utc>) -> DateTime<Utc> {
    let today = now.with_timezone(&tz).date_naive();
    // Offset 7 covers "today qualifies but the time has passed".
    for offset in 0..=7u64 {
        let date = today + Days::new(offset);
        let weekday = date.weekday().num_days_from_sunday() as u8;
        if days.contains(&weekday) {
            let candidate = at_local(tz, date, time);
            if candidate > now {
                return candidate;
            }
        }
    }
    // Unreachable with a validated, non-empty day set: wrap to the earliest
    // weekday of next week.
    let next_sunday = 7 - u64::from(today.weekday().num_days_from_sunday());
    let first = u64::from(days.iter().next().copied().unwrap_or(0));
    at_local(tz, today + Days::new(next_sunday + first), time)
}

fn next_monthly(tz: Tz, day: u32, time: NaiveTime, now: DateTime<Utc>) -> DateTime<Utc> {
    let today = now.with_timezone(&tz).date_naive();
    let this_month = clamp_day(today.year(), today.month(), day);
    let candidate = at_local(tz, this_month, time);
    if candidate > now {
        return candidate;
    }
    let first_of_next = first_of_month(today.year(), today.month()) + Months::new(1);
    at_local(
        tz,
        clamp_day(first_of_next.year(), first_of_next.month(), day),
        time,
    )
}

fn first_of_month(year: i32, month: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, 1).unwrap_or(NaiveDate::MIN)
}

/// Number of days in the given month (leap years included).
pub fn days_in_month(year: i32, month: u32) -> u32 {
    let first = first_of_month(year, month);
    let next = first + Months::new(1);
    (next - first).num_days() as u32
}

/// `day` in the given month, clamped to the month's last day.
fn clamp_day(year: i32, month: u32, day: u32) -> NaiveDate {
    let day = day.min(days_in_month(year, month));
    NaiveDate::from_ymd_opt(year, month, day).unwrap_or_else(|| first_of_month(year, month))
}
