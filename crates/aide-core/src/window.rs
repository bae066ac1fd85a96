//! Semantic time windows ("today", "next_week", ...) resolved to absolute
//! `[from, to)` ranges.
//!
//! Weeks start on **Sunday**. `this_week` covers only what is left of the
//! current week (from now until the coming Sunday 00:00), while `next_week`
//! is the full Sunday-to-Sunday week after it. The asymmetry is intentional.

use chrono::{DateTime, Datelike, Days, NaiveDate, TimeZone, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// A half-open absolute range. `from: None` means unbounded in the past.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeRange {
    pub from: Option<DateTime<Utc>>,
    pub to: DateTime<Utc>,
}

impl TimeRange {
    pub fn contains(&self, ts: &DateTime<Utc>) -> bool {
        self.from.is_none_or(|from| *ts >= from) && *ts < self.to
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Window {
    Today,
    Tomorrow,
    ThisWeek,
    NextWeek,
    Overdue,
}

impl FromStr for Window {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "today" => Ok(Self::Today),
            "tomorrow" => Ok(Self::Tomorrow),
            "this_week" => Ok(Self::ThisWeek),
            "next_week" => Ok(Self::NextWeek),
            "overdue" => Ok(Self::Overdue),
            _ => Err(()),
        }
    }
}

impl Window {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Today => "today",
            Self::Tomorrow => "tomorrow",
            Self::ThisWeek => "this_week",
            Self::NextWeek => "next_week",
            Self::Overdue => "overdue",
        }
    }

    /// Anchor this window on `now`, with day boundaries taken in `tz`.
    pub fn resolve(&self, now: DateTime<Utc>, tz: Tz) -> TimeRange {
        let today = now.with_timezone(&tz).date_naive();
        let day = |offset: u64| local_midnight(tz, today + Days::new(offset));
        // Days until the coming Sunday: 7 when today is Sunday.
        let to_sunday = 7 - u64::from(today.weekday().num_days_from_sunday());

        match self {
            Self::Today => TimeRange {
                from: Some(day(0)),
                to: day(1),
            },
            Self::Tomorrow => TimeRange {
                from: Some(day(1)),
                to: day(2),
            },
            Self::ThisWeek => TimeRange {
                from: Some(now),
                to: day(to_sunday),
            },
            Self::NextWeek => TimeRange {
                from: Some(day(to_sunday)),
                to: day(to_sunday + 7),
            },
            Self::Overdue => TimeRange {
                from: None,
                to: day(0),
            },
        }
    }
}

/// Resolve a window token. Unknown tokens yield `None`, meaning "no date
/// restriction from the window alone".
pub fn resolve_window(token: &str, now: DateTime<Utc>, tz: Tz) -> Option<TimeRange> {
    token.parse::<Window>().ok().map(|w| w.resolve(now, tz))
}

/// First instant of `date` in `tz`, as UTC.
///
/// Zones that skip midnight for DST get the first valid instant after it.
pub fn local_midnight(tz: Tz, date: NaiveDate) -> DateTime<Utc> {
    let mut naive = date.and_time(chrono::NaiveTime::MIN);
    for _ in 0..4 {
        if let Some(ts) = tz.from_local_datetime(&naive).earliest() {
            return ts.with_timezone(&Utc);
        }
        naive += chrono::Duration::minutes(30);
    }
    naive.and_utc()
}
