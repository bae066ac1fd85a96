//! Time words inside a calendar query ("standup tomorrow", "הפגישה מחר").

use aide_core::window::{TimeRange, Window};
use chrono::{DateTime, Utc};
use chrono_tz::Tz;

/// Multi-word phrases come before their single-word parts.
const PHRASES: &[(&str, Window)] = &[
    ("next week", Window::NextWeek),
    ("this week", Window::ThisWeek),
    ("today's", Window::Today),
    ("tomorrow's", Window::Tomorrow),
    ("today", Window::Today),
    ("tonight", Window::Today),
    ("tomorrow", Window::Tomorrow),
    ("בשבוע הבא", Window::NextWeek),
    ("שבוע הבא", Window::NextWeek),
    ("בשבוע הזה", Window::ThisWeek),
    ("השבוע", Window::ThisWeek),
    ("היום", Window::Today),
    ("הערב", Window::Today),
    ("מחר", Window::Tomorrow),
];

/// Find a time phrase in `query`, resolve it against `now` in `tz`, and
/// return the range with the phrase removed from the query.
pub fn extract_time_range(query: &str, now: DateTime<Utc>, tz: Tz) -> (Option<TimeRange>, String) {
    let padded = format!(" {} ", crate::similarity::normalize(query));
    for (phrase, window) in PHRASES {
        let needle = format!(" {phrase} ");
        if padded.contains(&needle) {
            let rest = padded.replacen(&needle, " ", 1);
            return (Some(window.resolve(now, tz)), rest.trim().to_string());
        }
    }
    (None, padded.trim().to_string())
}
