//! Format helpers for reminder and digest messages.

use super::t;
use aide_core::domain::Task;
use aide_core::message::Language;
use chrono::{DateTime, Utc};
use chrono_tz::Tz;

fn local_stamp(ts: &DateTime<Utc>, tz: Tz, lang: Language) -> String {
    let local = ts.with_timezone(&tz);
    match lang {
        Language::Hebrew => local.format("%d/%m %H:%M").to_string(),
        Language::English => local.format("%a %d %b %H:%M").to_string(),
    }
}

/// Text of a fired reminder. One-time reminders mention the due time.
pub fn reminder_text(task: &Task, lang: Language, tz: Tz) -> String {
    let label = t("reminder", lang);
    match (&task.due_date, &task.reminder_recurrence) {
        (Some(due), None) => format!(
            "⏰ {label}: {}\n{}: {}",
            task.text,
            t("due", lang),
            local_stamp(due, tz, lang)
        ),
        _ => format!("⏰ {label}: {}", task.text),
    }
}

/// The daily digest: tasks due today in owner-local time, overdue ones
/// marked. `day_start` is the owner's local midnight as UTC.
pub fn digest_text(tasks: &[Task], lang: Language, tz: Tz, day_start: DateTime<Utc>) -> String {
    let mut out = String::from(t("digest_header", lang));
    for task in tasks {
        let line = match task.due_date {
            Some(due) if due < day_start => format!(
                "• {} ({}, {})",
                task.text,
                t("overdue", lang),
                local_stamp(&due, tz, lang)
            ),
            Some(due) => format!(
                "• {} {}",
                due.with_timezone(&tz).format("%H:%M"),
                task.text
            ),
            None => format!("• {} ({})", task.text, t("no_time", lang)),
        };
        out.push('\n');
        out.push_str(&line);
    }
    out
}
