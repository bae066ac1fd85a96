//! Row tuples and their conversion into domain records.

use aide_core::domain::{CalendarEvent, Contact, Domain, Email, Entity, ListRecord, Task};
use aide_core::parse_timestamp;
use aide_core::recurrence::ReminderRecurrence;
use chrono::{DateTime, Utc};
use tracing::warn;

pub(crate) const TASK_COLUMNS: &str = "id, owner_id, text, category, due_date, reminder, \
     reminder_recurrence, next_reminder_at, completed";
pub(crate) const CONTACT_COLUMNS: &str = "id, owner_id, name, email, phone";
pub(crate) const LIST_COLUMNS: &str = "id, owner_id, list_name, content, is_checklist";
pub(crate) const EVENT_COLUMNS: &str = "id, owner_id, summary, description, start_time, end_time";
pub(crate) const EMAIL_COLUMNS: &str = "id, owner_id, subject, sender, recipient, received_at";

pub(crate) type TaskRow = (
    String,
    String,
    String,
    Option<String>,
    Option<String>,
    Option<String>,
    Option<String>,
    Option<String>,
    bool,
);
pub(crate) type ContactRow = (String, String, String, Option<String>, Option<String>);
pub(crate) type ListRow = (String, String, String, String, bool);
pub(crate) type EventRow = (String, String, String, Option<String>, String, Option<String>);
pub(crate) type EmailRow = (String, String, String, String, Option<String>, String);

/// Column list for `SELECT`s against a domain's table.
pub(crate) fn select_columns(domain: Domain) -> &'static str {
    match domain {
        Domain::Task => TASK_COLUMNS,
        Domain::Contact => CONTACT_COLUMNS,
        Domain::List => LIST_COLUMNS,
        Domain::CalendarEvent => EVENT_COLUMNS,
        Domain::Email => EMAIL_COLUMNS,
    }
}

/// Stable retrieval order per domain.
pub(crate) fn order_by(domain: Domain) -> &'static str {
    match domain {
        Domain::CalendarEvent => "start_time, rowid",
        Domain::Email => "received_at DESC, rowid",
        _ => "rowid",
    }
}

fn optional_ts(id: &str, field: &str, raw: Option<String>) -> Option<DateTime<Utc>> {
    let raw = raw?;
    let parsed = parse_timestamp(&raw);
    if parsed.is_none() {
        warn!("row {id}: unparseable {field} '{raw}', treated as empty");
    }
    parsed
}

pub(crate) fn task_from_row(row: TaskRow) -> Task {
    let (id, owner_id, text, category, due_date, reminder, recurrence, next_reminder_at, completed) =
        row;
    let reminder_recurrence = recurrence.and_then(|raw| {
        serde_json::from_str::<ReminderRecurrence>(&raw)
            .map_err(|e| warn!("task {id}: unreadable reminder_recurrence: {e}"))
            .ok()
    });
    Task {
        due_date: optional_ts(&id, "due_date", due_date),
        next_reminder_at: optional_ts(&id, "next_reminder_at", next_reminder_at),
        id,
        owner_id,
        text,
        category,
        reminder,
        reminder_recurrence,
        completed,
    }
}

pub(crate) fn contact_from_row(row: ContactRow) -> Contact {
    let (id, owner_id, name, email, phone) = row;
    Contact {
        id,
        owner_id,
        name,
        email,
        phone,
    }
}

pub(crate) fn list_from_row(row: ListRow) -> ListRecord {
    let (id, owner_id, list_name, content, is_checklist) = row;
    let content = serde_json::from_str::<Vec<String>>(&content).unwrap_or_else(|e| {
        warn!("list {id}: unreadable content: {e}");
        Vec::new()
    });
    ListRecord {
        id,
        owner_id,
        list_name,
        content,
        is_checklist,
    }
}

/// `None` when the mandatory start time cannot be read.
pub(crate) fn event_from_row(row: EventRow) -> Option<CalendarEvent> {
    let (id, owner_id, summary, description, start_time, end_time) = row;
    let Some(start) = parse_timestamp(&start_time) else {
        warn!("event {id}: unparseable start_time '{start_time}', skipped");
        return None;
    };
    Some(CalendarEvent {
        end_time: optional_ts(&id, "end_time", end_time),
        id,
        owner_id,
        summary,
        description,
        start_time: start,
    })
}

pub(crate) fn email_from_row(row: EmailRow) -> Option<Email> {
    let (id, owner_id, subject, sender, recipient, received_at) = row;
    let Some(received) = parse_timestamp(&received_at) else {
        warn!("email {id}: unparseable received_at '{received_at}', skipped");
        return None;
    };
    Some(Email {
        id,
        owner_id,
        subject,
        sender,
        recipient,
        received_at: received,
    })
}

pub(crate) fn wrap_tasks(rows: Vec<TaskRow>) -> Vec<Entity> {
    rows.into_iter()
        .map(|r| Entity::Task(task_from_row(r)))
        .collect()
}

pub(crate) fn wrap_contacts(rows: Vec<ContactRow>) -> Vec<Entity> {
    rows.into_iter()
        .map(|r| Entity::Contact(contact_from_row(r)))
        .collect()
}

pub(crate) fn wrap_lists(rows: Vec<ListRow>) -> Vec<Entity> {
    rows.into_iter()
        .map(|r| Entity::List(list_from_row(r)))
        .collect()
}

pub(crate) fn wrap_events(rows: Vec<EventRow>) -> Vec<Entity> {
    rows.into_iter()
        .filter_map(event_from_row)
        .map(Entity::CalendarEvent)
        .collect()
}

pub(crate) fn wrap_emails(rows: Vec<EmailRow>) -> Vec<Entity> {
    rows.into_iter()
        .filter_map(email_from_row)
        .map(Entity::Email)
        .collect()
}
