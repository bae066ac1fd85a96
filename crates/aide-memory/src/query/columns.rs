//! Per-domain column allow-lists.

use super::builder::{Column, ColumnKind};
use aide_core::domain::Domain;

pub const ID: Column = Column::new("id", ColumnKind::Text);
pub const OWNER_ID: Column = Column::new("owner_id", ColumnKind::Text);
pub const UPDATED_AT: Column = Column::new("updated_at", ColumnKind::Timestamp);

pub mod task {
    use super::*;

    pub const TEXT: Column = Column::new("text", ColumnKind::Text);
    pub const CATEGORY: Column = Column::new("category", ColumnKind::Text);
    pub const DUE_DATE: Column = Column::new("due_date", ColumnKind::Timestamp);
    pub const REMINDER: Column = Column::new("reminder", ColumnKind::Text);
    pub const REMINDER_RECURRENCE: Column =
        Column::new("reminder_recurrence", ColumnKind::Json);
    pub const NEXT_REMINDER_AT: Column = Column::new("next_reminder_at", ColumnKind::Timestamp);
    pub const COMPLETED: Column = Column::new("completed", ColumnKind::Bool);

    /// Columns whose change requires recomputing `next_reminder_at`.
    pub const REMINDER_FIELDS: [Column; 3] = [DUE_DATE, REMINDER, REMINDER_RECURRENCE];
}

pub mod contact {
    use super::*;

    pub const NAME: Column = Column::new("name", ColumnKind::Text);
    pub const EMAIL: Column = Column::new("email", ColumnKind::Text);
    pub const PHONE: Column = Column::new("phone", ColumnKind::Text);
}

pub mod list {
    use super::*;

    pub const LIST_NAME: Column = Column::new("list_name", ColumnKind::Text);
    pub const CONTENT: Column = Column::new("content", ColumnKind::Json);
    pub const IS_CHECKLIST: Column = Column::new("is_checklist", ColumnKind::Bool);
}

pub mod event {
    use super::*;

    pub const SUMMARY: Column = Column::new("summary", ColumnKind::Text);
    pub const DESCRIPTION: Column = Column::new("description", ColumnKind::Text);
    pub const START_TIME: Column = Column::new("start_time", ColumnKind::Timestamp);
    pub const END_TIME: Column = Column::new("end_time", ColumnKind::Timestamp);
}

pub mod email {
    use super::*;

    pub const SUBJECT: Column = Column::new("subject", ColumnKind::Text);
    pub const SENDER: Column = Column::new("sender", ColumnKind::Text);
    pub const RECIPIENT: Column = Column::new("recipient", ColumnKind::Text);
    pub const RECEIVED_AT: Column = Column::new("received_at", ColumnKind::Timestamp);
}

/// Columns a bulk or single update may write, per domain.
pub fn patch_columns(domain: Domain) -> &'static [Column] {
    const TASK: &[Column] = &[
        task::TEXT,
        task::CATEGORY,
        task::DUE_DATE,
        task::REMINDER,
        task::REMINDER_RECURRENCE,
        task::COMPLETED,
    ];
    const CONTACT: &[Column] = &[contact::NAME, contact::EMAIL, contact::PHONE];
    const LIST: &[Column] = &[list::LIST_NAME, list::CONTENT, list::IS_CHECKLIST];
    const EVENT: &[Column] = &[
        event::SUMMARY,
        event::DESCRIPTION,
        event::START_TIME,
        event::END_TIME,
    ];

    match domain {
        Domain::Task => TASK,
        Domain::Contact => CONTACT,
        Domain::List => LIST,
        Domain::CalendarEvent => EVENT,
        Domain::Email => &[],
    }
}

/// Columns searched by the free-text `q` filter.
pub fn search_columns(domain: Domain) -> &'static [Column] {
    match domain {
        Domain::Task => &[task::TEXT, task::CATEGORY],
        Domain::Contact => &[contact::NAME, contact::EMAIL, contact::PHONE],
        Domain::List => &[list::LIST_NAME, list::CONTENT],
        Domain::CalendarEvent => &[event::SUMMARY, event::DESCRIPTION],
        Domain::Email => &[email::SUBJECT, email::SENDER, email::RECIPIENT],
    }
}

/// The column time windows and date ranges apply to, if any.
pub fn date_column(domain: Domain) -> Option<Column> {
    match domain {
        Domain::Task => Some(task::DUE_DATE),
        Domain::CalendarEvent => Some(event::START_TIME),
        Domain::Email => Some(email::RECEIVED_AT),
        Domain::Contact | Domain::List => None,
    }
}
