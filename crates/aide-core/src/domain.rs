//! Record kinds subject to resolution, and the records themselves.

use crate::error::ValidationError;
use crate::recurrence::ReminderRecurrence;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// One of the record kinds a user can refer to by name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Domain {
    Task,
    Contact,
    List,
    CalendarEvent,
    Email,
}

impl Domain {
    pub const ALL: [Domain; 5] = [
        Domain::Task,
        Domain::Contact,
        Domain::List,
        Domain::CalendarEvent,
        Domain::Email,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Task => "tasks",
            Self::Contact => "contacts",
            Self::List => "lists",
            Self::CalendarEvent => "calendar_events",
            Self::Email => "emails",
        }
    }

    /// Backing table name.
    pub fn table(&self) -> &'static str {
        self.as_str()
    }
}

impl fmt::Display for Domain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Domain {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "task" | "tasks" => Ok(Self::Task),
            "contact" | "contacts" => Ok(Self::Contact),
            "list" | "lists" => Ok(Self::List),
            "event" | "events" | "calendar" | "calendar_event" | "calendar_events" => {
                Ok(Self::CalendarEvent)
            }
            "email" | "emails" | "mail" => Ok(Self::Email),
            other => Err(ValidationError::UnknownDomain(other.to_string())),
        }
    }
}

/// A task, optionally carrying a one-time or recurring reminder.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: String,
    pub owner_id: String,
    pub text: String,
    pub category: Option<String>,
    pub due_date: Option<DateTime<Utc>>,
    /// Offset before `due_date` for a one-time reminder (e.g. "30 minutes").
    pub reminder: Option<String>,
    pub reminder_recurrence: Option<ReminderRecurrence>,
    pub next_reminder_at: Option<DateTime<Utc>>,
    pub completed: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Contact {
    pub id: String,
    pub owner_id: String,
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListRecord {
    pub id: String,
    pub owner_id: String,
    pub list_name: String,
    pub content: Vec<String>,
    pub is_checklist: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalendarEvent {
    pub id: String,
    pub owner_id: String,
    pub summary: String,
    pub description: Option<String>,
    pub start_time: DateTime<Utc>,
    pub end_time: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Email {
    pub id: String,
    pub owner_id: String,
    pub subject: String,
    pub sender: String,
    pub recipient: Option<String>,
    pub received_at: DateTime<Utc>,
}

/// Any record a resolution can land on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "domain", rename_all = "snake_case")]
pub enum Entity {
    Task(Task),
    Contact(Contact),
    List(ListRecord),
    CalendarEvent(CalendarEvent),
    Email(Email),
}

impl Entity {
    pub fn domain(&self) -> Domain {
        match self {
            Self::Task(_) => Domain::Task,
            Self::Contact(_) => Domain::Contact,
            Self::List(_) => Domain::List,
            Self::CalendarEvent(_) => Domain::CalendarEvent,
            Self::Email(_) => Domain::Email,
        }
    }

    pub fn id(&self) -> &str {
        match self {
            Self::Task(t) => &t.id,
            Self::Contact(c) => &c.id,
            Self::List(l) => &l.id,
            Self::CalendarEvent(e) => &e.id,
            Self::Email(m) => &m.id,
        }
    }

    /// The natural display name: what a user would call this record.
    pub fn label(&self) -> &str {
        match self {
            Self::Task(t) => &t.text,
            Self::Contact(c) => &c.name,
            Self::List(l) => &l.list_name,
            Self::CalendarEvent(e) => &e.summary,
            Self::Email(m) => &m.subject,
        }
    }

    /// Look up a named text field. Missing or null fields return `None`.
    pub fn field(&self, name: &str) -> Option<&str> {
        match (self, name) {
            (Self::Task(t), "text") => Some(&t.text),
            (Self::Task(t), "category") => t.category.as_deref(),
            (Self::Contact(c), "name") => Some(&c.name),
            (Self::Contact(c), "email") => c.email.as_deref(),
            (Self::Contact(c), "phone") => c.phone.as_deref(),
            (Self::List(l), "list_name" | "title") => Some(&l.list_name),
            (Self::CalendarEvent(e), "summary") => Some(&e.summary),
            (Self::CalendarEvent(e), "description") => e.description.as_deref(),
            (Self::Email(m), "subject") => Some(&m.subject),
            (Self::Email(m), "from" | "sender") => Some(&m.sender),
            (Self::Email(m), "to" | "recipient") => m.recipient.as_deref(),
            _ => None,
        }
    }

    pub fn reference(&self) -> EntityReference {
        let metadata = match self {
            Self::Task(t) => serde_json::json!({
                "category": t.category,
                "completed": t.completed,
            }),
            Self::Contact(c) => serde_json::json!({ "email": c.email, "phone": c.phone }),
            Self::List(l) => serde_json::json!({ "is_checklist": l.is_checklist }),
            Self::CalendarEvent(e) => serde_json::json!({ "start_time": e.start_time }),
            Self::Email(m) => serde_json::json!({ "from": m.sender }),
        };
        EntityReference {
            domain: self.domain(),
            id: Some(self.id().to_string()),
            label: self.label().to_string(),
            metadata,
        }
    }
}

/// Transient pointer to a record, produced by resolution and used to build a
/// CRUD call. Never persisted on its own.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityReference {
    pub domain: Domain,
    pub id: Option<String>,
    pub label: String,
    pub metadata: serde_json::Value,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_domain_parse_aliases() {
        assert_eq!("tasks".parse::<Domain>().unwrap(), Domain::Task);
        assert_eq!("Event".parse::<Domain>().unwrap(), Domain::CalendarEvent);
        assert_eq!("mail".parse::<Domain>().unwrap(), Domain::Email);
        assert!(matches!(
            "notes".parse::<Domain>(),
            Err(ValidationError::UnknownDomain(_))
        ));
    }

    #[test]
    fn test_entity_missing_field_is_none() {
        let contact = Entity::Contact(Contact {
            id: "c1".into(),
            owner_id: "u1".into(),
            name: "Dana".into(),
            email: None,
            phone: Some("+972501234567".into()),
        });
        assert_eq!(contact.field("name"), Some("Dana"));
        assert_eq!(contact.field("email"), None);
        assert_eq!(contact.field("subject"), None);
        assert_eq!(contact.reference().id.as_deref(), Some("c1"));
    }
}
