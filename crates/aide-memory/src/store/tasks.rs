//! Task CRUD. Every write that touches reminder fields runs payload
//! normalization and the recurrence engine, and persists `next_reminder_at`.

use super::bulk::BulkOutcome;
use super::rows::{task_from_row, TaskRow, TASK_COLUMNS};
use super::Store;
use crate::query::columns::{self, task};
use crate::query::{patch_assignments, Column, Op, QueryBuilder, QueryParam};
use aide_core::domain::{Domain, Task};
use aide_core::error::{AideError, ValidationError};
use aide_core::recurrence::{
    normalize_reminder_payload, RecurrenceEngine, ReminderMode, ReminderPayload,
    ReminderRecurrence,
};
use aide_core::{format_timestamp, parse_timestamp};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::{Map, Value};
use tracing::{debug, info};
use uuid::Uuid;

/// A task as supplied by a caller.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewTask {
    pub text: String,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(flatten)]
    pub reminder: ReminderPayload,
}

impl NewTask {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Self::default()
        }
    }
}

fn ts_param(ts: Option<DateTime<Utc>>) -> QueryParam {
    ts.map_or(QueryParam::Null, |t| QueryParam::Text(format_timestamp(&t)))
}

fn recurrence_json(rec: Option<&ReminderRecurrence>) -> Result<Option<String>, AideError> {
    Ok(rec.map(serde_json::to_string).transpose()?)
}

/// Combine a patch with the stored task into the reminder payload the task
/// would have afterwards.
///
/// Naming a non-null `reminder_recurrence` without `reminder` drops the
/// stored one-time offset, and vice versa. Clearing `due_date` without
/// naming `reminder` drops the offset too. Conflicts named inside the patch
/// itself are left for normalization to reject.
pub(crate) fn merged_reminder_payload(
    current: &Task,
    patch: &Map<String, Value>,
) -> Result<ReminderPayload, ValidationError> {
    let sets = |key: &str| patch.get(key).is_some_and(|v| !v.is_null());
    let clears = |key: &str| patch.get(key).is_some_and(Value::is_null);

    let due_date = match patch.get("due_date") {
        None => current.due_date,
        Some(Value::Null) => None,
        Some(v) => Some(
            v.as_str()
                .and_then(parse_timestamp)
                .ok_or_else(|| ValidationError::InvalidTimestamp(v.to_string()))?,
        ),
    };

    let reminder_recurrence = match patch.get("reminder_recurrence") {
        Some(Value::Null) => None,
        Some(v) => Some(
            serde_json::from_value::<ReminderRecurrence>(v.clone())
                .map_err(|e| ValidationError::InvalidRecurrence(e.to_string()))?,
        ),
        None if sets("reminder") => None,
        None => current.reminder_recurrence.clone(),
    };

    let reminder = match patch.get("reminder") {
        Some(Value::Null) => None,
        Some(Value::String(s)) => Some(s.clone()),
        Some(other) => return Err(ValidationError::InvalidInterval(other.to_string())),
        None if sets("reminder_recurrence") || clears("due_date") => None,
        None => current.reminder.clone(),
    };

    Ok(ReminderPayload {
        due_date,
        reminder,
        reminder_recurrence,
    })
}

impl Store {
    async fn engine_for(&self, owner_id: &str) -> Result<RecurrenceEngine, AideError> {
        Ok(RecurrenceEngine::new(self.owner_timezone(owner_id).await?))
    }

    /// Create a task. The reminder payload is normalized first, so invalid
    /// or contradictory reminders never reach storage.
    pub async fn create_task(
        &self,
        owner_id: &str,
        new: NewTask,
        now: DateTime<Utc>,
    ) -> Result<Task, AideError> {
        let text = new.text.trim().to_string();
        if text.is_empty() {
            return Err(ValidationError::Other("task text must not be empty".to_string()).into());
        }

        let mode = normalize_reminder_payload(new.reminder)?;
        let next_reminder_at = self.engine_for(owner_id).await?.next_for_mode(&mode, now)?;

        let task = Task {
            id: Uuid::new_v4().to_string(),
            owner_id: owner_id.to_string(),
            text,
            category: new.category.filter(|c| !c.trim().is_empty()),
            due_date: mode.due_date(),
            reminder: mode.reminder().map(str::to_string),
            reminder_recurrence: mode.recurrence().cloned(),
            next_reminder_at,
            completed: false,
        };

        sqlx::query(
            "INSERT INTO tasks (id, owner_id, text, category, due_date, reminder, \
                 reminder_recurrence, next_reminder_at) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, json(?7), ?8)",
        )
        .bind(&task.id)
        .bind(&task.owner_id)
        .bind(&task.text)
        .bind(&task.category)
        .bind(task.due_date.as_ref().map(format_timestamp))
        .bind(&task.reminder)
        .bind(recurrence_json(task.reminder_recurrence.as_ref())?)
        .bind(task.next_reminder_at.as_ref().map(format_timestamp))
        .execute(&self.pool)
        .await
        .map_err(|e| AideError::Memory(format!("create task failed: {e}")))?;

        info!("task {} created for {owner_id}", task.id);
        Ok(task)
    }

    /// Create several tasks. Succeeds only when every item does.
    pub async fn create_tasks(
        &self,
        owner_id: &str,
        items: Vec<NewTask>,
        now: DateTime<Utc>,
    ) -> BulkOutcome {
        let mut outcome = BulkOutcome::default();
        for item in items {
            let label = item.text.clone();
            match self.create_task(owner_id, item, now).await {
                Ok(task) => outcome.succeeded.push(task.id),
                Err(e) => outcome.push_error(label, &e),
            }
        }
        outcome.success = outcome.errors.is_empty();
        outcome
    }

    pub async fn get_task(&self, owner_id: &str, id: &str) -> Result<Option<Task>, AideError> {
        let row: Option<TaskRow> = sqlx::query_as(&format!(
            "SELECT {TASK_COLUMNS} FROM tasks WHERE id = ?1 AND owner_id = ?2"
        ))
        .bind(id)
        .bind(owner_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AideError::Memory(format!("get task failed: {e}")))?;
        Ok(row.map(task_from_row))
    }

    /// Update one task by id.
    ///
    /// Keys outside the task allow-list are dropped. When reminder fields
    /// change, the patch is merged with the stored row, normalized, and
    /// `next_reminder_at` recomputed; a malformed reminder field rejects the
    /// whole update.
    pub async fn update_task(
        &self,
        owner_id: &str,
        id: &str,
        patch: &Map<String, Value>,
        now: DateTime<Utc>,
    ) -> Result<Task, AideError> {
        let current = self
            .get_task(owner_id, id)
            .await?
            .ok_or_else(|| AideError::NotFound(format!("task {id}")))?;
        let assignments = patch_assignments(patch, columns::patch_columns(Domain::Task));
        self.apply_task_patch(&current, patch, &assignments, now)
            .await
    }

    /// Write pre-validated `assignments` to one task. Reminder columns are
    /// never written as given: they are re-derived from the merged payload.
    pub(crate) async fn apply_task_patch(
        &self,
        current: &Task,
        patch: &Map<String, Value>,
        assignments: &[(Column, QueryParam)],
        now: DateTime<Utc>,
    ) -> Result<Task, AideError> {
        // Read from the patch itself: a malformed reminder value that the
        // assignment filter dropped must still be rejected.
        let touches_reminder = task::REMINDER_FIELDS
            .iter()
            .any(|c| patch.contains_key(c.name()));

        let mut qb = QueryBuilder::new(0);
        for (column, param) in assignments {
            if !task::REMINDER_FIELDS.contains(column) {
                qb.add_assignment(*column, param.clone());
            }
        }

        if touches_reminder {
            let mode = normalize_reminder_payload(merged_reminder_payload(current, patch)?)?;
            let next = self
                .engine_for(&current.owner_id)
                .await?
                .next_for_mode(&mode, now)?;
            add_reminder_assignments(&mut qb, &mode, next)?;
        }

        if qb.assignment_count() == 0 {
            debug!("task {}: patch changes nothing", current.id);
            return Ok(current.clone());
        }

        qb.add_raw_assignment(columns::UPDATED_AT, "datetime('now')");
        qb.add_condition(columns::ID, Op::Eq, QueryParam::Text(current.id.clone()));
        qb.add_condition(
            columns::OWNER_ID,
            Op::Eq,
            QueryParam::Text(current.owner_id.clone()),
        );
        let sql = format!("UPDATE tasks SET {} WHERE {}", qb.set_sql(), qb.where_sql());
        let affected = self.execute(&sql, qb.params(), "update task").await?;
        if affected == 0 {
            return Err(AideError::NotFound(format!("task {}", current.id)));
        }

        self.get_task(&current.owner_id, &current.id)
            .await?
            .ok_or_else(|| AideError::NotFound(format!("task {}", current.id)))
    }

    /// Mark a task done. A completed task never reminds again.
    pub async fn complete_task(&self, owner_id: &str, id: &str) -> Result<Task, AideError> {
        let affected = sqlx::query(
            "UPDATE tasks SET completed = 1, next_reminder_at = NULL, \
                 updated_at = datetime('now') \
             WHERE id = ?1 AND owner_id = ?2",
        )
        .bind(id)
        .bind(owner_id)
        .execute(&self.pool)
        .await
        .map_err(|e| AideError::Memory(format!("complete task failed: {e}")))?
        .rows_affected();
        if affected == 0 {
            return Err(AideError::NotFound(format!("task {id}")));
        }
        self.get_task(owner_id, id)
            .await?
            .ok_or_else(|| AideError::NotFound(format!("task {id}")))
    }

    /// Delete a task. Returns false when no such task exists for the owner.
    pub async fn delete_task(&self, owner_id: &str, id: &str) -> Result<bool, AideError> {
        let result = sqlx::query("DELETE FROM tasks WHERE id = ?1 AND owner_id = ?2")
            .bind(id)
            .bind(owner_id)
            .execute(&self.pool)
            .await
            .map_err(|e| AideError::Memory(format!("delete task failed: {e}")))?;
        Ok(result.rows_affected() > 0)
    }
}

fn add_reminder_assignments(
    qb: &mut QueryBuilder,
    mode: &ReminderMode,
    next: Option<DateTime<Utc>>,
) -> Result<(), AideError> {
    qb.add_assignment(task::DUE_DATE, ts_param(mode.due_date()));
    qb.add_assignment(
        task::REMINDER,
        mode.reminder()
            .map_or(QueryParam::Null, |r| QueryParam::Text(r.to_string())),
    );
    let recurrence = match mode.recurrence() {
        Some(rec) => QueryParam::Json(serde_json::to_value(rec)?),
        None => QueryParam::Null,
    };
    qb.add_assignment(task::REMINDER_RECURRENCE, recurrence);
    qb.add_assignment(task::NEXT_REMINDER_AT, ts_param(next));
    Ok(())
}
