//! Queries behind the reminder dispatch sweep and the daily digest.
//!
//! `next_reminder_at` is the only de-duplication mechanism: after a
//! delivery the sweep clears or advances it with a compare-and-set on the
//! value it read, so a reminder handled once is not handled again.

use super::rows::{task_from_row, TaskRow, TASK_COLUMNS};
use super::Store;
use crate::query::columns::{self, task};
use crate::query::{bind_all_as, Op, QueryBuilder, QueryParam};
use aide_core::domain::Task;
use aide_core::error::AideError;
use aide_core::format_timestamp;
use chrono::{DateTime, Duration, Utc};

/// Which reminder mode a sweep query selects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ReminderKind {
    OneTime,
    Recurring,
}

fn ts(t: &DateTime<Utc>) -> QueryParam {
    QueryParam::Text(format_timestamp(t))
}

impl Store {
    /// One-time reminders whose fire time lies in `[now - grace, now]`.
    pub async fn due_one_time_reminders(
        &self,
        now: DateTime<Utc>,
        grace: Duration,
    ) -> Result<Vec<Task>, AideError> {
        self.due_reminders(ReminderKind::OneTime, now, grace).await
    }

    /// Recurring reminders whose fire time lies in `[now - grace, now]`.
    pub async fn due_recurring_reminders(
        &self,
        now: DateTime<Utc>,
        grace: Duration,
    ) -> Result<Vec<Task>, AideError> {
        self.due_reminders(ReminderKind::Recurring, now, grace).await
    }

    async fn due_reminders(
        &self,
        kind: ReminderKind,
        now: DateTime<Utc>,
        grace: Duration,
    ) -> Result<Vec<Task>, AideError> {
        let mut qb = QueryBuilder::new(0);
        qb.add_condition(task::COMPLETED, Op::Eq, QueryParam::Bool(false));
        qb.add_condition(task::NEXT_REMINDER_AT, Op::Gte, ts(&(now - grace)));
        // Upper bound is inclusive: `< now + 1s` on second-resolution text.
        qb.add_condition(
            task::NEXT_REMINDER_AT,
            Op::Lt,
            ts(&(now + Duration::seconds(1))),
        );
        let mode_sql = match kind {
            ReminderKind::OneTime => {
                qb.add_is_null(task::REMINDER_RECURRENCE);
                "due_date IS NOT NULL AND reminder IS NOT NULL"
            }
            ReminderKind::Recurring => "reminder_recurrence IS NOT NULL",
        };

        let sql = format!(
            "SELECT {TASK_COLUMNS} FROM tasks WHERE {} AND {mode_sql} ORDER BY next_reminder_at",
            qb.where_sql()
        );
        let rows: Vec<TaskRow> = bind_all_as(sqlx::query_as(&sql), qb.params())
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AideError::Memory(format!("get due reminders failed: {e}")))?;
        Ok(rows.into_iter().map(task_from_row).collect())
    }

    /// Recurring reminders whose fire time fell before `now - grace`: a sweep
    /// outage or repeated failed deliveries left them behind the window.
    pub async fn missed_recurring_reminders(
        &self,
        now: DateTime<Utc>,
        grace: Duration,
    ) -> Result<Vec<Task>, AideError> {
        let mut qb = QueryBuilder::new(0);
        qb.add_condition(task::COMPLETED, Op::Eq, QueryParam::Bool(false));
        qb.add_condition(task::NEXT_REMINDER_AT, Op::Lt, ts(&(now - grace)));

        let sql = format!(
            "SELECT {TASK_COLUMNS} FROM tasks WHERE {} AND reminder_recurrence IS NOT NULL \
             ORDER BY next_reminder_at",
            qb.where_sql()
        );
        let rows: Vec<TaskRow> = bind_all_as(sqlx::query_as(&sql), qb.params())
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AideError::Memory(format!("get missed reminders failed: {e}")))?;
        Ok(rows.into_iter().map(task_from_row).collect())
    }

    /// Clear a fired one-time reminder. Returns false when the row no longer
    /// holds `expected` (handled elsewhere, edited, or deleted).
    pub async fn clear_next_reminder(
        &self,
        task_id: &str,
        expected: DateTime<Utc>,
    ) -> Result<bool, AideError> {
        self.swap_next_reminder(task_id, expected, None).await
    }

    /// Move a fired recurring reminder to `next`, or stop it with `None`.
    pub async fn advance_next_reminder(
        &self,
        task_id: &str,
        expected: DateTime<Utc>,
        next: Option<DateTime<Utc>>,
    ) -> Result<bool, AideError> {
        self.swap_next_reminder(task_id, expected, next).await
    }

    async fn swap_next_reminder(
        &self,
        task_id: &str,
        expected: DateTime<Utc>,
        next: Option<DateTime<Utc>>,
    ) -> Result<bool, AideError> {
        let mut qb = QueryBuilder::new(0);
        qb.add_assignment(
            task::NEXT_REMINDER_AT,
            next.as_ref().map_or(QueryParam::Null, ts),
        );
        qb.add_raw_assignment(columns::UPDATED_AT, "datetime('now')");
        qb.add_condition(columns::ID, Op::Eq, QueryParam::Text(task_id.to_string()));
        qb.add_condition(task::NEXT_REMINDER_AT, Op::Eq, ts(&expected));

        let sql = format!("UPDATE tasks SET {} WHERE {}", qb.set_sql(), qb.where_sql());
        let affected = self
            .execute(&sql, qb.params(), "update next_reminder_at")
            .await?;
        Ok(affected == 1)
    }

    /// Incomplete, non-recurring tasks due before `until` (overdue ones
    /// included), earliest first.
    pub async fn tasks_for_digest(
        &self,
        owner_id: &str,
        until: DateTime<Utc>,
    ) -> Result<Vec<Task>, AideError> {
        let mut qb = QueryBuilder::new(0);
        qb.add_condition(columns::OWNER_ID, Op::Eq, QueryParam::Text(owner_id.to_string()));
        qb.add_condition(task::COMPLETED, Op::Eq, QueryParam::Bool(false));
        qb.add_is_null(task::REMINDER_RECURRENCE);
        qb.add_condition(task::DUE_DATE, Op::Lt, ts(&until));

        let sql = format!(
            "SELECT {TASK_COLUMNS} FROM tasks WHERE {} ORDER BY due_date, rowid",
            qb.where_sql()
        );
        let rows: Vec<TaskRow> = bind_all_as(sqlx::query_as(&sql), qb.params())
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AideError::Memory(format!("get digest tasks failed: {e}")))?;
        Ok(rows.into_iter().map(task_from_row).collect())
    }
}
