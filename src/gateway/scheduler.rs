//! Reminder dispatch sweep.
//!
//! Each due reminder is delivered first and only then cleared (one-time) or
//! advanced (recurring). A failed delivery leaves `next_reminder_at` as it
//! was, so the next sweep retries while the reminder is inside the grace
//! window. Candidates are handled one by one; a failure on one never stops
//! the others.
//!
//! A recurring reminder that falls behind the window is moved to its next
//! occurrence without being delivered.

use super::Gateway;
use crate::i18n;
use aide_core::domain::Task;
use aide_core::error::{AideError, ValidationError};
use aide_core::recurrence::{RecurrenceEngine, ReminderRecurrence};
use aide_memory::Owner;
use chrono::{DateTime, Duration, Utc};
use std::fmt;
use tracing::{debug, error, warn};

/// What one sweep did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SweepReport {
    pub delivered: usize,
    pub failed: usize,
    /// Recurring reminders past their `until`, not delivered.
    pub ended: usize,
    /// Delivered, but another sweep or an edit changed the row first.
    pub stale: usize,
    /// Recurring reminders that had fallen behind the window, moved forward.
    pub rescheduled: usize,
}

impl SweepReport {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

impl fmt::Display for SweepReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "delivered {}, failed {}, ended {}, stale {}, rescheduled {}",
            self.delivered, self.failed, self.ended, self.stale, self.rescheduled
        )
    }
}

impl Gateway {
    /// Run one sweep at `now`.
    pub async fn sweep(&self, now: DateTime<Utc>) -> Result<SweepReport, AideError> {
        let grace = Duration::minutes(self.scheduler_config.grace_window_minutes);
        let mut report = SweepReport::default();

        let one_time = self.store.due_one_time_reminders(now, grace).await?;
        for task in &one_time {
            self.fire_one_time(task, &mut report).await;
        }

        let recurring = self.store.due_recurring_reminders(now, grace).await?;
        for task in &recurring {
            self.fire_recurring(task, now, &mut report).await;
        }

        let missed = self.store.missed_recurring_reminders(now, grace).await?;
        for task in &missed {
            self.reschedule_missed(task, now, &mut report).await;
        }

        Ok(report)
    }

    async fn fire_one_time(&self, task: &Task, report: &mut SweepReport) {
        let Some(expected) = task.next_reminder_at else {
            return;
        };
        if let Err(e) = self.deliver_reminder(task).await {
            warn!("scheduler: reminder for task {} not delivered: {e}", task.id);
            report.failed += 1;
            return;
        }
        match self.store.clear_next_reminder(&task.id, expected).await {
            Ok(true) => report.delivered += 1,
            Ok(false) => {
                debug!("scheduler: task {} changed during delivery", task.id);
                report.stale += 1;
            }
            Err(e) => {
                error!("scheduler: failed to clear reminder for task {}: {e}", task.id);
                report.delivered += 1;
            }
        }
    }

    async fn fire_recurring(&self, task: &Task, now: DateTime<Utc>, report: &mut SweepReport) {
        let (Some(expected), Some(recurrence)) = (task.next_reminder_at, &task.reminder_recurrence)
        else {
            return;
        };
        if recurrence.has_ended(now) {
            warn!("scheduler: recurring reminder for task {} has ended, skipping", task.id);
            report.ended += 1;
            return;
        }

        if let Err(e) = self.deliver_reminder(task).await {
            warn!("scheduler: reminder for task {} not delivered: {e}", task.id);
            report.failed += 1;
            return;
        }

        let next = self.next_occurrence(task, recurrence, now).await;
        match self.store.advance_next_reminder(&task.id, expected, next).await {
            Ok(true) => report.delivered += 1,
            Ok(false) => {
                debug!("scheduler: task {} changed during delivery", task.id);
                report.stale += 1;
            }
            Err(e) => {
                error!("scheduler: failed to advance reminder for task {}: {e}", task.id);
                report.delivered += 1;
            }
        }
    }

    async fn reschedule_missed(&self, task: &Task, now: DateTime<Utc>, report: &mut SweepReport) {
        let (Some(expected), Some(recurrence)) = (task.next_reminder_at, &task.reminder_recurrence)
        else {
            return;
        };
        let next = self.next_occurrence(task, recurrence, now).await;
        match self.store.advance_next_reminder(&task.id, expected, next).await {
            Ok(true) => {
                warn!(
                    "scheduler: task {} missed its reminder at {expected}, next is {next:?}",
                    task.id
                );
                report.rescheduled += 1;
            }
            Ok(false) => report.stale += 1,
            Err(e) => error!("scheduler: failed to reschedule task {}: {e}", task.id),
        }
    }

    /// Next fire time strictly after `now` in the owner's zone. `None` once
    /// the recurrence has ended or can no longer be computed.
    async fn next_occurrence(
        &self,
        task: &Task,
        recurrence: &ReminderRecurrence,
        now: DateTime<Utc>,
    ) -> Option<DateTime<Utc>> {
        let tz = match self.store.owner_timezone(&task.owner_id).await {
            Ok(tz) => tz,
            Err(e) => {
                warn!("scheduler: owner timezone lookup failed for {}: {e}", task.owner_id);
                self.store.default_tz()
            }
        };
        match RecurrenceEngine::new(tz).next_reminder_at(recurrence, now) {
            Ok(next) => Some(next),
            Err(ValidationError::PastUntil(_)) => None,
            Err(e) => {
                warn!("scheduler: task {} has an unusable recurrence: {e}", task.id);
                None
            }
        }
    }

    async fn deliver_reminder(&self, task: &Task) -> Result<(), AideError> {
        let owner: Owner = self
            .store
            .get_owner(&task.owner_id)
            .await?
            .ok_or_else(|| AideError::NotFound(format!("owner {}", task.owner_id)))?;
        let tz = self.store.timezone_of(Some(&owner));
        let text = i18n::reminder_text(task, self.language_of(&owner), tz);
        self.notify(&owner, text).await
    }
}
