//! Daily digest: once per owner-local day, at or after the configured hour.

use super::Gateway;
use crate::i18n;
use aide_core::error::AideError;
use aide_core::window::local_midnight;
use aide_memory::Owner;
use chrono::{DateTime, Days, Timelike, Utc};
use tracing::{debug, warn};

impl Gateway {
    /// Send every owner whose local clock has reached the digest hour and
    /// who has not had today's digest yet. Returns how many were sent.
    pub async fn digest_tick(&self, now: DateTime<Utc>) -> Result<usize, AideError> {
        let mut sent = 0;
        for owner in self.store.list_owners().await? {
            match self.send_digest(&owner, now).await {
                Ok(true) => sent += 1,
                Ok(false) => {}
                Err(e) => warn!("digest: owner {} not served: {e}", owner.id),
            }
        }
        Ok(sent)
    }

    /// Ok(true) when a message went out. Owners with nothing due get no
    /// message, but the day still counts as done.
    async fn send_digest(&self, owner: &Owner, now: DateTime<Utc>) -> Result<bool, AideError> {
        let tz = self.store.timezone_of(Some(owner));
        let local = now.with_timezone(&tz);
        if local.hour() < self.digest_config.hour {
            return Ok(false);
        }
        let today = local.date_naive();
        if owner.last_digest_on.is_some_and(|d| d >= today) {
            return Ok(false);
        }

        let day_start = local_midnight(tz, today);
        let day_end = today
            .checked_add_days(Days::new(1))
            .map_or(day_start + chrono::Duration::days(1), |d| local_midnight(tz, d));
        let tasks = self.store.tasks_for_digest(&owner.id, day_end).await?;

        if tasks.is_empty() {
            debug!("digest: nothing due for {}", owner.id);
            self.store.mark_digest_sent(&owner.id, today).await?;
            return Ok(false);
        }

        let text = i18n::digest_text(&tasks, self.language_of(owner), tz, day_start);
        self.notify(owner, text).await?;
        self.store.mark_digest_sent(&owner.id, today).await?;
        Ok(true)
    }
}
