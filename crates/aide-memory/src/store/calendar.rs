//! Locally mirrored calendar events. A sync job writes them here; the
//! resolver only reads.

use super::Store;
use aide_core::domain::CalendarEvent;
use aide_core::error::AideError;
use aide_core::format_timestamp;

impl Store {
    /// Insert or replace a mirrored event, keyed by its external id.
    pub async fn upsert_event(&self, event: &CalendarEvent) -> Result<(), AideError> {
        sqlx::query(
            "INSERT INTO calendar_events (id, owner_id, summary, description, start_time, end_time) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6) \
             ON CONFLICT(id) DO UPDATE SET \
                 summary = excluded.summary, \
                 description = excluded.description, \
                 start_time = excluded.start_time, \
                 end_time = excluded.end_time \
             WHERE calendar_events.owner_id = excluded.owner_id",
        )
        .bind(&event.id)
        .bind(&event.owner_id)
        .bind(&event.summary)
        .bind(&event.description)
        .bind(format_timestamp(&event.start_time))
        .bind(event.end_time.as_ref().map(format_timestamp))
        .execute(&self.pool)
        .await
        .map_err(|e| AideError::Memory(format!("upsert event failed: {e}")))?;
        Ok(())
    }
}
