//! Locally mirrored mailbox headers.

use super::Store;
use aide_core::domain::Email;
use aide_core::error::AideError;
use aide_core::format_timestamp;

impl Store {
    /// Insert a mirrored email. Messages are immutable, so a repeated id is
    /// ignored.
    pub async fn insert_email(&self, email: &Email) -> Result<bool, AideError> {
        let result = sqlx::query(
            "INSERT OR IGNORE INTO emails (id, owner_id, subject, sender, recipient, received_at) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        )
        .bind(&email.id)
        .bind(&email.owner_id)
        .bind(&email.subject)
        .bind(&email.sender)
        .bind(&email.recipient)
        .bind(format_timestamp(&email.received_at))
        .execute(&self.pool)
        .await
        .map_err(|e| AideError::Memory(format!("insert email failed: {e}")))?;
        Ok(result.rows_affected() > 0)
    }
}
