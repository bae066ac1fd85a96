//! Owner profiles.

use super::Store;
use aide_core::error::AideError;
use chrono::NaiveDate;
use chrono_tz::Tz;
use tracing::warn;

/// An end user all records are scoped to.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Owner {
    pub id: String,
    /// Notifier name used to reach this owner (e.g. "telegram").
    pub channel: String,
    /// Channel-specific address (e.g. a chat id).
    pub reply_target: String,
    pub timezone: Option<String>,
    pub language: Option<String>,
    /// Owner-local date the last digest went out.
    pub last_digest_on: Option<NaiveDate>,
}

type OwnerRow = (
    String,
    String,
    String,
    Option<String>,
    Option<String>,
    Option<String>,
);

fn owner_from_row(row: OwnerRow) -> Owner {
    let (id, channel, reply_target, timezone, language, last_digest_on) = row;
    Owner {
        last_digest_on: last_digest_on.and_then(|d| NaiveDate::parse_from_str(&d, "%Y-%m-%d").ok()),
        id,
        channel,
        reply_target,
        timezone,
        language,
    }
}

impl Store {
    /// Insert or update an owner. `last_digest_on` is left alone on update.
    pub async fn upsert_owner(&self, owner: &Owner) -> Result<(), AideError> {
        sqlx::query(
            "INSERT INTO owners (id, channel, reply_target, timezone, language) \
             VALUES (?1, ?2, ?3, ?4, ?5) \
             ON CONFLICT(id) DO UPDATE SET \
                 channel = excluded.channel, \
                 reply_target = excluded.reply_target, \
                 timezone = excluded.timezone, \
                 language = excluded.language",
        )
        .bind(&owner.id)
        .bind(&owner.channel)
        .bind(&owner.reply_target)
        .bind(&owner.timezone)
        .bind(&owner.language)
        .execute(&self.pool)
        .await
        .map_err(|e| AideError::Memory(format!("upsert owner failed: {e}")))?;
        Ok(())
    }

    pub async fn get_owner(&self, owner_id: &str) -> Result<Option<Owner>, AideError> {
        let row: Option<OwnerRow> = sqlx::query_as(
            "SELECT id, channel, reply_target, timezone, language, last_digest_on \
             FROM owners WHERE id = ?",
        )
        .bind(owner_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AideError::Memory(format!("get owner failed: {e}")))?;
        Ok(row.map(owner_from_row))
    }

    pub async fn list_owners(&self) -> Result<Vec<Owner>, AideError> {
        let rows: Vec<OwnerRow> = sqlx::query_as(
            "SELECT id, channel, reply_target, timezone, language, last_digest_on \
             FROM owners ORDER BY rowid",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AideError::Memory(format!("list owners failed: {e}")))?;
        Ok(rows.into_iter().map(owner_from_row).collect())
    }

    /// Record that the digest for `date` was sent.
    pub async fn mark_digest_sent(&self, owner_id: &str, date: NaiveDate) -> Result<(), AideError> {
        sqlx::query("UPDATE owners SET last_digest_on = ? WHERE id = ?")
            .bind(date.format("%Y-%m-%d").to_string())
            .bind(owner_id)
            .execute(&self.pool)
            .await
            .map_err(|e| AideError::Memory(format!("mark digest failed: {e}")))?;
        Ok(())
    }

    /// The owner's timezone, or the store default when unset, unknown or invalid.
    pub async fn owner_timezone(&self, owner_id: &str) -> Result<Tz, AideError> {
        let owner = self.get_owner(owner_id).await?;
        Ok(self.timezone_of(owner.as_ref()))
    }

    pub fn timezone_of(&self, owner: Option<&Owner>) -> Tz {
        match owner.and_then(|o| o.timezone.as_deref()) {
            Some(name) => name.parse::<Tz>().unwrap_or_else(|_| {
                warn!("owner timezone '{name}' is not a valid IANA name, using default");
                self.default_tz
            }),
            None => self.default_tz,
        }
    }
}
