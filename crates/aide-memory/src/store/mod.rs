//! SQLite-backed record store.
//!
//! Split into focused submodules:
//! - `owners` — owner profiles (timezone, language, delivery target, digest bookkeeping)
//! - `tasks` — task CRUD with reminder normalization and `next_reminder_at`
//! - `contacts`, `lists` — contact and list records
//! - `calendar`, `mail` — locally mirrored calendar events and emails
//! - `candidates` — filtered reads and resolution candidate pools
//! - `bulk` — bulk update/delete with preview and the unfiltered-write gate
//! - `reminders` — dispatch sweep and digest queries

mod bulk;
mod calendar;
mod candidates;
mod contacts;
mod lists;
mod mail;
mod owners;
mod reminders;
mod rows;
mod tasks;

pub use bulk::{BulkOutcome, BulkResult, ItemError};
pub use owners::Owner;
pub use tasks::NewTask;

use crate::query::{bind_all, QueryParam};
use aide_core::config::{shellexpand, MemoryConfig};
use aide_core::error::AideError;
use chrono_tz::Tz;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::str::FromStr;
use tracing::info;

/// Persistent record store backed by SQLite.
#[derive(Clone)]
pub struct Store {
    pool: SqlitePool,
    /// Timezone for owners without one of their own.
    default_tz: Tz,
}

impl Store {
    /// Create a new store, running migrations on first use.
    pub async fn new(config: &MemoryConfig) -> Result<Self, AideError> {
        let db_path = shellexpand(&config.db_path);

        if let Some(parent) = std::path::Path::new(&db_path).parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| AideError::Memory(format!("failed to create data dir: {e}")))?;
        }

        let opts = SqliteConnectOptions::from_str(&format!("sqlite:{db_path}"))
            .map_err(|e| AideError::Memory(format!("invalid db path: {e}")))?
            .create_if_missing(true)
            .journal_mode(sqlx::sqlite::SqliteJournalMode::Wal);

        let pool = SqlitePoolOptions::new()
            .max_connections(4)
            .connect_with(opts)
            .await
            .map_err(|e| AideError::Memory(format!("failed to connect to sqlite: {e}")))?;

        Self::run_migrations(&pool).await?;

        info!("Record store initialized at {db_path}");

        Ok(Self {
            pool,
            default_tz: Tz::UTC,
        })
    }

    /// A private in-memory database. One connection, so every query sees
    /// the same data.
    pub async fn in_memory() -> Result<Self, AideError> {
        let opts = SqliteConnectOptions::from_str("sqlite::memory:")
            .map_err(|e| AideError::Memory(format!("invalid db path: {e}")))?;
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(opts)
            .await
            .map_err(|e| AideError::Memory(format!("failed to open in-memory sqlite: {e}")))?;
        Self::run_migrations(&pool).await?;
        Ok(Self {
            pool,
            default_tz: Tz::UTC,
        })
    }

    pub fn with_timezone(mut self, tz: Tz) -> Self {
        self.default_tz = tz;
        self
    }

    pub fn default_tz(&self) -> Tz {
        self.default_tz
    }

    /// Get a reference to the underlying connection pool.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Row counts per table, for status output.
    pub async fn table_counts(&self) -> Result<Vec<(&'static str, i64)>, AideError> {
        let mut out = Vec::new();
        for table in ["owners", "tasks", "contacts", "lists", "calendar_events", "emails"] {
            let (count,): (i64,) = sqlx::query_as(&format!("SELECT COUNT(*) FROM {table}"))
                .fetch_one(&self.pool)
                .await
                .map_err(|e| AideError::Memory(format!("count {table} failed: {e}")))?;
            out.push((table, count));
        }
        Ok(out)
    }

    /// Execute a statement with builder parameters; returns rows affected.
    async fn execute(&self, sql: &str, params: &[QueryParam], what: &str) -> Result<u64, AideError> {
        let result = bind_all(sqlx::query(sql), params)
            .execute(&self.pool)
            .await
            .map_err(|e| AideError::Memory(format!("{what} failed: {e}")))?;
        Ok(result.rows_affected())
    }

    /// Run SQL migrations, tracking which have already been applied.
    async fn run_migrations(pool: &SqlitePool) -> Result<(), AideError> {
        sqlx::raw_sql(
            "CREATE TABLE IF NOT EXISTS _migrations (
                name TEXT PRIMARY KEY,
                applied_at TEXT NOT NULL DEFAULT (datetime('now'))
            );",
        )
        .execute(pool)
        .await
        .map_err(|e| AideError::Memory(format!("failed to create migrations table: {e}")))?;

        let migrations: &[(&str, &str)] = &[
            ("001_init", include_str!("../../migrations/001_init.sql")),
            ("002_mirrors", include_str!("../../migrations/002_mirrors.sql")),
        ];

        for (name, sql) in migrations {
            let applied: Option<(String,)> =
                sqlx::query_as("SELECT name FROM _migrations WHERE name = ?")
                    .bind(*name)
                    .fetch_optional(pool)
                    .await
                    .map_err(|e| {
                        AideError::Memory(format!("failed to check migration {name}: {e}"))
                    })?;

            if applied.is_some() {
                continue;
            }

            sqlx::raw_sql(sql)
                .execute(pool)
                .await
                .map_err(|e| AideError::Memory(format!("migration {name} failed: {e}")))?;

            sqlx::query("INSERT INTO _migrations (name) VALUES (?)")
                .bind(*name)
                .execute(pool)
                .await
                .map_err(|e| {
                    AideError::Memory(format!("failed to record migration {name}: {e}"))
                })?;
        }
        Ok(())
    }
}
