//! Filtered reads across domains, including resolution candidate pools.

use super::rows::{
    order_by, select_columns, wrap_contacts, wrap_emails, wrap_events, wrap_lists, wrap_tasks,
    ContactRow, EmailRow, EventRow, ListRow, TaskRow,
};
use super::Store;
use crate::query::bind_all_as;
use crate::query::{compile_where, FilterClause, FilterSpec, QueryParam};
use aide_core::domain::{Domain, Entity};
use aide_core::error::AideError;
use aide_core::window::TimeRange;
use chrono::{DateTime, Utc};

impl Store {
    /// Rows of `domain` matching a compiled `WHERE`, in stable order.
    pub(crate) async fn select_entities(
        &self,
        domain: Domain,
        where_sql: &str,
        params: &[QueryParam],
    ) -> Result<Vec<Entity>, AideError> {
        let sql = format!(
            "SELECT {} FROM {} WHERE {where_sql} ORDER BY {}",
            select_columns(domain),
            domain.table(),
            order_by(domain),
        );
        let err = |e: sqlx::Error| AideError::Memory(format!("select {domain} failed: {e}"));

        let entities = match domain {
            Domain::Task => wrap_tasks(
                bind_all_as(sqlx::query_as::<_, TaskRow>(&sql), params)
                    .fetch_all(&self.pool)
                    .await
                    .map_err(err)?,
            ),
            Domain::Contact => wrap_contacts(
                bind_all_as(sqlx::query_as::<_, ContactRow>(&sql), params)
                    .fetch_all(&self.pool)
                    .await
                    .map_err(err)?,
            ),
            Domain::List => wrap_lists(
                bind_all_as(sqlx::query_as::<_, ListRow>(&sql), params)
                    .fetch_all(&self.pool)
                    .await
                    .map_err(err)?,
            ),
            Domain::CalendarEvent => wrap_events(
                bind_all_as(sqlx::query_as::<_, EventRow>(&sql), params)
                    .fetch_all(&self.pool)
                    .await
                    .map_err(err)?,
            ),
            Domain::Email => wrap_emails(
                bind_all_as(sqlx::query_as::<_, EmailRow>(&sql), params)
                    .fetch_all(&self.pool)
                    .await
                    .map_err(err)?,
            ),
        };
        Ok(entities)
    }

    /// Records of `domain` matching `filter`. Windows resolve against `now`
    /// in the owner's timezone.
    pub async fn find(
        &self,
        domain: Domain,
        owner_id: &str,
        filter: &FilterSpec,
        now: DateTime<Utc>,
    ) -> Result<Vec<Entity>, AideError> {
        let tz = self.owner_timezone(owner_id).await?;
        let compiled = compile_where(domain, owner_id, filter, now, tz);
        self.select_entities(domain, &compiled.sql, &compiled.params)
            .await
    }

    /// The owner's whole candidate pool for a domain, freshly read. A range
    /// narrows domains that have a date column and is ignored otherwise.
    pub async fn fetch_candidates(
        &self,
        owner_id: &str,
        domain: Domain,
        range: Option<&TimeRange>,
    ) -> Result<Vec<Entity>, AideError> {
        let mut clauses = Vec::new();
        if let Some(range) = range {
            if let Some(from) = range.from {
                clauses.push(FilterClause::DueDateFrom(from));
            }
            clauses.push(FilterClause::DueDateTo(range.to));
        }
        let compiled = compile_where(
            domain,
            owner_id,
            &FilterSpec::new(clauses),
            Utc::now(),
            self.default_tz,
        );
        self.select_entities(domain, &compiled.sql, &compiled.params)
            .await
    }
}
