//! Bulk update/delete driven by a compiled filter.
//!
//! Each affected row is committed on its own, so a bulk call can partially
//! succeed. Outcomes are tracked per item.

use super::Store;
use crate::query::columns::{self, patch_columns};
use crate::query::{compile_where, patch_assignments, Column, FilterSpec, Op, QueryBuilder, QueryParam};
use aide_core::domain::{Domain, Entity};
use aide_core::error::{AideError, ValidationError};
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::{Map, Value};
use tracing::{info, warn};

/// One item that could not be processed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ItemError {
    /// Record id, or the caller-supplied label for items not yet stored.
    pub item: String,
    pub message: String,
}

/// Per-item results of a multi-item operation.
///
/// `success` follows the operation: every item for multi-create, at least
/// one item for bulk update and delete.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BulkOutcome {
    pub succeeded: Vec<String>,
    pub errors: Vec<ItemError>,
    pub success: bool,
}

impl BulkOutcome {
    pub(crate) fn push_error(&mut self, item: impl Into<String>, err: &AideError) {
        self.errors.push(ItemError {
            item: item.into(),
            message: err.to_string(),
        });
    }

    fn at_least_one(mut self) -> Self {
        self.success = !self.succeeded.is_empty();
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum BulkResult {
    /// Rows the operation would touch; nothing was written.
    Preview(Vec<Entity>),
    Applied(BulkOutcome),
}

impl Store {
    /// Apply `patch` to every record of `domain` matching `filter`.
    ///
    /// With `preview`, the matching rows are returned and nothing changes.
    /// Without it, a filter that compiles to the owner scope alone is
    /// refused.
    pub async fn bulk_update(
        &self,
        domain: Domain,
        owner_id: &str,
        filter: &FilterSpec,
        patch: &Map<String, Value>,
        preview: bool,
        now: DateTime<Utc>,
    ) -> Result<BulkResult, AideError> {
        let tz = self.owner_timezone(owner_id).await?;
        let compiled = compile_where(domain, owner_id, filter, now, tz);

        if preview {
            let rows = self
                .select_entities(domain, &compiled.sql, &compiled.params)
                .await?;
            return Ok(BulkResult::Preview(rows));
        }
        if compiled.is_owner_only() {
            warn!("bulk update on {domain} refused: no filter beyond owner scope");
            return Err(ValidationError::UnfilteredBulkOperation("update").into());
        }

        let assignments = patch_assignments(patch, patch_columns(domain));
        if assignments.is_empty() {
            return Err(
                ValidationError::Other(format!("patch has no updatable fields for {domain}")).into(),
            );
        }

        let rows = self
            .select_entities(domain, &compiled.sql, &compiled.params)
            .await?;
        let mut outcome = BulkOutcome::default();
        for entity in rows {
            let result = match &entity {
                Entity::Task(task) => self
                    .apply_task_patch(task, patch, &assignments, now)
                    .await
                    .map(|_| ()),
                other => self.update_row(domain, owner_id, other.id(), &assignments).await,
            };
            match result {
                Ok(()) => outcome.succeeded.push(entity.id().to_string()),
                Err(e) => {
                    warn!("bulk update on {domain}: {} failed: {e}", entity.id());
                    outcome.push_error(entity.id(), &e);
                }
            }
        }

        info!(
            "bulk update on {domain}: {} updated, {} failed",
            outcome.succeeded.len(),
            outcome.errors.len()
        );
        Ok(BulkResult::Applied(outcome.at_least_one()))
    }

    /// Delete every record of `domain` matching `filter`, with the same
    /// preview and unfiltered-write rules as `bulk_update`.
    pub async fn bulk_delete(
        &self,
        domain: Domain,
        owner_id: &str,
        filter: &FilterSpec,
        preview: bool,
        now: DateTime<Utc>,
    ) -> Result<BulkResult, AideError> {
        let tz = self.owner_timezone(owner_id).await?;
        let compiled = compile_where(domain, owner_id, filter, now, tz);

        if !preview && compiled.is_owner_only() {
            warn!("bulk delete on {domain} refused: no filter beyond owner scope");
            return Err(ValidationError::UnfilteredBulkOperation("delete").into());
        }
        let rows = self
            .select_entities(domain, &compiled.sql, &compiled.params)
            .await?;
        if preview {
            return Ok(BulkResult::Preview(rows));
        }

        let sql = format!(
            "DELETE FROM {} WHERE id = ?1 AND owner_id = ?2",
            domain.table()
        );
        let mut outcome = BulkOutcome::default();
        for entity in rows {
            let params = [
                QueryParam::Text(entity.id().to_string()),
                QueryParam::Text(owner_id.to_string()),
            ];
            match self.execute(&sql, &params, "bulk delete").await {
                Ok(0) => outcome.push_error(
                    entity.id(),
                    &AideError::NotFound(format!("{domain} {}", entity.id())),
                ),
                Ok(_) => outcome.succeeded.push(entity.id().to_string()),
                Err(e) => {
                    warn!("bulk delete on {domain}: {} failed: {e}", entity.id());
                    outcome.push_error(entity.id(), &e);
                }
            }
        }

        info!(
            "bulk delete on {domain}: {} deleted, {} failed",
            outcome.succeeded.len(),
            outcome.errors.len()
        );
        Ok(BulkResult::Applied(outcome.at_least_one()))
    }

    /// Plain column update of one row, for domains without derived fields.
    async fn update_row(
        &self,
        domain: Domain,
        owner_id: &str,
        id: &str,
        assignments: &[(Column, QueryParam)],
    ) -> Result<(), AideError> {
        let mut qb = QueryBuilder::new(0);
        for (column, param) in assignments {
            qb.add_assignment(*column, param.clone());
        }
        qb.add_condition(columns::ID, Op::Eq, QueryParam::Text(id.to_string()));
        qb.add_condition(columns::OWNER_ID, Op::Eq, QueryParam::Text(owner_id.to_string()));

        let sql = format!(
            "UPDATE {} SET {} WHERE {}",
            domain.table(),
            qb.set_sql(),
            qb.where_sql()
        );
        match self.execute(&sql, qb.params(), "update row").await? {
            0 => Err(AideError::NotFound(format!("{domain} {id}"))),
            _ => Ok(()),
        }
    }
}
