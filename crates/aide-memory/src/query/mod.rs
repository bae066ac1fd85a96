//! Filter/patch compiler.
//!
//! - `compile_where` turns a typed filter into an owner-scoped, parameterized
//!   `WHERE` expression.
//! - `compile_set` turns a JSON patch into a `SET` expression restricted to a
//!   column allow-list.

pub mod builder;
pub mod columns;
pub mod filter;

#[cfg(test)]
mod tests;

pub use builder::{bind_all, bind_all_as, Column, ColumnKind, Op, QueryBuilder, QueryParam};
pub use filter::{FilterClause, FilterSpec};

use aide_core::domain::Domain;
use aide_core::{format_timestamp, parse_timestamp};
use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use serde_json::{Map, Value};
use tracing::{debug, warn};

/// A compiled `WHERE` expression and its parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledWhere {
    pub sql: String,
    pub params: Vec<QueryParam>,
    /// Conditions beyond the owner scope.
    pub filter_conditions: usize,
}

impl CompiledWhere {
    /// True when nothing but the owner condition was produced. Destructive
    /// bulk operations must refuse to run on such a clause.
    pub fn is_owner_only(&self) -> bool {
        self.filter_conditions == 0
    }
}

/// A compiled `SET` expression and its parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledSet {
    pub sql: String,
    pub params: Vec<QueryParam>,
    pub columns: Vec<Column>,
}

impl CompiledSet {
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn touches(&self, column: Column) -> bool {
        self.columns.contains(&column)
    }
}

/// Compile a filter for `domain`, always scoped to `owner_id` first.
///
/// `now` and `tz` anchor any `window` token. Clauses that do not apply to
/// the domain (e.g. `completed` on contacts) are skipped.
pub fn compile_where(
    domain: Domain,
    owner_id: &str,
    filter: &FilterSpec,
    now: DateTime<Utc>,
    tz: Tz,
) -> CompiledWhere {
    let mut qb = QueryBuilder::new(0);
    qb.add_condition(columns::OWNER_ID, Op::Eq, QueryParam::Text(owner_id.to_string()));

    for clause in filter.clauses() {
        if !apply_clause(&mut qb, domain, clause, now, tz) {
            debug!("filter: {clause:?} does not apply to {domain}, skipped");
        }
    }

    let filter_conditions = qb.condition_count() - 1;
    CompiledWhere {
        sql: qb.where_sql(),
        params: qb.into_params(),
        filter_conditions,
    }
}

/// Returns false when the clause has no meaning for `domain`.
fn apply_clause(
    qb: &mut QueryBuilder,
    domain: Domain,
    clause: &FilterClause,
    now: DateTime<Utc>,
    tz: Tz,
) -> bool {
    use columns::{contact, list, task};

    let ts = |t: &DateTime<Utc>| QueryParam::Text(format_timestamp(t));

    match (clause, domain) {
        (FilterClause::Window(window), _) => {
            let Some(column) = columns::date_column(domain) else {
                return false;
            };
            let range = window.resolve(now, tz);
            if let Some(from) = range.from {
                qb.add_condition(column, Op::Gte, ts(&from));
            }
            qb.add_condition(column, Op::Lt, ts(&range.to));
        }
        (FilterClause::DueDateFrom(from), _) => {
            let Some(column) = columns::date_column(domain) else {
                return false;
            };
            qb.add_condition(column, Op::Gte, ts(from));
        }
        (FilterClause::DueDateTo(to), _) => {
            let Some(column) = columns::date_column(domain) else {
                return false;
            };
            qb.add_condition(column, Op::Lt, ts(to));
        }
        (FilterClause::Query(q), _) => qb.add_contains(columns::search_columns(domain), q),
        (FilterClause::Ids(ids), _) => qb.add_in(
            columns::ID,
            ids.iter().cloned().map(QueryParam::Text).collect(),
            false,
        ),
        (FilterClause::Category(values), Domain::Task) => {
            if let [single] = values.as_slice() {
                qb.add_condition(task::CATEGORY, Op::EqIgnoreCase, QueryParam::Text(single.clone()));
            } else {
                qb.add_in(
                    task::CATEGORY,
                    values
                        .iter()
                        .map(|v| QueryParam::Text(v.to_lowercase()))
                        .collect(),
                    true,
                );
            }
        }
        (FilterClause::Completed(done), Domain::Task) => {
            qb.add_condition(task::COMPLETED, Op::Eq, QueryParam::Bool(*done))
        }
        (FilterClause::Name(v), Domain::Contact) => qb.add_contains(&[contact::NAME], v),
        (FilterClause::Phone(v), Domain::Contact) => qb.add_contains(&[contact::PHONE], v),
        (FilterClause::Email(v), Domain::Contact) => qb.add_contains(&[contact::EMAIL], v),
        (FilterClause::ListName(v), Domain::List) => qb.add_contains(&[list::LIST_NAME], v),
        (FilterClause::IsChecklist(b), Domain::List) => {
            qb.add_condition(list::IS_CHECKLIST, Op::Eq, QueryParam::Bool(*b))
        }
        (FilterClause::Content(v), Domain::List) => qb.add_contains(&[list::CONTENT], v),
        _ => return false,
    }
    true
}

/// Compile a patch into a `SET` expression.
///
/// Only keys naming a column in `allowed` are emitted, always under the
/// allow-listed column name. An explicit JSON `null` clears the column;
/// absent keys are left untouched. Values of the wrong type are dropped.
pub fn compile_set(patch: &Map<String, Value>, allowed: &[Column], param_offset: usize) -> CompiledSet {
    let mut qb = QueryBuilder::new(param_offset);
    let mut touched = Vec::new();

    for (column, param) in patch_assignments(patch, allowed) {
        qb.add_assignment(column, param);
        touched.push(column);
    }

    CompiledSet {
        sql: qb.set_sql(),
        params: qb.into_params(),
        columns: touched,
    }
}

/// The allow-listed, type-checked `(column, value)` pairs of a patch.
pub(crate) fn patch_assignments(
    patch: &Map<String, Value>,
    allowed: &[Column],
) -> Vec<(Column, QueryParam)> {
    let mut out = Vec::new();
    for (key, value) in patch {
        let Some(column) = allowed.iter().find(|c| c.name() == key).copied() else {
            warn!("patch: dropping '{key}': not an updatable column");
            continue;
        };
        match patch_param(column, value) {
            Ok(param) => out.push((column, param)),
            Err(reason) => warn!("patch: dropping '{key}': {reason}"),
        }
    }
    out
}

/// Convert a patch value into a parameter of the column's kind.
fn patch_param(column: Column, value: &Value) -> Result<QueryParam, String> {
    if value.is_null() {
        return Ok(QueryParam::Null);
    }
    match column.kind() {
        ColumnKind::Text => match value {
            Value::String(s) => Ok(QueryParam::Text(s.clone())),
            Value::Number(n) => Ok(QueryParam::Text(n.to_string())),
            other => Err(format!("expected text, got {other}")),
        },
        ColumnKind::Bool => value
            .as_bool()
            .map(QueryParam::Bool)
            .ok_or_else(|| format!("expected a boolean literal, got {value}")),
        ColumnKind::Timestamp => value
            .as_str()
            .and_then(parse_timestamp)
            .map(|t| QueryParam::Text(format_timestamp(&t)))
            .ok_or_else(|| format!("expected a timestamp, got {value}")),
        ColumnKind::Json => match value {
            Value::Object(_) | Value::Array(_) => Ok(QueryParam::Json(value.clone())),
            other => Err(format!("expected a structured value, got {other}")),
        },
    }
}
