//! Parameterized SQL fragment builder.
//!
//! Placeholders are numbered (`?1`, `?2`, ...) and tracked internally, so
//! callers only ever add conditions and assignments. Column names come from
//! the `Column` constants in this crate and never from caller input.

use sqlx::sqlite::SqliteArguments;
use sqlx::query::{Query, QueryAs};
use sqlx::Sqlite;

/// How a column's values are validated and bound.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColumnKind {
    Text,
    Bool,
    Timestamp,
    /// Structured document stored as JSON text.
    Json,
}

/// An allow-listed column. Only this crate can construct one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Column {
    name: &'static str,
    kind: ColumnKind,
}

impl Column {
    pub(crate) const fn new(name: &'static str, kind: ColumnKind) -> Self {
        Self { name, kind }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn kind(&self) -> ColumnKind {
        self.kind
    }
}

/// Type-safe parameter binding for SQL queries.
#[derive(Debug, Clone, PartialEq)]
pub enum QueryParam {
    Text(String),
    Int(i64),
    Bool(bool),
    /// Serialized and bound as text, wrapped in `json(...)` in the SQL.
    Json(serde_json::Value),
    Null,
}

/// Comparison used by `add_condition`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Op {
    Eq,
    /// Case-insensitive equality (ASCII folding, as SQLite's `lower`).
    EqIgnoreCase,
    Gte,
    Lt,
}

/// Accumulates conditions (joined with `AND`) and assignments (joined with
/// `,`) together with their parameters in placeholder order.
#[derive(Debug, Clone, Default)]
pub struct QueryBuilder {
    conditions: Vec<String>,
    assignments: Vec<String>,
    params: Vec<QueryParam>,
    offset: usize,
}

impl QueryBuilder {
    /// `param_offset` is the number of parameters already bound ahead of
    /// this fragment; the first placeholder will be `?{param_offset + 1}`.
    pub fn new(param_offset: usize) -> Self {
        Self {
            offset: param_offset,
            ..Self::default()
        }
    }

    fn placeholder(&mut self, param: QueryParam) -> String {
        self.params.push(param);
        format!("?{}", self.offset + self.params.len())
    }

    pub fn add_condition(&mut self, column: Column, op: Op, value: QueryParam) {
        let name = column.name();
        let clause = match op {
            Op::Eq => format!("{name} = {}", self.placeholder(value)),
            Op::EqIgnoreCase => format!("lower({name}) = lower({})", self.placeholder(value)),
            Op::Gte => format!("{name} >= {}", self.placeholder(value)),
            Op::Lt => format!("{name} < {}", self.placeholder(value)),
        };
        self.conditions.push(clause);
    }

    /// Case-insensitive substring match against any of `columns`, sharing a
    /// single parameter.
    pub fn add_contains(&mut self, columns: &[Column], needle: &str) {
        if columns.is_empty() {
            return;
        }
        let pattern = format!("%{}%", escape_like(&needle.to_lowercase()));
        let p = self.placeholder(QueryParam::Text(pattern));
        let parts: Vec<String> = columns
            .iter()
            .map(|c| format!("lower({}) LIKE {p} ESCAPE '\\'", c.name()))
            .collect();
        if parts.len() == 1 {
            self.conditions.push(parts.concat());
        } else {
            self.conditions.push(format!("({})", parts.join(" OR ")));
        }
    }

    /// Set membership. An empty set matches nothing.
    pub fn add_in(&mut self, column: Column, values: Vec<QueryParam>, ignore_case: bool) {
        if values.is_empty() {
            self.conditions.push("0 = 1".to_string());
            return;
        }
        let placeholders: Vec<String> = values.into_iter().map(|v| self.placeholder(v)).collect();
        let lhs = if ignore_case {
            format!("lower({})", column.name())
        } else {
            column.name().to_string()
        };
        self.conditions
            .push(format!("{lhs} IN ({})", placeholders.join(", ")));
    }

    pub fn add_is_null(&mut self, column: Column) {
        self.conditions.push(format!("{} IS NULL", column.name()));
    }

    /// `column = ?N`, or `column = json(?N)` for structured values.
    pub fn add_assignment(&mut self, column: Column, value: QueryParam) {
        let rhs = match value {
            QueryParam::Json(_) => format!("json({})", self.placeholder(value)),
            _ => self.placeholder(value),
        };
        self.assignments.push(format!("{} = {rhs}", column.name()));
    }

    /// Assignment with a literal SQL expression and no parameter.
    pub(crate) fn add_raw_assignment(&mut self, column: Column, expr: &'static str) {
        self.assignments.push(format!("{} = {expr}", column.name()));
    }

    pub fn condition_count(&self) -> usize {
        self.conditions.len()
    }

    pub fn assignment_count(&self) -> usize {
        self.assignments.len()
    }

    pub fn where_sql(&self) -> String {
        if self.conditions.is_empty() {
            "1 = 1".to_string()
        } else {
            self.conditions.join(" AND ")
        }
    }

    pub fn set_sql(&self) -> String {
        self.assignments.join(", ")
    }

    pub fn params(&self) -> &[QueryParam] {
        &self.params
    }

    pub fn into_params(self) -> Vec<QueryParam> {
        self.params
    }
}

/// Escape `%`, `_` and `\` for a `LIKE ... ESCAPE '\'` pattern.
pub fn escape_like(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        if matches!(c, '%' | '_' | '\\') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

/// Bind parameters onto a `sqlx::query` in placeholder order.
pub fn bind_all<'q>(
    mut query: Query<'q, Sqlite, SqliteArguments<'q>>,
    params: &'q [QueryParam],
) -> Query<'q, Sqlite, SqliteArguments<'q>> {
    for p in params {
        query = match p {
            QueryParam::Text(s) => query.bind(s.as_str()),
            QueryParam::Int(n) => query.bind(*n),
            QueryParam::Bool(b) => query.bind(*b),
            QueryParam::Json(v) => query.bind(v.to_string()),
            QueryParam::Null => query.bind(Option::<String>::None),
        };
    }
    query
}

/// Bind parameters onto a `sqlx::query_as` in placeholder order.
pub fn bind_all_as<'q, O>(
    mut query: QueryAs<'q, Sqlite, O, SqliteArguments<'q>>,
    params: &'q [QueryParam],
) -> QueryAs<'q, Sqlite, O, SqliteArguments<'q>> {
    for p in params {
        query = match p {
            QueryParam::Text(s) => query.bind(s.as_str()),
            QueryParam::Int(n) => query.bind(*n),
            QueryParam::Bool(b) => query.bind(*b),
            QueryParam::Json(v) => query.bind(v.to_string()),
            QueryParam::Null => query.bind(Option::<String>::None),
        };
    }
    query
}
