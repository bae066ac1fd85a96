//! Typed filter objects.
//!
//! The JSON filter a caller supplies is parsed into a closed set of
//! `FilterClause` variants. Keys outside the vocabulary, and values of the
//! wrong type, are logged and dropped here, so nothing unrecognized ever
//! reaches the SQL compiler.

use aide_core::parse_timestamp;
use aide_core::window::Window;
use chrono::{DateTime, Utc};
use serde_json::Value;
use tracing::warn;

/// One recognized filter condition.
#[derive(Debug, Clone, PartialEq)]
pub enum FilterClause {
    Window(Window),
    /// Free-text substring over the domain's searchable columns.
    Query(String),
    /// One value compiles to equality, several to set membership.
    Category(Vec<String>),
    Completed(bool),
    DueDateFrom(DateTime<Utc>),
    /// Exclusive upper bound, matching window ranges.
    DueDateTo(DateTime<Utc>),
    Ids(Vec<String>),
    Name(String),
    Phone(String),
    Email(String),
    ListName(String),
    IsChecklist(bool),
    Content(String),
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterSpec {
    clauses: Vec<FilterClause>,
}

impl FilterSpec {
    pub fn new(clauses: Vec<FilterClause>) -> Self {
        Self { clauses }
    }

    pub fn clauses(&self) -> &[FilterClause] {
        &self.clauses
    }

    pub fn is_empty(&self) -> bool {
        self.clauses.is_empty()
    }

    /// Parse a JSON filter object. Never fails: anything unusable is
    /// logged and skipped. A non-object value yields an empty filter.
    pub fn from_json(value: &Value) -> Self {
        let Some(map) = value.as_object() else {
            if !value.is_null() {
                warn!("filter: expected an object, got {value}; ignoring");
            }
            return Self::default();
        };

        let mut clauses = Vec::new();
        for (key, val) in map {
            match parse_clause(key, val) {
                Ok(Some(clause)) => clauses.push(clause),
                Ok(None) => {}
                Err(reason) => warn!("filter: dropping '{key}': {reason}"),
            }
        }
        Self { clauses }
    }
}

fn parse_clause(key: &str, val: &Value) -> Result<Option<FilterClause>, String> {
    let clause = match key {
        "window" => {
            let token = expect_str(val)?;
            match token.parse::<Window>() {
                Ok(w) => FilterClause::Window(w),
                Err(()) => {
                    warn!("filter: unknown window '{token}', no date restriction applied");
                    return Ok(None);
                }
            }
        }
        "q" => FilterClause::Query(expect_non_empty(val)?),
        "category" => FilterClause::Category(expect_str_or_list(val)?),
        "completed" => FilterClause::Completed(expect_bool(val)?),
        "dueDateFrom" | "due_date_from" => FilterClause::DueDateFrom(expect_timestamp(val)?),
        "dueDateTo" | "due_date_to" => FilterClause::DueDateTo(expect_timestamp(val)?),
        "ids" => FilterClause::Ids(expect_str_or_list(val)?),
        "name" => FilterClause::Name(expect_non_empty(val)?),
        "phone" => FilterClause::Phone(expect_non_empty(val)?),
        "email" => FilterClause::Email(expect_non_empty(val)?),
        "list_name" | "listName" => FilterClause::ListName(expect_non_empty(val)?),
        "is_checklist" | "isChecklist" => FilterClause::IsChecklist(expect_bool(val)?),
        "content" => FilterClause::Content(expect_non_empty(val)?),
        _ => return Err("unknown filter key".to_string()),
    };
    Ok(Some(clause))
}

fn expect_str(val: &Value) -> Result<&str, String> {
    val.as_str().ok_or_else(|| format!("expected a string, got {val}"))
}

fn expect_non_empty(val: &Value) -> Result<String, String> {
    let s = expect_str(val)?.trim();
    if s.is_empty() {
        return Err("empty string".to_string());
    }
    Ok(s.to_string())
}

/// Booleans must be JSON literals; "true"/"false" strings are rejected.
fn expect_bool(val: &Value) -> Result<bool, String> {
    val.as_bool()
        .ok_or_else(|| format!("expected a boolean literal, got {val}"))
}

fn expect_str_or_list(val: &Value) -> Result<Vec<String>, String> {
    match val {
        Value::String(s) => Ok(vec![s.clone()]),
        Value::Array(items) => items
            .iter()
            .map(|v| expect_str(v).map(str::to_string))
            .collect(),
        other => Err(format!("expected a string or list of strings, got {other}")),
    }
}

fn expect_timestamp(val: &Value) -> Result<DateTime<Utc>, String> {
    let raw = expect_str(val)?;
    parse_timestamp(raw).ok_or_else(|| format!("invalid timestamp '{raw}'"))
}
