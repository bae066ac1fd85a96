//! # aide-memory
//!
//! SQLite record store for aide, plus the filter/patch compiler that turns
//! structured filters into owner-scoped, parameterized SQL.

pub mod query;
pub mod store;

pub use query::{compile_set, compile_where, CompiledSet, CompiledWhere, FilterClause, FilterSpec};
pub use store::{BulkOutcome, BulkResult, ItemError, NewTask, Owner, Store};
