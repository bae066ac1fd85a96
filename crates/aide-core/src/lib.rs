//! # aide-core
//!
//! Core types, traits, configuration, and error handling for aide,
//! plus the pure time math: window tokens, interval strings and
//! reminder recurrences.

pub mod config;
pub mod domain;
pub mod error;
pub mod interval;
pub mod message;
pub mod recurrence;
pub mod traits;
pub mod window;

/// Storage format for every persisted timestamp (UTC, lexically ordered).
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Render a UTC instant in the storage format.
pub fn format_timestamp(ts: &chrono::DateTime<chrono::Utc>) -> String {
    ts.format(TIMESTAMP_FORMAT).to_string()
}

/// Parse a stored or user-supplied timestamp.
///
/// Accepts the storage format, RFC 3339 (`2025-01-10T17:00:00Z`), and the
/// `T`-separated form without an offset, which is read as UTC. A bare date
/// means midnight UTC.
pub fn parse_timestamp(raw: &str) -> Option<chrono::DateTime<chrono::Utc>> {
    use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

    let raw = raw.trim();
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts.with_timezone(&Utc));
    }
    for fmt in [TIMESTAMP_FORMAT, "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M", "%Y-%m-%dT%H:%M"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, fmt) {
            return Some(naive.and_utc());
        }
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .map(|d| d.and_time(chrono::NaiveTime::MIN).and_utc())
}
