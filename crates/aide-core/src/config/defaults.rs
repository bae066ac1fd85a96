//! Serde default functions for config fields.

pub(super) fn default_name() -> String {
    "aide".to_string()
}

pub(super) fn default_data_dir() -> String {
    "~/.aide".to_string()
}

pub(super) fn default_log_level() -> String {
    "info".to_string()
}

pub(super) fn default_db_path() -> String {
    "~/.aide/data/aide.db".to_string()
}

pub(super) fn default_true() -> bool {
    true
}

pub(super) fn default_poll_interval() -> u64 {
    60
}

pub(super) fn default_grace_window() -> i64 {
    10
}

pub(super) fn default_digest_hour() -> u32 {
    8
}

pub(super) fn default_digest_poll_interval() -> u64 {
    300
}

pub(super) fn default_threshold() -> f64 {
    0.55
}

pub(super) fn default_ambiguity_gap() -> f64 {
    0.15
}

pub(super) fn default_max_options() -> usize {
    5
}

pub(super) fn default_disambiguation_ttl() -> i64 {
    30
}

pub(super) fn default_timezone() -> String {
    "UTC".to_string()
}

pub(super) fn default_language() -> String {
    "English".to_string()
}
