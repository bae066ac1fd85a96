//! Localized reminder and digest texts.
//!
//! `t(key, lang)` returns static strings; `format` holds the helpers that
//! interpolate task data. Supported languages: English (fallback), Hebrew.

mod format;


pub use format::*;

use aide_core::message::Language;

/// Return a localized static string for `key`. Unknown keys yield `"???"`.
pub fn t(key: &str, lang: Language) -> &'static str {
    match (key, lang) {
        ("reminder", Language::Hebrew) => "תזכורת",
        ("reminder", _) => "Reminder",
        ("due", Language::Hebrew) => "מועד",
        ("due", _) => "Due",
        ("digest_header", Language::Hebrew) => "בוקר טוב! המשימות להיום:",
        ("digest_header", _) => "Good morning! Here is what's on for today:",
        ("overdue", Language::Hebrew) => "באיחור",
        ("overdue", _) => "overdue",
        ("no_time", Language::Hebrew) => "במהלך היום",
        ("no_time", _) => "any time",
        _ => "???",
    }
}
