use serde::{Deserialize, Serialize};

/// An outbound notification (reminder, digest) addressed to one owner.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    pub owner_id: String,
    /// Channel name (e.g. "telegram").
    pub channel: String,
    /// Platform-specific target for routing (e.g. Telegram chat_id).
    pub reply_target: String,
    pub text: String,
}

/// Languages user-facing text is rendered in.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Language {
    #[default]
    English,
    Hebrew,
}

impl Language {
    /// Map a language name or code ("Hebrew", "he", "עברית") to a language.
    /// Anything unrecognized falls back to English.
    pub fn from_name(name: &str) -> Self {
        match name.trim().to_lowercase().as_str() {
            "hebrew" | "he" | "heb" | "iw" | "עברית" => Self::Hebrew,
            _ => Self::English,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_language_from_name() {
        assert_eq!(Language::from_name("Hebrew"), Language::Hebrew);
        assert_eq!(Language::from_name(" he "), Language::Hebrew);
        assert_eq!(Language::from_name("עברית"), Language::Hebrew);
        assert_eq!(Language::from_name("English"), Language::English);
        assert_eq!(Language::from_name("Klingon"), Language::English);
    }
}
