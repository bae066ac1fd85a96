use serde::{Deserialize, Serialize};

/// Notification channel configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ChannelConfig {
    pub telegram: Option<TelegramConfig>,
}

/// Telegram bot config (outbound only).
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct TelegramConfig {
    #[serde(default)]
    pub enabled: bool,
    /// Empty = read from `TELEGRAM_BOT_TOKEN`.
    #[serde(default)]
    pub bot_token: String,
}
