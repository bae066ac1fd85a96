//! Telegram Bot API notifier.
//!
//! Outbound only: reminders and digests go out through `sendMessage`.
//! Docs: <https://core.telegram.org/bots/api#sendmessage>

mod send;
pub(crate) mod types;

#[cfg(test)]
mod tests;

use aide_core::config::TelegramConfig;
use aide_core::error::AideError;
use aide_core::message::Notification;
use aide_core::traits::Notifier;
use async_trait::async_trait;

pub use send::split_message;

/// Telegram's per-message character limit.
pub const MAX_MESSAGE_CHARS: usize = 4096;

pub struct TelegramNotifier {
    client: reqwest::Client,
    base_url: String,
}

impl TelegramNotifier {
    /// Build from config. An empty `bot_token` falls back to the
    /// `TELEGRAM_BOT_TOKEN` environment variable.
    pub fn from_config(config: &TelegramConfig) -> Result<Self, AideError> {
        let token = if config.bot_token.trim().is_empty() {
            std::env::var("TELEGRAM_BOT_TOKEN").unwrap_or_default()
        } else {
            config.bot_token.trim().to_string()
        };
        if token.is_empty() {
            return Err(AideError::Config(
                "telegram is enabled but no bot token is set".into(),
            ));
        }
        Ok(Self::new(&token))
    }

    pub fn new(bot_token: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: format!("https://api.telegram.org/bot{bot_token}"),
        }
    }
}

#[async_trait]
impl Notifier for TelegramNotifier {
    fn name(&self) -> &str {
        "telegram"
    }

    async fn send(&self, notification: &Notification) -> Result<(), AideError> {
        let target = notification.reply_target.trim();
        let chat_id: i64 = target.parse().map_err(|e| {
            AideError::Channel(format!("invalid telegram chat_id '{target}': {e}"))
        })?;
        self.send_text(chat_id, &notification.text).await
    }
}
