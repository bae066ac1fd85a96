//! `sendMessage` with chunking and a single rate-limit retry.

use super::types::TgResponse;
use super::{TelegramNotifier, MAX_MESSAGE_CHARS};
use aide_core::error::AideError;
use std::time::Duration;
use tracing::{debug, warn};

/// Longest wait honored from a 429 `retry_after`.
const MAX_RETRY_AFTER_SECS: u64 = 30;

impl TelegramNotifier {
    /// Send `text`, split into chunks under the limit. Fails on the first
    /// chunk Telegram does not accept.
    pub(crate) async fn send_text(&self, chat_id: i64, text: &str) -> Result<(), AideError> {
        for chunk in split_message(text, MAX_MESSAGE_CHARS) {
            match self.post_chunk(chat_id, chunk).await? {
                None => {}
                Some(wait) => {
                    debug!("telegram: rate limited, retrying in {wait}s");
                    tokio::time::sleep(Duration::from_secs(wait)).await;
                    if let Some(wait) = self.post_chunk(chat_id, chunk).await? {
                        return Err(AideError::Channel(format!(
                            "telegram still rate limited (retry after {wait}s)"
                        )));
                    }
                }
            }
        }
        Ok(())
    }

    /// Post one chunk. `Ok(Some(secs))` means rate limited.
    async fn post_chunk(&self, chat_id: i64, chunk: &str) -> Result<Option<u64>, AideError> {
        let body = serde_json::json!({
            "chat_id": chat_id,
            "text": chunk,
        });
        let resp = self
            .client
            .post(format!("{}/sendMessage", self.base_url))
            .json(&body)
            .send()
            .await
            .map_err(|e| AideError::Channel(format!("telegram send failed: {e}")))?;

        let status = resp.status();
        if status.is_success() {
            return Ok(None);
        }

        let raw = resp.text().await.unwrap_or_default();
        let parsed: Option<TgResponse> = serde_json::from_str(&raw).ok();
        if status.as_u16() == 429 {
            let wait = parsed
                .as_ref()
                .and_then(|r| r.parameters.as_ref())
                .and_then(|p| p.retry_after)
                .unwrap_or(1)
                .min(MAX_RETRY_AFTER_SECS);
            return Ok(Some(wait));
        }

        let description = parsed
            .filter(|r| !r.ok)
            .and_then(|r| r.description)
            .unwrap_or(raw);
        warn!("telegram send got {status}: {description}");
        Err(AideError::Channel(format!(
            "telegram send got {status}: {description}"
        )))
    }
}

/// Split a message into chunks of at most `max_chars` characters,
/// preferring to break after a newline. Never splits inside a character.
pub fn split_message(text: &str, max_chars: usize) -> Vec<&str> {
    let max_chars = max_chars.max(1);
    let mut chunks = Vec::new();
    let mut rest = text;

    while rest.chars().count() > max_chars {
        let limit = rest
            .char_indices()
            .nth(max_chars)
            .map(|(i, _)| i)
            .unwrap_or(rest.len());
        let break_at = rest[..limit]
            .rfind('\n')
            .map(|i| i + 1)
            .unwrap_or(limit);
        chunks.push(&rest[..break_at]);
        rest = &rest[break_at..];
    }
    if !rest.is_empty() || chunks.is_empty() {
        chunks.push(rest);
    }
    chunks
}
