//! Telegram Bot API response envelope.

use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub(crate) struct TgResponse {
    pub ok: bool,
    pub description: Option<String>,
    /// Seconds to wait after a 429.
    pub parameters: Option<TgResponseParameters>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct TgResponseParameters {
    pub retry_after: Option<u64>,
}
