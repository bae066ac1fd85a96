use crate::{error::AideError, message::Notification};
use async_trait::async_trait;

/// Outbound notification sender.
///
/// Every delivery transport (Telegram, a test recorder, ...) implements this
/// trait so the dispatch loop never depends on a concrete platform.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Human-readable channel name.
    fn name(&self) -> &str;

    /// Deliver one notification. An `Err` means it was not delivered.
    async fn send(&self, notification: &Notification) -> Result<(), AideError>;
}
