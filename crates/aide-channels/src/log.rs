//! A notifier that only writes to the log. Used when no transport is
//! configured, so sweeps can run locally.

use aide_core::{error::AideError, message::Notification, traits::Notifier};
use async_trait::async_trait;
use tracing::info;

#[derive(Debug, Default)]
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    fn name(&self) -> &str {
        "log"
    }

    async fn send(&self, notification: &Notification) -> Result<(), AideError> {
        info!(
            "log: to {} ({}): {}",
            notification.owner_id, notification.reply_target, notification.text
        );
        Ok(())
    }
}
