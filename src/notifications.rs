//! Outbound notification seam.
//!
//! Delivery is simulated: the only sink logs what a real integration would
//! send. The trait keeps the event loop decoupled from any concrete channel.

use async_trait::async_trait;
use tracing::info;

/// A message the event loop wants delivered somewhere outside the system.
#[derive(Debug, Clone)]
pub struct Notification {
    /// Delivery channel, e.g. "email" or "fax" for supplier sends, "ops"
    /// for internal alerting.
    pub channel: String,
    pub recipient: String,
    pub subject: String,
    pub body: String,
}

#[async_trait]
pub trait NotificationSink: Send + Sync {
    async fn deliver(&self, notification: Notification) -> Result<(), String>;
}

/// Sink that writes notifications to the log instead of sending them.
#[derive(Debug, Clone, Copy, Default)]
pub struct LoggingNotificationSink;

#[async_trait]
impl NotificationSink for LoggingNotificationSink {
    async fn deliver(&self, notification: Notification) -> Result<(), String> {
        info!(
            channel = %notification.channel,
            recipient = %notification.recipient,
            subject = %notification.subject,
            "Simulated notification delivery"
        );
        Ok(())
    }
}
