use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tracing::{info, warn};
use uuid::Uuid;

use crate::entities::stock_alert::{AlertPriority, AlertType};
use crate::notifications::{Notification, NotificationSink};

#[derive(Debug, Clone)]
pub struct EventSender {
    sender: mpsc::Sender<Event>,
}

impl EventSender {
    /// Creates a new EventSender
    pub fn new(sender: mpsc::Sender<Event>) -> Self {
        Self { sender }
    }

    /// Sends an event asynchronously
    pub async fn send(&self, event: Event) -> Result<(), String> {
        self.sender
            .send(event)
            .await
            .map_err(|e| format!("Failed to send event: {}", e))
    }

    /// Sends an event, logging on failure instead of surfacing it. Used
    /// after a commit, where the database is already the source of truth
    /// and a dropped notification must not fail the request.
    pub async fn send_or_log(&self, event: Event) {
        if let Err(e) = self.send(event).await {
            warn!("Dropping event after commit: {}", e);
        }
    }
}

/// Events emitted by the alert and replenishment services.
///
/// Emission is decoupled from the transactional core: a full channel or a
/// slow consumer can delay notifications but never roll back a commit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Event {
    AlertCreated {
        alert_id: Uuid,
        alert_type: AlertType,
        priority: AlertPriority,
        related_id: Uuid,
    },
    AlertAcknowledged(Uuid),
    AlertIgnored {
        alert_id: Uuid,
        reason: Option<String>,
    },
    AlertResolved {
        alert_id: Uuid,
        purchase_order_id: Uuid,
    },
    AlertDeleted(Uuid),
    PurchaseOrderIssued {
        purchase_order_id: Uuid,
        po_number: String,
        product_id: Uuid,
    },
    PurchaseOrderSent {
        purchase_order_id: Uuid,
        po_number: String,
        method: String,
        recipient: String,
    },
}

/// Consumes events off the channel and forwards the outward-facing ones to
/// the notification sink. Delivery failures are logged and dropped.
pub async fn process_events(mut rx: mpsc::Receiver<Event>, sink: Arc<dyn NotificationSink>) {
    info!("Starting event processing loop");

    while let Some(event) = rx.recv().await {
        info!("Received event: {:?}", event);

        let notification = match &event {
            Event::AlertCreated {
                alert_id,
                alert_type,
                priority,
                related_id,
            } => Some(Notification {
                channel: "ops".into(),
                recipient: "warehouse-dashboard".into(),
                subject: format!("New {} alert ({})", alert_type, priority),
                body: format!("Alert {} raised for {}", alert_id, related_id),
            }),
            Event::PurchaseOrderSent {
                purchase_order_id,
                po_number,
                method,
                recipient,
            } => Some(Notification {
                channel: method.clone(),
                recipient: recipient.clone(),
                subject: format!("Purchase order {}", po_number),
                body: format!("Purchase order {} issued, id {}", po_number, purchase_order_id),
            }),
            _ => None,
        };

        if let Some(notification) = notification {
            if let Err(e) = sink.deliver(notification).await {
                warn!("Notification delivery failed: {}", e);
            }
        }
    }

    warn!("Event processing loop has ended");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notifications::LoggingNotificationSink;

    #[tokio::test]
    async fn send_fails_once_receiver_is_gone() {
        let (tx, rx) = mpsc::channel(4);
        let sender = EventSender::new(tx);
        drop(rx);

        let result = sender.send(Event::AlertAcknowledged(Uuid::new_v4())).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn processing_drains_the_channel() {
        let (tx, rx) = mpsc::channel(4);
        let sender = EventSender::new(tx);

        sender
            .send(Event::AlertCreated {
                alert_id: Uuid::new_v4(),
                alert_type: crate::entities::stock_alert::AlertType::LowStock,
                priority: crate::entities::stock_alert::AlertPriority::Medium,
                related_id: Uuid::new_v4(),
            })
            .await
            .unwrap();
        sender
            .send(Event::AlertDeleted(Uuid::new_v4()))
            .await
            .unwrap();
        drop(sender);

        // Returns once the channel closes and everything was consumed
        process_events(rx, Arc::new(LoggingNotificationSink)).await;
    }
}
