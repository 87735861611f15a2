// src/notifications/channel.rs
// Outbound notification channels

use async_trait::async_trait;
use tokio::sync::broadcast;
use tracing::{debug, info};

use super::RecommendationNotification;
use crate::error::Result;

/// Where consolidated notifications are delivered
#[async_trait]
pub trait NotificationChannel: Send + Sync {
    async fn publish(&self, database_id: &str, notification: RecommendationNotification) -> Result<()>;
}

/// In-process fan-out to any number of subscribers
#[derive(Debug, Clone)]
pub struct BroadcastNotificationChannel {
    tx: broadcast::Sender<(String, RecommendationNotification)>,
}

impl BroadcastNotificationChannel {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<(String, RecommendationNotification)> {
        self.tx.subscribe()
    }
}

#[async_trait]
impl NotificationChannel for BroadcastNotificationChannel {
    async fn publish(&self, database_id: &str, notification: RecommendationNotification) -> Result<()> {
        // No subscribers is not an error
        if self.tx.send((database_id.to_string(), notification)).is_err() {
            debug!(database_id, "No notification subscribers");
        }
        Ok(())
    }
}

/// Writes notifications to the log as JSON
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingNotificationChannel;

#[async_trait]
impl NotificationChannel for TracingNotificationChannel {
    async fn publish(&self, database_id: &str, notification: RecommendationNotification) -> Result<()> {
        let payload = serde_json::to_string(&notification)?;
        info!(target: "notifications", database_id, %payload, "Recommendations notification");
        Ok(())
    }
}
