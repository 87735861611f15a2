// src/notifications/mod.rs
// New-recommendation events and the relay that turns them into notifications
//
// Producers (the repository adapter on every create) hold a
// `RecommendationPublisher`; the relay owns the receiving end of the same
// bounded queue. Delivery is best-effort: a full queue drops the event and
// clients can always rebuild state from `list()`.

pub mod channel;
pub mod relay;

use serde::Serialize;
use tokio::sync::mpsc::{self, error::TrySendError};
use tracing::{debug, warn};

use crate::recommendation::types::Recommendation;

pub use channel::{BroadcastNotificationChannel, NotificationChannel, TracingNotificationChannel};
pub use relay::{AnonymousSession, NotificationRelay, SessionSource};

/// Batch of freshly created recommendations for one database
#[derive(Debug, Clone, PartialEq)]
pub struct NewRecommendations {
    pub database_id: String,
    pub recommendations: Vec<Recommendation>,
}

/// Payload pushed to clients
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecommendationNotification {
    pub total_unread: u64,
    pub recommendations: Vec<Recommendation>,
}

/// Sending half of the new-recommendation queue
#[derive(Debug, Clone)]
pub struct RecommendationPublisher {
    tx: mpsc::Sender<NewRecommendations>,
}

impl RecommendationPublisher {
    /// Enqueue without waiting. Never fails; drops the event if the relay lags or is gone.
    pub fn publish(&self, event: NewRecommendations) {
        match self.tx.try_send(event) {
            Ok(()) => {}
            Err(TrySendError::Full(event)) => {
                warn!(
                    database_id = %event.database_id,
                    count = event.recommendations.len(),
                    "Notification queue full, dropping new recommendations event"
                );
            }
            Err(TrySendError::Closed(event)) => {
                debug!(database_id = %event.database_id, "Notification relay stopped, event discarded");
            }
        }
    }
}

/// Create the bounded queue between producers and the relay
pub fn queue(capacity: usize) -> (RecommendationPublisher, mpsc::Receiver<NewRecommendations>) {
    let (tx, rx) = mpsc::channel(capacity.max(1));
    (RecommendationPublisher { tx }, rx)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event(database_id: &str) -> NewRecommendations {
        NewRecommendations {
            database_id: database_id.to_string(),
            recommendations: Vec::new(),
        }
    }

    #[tokio::test]
    async fn test_publish_delivers_in_order() {
        let (publisher, mut rx) = queue(4);
        publisher.publish(event("a"));
        publisher.publish(event("b"));

        assert_eq!(rx.recv().await.unwrap().database_id, "a");
        assert_eq!(rx.recv().await.unwrap().database_id, "b");
    }

    #[tokio::test]
    async fn test_full_queue_drops_without_blocking() {
        let (publisher, mut rx) = queue(1);
        publisher.publish(event("kept"));
        publisher.publish(event("dropped"));

        assert_eq!(rx.recv().await.unwrap().database_id, "kept");
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_closed_queue_is_ignored() {
        let (publisher, rx) = queue(1);
        drop(rx);
        publisher.publish(event("nobody"));
    }
}
