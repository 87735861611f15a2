// src/notifications/relay.rs
// Best-effort relay from new-recommendation events to the notification channel

use std::sync::Arc;

use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{debug, error, info};

use super::channel::NotificationChannel;
use super::{NewRecommendations, RecommendationNotification};
use crate::error::Result;
use crate::recommendation::ports::RecommendationRepository;
use crate::recommendation::types::SessionMetadata;

/// Supplies the session used for the relay's own repository lookups.
///
/// Events are produced outside any request, so there is no caller session to
/// reuse. Deployments that scope storage per session must provide one here.
pub trait SessionSource: Send + Sync {
    fn session_for(&self, database_id: &str) -> SessionMetadata;
}

/// Empty session for single-user deployments
#[derive(Debug, Default, Clone, Copy)]
pub struct AnonymousSession;

impl SessionSource for AnonymousSession {
    fn session_for(&self, _database_id: &str) -> SessionMetadata {
        SessionMetadata::default()
    }
}

/// Republishes new recommendations together with the database's unread count.
/// Not authoritative: every failure is logged and dropped.
pub struct NotificationRelay {
    repository: Arc<dyn RecommendationRepository>,
    channel: Arc<dyn NotificationChannel>,
    sessions: Arc<dyn SessionSource>,
}

impl NotificationRelay {
    pub fn new(repository: Arc<dyn RecommendationRepository>, channel: Arc<dyn NotificationChannel>) -> Self {
        Self {
            repository,
            channel,
            sessions: Arc::new(AnonymousSession),
        }
    }

    pub fn with_session_source(mut self, sessions: Arc<dyn SessionSource>) -> Self {
        self.sessions = sessions;
        self
    }

    /// Handle one event. Never fails.
    pub async fn on_new_recommendations(&self, event: NewRecommendations) {
        let database_id = event.database_id.clone();
        if let Err(e) = self.try_handle(event).await {
            error!(database_id = %database_id, "Failed to relay new recommendations: {}", e);
        }
    }

    /// Fallible form of [`NotificationRelay::on_new_recommendations`].
    /// Returns whether a notification was published.
    pub async fn try_handle(&self, event: NewRecommendations) -> Result<bool> {
        if event.recommendations.is_empty() {
            return Ok(false);
        }

        let session = self.sessions.session_for(&event.database_id);
        let total_unread = self
            .repository
            .get_total_unread(&session, &event.database_id)
            .await?;

        debug!(
            database_id = %event.database_id,
            count = event.recommendations.len(),
            total_unread,
            "Relaying new recommendations"
        );

        self.channel
            .publish(
                &event.database_id,
                RecommendationNotification {
                    total_unread,
                    recommendations: event.recommendations,
                },
            )
            .await?;
        Ok(true)
    }

    /// Consume events until the queue closes or shutdown is signalled
    pub async fn run(self, mut events: mpsc::Receiver<NewRecommendations>, mut shutdown: watch::Receiver<bool>) {
        info!("Notification relay started");

        loop {
            if *shutdown.borrow() {
                break;
            }

            tokio::select! {
                event = events.recv() => match event {
                    Some(event) => self.on_new_recommendations(event).await,
                    None => break,
                },
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                }
            }
        }

        info!("Notification relay stopped");
    }

    pub fn spawn(self, events: mpsc::Receiver<NewRecommendations>, shutdown: watch::Receiver<bool>) -> JoinHandle<()> {
        tokio::spawn(self.run(events, shutdown))
    }
}
