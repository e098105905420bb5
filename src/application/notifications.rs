// Notification center - user-visible, dismissable notices raised by panels
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::VecDeque;
use std::sync::Arc;
use tokio::sync::{Mutex, broadcast};
use uuid::Uuid;

/// Oldest notices are dropped once this many are waiting to be dismissed
const MAX_ACTIVE: usize = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationLevel {
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub id: Uuid,
    pub level: NotificationLevel,
    pub title: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Clone)]
pub struct Notifier {
    active: Arc<Mutex<VecDeque<Notification>>>,
    events: broadcast::Sender<Notification>,
}

impl Notifier {
    pub fn new() -> Self {
        let (events, _) = broadcast::channel(64);
        Self {
            active: Arc::new(Mutex::new(VecDeque::new())),
            events,
        }
    }

    pub async fn notify(
        &self,
        level: NotificationLevel,
        title: impl Into<String>,
        description: Option<String>,
    ) -> Uuid {
        let notification = Notification {
            id: Uuid::new_v4(),
            level,
            title: title.into(),
            description,
            created_at: Utc::now(),
        };
        let id = notification.id;

        {
            let mut active = self.active.lock().await;
            if active.len() == MAX_ACTIVE {
                active.pop_front();
            }
            active.push_back(notification.clone());
        }

        // No subscribers is fine; the notice stays listed until dismissed
        let _ = self.events.send(notification);
        id
    }

    pub async fn error(&self, title: impl Into<String>, description: impl Into<String>) -> Uuid {
        self.notify(NotificationLevel::Error, title, Some(description.into())).await
    }

    pub async fn success(&self, title: impl Into<String>) -> Uuid {
        self.notify(NotificationLevel::Success, title, None).await
    }

    pub async fn active(&self) -> Vec<Notification> {
        self.active.lock().await.iter().cloned().collect()
    }

    /// Returns false when no notice with this id is active
    pub async fn dismiss(&self, id: Uuid) -> bool {
        let mut active = self.active.lock().await;
        let before = active.len();
        active.retain(|n| n.id != id);
        active.len() != before
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Notification> {
        self.events.subscribe()
    }
}

impl Default for Notifier {
    fn default() -> Self {
        Self::new()
    }
}
