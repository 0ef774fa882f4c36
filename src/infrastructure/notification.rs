//! In-memory notification feed

use std::collections::VecDeque;
use std::sync::Arc;

use tokio::sync::RwLock;

use crate::domain::notification::Notification;

const FEED_CAPACITY: usize = 100;

/// Bounded feed of recent notifications, newest first
#[derive(Debug, Clone, Default)]
pub struct InMemoryNotificationFeed {
    entries: Arc<RwLock<VecDeque<Notification>>>,
}

impl InMemoryNotificationFeed {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn push(&self, notification: Notification) {
        let mut entries = self.entries.write().await;
        entries.push_front(notification);
        entries.truncate(FEED_CAPACITY);
    }

    pub async fn recent(&self, limit: usize) -> Vec<Notification> {
        self.entries.read().await.iter().take(limit).cloned().collect()
    }
}
