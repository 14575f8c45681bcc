//! Notification center
//!
//! Holds the in-app notification list, newest first. Construct exactly one
//! per running application and share it; construction publishes the
//! welcome notification.

use crate::config::WELCOME_NOTIFICATION;
use crate::events::{Feed, IdClock, Subscription};
use crate::models::Notification;
use chrono::Utc;
use std::sync::Arc;

struct Inner {
    notifications: Feed<Vec<Notification>>,
    ids: IdClock,
}

/// Cloneable handle; clones share one list
#[derive(Clone)]
pub struct NotificationCenter {
    inner: Arc<Inner>,
}

impl NotificationCenter {
    pub fn new() -> Self {
        let center = Self {
            inner: Arc::new(Inner {
                notifications: Feed::new(Vec::new()),
                ids: IdClock::new(),
            }),
        };
        center.publish(WELCOME_NOTIFICATION);
        center
    }

    /// Prepend a new unread notification and return its id
    pub fn publish(&self, text: impl Into<String>) -> u64 {
        let notification = Notification {
            id: self.inner.ids.next_id(),
            text: text.into(),
            read: false,
            timestamp: Utc::now(),
        };
        let id = notification.id;

        tracing::debug!("Publishing notification {}", id);
        self.update(|list| list.insert(0, notification));
        id
    }

    pub fn mark_read(&self, id: u64) {
        self.update(|list| {
            if let Some(n) = list.iter_mut().find(|n| n.id == id) {
                n.read = true;
            }
        });
    }

    pub fn mark_all_read(&self) {
        self.update(|list| list.iter_mut().for_each(|n| n.read = true));
    }

    pub fn dismiss(&self, id: u64) {
        self.update(|list| list.retain(|n| n.id != id));
    }

    /// Register a listener. It is called at once with the current list and
    /// again after every change, until the returned guard is dropped.
    #[must_use = "dropping the subscription unsubscribes immediately"]
    pub fn subscribe<F>(&self, callback: F) -> Subscription
    where
        F: Fn(&Vec<Notification>) + Send + Sync + 'static,
    {
        self.inner.notifications.subscribe(callback)
    }

    pub fn notifications(&self) -> Vec<Notification> {
        self.inner.notifications.get()
    }

    pub fn unread_count(&self) -> usize {
        self.inner
            .notifications
            .read(|list| list.iter().filter(|n| !n.read).count())
    }

    fn update(&self, change: impl FnOnce(&mut Vec<Notification>)) {
        self.inner.notifications.update(change);
    }
}

impl Default for NotificationCenter {
    fn default() -> Self {
        Self::new()
    }
}
