//! Toast center
//!
//! Ephemeral feedback messages. Each toast removes itself after its
//! duration via a tokio timer, or earlier through [`ToastCenter::remove`].
//! Either path may run first; the second is a no-op. Dropping the last
//! handle aborts every pending timer.

use crate::config::DEFAULT_TOAST_DURATION_MS;
use crate::events::{lock, Feed, IdClock, Subscription};
use crate::models::{Toast, ToastKind};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, Weak};
use std::time::Duration;
use tokio::task::JoinHandle;

struct Inner {
    toasts: Feed<Vec<Toast>>,
    timers: Mutex<HashMap<u64, JoinHandle<()>>>,
    ids: IdClock,
    default_duration: Duration,
}

impl Inner {
    /// Drop a toast; subscribers hear about it only if it was still present
    fn take(&self, id: u64) -> bool {
        self.toasts.update_if(|toasts| {
            let before = toasts.len();
            toasts.retain(|t| t.id != id);
            toasts.len() != before
        })
    }

    fn expire(&self, id: u64) {
        lock(&self.timers).remove(&id);
        if self.take(id) {
            tracing::debug!("Toast {} expired", id);
        }
    }
}

impl Drop for Inner {
    fn drop(&mut self) {
        let timers = std::mem::take(&mut *lock(&self.timers));
        for (_, handle) in timers {
            handle.abort();
        }
    }
}

/// Cloneable handle; clones share one list
#[derive(Clone)]
pub struct ToastCenter {
    inner: Arc<Inner>,
}

impl ToastCenter {
    pub fn new() -> Self {
        Self::with_default_duration(Duration::from_millis(DEFAULT_TOAST_DURATION_MS))
    }

    pub fn with_default_duration(default_duration: Duration) -> Self {
        Self {
            inner: Arc::new(Inner {
                toasts: Feed::new(Vec::new()),
                timers: Mutex::new(HashMap::new()),
                ids: IdClock::new(),
                default_duration,
            }),
        }
    }

    /// Append a toast and schedule its removal after `duration`.
    ///
    /// Must be called from within a tokio runtime for auto-removal; outside
    /// one the toast stays until removed explicitly.
    pub fn show(&self, message: impl Into<String>, kind: ToastKind, duration: Duration) -> u64 {
        let id = self.inner.ids.next_id();
        let toast = Toast {
            id,
            message: message.into(),
            kind,
            duration: u64::try_from(duration.as_millis()).unwrap_or(u64::MAX),
        };

        // Push before scheduling; a zero duration timer may fire right away
        self.inner.toasts.update(|toasts| toasts.push(toast));
        self.schedule_expiry(id, duration);
        id
    }

    pub fn success(&self, message: impl Into<String>) -> u64 {
        self.show(message, ToastKind::Success, self.inner.default_duration)
    }

    pub fn error(&self, message: impl Into<String>) -> u64 {
        self.show(message, ToastKind::Error, self.inner.default_duration)
    }

    pub fn info(&self, message: impl Into<String>) -> u64 {
        self.show(message, ToastKind::Info, self.inner.default_duration)
    }

    /// Remove a toast now and cancel its timer. Unknown ids are ignored.
    pub fn remove(&self, id: u64) {
        if let Some(handle) = lock(&self.inner.timers).remove(&id) {
            handle.abort();
        }
        self.inner.take(id);
    }

    /// Register a listener. It is called at once with the current list and
    /// again after every change, until the returned guard is dropped.
    #[must_use = "dropping the subscription unsubscribes immediately"]
    pub fn subscribe<F>(&self, callback: F) -> Subscription
    where
        F: Fn(&Vec<Toast>) + Send + Sync + 'static,
    {
        self.inner.toasts.subscribe(callback)
    }

    pub fn toasts(&self) -> Vec<Toast> {
        self.inner.toasts.get()
    }

    pub fn pending_timers(&self) -> usize {
        lock(&self.inner.timers).len()
    }

    fn schedule_expiry(&self, id: u64, duration: Duration) {
        let runtime = match tokio::runtime::Handle::try_current() {
            Ok(runtime) => runtime,
            Err(_) => {
                tracing::warn!("No async runtime, toast {} will not expire on its own", id);
                return;
            }
        };

        // Weak, so a pending timer never keeps a dropped center alive
        let weak: Weak<Inner> = Arc::downgrade(&self.inner);
        // Held across the spawn so the timer cannot finish before it is registered
        let mut timers = lock(&self.inner.timers);
        let handle = runtime.spawn(async move {
            tokio::time::sleep(duration).await;
            // Center gone: Drop already aborted us, or is about to
            if let Some(inner) = weak.upgrade() {
                inner.expire(id);
            }
        });
        timers.insert(id, handle);
    }
}

impl Default for ToastCenter {
    fn default() -> Self {
        Self::new()
    }
}
