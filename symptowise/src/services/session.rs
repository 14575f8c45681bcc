//! Session guard
//!
//! Tracks whether a user is signed in through a single flag in the backing
//! store. Sign-in itself happens elsewhere; this is what protected views
//! consult before rendering.

use crate::config::SESSION_KEY;
use crate::error::Result;
use crate::storage::BackingStore;

#[derive(Clone)]
pub struct SessionGuard<S> {
    backing: S,
}

impl<S: BackingStore> SessionGuard<S> {
    pub fn new(backing: S) -> Self {
        Self { backing }
    }

    /// True only when the flag holds the literal `true`
    pub async fn is_authenticated(&self) -> Result<bool> {
        let value = self.backing.get(SESSION_KEY).await?;
        Ok(value.as_deref() == Some("true"))
    }

    pub async fn mark_logged_in(&self) -> Result<()> {
        tracing::info!("Session started");
        self.backing.set(SESSION_KEY, "true").await
    }

    pub async fn logout(&self) -> Result<()> {
        tracing::info!("Session ended");
        self.backing.remove(SESSION_KEY).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;

    #[tokio::test]
    async fn test_login_logout_cycle() {
        let store = MemoryStore::new();
        let guard = SessionGuard::new(store.clone());

        assert!(!guard.is_authenticated().await.unwrap());

        guard.mark_logged_in().await.unwrap();
        assert!(guard.is_authenticated().await.unwrap());
        assert_eq!(store.peek(SESSION_KEY).as_deref(), Some("true"));

        guard.logout().await.unwrap();
        assert!(!guard.is_authenticated().await.unwrap());
        assert_eq!(store.peek(SESSION_KEY), None);
    }

    #[tokio::test]
    async fn test_other_values_are_not_a_session() {
        let store = MemoryStore::new();
        store.set(SESSION_KEY, "yes").await.unwrap();

        let guard = SessionGuard::new(store);

        assert!(!guard.is_authenticated().await.unwrap());
    }
}
