//! In-process backing store
//!
//! Holds values in a shared map. An optional byte quota makes writes fail
//! the way a full browser storage area does.

use super::BackingStore;
use crate::error::{AppError, Result};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

#[derive(Debug, Default)]
struct Inner {
    values: HashMap<String, String>,
    quota: Option<usize>,
    writes: usize,
}

/// Cloneable in-memory store; clones share the same map
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    inner: Arc<Mutex<Inner>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store whose total size (keys plus values) may not exceed `bytes`
    pub fn with_quota(bytes: usize) -> Self {
        let store = Self::default();
        store.lock().quota = Some(bytes);
        store
    }

    /// Number of successful `set` calls since creation
    pub fn write_count(&self) -> usize {
        self.lock().writes
    }

    /// Current value of a key without going through the async interface
    pub fn peek(&self, key: &str) -> Option<String> {
        self.lock().values.get(key).cloned()
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl BackingStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.lock().values.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut inner = self.lock();

        if let Some(quota) = inner.quota {
            let others: usize = inner
                .values
                .iter()
                .filter(|(k, _)| k.as_str() != key)
                .map(|(k, v)| k.len() + v.len())
                .sum();
            if others + key.len() + value.len() > quota {
                return Err(AppError::Storage(format!(
                    "Quota of {} bytes exceeded writing '{}'",
                    quota, key
                )));
            }
        }

        inner.values.insert(key.to_string(), value.to_string());
        inner.writes += 1;
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<()> {
        self.lock().values.remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_set_get_remove() {
        let store = MemoryStore::new();

        assert_eq!(store.get("a").await.unwrap(), None);

        store.set("a", "1").await.unwrap();
        assert_eq!(store.get("a").await.unwrap().as_deref(), Some("1"));

        store.remove("a").await.unwrap();
        store.remove("a").await.unwrap();
        assert_eq!(store.get("a").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_clones_share_values() {
        let store = MemoryStore::new();
        let other = store.clone();

        store.set("shared", "yes").await.unwrap();

        assert_eq!(other.peek("shared").as_deref(), Some("yes"));
    }

    #[tokio::test]
    async fn test_quota_rejects_oversized_write() {
        let store = MemoryStore::with_quota(10);

        store.set("k", "12345").await.unwrap();
        let err = store.set("k2", "123456789").await.unwrap_err();

        assert!(matches!(err, AppError::Storage(_)));
        assert_eq!(store.peek("k2"), None);
        assert_eq!(store.write_count(), 1);
    }

    #[tokio::test]
    async fn test_quota_counts_replaced_value_once() {
        let store = MemoryStore::with_quota(8);

        store.set("k", "1234567").await.unwrap();
        store.set("k", "abcdefg").await.unwrap();

        assert_eq!(store.peek("k").as_deref(), Some("abcdefg"));
    }
}
