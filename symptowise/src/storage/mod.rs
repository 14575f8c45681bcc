//! Storage module
//!
//! Durable string-keyed backing stores. The health store mirrors its
//! collections here; it never reads them back except at load time.

pub mod file_store;
pub mod memory;
pub mod sqlite_store;

pub use file_store::FileStore;
pub use memory::MemoryStore;
pub use sqlite_store::SqliteStore;

use crate::error::Result;
use std::future::Future;

/// A durable key-value store holding one string value per key
pub trait BackingStore: Send + Sync {
    /// Read a key; `None` when the key has never been written or was removed
    fn get(&self, key: &str) -> impl Future<Output = Result<Option<String>>> + Send;

    /// Write a key, replacing any previous value
    fn set(&self, key: &str, value: &str) -> impl Future<Output = Result<()>> + Send;

    /// Remove a key; removing an absent key is not an error
    fn remove(&self, key: &str) -> impl Future<Output = Result<()>> + Send;
}
