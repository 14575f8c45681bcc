//! Domain models
//!
//! Rust structs for every persisted or broadcast entity. All models use
//! serde with camelCase field names, matching the JSON documents the web
//! client stores.

pub mod feedback;
pub mod health;
pub mod reference;
pub mod seed;

pub use feedback::*;
pub use health::*;
pub use reference::*;

use serde::de::DeserializeOwned;
use serde::Serialize;

/// An element of one of the health store's persisted collections
pub trait Record: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {
    /// Backing-store key holding the whole collection
    const STORAGE_KEY: &'static str;

    fn id(&self) -> &str;
}
