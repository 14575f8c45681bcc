//! Change notification primitives
//!
//! - [`Observable`]: a thread-safe list of subscriber callbacks.
//! - [`Subscription`]: RAII guard that unsubscribes on drop.
//! - [`Feed`]: a shared value whose changes reach subscribers in order.
//! - [`IdClock`]: strictly increasing, time-derived numeric ids.

pub mod clock;
pub mod feed;
pub mod observable;

pub use clock::IdClock;
pub use feed::Feed;
pub use observable::{Observable, Subscription};

use std::sync::{Mutex, MutexGuard, PoisonError};

/// Lock a std mutex, recovering the data if a previous holder panicked
pub(crate) fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
