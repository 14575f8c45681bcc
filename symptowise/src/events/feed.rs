//! Latest-value feed
//!
//! A [`Feed`] owns a value, applies changes to it and delivers the value to
//! subscribers after every change.
//!
//! # Invariants
//!
//! 1. Only one caller delivers at a time. A change made while someone else
//!    is delivering, on another thread or from inside a callback, is picked
//!    up by that deliverer before it stops.
//! 2. Every delivery reads the value fresh, and each subscriber skips
//!    versions it has already seen, so no subscriber is handed an older
//!    value after a newer one and every subscriber ends on the current one.
//! 3. Sequential changes on one thread are each delivered before the
//!    changing call returns.

use super::lock;
use super::observable::{Observable, Subscription};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Mutex;

struct Versioned<T> {
    value: T,
    version: u64,
}

pub struct Feed<T> {
    state: Mutex<Versioned<T>>,
    observers: Observable<Versioned<T>>,
    delivering: AtomicBool,
    dirty: AtomicBool,
}

impl<T: Clone + Send + Sync + 'static> Feed<T> {
    pub fn new(value: T) -> Self {
        Self {
            // Subscribers start at version 0, so they always get the first delivery
            state: Mutex::new(Versioned { value, version: 1 }),
            observers: Observable::new(),
            delivering: AtomicBool::new(false),
            dirty: AtomicBool::new(false),
        }
    }

    /// Change the value and deliver the result
    pub fn update<R>(&self, change: impl FnOnce(&mut T) -> R) -> R {
        let outcome = {
            let mut state = lock(&self.state);
            let outcome = change(&mut state.value);
            state.version += 1;
            outcome
        };
        self.flush();
        outcome
    }

    /// Like [`Feed::update`], but nothing is delivered when `change`
    /// reports that it left the value alone
    pub fn update_if(&self, change: impl FnOnce(&mut T) -> bool) -> bool {
        let changed = {
            let mut state = lock(&self.state);
            let changed = change(&mut state.value);
            if changed {
                state.version += 1;
            }
            changed
        };
        if changed {
            self.flush();
        }
        changed
    }

    pub fn get(&self) -> T {
        lock(&self.state).value.clone()
    }

    pub fn read<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        f(&lock(&self.state).value)
    }

    /// Register a listener; it receives the current value first and then
    /// every later change
    #[must_use = "dropping the subscription unsubscribes immediately"]
    pub fn subscribe<F>(&self, callback: F) -> Subscription
    where
        F: Fn(&T) + Send + Sync + 'static,
    {
        let seen = AtomicU64::new(0);
        let subscription = self.observers.subscribe(move |snapshot: &Versioned<T>| {
            // Deliveries are serialized, so a plain load/store pair is enough
            if snapshot.version > seen.load(Ordering::Acquire) {
                seen.store(snapshot.version, Ordering::Release);
                callback(&snapshot.value);
            }
        });
        self.flush();
        subscription
    }

    fn flush(&self) {
        // Mark before claiming, so a deliverer that is just stopping sees it
        self.dirty.store(true, Ordering::SeqCst);
        loop {
            if self.delivering.swap(true, Ordering::SeqCst) {
                return;
            }

            while self.dirty.swap(false, Ordering::SeqCst) {
                let snapshot = {
                    let state = lock(&self.state);
                    Versioned {
                        value: state.value.clone(),
                        version: state.version,
                    }
                };
                self.observers.notify(&snapshot);
            }

            self.delivering.store(false, Ordering::SeqCst);
            // A change may have landed between the last read and the release
            if !self.dirty.load(Ordering::SeqCst) {
                return;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    fn recorder(feed: &Feed<u32>) -> (Arc<Mutex<Vec<u32>>>, Subscription) {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sub = {
            let seen = Arc::clone(&seen);
            feed.subscribe(move |v| seen.lock().unwrap().push(*v))
        };
        (seen, sub)
    }

    #[test]
    fn test_sequential_changes_all_delivered() {
        let feed = Feed::new(0u32);
        let (seen, _sub) = recorder(&feed);

        feed.update(|v| *v += 1);
        feed.update(|v| *v += 1);
        assert!(!feed.update_if(|_| false));

        assert_eq!(*seen.lock().unwrap(), vec![0, 1, 2]);
    }

    #[test]
    fn test_late_subscriber_only_gets_current() {
        let feed = Feed::new(5u32);
        let (first, _a) = recorder(&feed);

        let (second, _b) = recorder(&feed);

        assert_eq!(*first.lock().unwrap(), vec![5]);
        assert_eq!(*second.lock().unwrap(), vec![5]);
    }

    #[test]
    fn test_change_from_inside_callback() {
        let feed = Arc::new(Feed::new(0u32));
        let seen = Arc::new(Mutex::new(Vec::new()));
        let _sub = {
            let inner = Arc::clone(&feed);
            let seen = Arc::clone(&seen);
            feed.subscribe(move |v| {
                seen.lock().unwrap().push(*v);
                if *v == 1 {
                    inner.update(|x| *x = 2);
                }
            })
        };

        feed.update(|v| *v = 1);

        assert_eq!(*seen.lock().unwrap(), vec![0, 1, 2]);
    }

    #[test]
    fn test_concurrent_changes_deliver_in_order() {
        let feed = Arc::new(Feed::new(0u32));
        let (seen, _sub) = recorder(&feed);

        let workers: Vec<_> = (0..4)
            .map(|_| {
                let feed = Arc::clone(&feed);
                thread::spawn(move || {
                    for _ in 0..250 {
                        feed.update(|v| *v += 1);
                    }
                })
            })
            .collect();
        for worker in workers {
            worker.join().unwrap();
        }

        let seen = seen.lock().unwrap();
        assert!(seen.windows(2).all(|w| w[0] < w[1]));
        assert_eq!(*seen.last().unwrap(), 1000);
    }
}
