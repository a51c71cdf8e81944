//! In-memory snapshot cache with a time-to-live.

use std::sync::Mutex;
use std::time::{Duration, Instant};

/// Holds the last successful fetch and when it happened.
///
/// The slot is replaced wholesale on every store. The lock is only held for
/// the copy in or out, never across an await.
#[derive(Debug)]
pub struct FeedCache<T> {
    ttl: Duration,
    slot: Mutex<Option<(T, Instant)>>,
}

impl<T: Clone> FeedCache<T> {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            slot: Mutex::new(None),
        }
    }

    /// The cached snapshot, if it is younger than the TTL.
    pub fn get_fresh(&self) -> Option<T> {
        self.get_fresh_at(Instant::now())
    }

    fn get_fresh_at(&self, now: Instant) -> Option<T> {
        let slot = self.slot.lock().ok()?;
        match slot.as_ref() {
            Some((value, fetched_at)) if now.saturating_duration_since(*fetched_at) < self.ttl => {
                Some(value.clone())
            }
            _ => None,
        }
    }

    /// Replace the cached snapshot.
    pub fn store(&self, value: T) {
        self.store_at(value, Instant::now());
    }

    fn store_at(&self, value: T, fetched_at: Instant) {
        match self.slot.lock() {
            Ok(mut slot) => *slot = Some((value, fetched_at)),
            Err(poisoned) => *poisoned.into_inner() = Some((value, fetched_at)),
        }
    }

    /// Drop the cached snapshot.
    pub fn clear(&self) {
        if let Ok(mut slot) = self.slot.lock() {
            *slot = None;
        }
    }
}
