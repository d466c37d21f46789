use std::collections::HashMap;
use std::time::{Duration, Instant};

/// Per-key minimum-interval gate.
///
/// Keeps the last accepted timestamp for every key. An acquire inside the
/// window is denied and leaves the timestamp untouched; an accepted acquire
/// records its own timestamp in the same synchronous call, so two triggers
/// arriving in the same tick let exactly one through.
#[derive(Debug, Default)]
pub struct RateLimiter {
    last_triggered: HashMap<String, Instant>,
}

impl RateLimiter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Check-then-set: returns true if `key` is outside its window and
    /// records now as the new last-trigger time.
    pub fn try_acquire(&mut self, key: &str, min_interval: Duration) -> bool {
        self.try_acquire_at(key, min_interval, Instant::now())
    }

    fn try_acquire_at(&mut self, key: &str, min_interval: Duration, now: Instant) -> bool {
        if let Some(&last) = self.last_triggered.get(key) {
            if now.duration_since(last) < min_interval {
                return false;
            }
        }
        self.last_triggered.insert(key.to_string(), now);
        true
    }
}
