use std::time::{Duration, Instant};

use dashmap::DashMap;

/// Sliding-window limiter for login attempts, keyed by username.
///
/// Kept in process memory. Entries are pruned lazily on each check, so an
/// idle key costs nothing after its window expires.
pub struct LoginRateLimiter {
    max_attempts: u32,
    window: Duration,
    attempts: DashMap<String, Vec<Instant>>,
}

impl LoginRateLimiter {
    pub fn new(max_attempts: u32, window: Duration) -> Self {
        Self {
            max_attempts,
            window,
            attempts: DashMap::new(),
        }
    }

    /// Records an attempt for `key` and returns `Err(retry_after_secs)` when
    /// the window already holds the maximum number of attempts.
    pub fn check(&self, key: &str) -> Result<(), u64> {
        let now = Instant::now();
        let mut entry = self.attempts.entry(key.to_string()).or_default();

        entry.retain(|t| now.duration_since(*t) < self.window);

        if entry.len() >= self.max_attempts as usize {
            let oldest = entry[0];
            let retry_after = self
                .window
                .saturating_sub(now.duration_since(oldest))
                .as_secs()
                .max(1);
            return Err(retry_after);
        }

        entry.push(now);
        Ok(())
    }

    /// Clears recorded attempts after a successful login.
    pub fn reset(&self, key: &str) {
        self.attempts.remove(key);
    }
}
