//! Fixed-window, per-key admission control.
//!
//! Each key gets a window of `window` length starting at its first call.
//! Within a window at most `max_requests` calls are admitted; the next one
//! is rejected with [`NeoError::RateLimited`]. Once the window has elapsed
//! the key's count restarts at 1.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use tokio::time::Instant;
use tracing::{debug, warn};

use crate::error::NeoError;

#[derive(Debug, Clone, Copy)]
struct RateWindow {
    count: u32,
    window_start: Instant,
}

struct LimiterState {
    windows: HashMap<String, RateWindow>,
    last_prune: Instant,
}

pub struct RateLimiter {
    max_requests: u32,
    window: Duration,
    state: Mutex<LimiterState>,
}

impl RateLimiter {
    pub fn new(max_requests: u32, window: Duration) -> Self {
        Self {
            max_requests,
            window,
            state: Mutex::new(LimiterState {
                windows: HashMap::new(),
                last_prune: Instant::now(),
            }),
        }
    }

    pub fn max_requests(&self) -> u32 {
        self.max_requests
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    /// Admit one call for `key` or reject it.
    ///
    /// The lookup, comparison and increment happen under one lock so two
    /// concurrent callers can never both take the last slot.
    pub fn check_limit(&self, key: &str) -> Result<(), NeoError> {
        let now = Instant::now();
        let mut state = self.lock();

        if now.duration_since(state.last_prune) >= self.window {
            let window = self.window;
            let before = state.windows.len();
            state
                .windows
                .retain(|k, w| k == key || now.duration_since(w.window_start) < window);
            state.last_prune = now;
            let pruned = before - state.windows.len();
            if pruned > 0 {
                debug!(pruned, "pruned stale rate-limit windows");
            }
        }

        let entry = state.windows.entry(key.to_owned()).or_insert(RateWindow {
            count: 0,
            window_start: now,
        });

        if now.duration_since(entry.window_start) >= self.window {
            entry.count = 1;
            entry.window_start = now;
            return Ok(());
        }

        entry.count = entry.count.saturating_add(1);
        if entry.count > self.max_requests {
            let retry_after = self
                .window
                .saturating_sub(now.duration_since(entry.window_start));
            warn!(
                key,
                count = entry.count,
                max = self.max_requests,
                "rate limit exceeded"
            );
            return Err(NeoError::RateLimited {
                key: key.to_owned(),
                retry_after_ms: u64::try_from(retry_after.as_millis()).unwrap_or(u64::MAX),
            });
        }

        Ok(())
    }

    /// Calls still admissible for `key` in its current window.
    pub fn remaining(&self, key: &str) -> u32 {
        let now = Instant::now();
        match self.lock().windows.get(key) {
            Some(w) if now.duration_since(w.window_start) < self.window => {
                self.max_requests.saturating_sub(w.count)
            }
            _ => self.max_requests,
        }
    }

    fn tracked_keys(&self) -> usize {
        self.lock().windows.len()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, LimiterState> {
        // A panic while holding the lock leaves the counters consistent
        // (every mutation is a single assignment), so poisoning is ignored.
        self.state
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

impl std::fmt::Debug for RateLimiter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RateLimiter")
            .field("max_requests", &self.max_requests)
            .field("window", &self.window)
            .field("tracked_keys", &self.tracked_keys())
            .finish()
    }
}
