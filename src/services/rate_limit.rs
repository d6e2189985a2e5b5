use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

/// Fixed-window request counter keyed by client (usually the remote IP).
#[derive(Debug)]
pub struct RateLimiter {
    max_requests: u32,
    window: Duration,
    windows: Mutex<HashMap<String, (Instant, u32)>>,
}

impl RateLimiter {
    pub fn new(max_requests: u32, window: Duration) -> Self {
        Self {
            max_requests,
            window,
            windows: Mutex::new(HashMap::new()),
        }
    }

    pub fn per_minute(max_requests: u32) -> Self {
        Self::new(max_requests, Duration::from_secs(60))
    }

    /// Records a request from `key`; `false` once the key has used up its window.
    pub fn check(&self, key: &str) -> bool {
        self.check_at(key, Instant::now())
    }

    fn check_at(&self, key: &str, now: Instant) -> bool {
        let mut windows = self.windows.lock().unwrap_or_else(|poisoned| poisoned.into_inner());

        // Drop stale windows so idle clients do not accumulate.
        windows.retain(|_, (started, _)| now.duration_since(*started) < self.window);

        let (_, count) = windows.entry(key.to_string()).or_insert((now, 0));
        if *count >= self.max_requests {
            return false;
        }
        *count += 1;
        true
    }
}
