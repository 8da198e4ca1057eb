//! Fixed-window request throttling
//!
//! Each key gets a window that opens on its first request and admits
//! `max_requests` until it closes. The next request after that opens a fresh
//! window.

use std::collections::HashMap;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;

/// Rate limiter configuration
#[derive(Debug, Clone)]
pub struct RateLimitConfig {
    /// Maximum requests allowed in one window
    pub max_requests: u32,
    /// Window length
    pub window: Duration,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            max_requests: 100,
            window: Duration::from_secs(15 * 60),
        }
    }
}

impl RateLimitConfig {
    /// Create a new rate limit config
    #[must_use]
    pub fn new(max_requests: u32, window: Duration) -> Self {
        Self {
            max_requests,
            window,
        }
    }

    /// Create config for requests per minute
    #[must_use]
    pub fn per_minute(max_requests: u32) -> Self {
        Self::new(max_requests, Duration::from_secs(60))
    }
}

/// Result of a rate limit check
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RateLimitResult {
    /// Whether the request is allowed
    pub allowed: bool,
    /// Remaining requests in the current window
    pub remaining: u32,
    /// Time until the window closes
    pub reset_after: Duration,
}

#[derive(Debug, Clone, Copy)]
struct Window {
    started: Instant,
    count: u32,
}

/// In-memory per-key fixed-window limiter
#[derive(Debug)]
pub struct RateLimiter {
    config: RateLimitConfig,
    windows: Mutex<HashMap<String, Window>>,
}

impl RateLimiter {
    /// Create a new rate limiter
    #[must_use]
    pub fn new(config: RateLimitConfig) -> Self {
        Self {
            config,
            windows: Mutex::new(HashMap::new()),
        }
    }

    /// Configuration in use
    pub fn config(&self) -> &RateLimitConfig {
        &self.config
    }

    /// Count a request against `key` and report whether it is admitted
    pub async fn acquire(&self, key: &str) -> RateLimitResult {
        let now = Instant::now();
        let mut windows = self.windows.lock().await;

        let window = windows.entry(key.to_string()).or_insert(Window {
            started: now,
            count: 0,
        });
        if now.duration_since(window.started) >= self.config.window {
            *window = Window {
                started: now,
                count: 0,
            };
        }

        let reset_after = self
            .config
            .window
            .saturating_sub(now.duration_since(window.started));

        if window.count >= self.config.max_requests {
            return RateLimitResult {
                allowed: false,
                remaining: 0,
                reset_after,
            };
        }

        window.count += 1;
        RateLimitResult {
            allowed: true,
            remaining: self.config.max_requests - window.count,
            reset_after,
        }
    }

    /// Requests counted for `key` in its open window
    pub async fn usage(&self, key: &str) -> u32 {
        let now = Instant::now();
        self.windows
            .lock()
            .await
            .get(key)
            .filter(|w| now.duration_since(w.started) < self.config.window)
            .map_or(0, |w| w.count)
    }

    /// Drop closed windows, returning how many were removed
    pub async fn cleanup(&self) -> usize {
        let now = Instant::now();
        let mut windows = self.windows.lock().await;
        let before = windows.len();
        windows.retain(|_, w| now.duration_since(w.started) < self.config.window);
        before - windows.len()
    }
}
