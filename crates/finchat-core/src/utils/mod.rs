//! Utility modules for finchat-core
//!
//! - retry: Retry logic with exponential backoff
//! - rate_limiter: Per-key fixed-window throttling

mod rate_limiter;
mod retry;

pub use rate_limiter::{RateLimitConfig, RateLimitResult, RateLimiter};
pub use retry::{retry_with_backoff, RetryConfig};
