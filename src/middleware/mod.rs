//! Middleware module for the finchat HTTP server
//!
//! - Rate limiting middleware (per client IP, fixed window)

pub mod rate_limit;
