//! Rate limiting middleware for Axum
//!
//! Wraps the fixed-window `RateLimiter` from finchat-core as an Axum layer
//! keyed by client IP.

use axum::{
    extract::ConnectInfo,
    http::{header, Request, StatusCode},
    response::{IntoResponse, Response},
};
use finchat_core::{RateLimitConfig, RateLimiter};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::sync::Arc;
use std::task::{Context, Poll};
use std::time::Duration;
use tower::{Layer, Service};
use tracing::warn;

/// Rate limit configuration (deserializable from TOML)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateLimitSettings {
    /// Enable rate limiting
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Requests admitted per IP in one window
    #[serde(default = "default_max_requests")]
    pub max_requests: u32,
    /// Window length in seconds
    #[serde(default = "default_window_secs")]
    pub window_secs: u64,
}

fn default_true() -> bool {
    true
}
fn default_max_requests() -> u32 {
    100
}
fn default_window_secs() -> u64 {
    15 * 60
}

impl Default for RateLimitSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            max_requests: default_max_requests(),
            window_secs: default_window_secs(),
        }
    }
}

impl RateLimitSettings {
    fn limiter_config(&self) -> RateLimitConfig {
        RateLimitConfig::new(self.max_requests, Duration::from_secs(self.window_secs))
    }

    /// Body returned with every 429
    pub fn message(&self) -> String {
        let minutes = (self.window_secs / 60).max(1);
        let unit = if minutes == 1 { "minute" } else { "minutes" };
        format!("Too many requests from this IP, please try again after {minutes} {unit}.")
    }
}

/// Shared rate limiter state
#[derive(Clone)]
pub struct RateLimitState {
    limiter: Arc<RateLimiter>,
    enabled: bool,
    message: Arc<str>,
}

impl RateLimitState {
    /// Create a new rate limit state from settings
    pub fn new(settings: &RateLimitSettings) -> Self {
        Self {
            limiter: Arc::new(RateLimiter::new(settings.limiter_config())),
            enabled: settings.enabled,
            message: settings.message().into(),
        }
    }

    /// Count a request, returning the seconds until retry when limited
    pub async fn check_request(&self, key: &str) -> std::result::Result<(), u64> {
        if !self.enabled {
            return Ok(());
        }

        let result = self.limiter.acquire(key).await;
        if result.allowed {
            Ok(())
        } else {
            Err(result.reset_after.as_secs().max(1))
        }
    }

    /// Spawn periodic cleanup of closed windows
    pub fn spawn_cleanup(&self) {
        let limiter = self.limiter.clone();
        let period = limiter.config().window.max(Duration::from_secs(1));
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            loop {
                interval.tick().await;
                limiter.cleanup().await;
            }
        });
    }
}

/// Rate limiting layer for Axum
#[derive(Clone)]
pub struct RateLimitLayer {
    state: RateLimitState,
}

impl RateLimitLayer {
    /// Create a new rate limit layer
    pub fn new(settings: &RateLimitSettings) -> Self {
        Self {
            state: RateLimitState::new(settings),
        }
    }

    /// Get the inner state
    pub fn state(&self) -> &RateLimitState {
        &self.state
    }
}

impl<S> Layer<S> for RateLimitLayer {
    type Service = RateLimitService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        RateLimitService {
            inner,
            state: self.state.clone(),
        }
    }
}

/// Rate limiting service wrapper
#[derive(Clone)]
pub struct RateLimitService<S> {
    inner: S,
    state: RateLimitState,
}

type BoxFuture<T, E> =
    std::pin::Pin<Box<dyn std::future::Future<Output = std::result::Result<T, E>> + Send>>;

impl<S, B> Service<Request<B>> for RateLimitService<S>
where
    S: Service<Request<B>, Response = Response> + Send + Clone + 'static,
    S::Future: Send + 'static,
    B: Send + 'static,
{
    type Response = Response;
    type Error = S::Error;
    type Future = BoxFuture<Response, S::Error>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<std::result::Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, req: Request<B>) -> BoxFuture<Response, S::Error> {
        let state = self.state.clone();
        let mut inner = self.inner.clone();

        Box::pin(async move {
            let key = extract_rate_limit_key(&req);

            match state.check_request(&key).await {
                Ok(()) => inner.call(req).await,
                Err(retry_after) => {
                    warn!(key = %key, retry_after_secs = retry_after, "Rate limit exceeded");

                    let response = (
                        StatusCode::TOO_MANY_REQUESTS,
                        [(header::RETRY_AFTER, retry_after.to_string())],
                        state.message.to_string(),
                    )
                        .into_response();

                    Ok(response)
                }
            }
        })
    }
}

/// Extract the client IP used as the rate limit key
fn extract_rate_limit_key<B>(req: &Request<B>) -> String {
    if let Some(ConnectInfo(addr)) = req.extensions().get::<ConnectInfo<SocketAddr>>() {
        return format!("ip:{}", addr.ip());
    }

    // Fallback: use forwarded header
    if let Some(forwarded) = req.headers().get("x-forwarded-for") {
        if let Ok(value) = forwarded.to_str() {
            if let Some(ip) = value.split(',').next() {
                return format!("ip:{}", ip.trim());
            }
        }
    }

    "ip:unknown".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{body::Body, routing::get, Router};
    use tower::ServiceExt;

    fn app(settings: &RateLimitSettings) -> Router {
        Router::new()
            .route("/", get(|| async { "ok" }))
            .layer(RateLimitLayer::new(settings))
    }

    fn from_ip(ip: &str) -> Request<Body> {
        Request::builder()
            .uri("/")
            .header("x-forwarded-for", ip)
            .body(Body::empty())
            .unwrap()
    }

    #[test]
    fn test_default_message() {
        assert_eq!(
            RateLimitSettings::default().message(),
            "Too many requests from this IP, please try again after 15 minutes."
        );
    }

    #[test]
    fn test_key_prefers_connect_info() {
        let mut req = from_ip("203.0.113.9, 10.0.0.1");
        assert_eq!(extract_rate_limit_key(&req), "ip:203.0.113.9");

        let addr: SocketAddr = "192.0.2.1:5555".parse().unwrap();
        req.extensions_mut().insert(ConnectInfo(addr));
        assert_eq!(extract_rate_limit_key(&req), "ip:192.0.2.1");
    }

    #[tokio::test]
    async fn test_limit_returns_429_with_message() {
        let settings = RateLimitSettings {
            max_requests: 2,
            ..RateLimitSettings::default()
        };
        let app = app(&settings);

        for _ in 0..2 {
            let response = app.clone().oneshot(from_ip("198.51.100.7")).await.unwrap();
            assert_eq!(response.status(), StatusCode::OK);
        }

        let limited = app.clone().oneshot(from_ip("198.51.100.7")).await.unwrap();
        assert_eq!(limited.status(), StatusCode::TOO_MANY_REQUESTS);
        assert!(limited.headers().contains_key(header::RETRY_AFTER));
        let body = axum::body::to_bytes(limited.into_body(), usize::MAX)
            .await
            .unwrap();
        assert_eq!(body, settings.message().as_bytes());

        let other = app.oneshot(from_ip("198.51.100.8")).await.unwrap();
        assert_eq!(other.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_disabled_never_limits() {
        let settings = RateLimitSettings {
            enabled: false,
            max_requests: 1,
            ..RateLimitSettings::default()
        };
        let app = app(&settings);

        for _ in 0..3 {
            let response = app.clone().oneshot(from_ip("198.51.100.7")).await.unwrap();
            assert_eq!(response.status(), StatusCode::OK);
        }
    }
}
