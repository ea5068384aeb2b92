//! View Server Middleware (Admin guard, Rate Limiting, Logging)

use axum::{
    extract::{ConnectInfo, Request, State},
    http::{HeaderMap, StatusCode},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use dashmap::DashMap;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

use super::context::AppState;
use crate::core::navigation::{guard_route, GuardDecision};
use crate::utils::constants::ROUTE_LOGIN;

/// Rate limiter configuration
#[derive(Debug, Clone)]
pub struct RateLimitConfig {
    /// Requests per window
    pub requests_per_window: u32,
    /// Window duration
    pub window_duration: Duration,
}

impl RateLimitConfig {
    pub fn per_minute(requests: u32) -> Self {
        Self {
            requests_per_window: requests.max(1),
            window_duration: Duration::from_secs(60),
        }
    }
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self::per_minute(120)
    }
}

/// In-memory rate limiter, keyed by client address
pub struct RateLimiter {
    requests: DashMap<String, (u32, Instant)>,
    config: RateLimitConfig,
}

impl RateLimiter {
    pub fn new(config: RateLimitConfig) -> Self {
        Self {
            requests: DashMap::new(),
            config,
        }
    }

    /// Check if request is allowed, returns (allowed, remaining, reset_seconds)
    pub fn check(&self, key: &str) -> (bool, u32, u64) {
        let now = Instant::now();

        let mut entry = self.requests.entry(key.to_string()).or_insert((0, now));

        // Reset window if expired
        if now.duration_since(entry.1) > self.config.window_duration {
            entry.0 = 0;
            entry.1 = now;
        }

        let remaining = self.config.requests_per_window.saturating_sub(entry.0);
        let reset_secs = self
            .config
            .window_duration
            .saturating_sub(now.duration_since(entry.1))
            .as_secs();

        if entry.0 >= self.config.requests_per_window {
            return (false, 0, reset_secs);
        }

        entry.0 += 1;
        (true, remaining.saturating_sub(1), reset_secs)
    }

    /// Drop windows idle for two periods; returns removed count
    pub fn cleanup(&self) -> usize {
        let now = Instant::now();
        let before = self.requests.len();
        self.requests.retain(|_, (_, timestamp)| {
            now.duration_since(*timestamp) < self.config.window_duration * 2
        });
        before.saturating_sub(self.requests.len())
    }

    pub fn tracked(&self) -> usize {
        self.requests.len()
    }
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new(RateLimitConfig::default())
    }
}

/// Periodic limiter cleanup (every 60s)
pub fn start_cleanup_task(limiter: Arc<RateLimiter>) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(60));
        loop {
            interval.tick().await;
            let removed = limiter.cleanup();
            if removed > 0 {
                debug!("🧹 Rate limiter cleanup: {} idle clients removed", removed);
            }
        }
    })
}

/// Rate-limit key: the socket peer, or the first forwarded hop when the
/// server runs behind a trusted proxy
fn client_key(headers: &HeaderMap, peer: Option<SocketAddr>, trust_proxy: bool) -> String {
    let forwarded = || {
        headers
            .get("X-Forwarded-For")
            .or_else(|| headers.get("x-real-ip"))
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.split(',').next())
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    };

    trust_proxy
        .then(forwarded)
        .flatten()
        .or_else(|| peer.map(|addr| addr.ip().to_string()))
        .unwrap_or_else(|| "unknown".to_string())
}

/// Rate limiting middleware
pub async fn rate_limit_middleware(
    State(state): State<Arc<AppState>>,
    request: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    // Skip rate limiting for health check
    if request.uri().path() == "/health" {
        return Ok(next.run(request).await);
    }

    let peer = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| *addr);
    let rate_key = client_key(request.headers(), peer, state.config.trust_proxy_headers);
    let (allowed, remaining, reset) = state.rate_limiter.check(&rate_key);

    if !allowed {
        warn!(key = %rate_key, "Rate limit exceeded");
        return Err(StatusCode::TOO_MANY_REQUESTS);
    }

    let mut response = next.run(request).await;

    let headers = response.headers_mut();
    headers.insert("X-RateLimit-Remaining", remaining.into());
    headers.insert("X-RateLimit-Reset", reset.into());

    Ok(response)
}

/// Admin sub-tree: no token → 303 to the login view, upstream never called
pub async fn admin_guard_middleware(
    State(state): State<Arc<AppState>>,
    request: Request,
    next: Next,
) -> Response {
    let (session, _) = state.session_for(request.headers());
    match guard_route(request.uri().path(), session.as_ref()) {
        GuardDecision::Allow => next.run(request).await,
        GuardDecision::RedirectToLogin => {
            info!(uri = %request.uri(), "🔒 Admin route without session, redirecting to login");
            Redirect::to(ROUTE_LOGIN).into_response()
        }
    }
}

/// Request logging middleware
pub async fn logging_middleware(request: Request, next: Next) -> Response {
    let start = Instant::now();
    let method = request.method().clone();
    let uri = request.uri().clone();

    let response = next.run(request).await;

    let latency = start.elapsed();
    let status = response.status();

    info!(
        method = %method,
        uri = %uri,
        status = %status.as_u16(),
        latency_ms = %latency.as_millis(),
        "Request completed"
    );

    response
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rate_limiter_window() {
        let limiter = RateLimiter::new(RateLimitConfig::per_minute(2));
        let (allowed, remaining, reset) = limiter.check("a");
        assert!(allowed);
        assert_eq!(remaining, 1);
        assert!(reset <= 60);
        assert!(limiter.check("a").0);
        let (allowed, remaining, _) = limiter.check("a");
        assert!(!allowed);
        assert_eq!(remaining, 0);
        assert!(limiter.check("b").0);
        assert_eq!(limiter.tracked(), 2);
    }

    #[test]
    fn test_client_key_uses_peer_address() {
        let peer: SocketAddr = "192.168.1.20:51234".parse().unwrap();
        let mut headers = HeaderMap::new();
        assert_eq!(client_key(&headers, None, false), "unknown");
        assert_eq!(client_key(&headers, Some(peer), false), "192.168.1.20");

        // Spoofed header is ignored without a trusted proxy
        headers.insert("X-Forwarded-For", "1.2.3.4".parse().unwrap());
        assert_eq!(client_key(&headers, Some(peer), false), "192.168.1.20");
    }

    #[test]
    fn test_client_key_takes_first_forwarded_hop_behind_proxy() {
        let proxy: SocketAddr = "10.0.0.1:443".parse().unwrap();
        let mut headers = HeaderMap::new();
        assert_eq!(client_key(&headers, Some(proxy), true), "10.0.0.1");
        headers.insert("x-real-ip", "10.0.0.9".parse().unwrap());
        assert_eq!(client_key(&headers, Some(proxy), true), "10.0.0.9");
        headers.insert("X-Forwarded-For", "1.2.3.4, 10.0.0.1".parse().unwrap());
        assert_eq!(client_key(&headers, Some(proxy), true), "1.2.3.4");
    }
}
