//! Shared state dan konteks per-request
//!
//! Setiap request mendapat `SessionGuard` sendiri: token dibaca dari cookie
//! `authToken` (atau dari file session bila mode kiosk aktif), navigasi dan
//! notifikasi direkam lalu diubah menjadi respons HTTP.

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header, request::Parts, HeaderMap, HeaderValue, StatusCode},
    response::{IntoResponse, Redirect, Response},
    Json,
};
use serde::Serialize;
use std::convert::Infallible;
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, warn};

use super::middleware::{RateLimitConfig, RateLimiter};
use super::types::{ApiResponse, ViewResult};
use crate::core::navigation::{RecordingNavigator, SessionGuard};
use crate::core::notify::RecordingNotifier;
use crate::core::session::{FileSession, MemorySession, SessionStore};
use crate::models::config::PortalConfig;
use crate::models::errors::AppResult;
use crate::providers::client::DesaApiClient;
use crate::utils::constants::{AUTH_TOKEN_KEY, ROUTE_LOGIN};

/// Shared application state
pub struct AppState {
    pub config: PortalConfig,
    /// One connection pool for every request context
    pub http: reqwest::Client,
    pub rate_limiter: Arc<RateLimiter>,
    /// Process-wide login (kiosk mode) instead of the cookie
    pub shared_session: Option<Arc<FileSession>>,
    pub start_time: Instant,
}

impl AppState {
    pub fn new(config: PortalConfig) -> AppResult<Self> {
        let http = DesaApiClient::build_http(&config.api)?;
        let shared_session = match &config.session_file {
            Some(path) => {
                let session = FileSession::open(path)?;
                info!(path = %path.display(), "🗝️ Using file session (kiosk mode)");
                Some(Arc::new(session))
            }
            None => None,
        };
        let rate_limiter = Arc::new(RateLimiter::new(RateLimitConfig::per_minute(
            config.rate_limit_per_minute,
        )));

        Ok(Self {
            config,
            http,
            rate_limiter,
            shared_session,
            start_time: Instant::now(),
        })
    }

    pub fn uptime_seconds(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }

    /// Session for a request and whether it is cookie-backed
    pub fn session_for(&self, headers: &HeaderMap) -> (Arc<dyn SessionStore>, bool) {
        match &self.shared_session {
            Some(shared) => (shared.clone() as Arc<dyn SessionStore>, false),
            None => {
                let session = match token_from_cookies(headers) {
                    Some(token) => MemorySession::with_token(token),
                    None => MemorySession::new(),
                };
                (Arc::new(session), true)
            }
        }
    }

    pub fn context(&self, headers: &HeaderMap) -> ViewContext {
        let (session, cookie_backed) = self.session_for(headers);
        let initial_token = session.get_token();
        let navigator = Arc::new(RecordingNavigator::new());
        let guard = Arc::new(SessionGuard::new(session, navigator.clone()));
        let client = DesaApiClient::with_http(self.http.clone(), self.config.api.clone(), guard);

        ViewContext {
            client,
            navigator,
            notifier: RecordingNotifier::new(),
            initial_token,
            cookie_backed,
            start: Instant::now(),
        }
    }
}

/// `authToken` value of the Cookie header
pub fn token_from_cookies(headers: &HeaderMap) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|raw| raw.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == AUTH_TOKEN_KEY)
        .map(|(_, value)| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn session_cookie(token: Option<&str>) -> Option<HeaderValue> {
    let raw = match token {
        Some(token) => format!("{}={}; Path=/; HttpOnly; SameSite=Lax", AUTH_TOKEN_KEY, token),
        None => format!("{}=; Path=/; Max-Age=0; HttpOnly; SameSite=Lax", AUTH_TOKEN_KEY),
    };
    HeaderValue::from_str(&raw)
        .inspect_err(|_| warn!("⚠️ Token is not a valid cookie value"))
        .ok()
}

/// Per-request view context
pub struct ViewContext {
    pub client: DesaApiClient,
    navigator: Arc<RecordingNavigator>,
    notifier: RecordingNotifier,
    initial_token: Option<String>,
    cookie_backed: bool,
    start: Instant,
}

#[async_trait]
impl FromRequestParts<Arc<AppState>> for ViewContext {
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &Arc<AppState>) -> Result<Self, Self::Rejection> {
        Ok(state.context(&parts.headers))
    }
}

impl ViewContext {
    pub fn notifier(&self) -> &RecordingNotifier {
        &self.notifier
    }

    pub fn latency_ms(&self) -> f64 {
        self.start.elapsed().as_secs_f64() * 1000.0
    }

    /// Final HTTP response for a view result.
    /// A login redirect wins over the body (303 `/login`); any other
    /// navigation is reported in `redirect`. Token changes become cookies.
    pub fn respond<T: Serialize>(self, result: ViewResult<T>) -> Response {
        let latency_ms = self.latency_ms();
        let cookie = self.cookie_update();

        let mut response = if self.client.guard().has_redirected_to_login() {
            Redirect::to(ROUTE_LOGIN).into_response()
        } else {
            let (status, mut body) = match result {
                Ok(data) => (StatusCode::OK, ApiResponse::success(data, latency_ms)),
                Err((status, error)) => (status, ApiResponse::error(error, latency_ms)),
            };
            body.notifications = self.notifier.take();
            body.redirect = self.navigator.last().filter(|path| path != ROUTE_LOGIN);
            (status, Json(body)).into_response()
        };

        if let Some(cookie) = cookie {
            response.headers_mut().insert(header::SET_COOKIE, cookie);
        }
        response
    }

    /// Set-Cookie needed after the request, if the token changed
    fn cookie_update(&self) -> Option<HeaderValue> {
        if !self.cookie_backed {
            return None;
        }
        let current = self.client.guard().session().get_token();
        if current == self.initial_token {
            return None;
        }
        session_cookie(current.as_deref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::notify::{Notification, Notifier};
    use crate::models::config::ApiConfig;

    fn state() -> AppState {
        AppState::new(PortalConfig {
            host: "127.0.0.1".to_string(),
            port: 0,
            api: ApiConfig::with_base_url("http://127.0.0.1:9"),
            rate_limit_per_minute: 10,
            session_file: None,
            trust_proxy_headers: false,
        })
        .unwrap()
    }

    fn cookie_headers(raw: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(header::COOKIE, raw.parse().unwrap());
        headers
    }

    #[test]
    fn test_token_from_cookies() {
        assert_eq!(
            token_from_cookies(&cookie_headers("theme=dark; authToken=abc123")).as_deref(),
            Some("abc123")
        );
        assert_eq!(token_from_cookies(&cookie_headers("authToken=")), None);
        assert_eq!(token_from_cookies(&HeaderMap::new()), None);
    }

    #[tokio::test]
    async fn test_login_sets_cookie_and_carries_notifications() {
        let state = state();
        let ctx = state.context(&HeaderMap::new());
        ctx.client.guard().login("fresh").unwrap();
        ctx.notifier().notify(Notification::success("ok"));

        let response = ctx.respond(Ok("done"));
        assert_eq!(response.status(), StatusCode::OK);
        let cookie = response.headers().get(header::SET_COOKIE).unwrap().to_str().unwrap();
        assert!(cookie.starts_with("authToken=fresh"));
    }

    #[tokio::test]
    async fn test_expired_session_redirects_and_clears_cookie() {
        let state = state();
        let ctx = state.context(&cookie_headers("authToken=old"));
        ctx.client.guard().expire();

        let response = ctx.respond::<()>(Ok(()));
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(response.headers().get(header::LOCATION).unwrap(), "/login");
        let cookie = response.headers().get(header::SET_COOKIE).unwrap().to_str().unwrap();
        assert!(cookie.contains("Max-Age=0"));
    }
}
