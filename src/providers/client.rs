//! Village API Client - jalur tunggal ke REST API desa
//!
//! Tanggung jawab:
//! 1. Static headers dari konfigurasi + `Authorization: Bearer <token>`
//! 2. Token diambil dari SessionGuard; kalau tidak ada, request TIDAK dikirim
//! 3. Klasifikasi status: 401 → sesi kadaluarsa (hapus token, redirect sekali),
//!    404 → not found, lainnya → request failed dengan `message` dari server
//! 4. Multipart upload dan download binary (PDF)
//!
//! Tidak ada retry, backoff, atau dedup: setiap halaman fetch ulang penuh.

use reqwest::header::{HeaderMap, HeaderName, HeaderValue, AUTHORIZATION, USER_AGENT};
use reqwest::{Method, RequestBuilder, Response, StatusCode};
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

use crate::core::navigation::SessionGuard;
use crate::models::config::ApiConfig;
use crate::models::errors::{AppError, AppResult, ErrorCode};
use crate::utils::constants::USER_AGENT as USER_AGENT_CONST;

/// Credential requirement of a request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    /// Never send a token (`/api/publik/...`)
    Public,
    /// Send the token when one exists
    Optional,
    /// Token required; absent token aborts before sending
    Bearer,
}

/// Client for the remote village REST API
#[derive(Clone)]
pub struct DesaApiClient {
    http: reqwest::Client,
    config: ApiConfig,
    guard: Arc<SessionGuard>,
}

impl DesaApiClient {
    /// Create a client with its own connection pool
    pub fn new(config: ApiConfig, guard: Arc<SessionGuard>) -> AppResult<Self> {
        let http = Self::build_http(&config)?;
        Ok(Self::with_http(http, config, guard))
    }

    /// Create a client on a shared connection pool (one per request context)
    pub fn with_http(http: reqwest::Client, config: ApiConfig, guard: Arc<SessionGuard>) -> Self {
        Self {
            http,
            config,
            guard,
        }
    }

    /// Build the pooled HTTP client with static headers and gzip
    pub fn build_http(config: &ApiConfig) -> AppResult<reqwest::Client> {
        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, HeaderValue::from_static(USER_AGENT_CONST));
        for (name, value) in &config.static_headers {
            let name = HeaderName::from_bytes(name.as_bytes())
                .map_err(|_| AppError::invalid_config("static header name", name))?;
            let value = HeaderValue::from_str(value)
                .map_err(|_| AppError::invalid_config("static header value", value))?;
            headers.insert(name, value);
        }

        reqwest::Client::builder()
            .default_headers(headers)
            .gzip(true)
            .timeout(config.timeout)
            .build()
            .map_err(|e| AppError::with_source(ErrorCode::ConfigInvalidValue, "HTTP client build failed", e))
    }

    pub fn config(&self) -> &ApiConfig {
        &self.config
    }

    pub fn guard(&self) -> &Arc<SessionGuard> {
        &self.guard
    }

    // ============================================
    // Verbs
    // ============================================

    pub async fn get_json(&self, path: &str, access: Access) -> AppResult<Value> {
        let response = self.execute(Method::GET, path, access, |rb| rb).await?;
        Self::read_json(response).await
    }

    pub async fn post_json<B: Serialize + ?Sized>(
        &self,
        path: &str,
        access: Access,
        body: &B,
    ) -> AppResult<Value> {
        let response = self
            .execute(Method::POST, path, access, |rb| rb.json(body))
            .await?;
        Self::read_json(response).await
    }

    pub async fn put_json<B: Serialize + ?Sized>(
        &self,
        path: &str,
        access: Access,
        body: &B,
    ) -> AppResult<Value> {
        let response = self
            .execute(Method::PUT, path, access, |rb| rb.json(body))
            .await?;
        Self::read_json(response).await
    }

    pub async fn delete(&self, path: &str, access: Access) -> AppResult<()> {
        self.execute(Method::DELETE, path, access, |rb| rb).await?;
        Ok(())
    }

    pub async fn post_multipart(
        &self,
        path: &str,
        access: Access,
        form: reqwest::multipart::Form,
    ) -> AppResult<Value> {
        let response = self
            .execute(Method::POST, path, access, |rb| rb.multipart(form))
            .await?;
        Self::read_json(response).await
    }

    /// Binary download (e.g. APBDesa PDF)
    pub async fn get_bytes(&self, path: &str, access: Access) -> AppResult<Vec<u8>> {
        let response = self.execute(Method::GET, path, access, |rb| rb).await?;
        let bytes = response.bytes().await?;
        Ok(bytes.to_vec())
    }

    // ============================================
    // Core request path
    // ============================================

    async fn execute<F>(
        &self,
        method: Method,
        path: &str,
        access: Access,
        attach: F,
    ) -> AppResult<Response>
    where
        F: FnOnce(RequestBuilder) -> RequestBuilder,
    {
        let token = match access {
            Access::Public => None,
            Access::Optional => self.guard.optional_token(),
            Access::Bearer => Some(self.guard.require_token()?),
        };

        let url = self.config.url(path);
        let mut builder = self.http.request(method.clone(), &url);
        if let Some(token) = &token {
            builder = builder.header(AUTHORIZATION, format!("Bearer {}", token));
        }
        let builder = attach(builder);

        let start = Instant::now();
        let response = builder.send().await.map_err(|e| {
            warn!(method = %method, path, error = %e, "Village API request failed");
            AppError::from(e)
        })?;
        let status = response.status();

        info!(
            method = %method,
            path,
            status = status.as_u16(),
            latency_ms = start.elapsed().as_millis() as u64,
            authenticated = token.is_some(),
            "Village API request"
        );

        if status.is_success() {
            return Ok(response);
        }

        Err(self.classify_failure(status, token.is_some(), response).await)
    }

    async fn classify_failure(&self, status: StatusCode, sent_token: bool, response: Response) -> AppError {
        match status {
            StatusCode::UNAUTHORIZED => {
                if sent_token {
                    self.guard.expire();
                }
                AppError::unauthorized()
            }
            StatusCode::NOT_FOUND => AppError::not_found(),
            _ => {
                let body = response.text().await.unwrap_or_default();
                let message = server_message(&body)
                    .unwrap_or_else(|| format!("Request failed with status code {}", status.as_u16()));
                warn!(status = status.as_u16(), message = %message, "Village API rejected request");
                AppError::request_failed(status.as_u16(), message)
            }
        }
    }

    async fn read_json(response: Response) -> AppResult<Value> {
        let body = response.text().await?;
        if body.trim().is_empty() {
            return Ok(Value::Null);
        }
        serde_json::from_str(&body).map_err(|e| {
            debug!(error = %e, "Response body is not JSON");
            AppError::from(e)
        })
    }
}

/// `message` field of a JSON error body, if any
fn server_message(body: &str) -> Option<String> {
    serde_json::from_str::<Value>(body)
        .ok()?
        .get("message")?
        .as_str()
        .filter(|m| !m.is_empty())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::navigation::RecordingNavigator;
    use crate::core::session::MemorySession;

    #[test]
    fn test_server_message() {
        assert_eq!(
            server_message(r#"{"message":"Nama wajib diisi"}"#).as_deref(),
            Some("Nama wajib diisi")
        );
        assert_eq!(server_message(r#"{"message":""}"#), None);
        assert_eq!(server_message("<html>"), None);
    }

    #[test]
    fn test_rejects_invalid_static_header() {
        let mut config = ApiConfig::default();
        config.static_headers.push(("bad header".to_string(), "x".to_string()));
        assert!(DesaApiClient::build_http(&config).is_err());
    }

    #[tokio::test]
    async fn test_bearer_without_token_sends_nothing() {
        // Port 9 (discard) is never contacted: the token check fails first
        let config = ApiConfig::with_base_url("http://127.0.0.1:9");
        let nav = Arc::new(RecordingNavigator::new());
        let guard = Arc::new(SessionGuard::new(Arc::new(MemorySession::new()), nav.clone()));
        let client = DesaApiClient::new(config, guard).unwrap();

        let err = client.get_json("/api/surat", Access::Bearer).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::SessionMissingToken);
        assert_eq!(nav.visits(), vec!["/login".to_string()]);
    }
}
