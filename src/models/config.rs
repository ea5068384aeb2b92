//! Configuration module for the village portal
//!
//! Semua nilai dibaca dari environment dengan default yang aman untuk
//! development lokal. Token tidak pernah disimpan di konfigurasi.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;
use tracing::info;

use crate::models::errors::{AppError, AppResult};
use crate::utils::constants::{
    DEFAULT_API_BASE_URL, DEFAULT_API_TIMEOUT_SECS, ITEMS_PER_PAGE, SKIP_BROWSER_WARNING_HEADER,
    SKIP_BROWSER_WARNING_VALUE,
};

/// Remote village API configuration
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Base URL without trailing slash (e.g. "https://api.desa.id")
    pub base_url: String,
    /// Static headers sent with every request
    pub static_headers: Vec<(String, String)>,
    /// Timeout for a single request
    pub timeout: Duration,
    /// Rows per in-memory table page
    pub page_size: usize,
    /// Village profile id used for the boundary polygon
    pub profile_id: u64,
    /// Serve built-in demo data when a public map/IDM request fails
    pub demo_fallback: bool,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_BASE_URL.to_string(),
            static_headers: vec![
                ("Accept".to_string(), "application/json".to_string()),
                (
                    SKIP_BROWSER_WARNING_HEADER.to_string(),
                    SKIP_BROWSER_WARNING_VALUE.to_string(),
                ),
            ],
            timeout: Duration::from_secs(DEFAULT_API_TIMEOUT_SECS),
            page_size: ITEMS_PER_PAGE,
            profile_id: 1,
            demo_fallback: false,
        }
    }
}

impl ApiConfig {
    /// Config pointing at an explicit base URL, other values default
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: normalize_base_url(&base_url.into()),
            ..Self::default()
        }
    }

    /// Load from environment
    pub fn from_env() -> AppResult<Self> {
        let mut config = Self::default();

        if let Some(url) = env_non_empty("DESA_API_BASE_URL") {
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                return Err(AppError::invalid_config("DESA_API_BASE_URL", &url));
            }
            config.base_url = normalize_base_url(&url);
        }

        if let Some(raw) = env_non_empty("DESA_API_TIMEOUT_SECS") {
            let secs: u64 = raw
                .parse()
                .map_err(|_| AppError::invalid_config("DESA_API_TIMEOUT_SECS", &raw))?;
            config.timeout = Duration::from_secs(secs.max(1));
        }

        if let Ok(value) = std::env::var("DESA_API_SKIP_BROWSER_WARNING") {
            config
                .static_headers
                .retain(|(name, _)| name != SKIP_BROWSER_WARNING_HEADER);
            if !value.is_empty() {
                config
                    .static_headers
                    .push((SKIP_BROWSER_WARNING_HEADER.to_string(), value));
            }
        }

        if let Some(raw) = env_non_empty("DESA_PROFILE_ID") {
            config.profile_id = raw
                .parse()
                .map_err(|_| AppError::invalid_config("DESA_PROFILE_ID", &raw))?;
        }

        if let Some(raw) = env_non_empty("DESA_DEMO_FALLBACK") {
            config.demo_fallback = parse_flag(&raw)
                .ok_or_else(|| AppError::invalid_config("DESA_DEMO_FALLBACK", &raw))?;
        }

        info!(
            base_url = %config.base_url,
            timeout_secs = config.timeout.as_secs(),
            demo_fallback = config.demo_fallback,
            "Village API configured"
        );

        Ok(config)
    }

    /// Full URL for an endpoint path
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

/// View server configuration
#[derive(Debug, Clone)]
pub struct PortalConfig {
    pub host: String,
    pub port: u16,
    pub api: ApiConfig,
    /// Requests per minute per client
    pub rate_limit_per_minute: u32,
    /// Optional file-backed session for the process-wide login (CLI / kiosk use)
    pub session_file: Option<PathBuf>,
    /// Key the rate limiter on `X-Forwarded-For` / `X-Real-IP` (only behind a reverse proxy)
    pub trust_proxy_headers: bool,
}

impl PortalConfig {
    /// Load from environment.
    /// `PORT` wins over `DESA_PORTAL_PORT` (container platforms set `PORT`).
    pub fn from_env() -> AppResult<Self> {
        let host = env_non_empty("DESA_PORTAL_HOST").unwrap_or_else(|| "0.0.0.0".to_string());

        let port = match env_non_empty("PORT").or_else(|| env_non_empty("DESA_PORTAL_PORT")) {
            Some(raw) => raw
                .parse()
                .map_err(|_| AppError::invalid_config("PORT", &raw))?,
            None => 8080,
        };

        let rate_limit_per_minute = match env_non_empty("DESA_RATE_LIMIT_PER_MINUTE") {
            Some(raw) => raw
                .parse()
                .map_err(|_| AppError::invalid_config("DESA_RATE_LIMIT_PER_MINUTE", &raw))?,
            None => 120,
        };

        let trust_proxy_headers = match env_non_empty("DESA_TRUST_PROXY") {
            Some(raw) => parse_flag(&raw).ok_or_else(|| AppError::invalid_config("DESA_TRUST_PROXY", &raw))?,
            None => false,
        };

        Ok(Self {
            host,
            port,
            api: ApiConfig::from_env()?,
            rate_limit_per_minute,
            session_file: env_non_empty("DESA_SESSION_FILE").map(PathBuf::from),
            trust_proxy_headers,
        })
    }

    /// Socket address to bind
    pub fn socket_addr(&self) -> AppResult<SocketAddr> {
        let raw = format!("{}:{}", self.host, self.port);
        raw.parse()
            .map_err(|_| AppError::invalid_config("DESA_PORTAL_HOST", &raw))
    }
}

fn env_non_empty(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

fn normalize_base_url(url: &str) -> String {
    url.trim().trim_end_matches('/').to_string()
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_headers() {
        let config = ApiConfig::default();
        assert!(config
            .static_headers
            .iter()
            .any(|(k, v)| k == SKIP_BROWSER_WARNING_HEADER && v == "69420"));
        assert_eq!(config.page_size, 5);
        assert!(!config.demo_fallback);
    }

    #[test]
    fn test_url_joins_without_double_slash() {
        let config = ApiConfig::with_base_url("https://api.desa.id/");
        assert_eq!(config.url("/api/surat"), "https://api.desa.id/api/surat");
    }

    #[test]
    fn test_parse_flag() {
        assert_eq!(parse_flag("TRUE"), Some(true));
        assert_eq!(parse_flag("off"), Some(false));
        assert_eq!(parse_flag("maybe"), None);
    }
}
