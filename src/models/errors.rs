//! Centralized Error Handling Module
//!
//! Setiap kegagalan punya kode error yang unik supaya mudah dilacak di log.
//!
//! Error codes follow pattern: CATEGORY_SPECIFIC_ERROR
//! - SESSION_xxx: credential / session storage errors
//! - API_xxx: remote village API errors
//! - NETWORK_xxx: transport errors
//! - VALIDATION_xxx / SHAPE_xxx: client-side checks
//! - CFG_xxx: configuration errors

use std::fmt;

use crate::utils::constants::{
    MSG_NOT_FOUND, MSG_SESSION_EXPIRED, MSG_TOKEN_MISSING, MSG_UNKNOWN_ERROR,
};

/// Application-wide error type
#[derive(Debug)]
pub struct AppError {
    /// Unique error code for logging/monitoring
    pub code: ErrorCode,
    /// Human-readable message (Indonesian, shown to the user where relevant)
    pub message: String,
    /// HTTP status returned by the remote API, if any
    pub status: Option<u16>,
    /// Optional underlying error
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl AppError {
    /// Create a new AppError
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            status: None,
            source: None,
        }
    }

    /// Create AppError with source error
    pub fn with_source(
        code: ErrorCode,
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self {
            code,
            message: message.into(),
            status: None,
            source: Some(Box::new(source)),
        }
    }

    /// Attach the remote HTTP status
    pub fn with_status(mut self, status: u16) -> Self {
        self.status = Some(status);
        self
    }

    /// Get error code as string (for logging)
    pub fn code_str(&self) -> &'static str {
        self.code.as_str()
    }

    /// True when the user has to log in again (missing token or 401)
    pub fn requires_login(&self) -> bool {
        matches!(
            self.code,
            ErrorCode::SessionMissingToken | ErrorCode::ApiUnauthorized
        )
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code.as_str(), self.message)
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_ref()
            .map(|e| e.as_ref() as &(dyn std::error::Error + 'static))
    }
}

/// Unique error codes for monitoring
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    // ============================================
    // Session Errors (1xx)
    // ============================================
    /// No token in the session store
    SessionMissingToken,
    /// Session store could not be read or written
    SessionStorage,

    // ============================================
    // Remote API Errors (2xx)
    // ============================================
    /// Remote API answered 401
    ApiUnauthorized,
    /// Remote API answered 404
    ApiNotFound,
    /// Remote API answered any other non-success status
    ApiRequestFailed,
    /// Response body did not have any of the known shapes
    ShapeMismatch,

    // ============================================
    // Network Errors (3xx)
    // ============================================
    /// Connection could not be established
    NetworkFailed,
    /// Request timed out
    NetworkTimeout,

    // ============================================
    // Client-side Validation (4xx)
    // ============================================
    /// Form input rejected before any request was sent
    ValidationFailed,
    /// Action not available (e.g. PDF for the running year)
    ActionUnavailable,

    // ============================================
    // Configuration Errors (5xx)
    // ============================================
    /// Missing environment variable
    ConfigMissingEnv,
    /// Invalid configuration value
    ConfigInvalidValue,

    // ============================================
    // Generic Errors (9xx)
    // ============================================
    /// Unknown error
    Unknown,
}

impl ErrorCode {
    /// Get string representation of error code
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SessionMissingToken => "SESSION_MISSING_TOKEN",
            Self::SessionStorage => "SESSION_STORAGE",

            Self::ApiUnauthorized => "API_UNAUTHORIZED",
            Self::ApiNotFound => "API_NOT_FOUND",
            Self::ApiRequestFailed => "API_REQUEST_FAILED",
            Self::ShapeMismatch => "SHAPE_MISMATCH",

            Self::NetworkFailed => "NETWORK_FAILED",
            Self::NetworkTimeout => "NETWORK_TIMEOUT",

            Self::ValidationFailed => "VALIDATION_FAILED",
            Self::ActionUnavailable => "ACTION_UNAVAILABLE",

            Self::ConfigMissingEnv => "CFG_MISSING_ENV",
            Self::ConfigInvalidValue => "CFG_INVALID_VALUE",

            Self::Unknown => "UNKNOWN_ERROR",
        }
    }

    /// Get HTTP status code for view responses
    pub fn http_status(&self) -> u16 {
        match self {
            Self::ValidationFailed | Self::ConfigInvalidValue => 400,
            Self::SessionMissingToken | Self::ApiUnauthorized => 401,
            Self::ApiNotFound => 404,
            Self::ActionUnavailable => 409,
            Self::ApiRequestFailed | Self::ShapeMismatch | Self::NetworkFailed => 502,
            Self::NetworkTimeout => 504,
            _ => 500,
        }
    }
}

// ============================================
// Convenience constructors
// ============================================

impl AppError {
    /// Token absent from the session store
    pub fn missing_token() -> Self {
        Self::new(ErrorCode::SessionMissingToken, MSG_TOKEN_MISSING)
    }

    /// Remote API rejected the token
    pub fn unauthorized() -> Self {
        Self::new(ErrorCode::ApiUnauthorized, MSG_SESSION_EXPIRED).with_status(401)
    }

    /// Remote endpoint not found
    pub fn not_found() -> Self {
        Self::new(ErrorCode::ApiNotFound, MSG_NOT_FOUND).with_status(404)
    }

    /// Remote API answered with a non-success status
    pub fn request_failed(status: u16, msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::ApiRequestFailed, msg).with_status(status)
    }

    /// Client-side validation failure
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::ValidationFailed, msg)
    }

    /// Response body shape not recognised
    pub fn shape_mismatch(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::ShapeMismatch, msg)
    }

    /// Action refused locally
    pub fn unavailable(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::ActionUnavailable, msg)
    }

    /// Session store failure
    pub fn session_storage(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::SessionStorage, msg)
    }

    /// Missing environment variable
    pub fn missing_env(name: &str) -> Self {
        Self::new(
            ErrorCode::ConfigMissingEnv,
            format!("Missing environment variable: {}", name),
        )
    }

    /// Invalid configuration value
    pub fn invalid_config(name: &str, value: &str) -> Self {
        Self::new(
            ErrorCode::ConfigInvalidValue,
            format!("Invalid value for {}: {}", name, value),
        )
    }

    /// Unknown failure
    pub fn unknown() -> Self {
        Self::new(ErrorCode::Unknown, MSG_UNKNOWN_ERROR)
    }
}

// ============================================
// Result type alias
// ============================================

/// Application Result type
pub type AppResult<T> = Result<T, AppError>;

// ============================================
// Conversion from common error types
// ============================================

impl From<eyre::Report> for AppError {
    fn from(err: eyre::Report) -> Self {
        Self::new(ErrorCode::Unknown, err.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        Self::with_source(ErrorCode::SessionStorage, "IO error", err)
    }
}

impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::new(ErrorCode::NetworkTimeout, "Request timeout")
        } else if err.is_connect() {
            Self::new(ErrorCode::NetworkFailed, "Connection failed")
        } else if err.is_decode() {
            Self::with_source(ErrorCode::ShapeMismatch, "Response decode error", err)
        } else {
            Self::new(ErrorCode::NetworkFailed, err.to_string())
        }
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        Self::with_source(ErrorCode::ShapeMismatch, "JSON parse error", err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        let err = AppError::unauthorized();
        assert_eq!(err.code, ErrorCode::ApiUnauthorized);
        assert_eq!(err.code_str(), "API_UNAUTHORIZED");
        assert_eq!(err.status, Some(401));
    }

    #[test]
    fn test_requires_login() {
        assert!(AppError::missing_token().requires_login());
        assert!(AppError::unauthorized().requires_login());
        assert!(!AppError::not_found().requires_login());
        assert!(!AppError::validation("x").requires_login());
    }

    #[test]
    fn test_http_status() {
        assert_eq!(ErrorCode::ValidationFailed.http_status(), 400);
        assert_eq!(ErrorCode::ApiNotFound.http_status(), 404);
        assert_eq!(ErrorCode::NetworkTimeout.http_status(), 504);
        assert_eq!(ErrorCode::Unknown.http_status(), 500);
    }

    #[test]
    fn test_display_includes_code() {
        let err = AppError::validation("Kategori pengaduan harus dipilih");
        assert_eq!(
            err.to_string(),
            "[VALIDATION_FAILED] Kategori pengaduan harus dipilih"
        );
    }
}
