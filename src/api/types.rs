//! View Server Request/Response Types

use axum::http::StatusCode;
use serde::{Deserialize, Serialize};

use crate::core::loader::{FailureKind, LoadFailure, LoadState};
use crate::core::notify::Notification;
use crate::models::errors::AppError;
use crate::models::types::{ArticleOption, Pengaduan};
use crate::services::fasilitas::FacilityForm;
use crate::services::pengaduan::ComplaintCounts;

/// View response wrapper
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ApiError>,
    /// Toasts raised while handling the request
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub notifications: Vec<Notification>,
    /// Client-side navigation requested by the view (not a login redirect)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub redirect: Option<String>,
    pub latency_ms: f64,
    pub timestamp: i64,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn success(data: T, latency_ms: f64) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
            notifications: Vec::new(),
            redirect: None,
            latency_ms,
            timestamp: chrono::Utc::now().timestamp(),
        }
    }

    pub fn error(error: ApiError, latency_ms: f64) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(error),
            notifications: Vec::new(),
            redirect: None,
            latency_ms,
            timestamp: chrono::Utc::now().timestamp(),
        }
    }
}

/// API Error
#[derive(Debug, Clone, Serialize)]
pub struct ApiError {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            code: "BAD_REQUEST".to_string(),
            message: message.into(),
            details: None,
        }
    }

    pub fn rate_limited(retry_after: u64) -> Self {
        Self {
            code: "RATE_LIMITED".to_string(),
            message: format!("Rate limit exceeded. Retry after {} seconds", retry_after),
            details: Some(format!("retry_after: {}", retry_after)),
        }
    }
}

impl From<&AppError> for ApiError {
    fn from(err: &AppError) -> Self {
        Self {
            code: err.code_str().to_string(),
            message: err.message.clone(),
            details: err.status.map(|s| format!("upstream status {}", s)),
        }
    }
}

impl From<&LoadFailure> for ApiError {
    fn from(f: &LoadFailure) -> Self {
        Self {
            code: f.code.to_string(),
            message: f.message.clone(),
            details: None,
        }
    }
}

/// Failed view: HTTP status + body error
pub type ViewError = (StatusCode, ApiError);
pub type ViewResult<T> = Result<T, ViewError>;

pub fn view_error(err: &AppError) -> ViewError {
    let status = StatusCode::from_u16(err.code.http_status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (status, ApiError::from(err))
}

/// Ready data or the failure state as a view error
pub fn from_load<T>(state: LoadState<T>) -> ViewResult<T> {
    match state {
        LoadState::Ready { data } => Ok(data),
        LoadState::Failed { failure } => {
            let status = match failure.kind {
                FailureKind::LoginRequired => StatusCode::UNAUTHORIZED,
                FailureKind::NotFound => StatusCode::NOT_FOUND,
                FailureKind::Generic => StatusCode::BAD_GATEWAY,
            };
            Err((status, ApiError::from(&failure)))
        }
        LoadState::Loading => Err((
            StatusCode::SERVICE_UNAVAILABLE,
            ApiError::bad_request("still loading"),
        )),
    }
}

// ============================================
// Requests & small payloads
// ============================================

#[derive(Debug, Serialize)]
pub struct HealthData {
    pub status: String,
    pub version: String,
    pub uptime_seconds: u64,
    pub upstream: String,
}

/// `?tahun=&kategori=&page=`
#[derive(Debug, Default, Deserialize)]
pub struct TableQuery {
    pub tahun: Option<i32>,
    pub kategori: Option<String>,
    pub page: Option<usize>,
}

/// `?kategori=pertanian,wisata&q=sawah`
#[derive(Debug, Default, Deserialize)]
pub struct PotensiQuery {
    pub kategori: Option<String>,
    pub q: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct StatusUpdateRequest {
    pub status: String,
}

#[derive(Debug, Serialize)]
pub struct Deleted {
    pub id: String,
}

#[derive(Debug, Serialize)]
pub struct LoginData {
    pub logged_in: bool,
}

#[derive(Debug, Serialize)]
pub struct Submitted {
    pub submitted: bool,
}

#[derive(Debug, Serialize)]
pub struct ComplaintListData {
    pub counts: ComplaintCounts,
    pub items: Vec<Pengaduan>,
}

#[derive(Debug, Serialize)]
pub struct FacilityEditData {
    pub form: FacilityForm,
    pub articles: Vec<ArticleOption>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::loader::LoadState;

    #[test]
    fn test_from_load_maps_failure_kind() {
        let state: LoadState<()> = LoadState::from_result(Err(AppError::unauthorized()), "idm");
        let (status, err) = from_load(state).unwrap_err();
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(err.code, "API_UNAUTHORIZED");

        let ok = from_load(LoadState::Ready { data: 3 }).unwrap();
        assert_eq!(ok, 3);
    }

    #[test]
    fn test_error_response_omits_empty_fields() {
        let body = ApiResponse::<()>::error(ApiError::bad_request("x"), 1.0);
        let json = serde_json::to_value(&body).unwrap();
        assert!(json.get("data").is_none());
        assert!(json.get("notifications").is_none());
        assert_eq!(json["error"]["code"], "BAD_REQUEST");
    }
}
