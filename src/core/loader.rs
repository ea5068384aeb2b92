//! Fetch Lifecycle - pola load/loading/error yang dipakai semua halaman
//!
//! `Loader` diparameterisasi endpoint + mapper dan selalu menghasilkan
//! `LoadState<T>`; error tidak pernah lolos melewati batas halaman.
//! Klasifikasi kegagalan:
//! - token hilang / 401 → LoginRequired (redirect sudah dilakukan client)
//! - 404 → NotFound dengan pesan statis
//! - lainnya → Generic "Gagal mengambil data <resource>."

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, warn};

use crate::core::normalize::{normalize_list, parse_page};
use crate::models::errors::{AppError, AppResult, ErrorCode};
use crate::providers::client::{Access, DesaApiClient};
use crate::utils::constants::{
    MAX_REMOTE_PAGES, MSG_NOT_FOUND, MSG_SESSION_EXPIRED, MSG_TOKEN_MISSING, MSG_UNKNOWN_ERROR,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    LoginRequired,
    NotFound,
    Generic,
}

/// User-facing failure state of a view
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LoadFailure {
    pub kind: FailureKind,
    pub code: &'static str,
    pub message: String,
}

impl LoadFailure {
    /// Map an error to the view's failure state; `resource` names the data ("pendapatan")
    pub fn from_error(err: &AppError, resource: &str) -> Self {
        let (kind, message) = match err.code {
            ErrorCode::SessionMissingToken => (FailureKind::LoginRequired, MSG_TOKEN_MISSING.to_string()),
            ErrorCode::ApiUnauthorized => (FailureKind::LoginRequired, MSG_SESSION_EXPIRED.to_string()),
            ErrorCode::ApiNotFound => (FailureKind::NotFound, MSG_NOT_FOUND.to_string()),
            ErrorCode::Unknown => (FailureKind::Generic, MSG_UNKNOWN_ERROR.to_string()),
            _ => (
                FailureKind::Generic,
                format!("Gagal mengambil data {}.", resource),
            ),
        };
        Self {
            kind,
            code: err.code_str(),
            message,
        }
    }
}

/// State of one fetched resource
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum LoadState<T> {
    Loading,
    Ready { data: T },
    Failed { failure: LoadFailure },
}

impl<T> LoadState<T> {
    pub fn from_result(result: AppResult<T>, resource: &str) -> Self {
        match result {
            Ok(data) => Self::Ready { data },
            Err(err) => {
                warn!(resource, code = err.code_str(), "❌ Failed to load: {}", err);
                Self::Failed {
                    failure: LoadFailure::from_error(&err, resource),
                }
            }
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, Self::Loading)
    }

    pub fn ready(&self) -> Option<&T> {
        match self {
            Self::Ready { data } => Some(data),
            _ => None,
        }
    }

    pub fn into_ready(self) -> Option<T> {
        match self {
            Self::Ready { data } => Some(data),
            _ => None,
        }
    }

    pub fn failure(&self) -> Option<&LoadFailure> {
        match self {
            Self::Failed { failure } => Some(failure),
            _ => None,
        }
    }

    pub fn map<U, F: FnOnce(T) -> U>(self, f: F) -> LoadState<U> {
        match self {
            Self::Loading => LoadState::Loading,
            Self::Ready { data } => LoadState::Ready { data: f(data) },
            Self::Failed { failure } => LoadState::Failed { failure },
        }
    }
}

/// Reusable data loader bound to one client and resource label
pub struct Loader<'a> {
    client: &'a DesaApiClient,
    resource: &'static str,
}

impl<'a> Loader<'a> {
    pub fn new(client: &'a DesaApiClient, resource: &'static str) -> Self {
        Self { client, resource }
    }

    /// GET `path` and map the JSON body
    pub async fn load<T, F>(&self, path: &str, access: Access, mapper: F) -> LoadState<T>
    where
        F: FnOnce(Value) -> AppResult<T>,
    {
        let result = self.client.get_json(path, access).await.and_then(mapper);
        LoadState::from_result(result, self.resource)
    }

    /// GET a list in any of the known envelope shapes
    pub async fn load_list<T: DeserializeOwned>(&self, path: &str, access: Access) -> LoadState<Vec<T>> {
        self.load(path, access, |body| normalize_list(body).map(|list| list.items))
            .await
    }

    /// Follow every remote page and return the concatenation
    pub async fn load_all_pages<T: DeserializeOwned>(
        &self,
        path: &str,
        access: Access,
    ) -> LoadState<Vec<T>> {
        let result = collect_all_pages(self.client, path, access).await;
        LoadState::from_result(result, self.resource)
    }
}

/// Collect all pages of a Laravel-paginated endpoint, in page order.
/// Stops on a null `next_page_url`, on `last_page`, or at [`MAX_REMOTE_PAGES`].
pub async fn collect_all_pages<T: DeserializeOwned>(
    client: &DesaApiClient,
    path: &str,
    access: Access,
) -> AppResult<Vec<T>> {
    let separator = if path.contains('?') { '&' } else { '?' };
    let mut all = Vec::new();
    let mut page: u32 = 1;

    loop {
        let url = format!("{}{}page={}", path, separator, page);
        let chunk = parse_page::<T>(client.get_json(&url, access).await?)?;
        debug!(path, page, items = chunk.items.len(), "Collected remote page");

        let reached_last = chunk.last_page.is_some_and(|last| page >= last);
        let has_next = chunk.has_next();
        all.extend(chunk.items);

        if !has_next || reached_last {
            break;
        }
        if page >= MAX_REMOTE_PAGES {
            warn!(path, page, "⚠️ Remote page limit reached, list truncated");
            break;
        }
        page += 1;
    }

    Ok(all)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failure_classification() {
        let login = LoadFailure::from_error(&AppError::unauthorized(), "pendapatan");
        assert_eq!(login.kind, FailureKind::LoginRequired);
        assert_eq!(login.message, MSG_SESSION_EXPIRED);

        let missing = LoadFailure::from_error(&AppError::missing_token(), "pendapatan");
        assert_eq!(missing.message, MSG_TOKEN_MISSING);

        let not_found = LoadFailure::from_error(&AppError::not_found(), "pendapatan");
        assert_eq!(not_found.kind, FailureKind::NotFound);
        assert_eq!(not_found.message, "Endpoint API tidak ditemukan (404).");

        let generic = LoadFailure::from_error(&AppError::request_failed(500, "boom"), "pendapatan");
        assert_eq!(generic.kind, FailureKind::Generic);
        assert_eq!(generic.message, "Gagal mengambil data pendapatan.");
    }

    #[test]
    fn test_load_state_map_and_serialize() {
        let state: LoadState<Vec<i32>> = LoadState::Ready { data: vec![1, 2] };
        let mapped = state.map(|v| v.len());
        assert_eq!(mapped.ready(), Some(&2));

        let json = serde_json::to_value(&mapped).unwrap();
        assert_eq!(json["state"], "ready");
        assert_eq!(json["data"], 2);

        let failed: LoadState<usize> = LoadState::from_result(Err(AppError::not_found()), "idm");
        let json = serde_json::to_value(&failed).unwrap();
        assert_eq!(json["state"], "failed");
        assert_eq!(json["failure"]["kind"], "not_found");
    }
}
