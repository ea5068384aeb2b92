//! Akun admin: login, user aktif, logout

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::info;

use crate::core::loader::{LoadState, Loader};
use crate::core::normalize::unwrap_data;
use crate::models::errors::{AppError, AppResult};
use crate::models::types::CurrentUser;
use crate::providers::client::{Access, DesaApiClient};
use crate::utils::constants::{EP_CURRENT_USER, EP_LOGIN};

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

/// Token from `token`, `access_token` or `data.token`
pub fn extract_token(body: &Value) -> Option<String> {
    ["/token", "/access_token", "/data/token"]
        .iter()
        .find_map(|ptr| body.pointer(ptr).and_then(Value::as_str))
        .filter(|t| !t.is_empty())
        .map(str::to_string)
}

pub struct AccountService<'a> {
    client: &'a DesaApiClient,
}

impl<'a> AccountService<'a> {
    pub fn new(client: &'a DesaApiClient) -> Self {
        Self { client }
    }

    /// Exchange credentials for a token and store it in the session
    pub async fn login(&self, credentials: &Credentials) -> AppResult<String> {
        if credentials.email.trim().is_empty() || credentials.password.is_empty() {
            return Err(AppError::validation("Email dan password wajib diisi"));
        }
        let body = self
            .client
            .post_json(EP_LOGIN, Access::Public, credentials)
            .await?;
        let token = extract_token(&body)
            .ok_or_else(|| AppError::shape_mismatch("login response without token"))?;
        self.client.guard().login(&token)?;
        info!(email = %credentials.email, "🔑 Logged in");
        Ok(token)
    }

    pub async fn current_user(&self) -> LoadState<CurrentUser> {
        Loader::new(self.client, "user")
            .load(EP_CURRENT_USER, Access::Bearer, |body| {
                let body = if body.get("name").is_some() { body } else { unwrap_data(body) };
                Ok(serde_json::from_value(body)?)
            })
            .await
    }

    /// Clear the token and go to the login view
    pub fn logout(&self) -> AppResult<()> {
        self.client.guard().logout()?;
        info!("👋 Logged out");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_extract_token_variants() {
        assert_eq!(extract_token(&json!({ "token": "a" })).as_deref(), Some("a"));
        assert_eq!(extract_token(&json!({ "access_token": "b" })).as_deref(), Some("b"));
        assert_eq!(extract_token(&json!({ "data": { "token": "c" } })).as_deref(), Some("c"));
        assert_eq!(extract_token(&json!({ "token": "" })), None);
        assert_eq!(extract_token(&json!({ "message": "ok" })), None);
    }
}
