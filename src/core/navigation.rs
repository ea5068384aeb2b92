//! Navigation & Session Guard
//!
//! Mengatur redirect ke halaman login:
//! - token tidak ada → redirect, request tidak dikirim
//! - API membalas 401 → token dihapus, redirect TEPAT SATU KALI walaupun
//!   beberapa request paralel gagal bersamaan
//!
//! Route guard admin hanya memeriksa keberadaan token (tanpa role).

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use tracing::{info, warn};

use crate::core::session::SessionStore;
use crate::models::errors::{AppError, AppResult};
use crate::utils::constants::ROUTE_LOGIN;

/// Target of forced navigation (browser router, HTTP redirect, recorder)
pub trait Navigator: Send + Sync {
    fn redirect(&self, path: &str);
}

/// Navigator that only remembers where it was sent
#[derive(Debug, Default)]
pub struct RecordingNavigator {
    visits: Mutex<Vec<String>>,
}

impl RecordingNavigator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn visits(&self) -> Vec<String> {
        self.visits.lock().map(|v| v.clone()).unwrap_or_default()
    }

    pub fn last(&self) -> Option<String> {
        self.visits.lock().ok().and_then(|v| v.last().cloned())
    }
}

impl Navigator for RecordingNavigator {
    fn redirect(&self, path: &str) {
        if let Ok(mut visits) = self.visits.lock() {
            visits.push(path.to_string());
        }
    }
}

/// Session + navigator pair shared by every request of one client context
pub struct SessionGuard {
    session: Arc<dyn SessionStore>,
    navigator: Arc<dyn Navigator>,
    login_redirected: AtomicBool,
}

impl SessionGuard {
    pub fn new(session: Arc<dyn SessionStore>, navigator: Arc<dyn Navigator>) -> Self {
        Self {
            session,
            navigator,
            login_redirected: AtomicBool::new(false),
        }
    }

    pub fn session(&self) -> &Arc<dyn SessionStore> {
        &self.session
    }

    /// Token for an authenticated request; redirects to login when absent
    pub fn require_token(&self) -> AppResult<String> {
        match self.session.get_token() {
            Some(token) => Ok(token),
            None => {
                self.redirect_to_login();
                Err(AppError::missing_token())
            }
        }
    }

    /// Token if present, without side effects
    pub fn optional_token(&self) -> Option<String> {
        self.session.get_token()
    }

    /// Server rejected the credential: clear it and go to login (once)
    pub fn expire(&self) {
        if let Err(e) = self.session.clear() {
            warn!("⚠️ Failed to clear expired session: {}", e);
        }
        if self.redirect_to_login() {
            info!("🔒 Session expired, redirected to login");
        }
    }

    /// Store a fresh token and re-arm the login redirect
    pub fn login(&self, token: &str) -> AppResult<()> {
        self.session.set_token(token)?;
        self.login_redirected.store(false, Ordering::SeqCst);
        Ok(())
    }

    /// Explicit logout
    pub fn logout(&self) -> AppResult<()> {
        self.session.clear()?;
        self.redirect_to_login();
        Ok(())
    }

    /// Ordinary navigation (e.g. back to a list page)
    pub fn redirect(&self, path: &str) {
        self.navigator.redirect(path);
    }

    pub fn has_redirected_to_login(&self) -> bool {
        self.login_redirected.load(Ordering::SeqCst)
    }

    /// Returns true only for the call that actually navigated
    fn redirect_to_login(&self) -> bool {
        if self
            .login_redirected
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_ok()
        {
            self.navigator.redirect(ROUTE_LOGIN);
            true
        } else {
            false
        }
    }
}

/// Outcome of the admin route guard
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardDecision {
    Allow,
    RedirectToLogin,
}

/// Admin sub-tree lives under `/admin`
pub fn is_admin_path(path: &str) -> bool {
    path == "/admin" || path.starts_with("/admin/")
}

/// Token-presence guard for client-side routes
pub fn guard_route(path: &str, session: &dyn SessionStore) -> GuardDecision {
    if is_admin_path(path) && session.get_token().is_none() {
        GuardDecision::RedirectToLogin
    } else {
        GuardDecision::Allow
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::session::MemorySession;

    fn guard_with(token: Option<&str>) -> (SessionGuard, Arc<RecordingNavigator>) {
        let session: Arc<dyn SessionStore> = match token {
            Some(t) => Arc::new(MemorySession::with_token(t)),
            None => Arc::new(MemorySession::new()),
        };
        let nav = Arc::new(RecordingNavigator::new());
        (SessionGuard::new(session, nav.clone()), nav)
    }

    #[test]
    fn test_missing_token_redirects() {
        let (guard, nav) = guard_with(None);
        let err = guard.require_token().unwrap_err();
        assert!(err.requires_login());
        assert_eq!(nav.visits(), vec!["/login".to_string()]);
    }

    #[test]
    fn test_expire_clears_and_redirects_once() {
        let (guard, nav) = guard_with(Some("tok"));
        guard.expire();
        guard.expire();
        guard.expire();
        assert_eq!(guard.session().get_token(), None);
        assert_eq!(nav.visits(), vec!["/login".to_string()]);
    }

    #[test]
    fn test_login_rearms_redirect() {
        let (guard, nav) = guard_with(Some("tok"));
        guard.expire();
        guard.login("fresh").unwrap();
        assert!(!guard.has_redirected_to_login());
        guard.expire();
        assert_eq!(nav.visits().len(), 2);
    }

    #[test]
    fn test_route_guard() {
        let empty = MemorySession::new();
        let logged_in = MemorySession::with_token("tok");
        assert_eq!(guard_route("/admin/surat", &empty), GuardDecision::RedirectToLogin);
        assert_eq!(guard_route("/admin/surat", &logged_in), GuardDecision::Allow);
        assert_eq!(guard_route("/artikeldesa", &empty), GuardDecision::Allow);
        assert_eq!(guard_route("/administrasi", &empty), GuardDecision::Allow);
    }
}
