//! Session Store - satu-satunya tempat token bearer disimpan
//!
//! Token tidak pernah menjadi global bebas: setiap komponen menerima
//! `Arc<dyn SessionStore>` secara eksplisit. Ada dua implementasi:
//! - `MemorySession`: per-request (view server) atau test
//! - `FileSession`: persisted key-value file, key tetap `authToken`

use serde_json::{Map, Value};
use std::path::{Path, PathBuf};
use std::sync::RwLock;
use tracing::{debug, warn};

use crate::models::errors::{AppError, AppResult};
use crate::utils::constants::AUTH_TOKEN_KEY;

/// Access to the persisted bearer token
pub trait SessionStore: Send + Sync {
    /// Current token, if any. Empty strings count as absent.
    fn get_token(&self) -> Option<String>;
    /// Store a new token
    fn set_token(&self, token: &str) -> AppResult<()>;
    /// Remove the token
    fn clear(&self) -> AppResult<()>;
}

/// In-memory session
#[derive(Debug, Default)]
pub struct MemorySession {
    token: RwLock<Option<String>>,
}

impl MemorySession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Session that already holds a token
    pub fn with_token(token: impl Into<String>) -> Self {
        let token = token.into();
        Self {
            token: RwLock::new(Some(token).filter(|t| !t.is_empty())),
        }
    }
}

impl SessionStore for MemorySession {
    fn get_token(&self) -> Option<String> {
        self.token.read().ok().and_then(|guard| guard.clone())
    }

    fn set_token(&self, token: &str) -> AppResult<()> {
        let mut guard = self
            .token
            .write()
            .map_err(|_| AppError::session_storage("session lock poisoned"))?;
        *guard = Some(token.to_string()).filter(|t| !t.is_empty());
        Ok(())
    }

    fn clear(&self) -> AppResult<()> {
        let mut guard = self
            .token
            .write()
            .map_err(|_| AppError::session_storage("session lock poisoned"))?;
        *guard = None;
        Ok(())
    }
}

/// File-backed session: a JSON object on disk, token under [`AUTH_TOKEN_KEY`].
/// Other keys in the file are preserved.
#[derive(Debug)]
pub struct FileSession {
    path: PathBuf,
    cached: RwLock<Option<String>>,
}

impl FileSession {
    /// Open (or lazily create) the store at `path`
    pub fn open(path: impl Into<PathBuf>) -> AppResult<Self> {
        let path = path.into();
        let entries = read_entries(&path)?;
        let cached = entries
            .get(AUTH_TOKEN_KEY)
            .and_then(Value::as_str)
            .filter(|t| !t.is_empty())
            .map(str::to_string);
        debug!(path = %path.display(), has_token = cached.is_some(), "Session file opened");
        Ok(Self {
            path,
            cached: RwLock::new(cached),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn persist(&self, token: Option<&str>) -> AppResult<()> {
        let mut entries = read_entries(&self.path)?;
        match token {
            Some(t) => {
                entries.insert(AUTH_TOKEN_KEY.to_string(), Value::String(t.to_string()));
            }
            None => {
                entries.remove(AUTH_TOKEN_KEY);
            }
        }
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let body = serde_json::to_string_pretty(&Value::Object(entries))?;
        std::fs::write(&self.path, body)?;
        Ok(())
    }
}

impl SessionStore for FileSession {
    fn get_token(&self) -> Option<String> {
        self.cached.read().ok().and_then(|guard| guard.clone())
    }

    fn set_token(&self, token: &str) -> AppResult<()> {
        let token = Some(token).filter(|t| !t.is_empty());
        self.persist(token)?;
        let mut guard = self
            .cached
            .write()
            .map_err(|_| AppError::session_storage("session lock poisoned"))?;
        *guard = token.map(str::to_string);
        Ok(())
    }

    fn clear(&self) -> AppResult<()> {
        self.persist(None)?;
        let mut guard = self
            .cached
            .write()
            .map_err(|_| AppError::session_storage("session lock poisoned"))?;
        *guard = None;
        Ok(())
    }
}

fn read_entries(path: &Path) -> AppResult<Map<String, Value>> {
    match std::fs::read_to_string(path) {
        Ok(raw) if raw.trim().is_empty() => Ok(Map::new()),
        Ok(raw) => match serde_json::from_str::<Value>(&raw) {
            Ok(Value::Object(map)) => Ok(map),
            Ok(_) | Err(_) => {
                warn!(path = %path.display(), "Session file is not a JSON object, starting empty");
                Ok(Map::new())
            }
        },
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Map::new()),
        Err(e) => Err(AppError::with_source(
            crate::models::errors::ErrorCode::SessionStorage,
            format!("Cannot read session file {}", path.display()),
            e,
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("desa-session-{}-{}.json", name, uuid::Uuid::new_v4()))
    }

    #[test]
    fn test_memory_session_roundtrip() {
        let session = MemorySession::new();
        assert_eq!(session.get_token(), None);
        session.set_token("abc").unwrap();
        assert_eq!(session.get_token().as_deref(), Some("abc"));
        session.clear().unwrap();
        assert_eq!(session.get_token(), None);
    }

    #[test]
    fn test_empty_token_is_absent() {
        let session = MemorySession::with_token("");
        assert_eq!(session.get_token(), None);
    }

    #[test]
    fn test_file_session_persists_and_keeps_other_keys() {
        let path = temp_path("persist");
        std::fs::write(&path, r#"{"theme":"dark"}"#).unwrap();

        let session = FileSession::open(&path).unwrap();
        session.set_token("tok-1").unwrap();

        let reopened = FileSession::open(&path).unwrap();
        assert_eq!(reopened.get_token().as_deref(), Some("tok-1"));

        reopened.clear().unwrap();
        let raw: Value = serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(raw["theme"], "dark");
        assert!(raw.get(AUTH_TOKEN_KEY).is_none());

        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn test_file_session_missing_file_is_empty() {
        let path = temp_path("missing");
        let session = FileSession::open(&path).unwrap();
        assert_eq!(session.get_token(), None);
    }
}
