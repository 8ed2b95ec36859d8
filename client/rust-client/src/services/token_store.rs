use std::fs;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::models::UserInfo;

/// Tokens and user record persisted between runs, the client-side session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredSession {
    pub access: String,
    pub refresh: String,
    #[serde(default)]
    pub user: Option<UserInfo>,
}

/// File-backed holder for the persisted session. Reads happen on every
/// request; writes only on login/logout, so a plain `RwLock` over the cached
/// copy is enough.
pub struct TokenStore {
    path: PathBuf,
    inner: RwLock<Option<StoredSession>>,
}

impl TokenStore {
    /// Opens the store, loading any session left by a previous run. A
    /// missing or unreadable file just means "not logged in".
    pub fn open(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref().to_path_buf();
        let session = match fs::read_to_string(&path) {
            Ok(json) => match serde_json::from_str::<StoredSession>(&json) {
                Ok(session) => Some(session),
                Err(e) => {
                    tracing::warn!("Ignoring corrupt session file {}: {}", path.display(), e);
                    None
                }
            },
            Err(_) => None,
        };
        Self {
            path,
            inner: RwLock::new(session),
        }
    }

    pub fn set(&self, session: StoredSession) -> Result<()> {
        let json =
            serde_json::to_string_pretty(&session).context("Failed to serialize session")?;
        fs::write(&self.path, json)
            .with_context(|| format!("Failed to write session file {}", self.path.display()))?;
        *self.inner.write().unwrap_or_else(|e| e.into_inner()) = Some(session);
        Ok(())
    }

    pub fn clear(&self) {
        if self.path.exists() {
            if let Err(e) = fs::remove_file(&self.path) {
                tracing::warn!("Failed to remove session file {}: {}", self.path.display(), e);
            }
        }
        *self.inner.write().unwrap_or_else(|e| e.into_inner()) = None;
    }

    pub fn access_token(&self) -> Option<String> {
        self.inner
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .as_ref()
            .map(|s| s.access.clone())
    }

    pub fn user(&self) -> Option<UserInfo> {
        self.inner
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .as_ref()
            .and_then(|s| s.user.clone())
    }

    pub fn is_authenticated(&self) -> bool {
        self.inner
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("banana-token-store-{}-{}.json", name, std::process::id()))
    }

    fn sample_session() -> StoredSession {
        StoredSession {
            access: "access-token".to_string(),
            refresh: "refresh-token".to_string(),
            user: Some(UserInfo {
                id: 7,
                username: "banana_fan".to_string(),
                email: "fan@example.com".to_string(),
                role: Some("player".to_string()),
            }),
        }
    }

    #[test]
    fn persists_and_reloads_session() {
        let path = temp_path("reload");
        let store = TokenStore::open(&path);
        assert!(!store.is_authenticated());

        store.set(sample_session()).unwrap();
        assert_eq!(store.access_token().as_deref(), Some("access-token"));

        // A fresh store sees the persisted session.
        let reopened = TokenStore::open(&path);
        assert!(reopened.is_authenticated());
        assert_eq!(reopened.user().unwrap().username, "banana_fan");

        store.clear();
        assert!(!path.exists());
    }

    #[test]
    fn clear_removes_session() {
        let path = temp_path("clear");
        let store = TokenStore::open(&path);
        store.set(sample_session()).unwrap();
        store.clear();
        assert!(!store.is_authenticated());
        assert!(store.access_token().is_none());
        assert!(!path.exists());
    }

    #[test]
    fn corrupt_file_is_treated_as_logged_out() {
        let path = temp_path("corrupt");
        fs::write(&path, "{not json").unwrap();
        let store = TokenStore::open(&path);
        assert!(!store.is_authenticated());
        fs::remove_file(&path).ok();
    }
}
