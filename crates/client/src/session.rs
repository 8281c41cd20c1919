//! Explicit session object.
//!
//! A [`SessionHandle`] holds the bearer token and user for the current shopper
//! and is injected into the [`ApiClient`](crate::ApiClient). Login populates
//! it, logout clears it, and a 401 from any authenticated request clears it.
//! A [`SessionStore`] persists it between runs.

use std::fmt;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::RwLock;

use crate::types::User;

/// Errors from reading or writing a persisted session.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("session file I/O failed for {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("session file is corrupt: {0}")]
    Corrupt(#[from] serde_json::Error),
}

/// Token and user returned by login or signup.
#[derive(Clone)]
pub struct Session {
    token: SecretString,
    user: User,
}

impl Session {
    #[must_use]
    pub fn new(token: impl Into<String>, user: User) -> Self {
        Self {
            token: SecretString::from(token.into()),
            user,
        }
    }

    #[must_use]
    pub const fn token(&self) -> &SecretString {
        &self.token
    }

    #[must_use]
    pub const fn user(&self) -> &User {
        &self.user
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("token", &"[REDACTED]")
            .field("user", &self.user)
            .finish()
    }
}

/// On-disk shape of a session.
#[derive(Serialize, Deserialize)]
struct StoredSession {
    token: String,
    user: User,
}

impl From<&Session> for StoredSession {
    fn from(session: &Session) -> Self {
        Self {
            token: session.token.expose_secret().to_string(),
            user: session.user.clone(),
        }
    }
}

impl From<StoredSession> for Session {
    fn from(stored: StoredSession) -> Self {
        Self::new(stored.token, stored.user)
    }
}

/// Persistence for the session between runs.
pub trait SessionStore: Send + Sync {
    /// Load the stored session, if any.
    ///
    /// # Errors
    ///
    /// Returns an error if the stored copy cannot be read or parsed.
    fn load(&self) -> Result<Option<Session>, SessionError>;

    /// Replace the stored session.
    ///
    /// # Errors
    ///
    /// Returns an error if the session cannot be written.
    fn save(&self, session: &Session) -> Result<(), SessionError>;

    /// Remove the stored session. Clearing an empty store succeeds.
    ///
    /// # Errors
    ///
    /// Returns an error if the stored copy exists but cannot be removed.
    fn clear(&self) -> Result<(), SessionError>;
}

/// Session persisted as a JSON file (mode 0600 on Unix).
#[derive(Debug, Clone)]
pub struct FileSessionStore {
    path: PathBuf,
}

impl FileSessionStore {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_error(&self, source: io::Error) -> SessionError {
        SessionError::Io {
            path: self.path.clone(),
            source,
        }
    }
}

impl SessionStore for FileSessionStore {
    fn load(&self) -> Result<Option<Session>, SessionError> {
        let raw = match std::fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(self.io_error(e)),
        };
        let stored: StoredSession = serde_json::from_str(&raw)?;
        Ok(Some(stored.into()))
    }

    fn save(&self, session: &Session) -> Result<(), SessionError> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent).map_err(|e| self.io_error(e))?;
        }
        let json = serde_json::to_string_pretty(&StoredSession::from(session))?;
        std::fs::write(&self.path, json).map_err(|e| self.io_error(e))?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            std::fs::set_permissions(&self.path, std::fs::Permissions::from_mode(0o600))
                .map_err(|e| self.io_error(e))?;
        }
        Ok(())
    }

    fn clear(&self) -> Result<(), SessionError> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(self.io_error(e)),
        }
    }
}

/// Session kept in memory only.
#[derive(Default)]
pub struct MemorySessionStore {
    stored: Mutex<Option<StoredSession>>,
}

impl MemorySessionStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a session is currently stored.
    #[must_use]
    pub fn is_stored(&self) -> bool {
        self.stored
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }
}

impl SessionStore for MemorySessionStore {
    fn load(&self) -> Result<Option<Session>, SessionError> {
        let stored = self.stored.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(stored
            .as_ref()
            .map(|s| Session::new(s.token.clone(), s.user.clone())))
    }

    fn save(&self, session: &Session) -> Result<(), SessionError> {
        *self.stored.lock().unwrap_or_else(PoisonError::into_inner) =
            Some(StoredSession::from(session));
        Ok(())
    }

    fn clear(&self) -> Result<(), SessionError> {
        *self.stored.lock().unwrap_or_else(PoisonError::into_inner) = None;
        Ok(())
    }
}

/// Shared handle to the current session.
///
/// Cheaply cloneable; every clone sees the same session.
#[derive(Clone)]
pub struct SessionHandle {
    inner: Arc<SessionInner>,
}

struct SessionInner {
    current: RwLock<Option<Session>>,
    store: Arc<dyn SessionStore>,
}

impl SessionHandle {
    /// Start with no session, persisting future logins to `store`.
    #[must_use]
    pub fn new(store: Arc<dyn SessionStore>) -> Self {
        Self::with_session(store, None)
    }

    /// Start from whatever `store` holds.
    ///
    /// # Errors
    ///
    /// Returns an error if the stored session cannot be read.
    pub fn restore(store: Arc<dyn SessionStore>) -> Result<Self, SessionError> {
        let current = store.load()?;
        if let Some(session) = &current {
            tracing::debug!(user_id = %session.user().id, "restored session");
        }
        Ok(Self::with_session(store, current))
    }

    /// Session that is never persisted.
    #[must_use]
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemorySessionStore::new()))
    }

    fn with_session(store: Arc<dyn SessionStore>, current: Option<Session>) -> Self {
        Self {
            inner: Arc::new(SessionInner {
                current: RwLock::new(current),
                store,
            }),
        }
    }

    /// Make `session` current and persist it.
    ///
    /// # Errors
    ///
    /// Returns an error if persisting fails; the in-memory session is still set.
    pub async fn begin(&self, session: Session) -> Result<(), SessionError> {
        let persisted = self.inner.store.save(&session);
        *self.inner.current.write().await = Some(session);
        persisted
    }

    /// Drop the current session and its persisted copy.
    ///
    /// # Errors
    ///
    /// Returns an error if the persisted copy cannot be removed; the
    /// in-memory session is cleared regardless.
    pub async fn end(&self) -> Result<(), SessionError> {
        *self.inner.current.write().await = None;
        self.inner.store.clear()
    }

    /// Drop the session only if it still holds `token`.
    ///
    /// Returns `false` without touching anything when a newer session has
    /// replaced the one `token` belongs to.
    ///
    /// # Errors
    ///
    /// Returns an error if the persisted copy cannot be removed.
    pub async fn end_if_current(&self, token: &SecretString) -> Result<bool, SessionError> {
        let mut current = self.inner.current.write().await;
        let matches = current
            .as_ref()
            .is_some_and(|s| s.token.expose_secret() == token.expose_secret());
        if !matches {
            return Ok(false);
        }
        *current = None;
        self.inner.store.clear().map(|()| true)
    }

    /// Replace the user of the current session (after a profile update).
    ///
    /// # Errors
    ///
    /// Returns an error if persisting fails.
    pub async fn replace_user(&self, user: User) -> Result<(), SessionError> {
        let mut current = self.inner.current.write().await;
        match current.as_mut() {
            Some(session) => {
                session.user = user;
                self.inner.store.save(session)
            }
            None => Ok(()),
        }
    }

    /// Bearer token of the current session.
    pub async fn token(&self) -> Option<SecretString> {
        self.inner
            .current
            .read()
            .await
            .as_ref()
            .map(|s| s.token.clone())
    }

    /// User of the current session.
    pub async fn user(&self) -> Option<User> {
        self.inner
            .current
            .read()
            .await
            .as_ref()
            .map(|s| s.user.clone())
    }

    pub async fn is_authenticated(&self) -> bool {
        self.inner.current.read().await.is_some()
    }
}

impl fmt::Debug for SessionHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionHandle").finish_non_exhaustive()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use tryla_core::{UserId, UserRole};

    use super::*;

    fn shopper() -> User {
        User {
            id: UserId::new("u1"),
            name: "Asha".to_string(),
            email: "asha@example.com".to_string(),
            role: UserRole::Customer,
            phone: None,
            address: None,
        }
    }

    #[test]
    fn test_session_debug_redacts_token() {
        let session = Session::new("super-secret-token", shopper());
        let debug = format!("{session:?}");
        assert!(debug.contains("[REDACTED]"));
        assert!(!debug.contains("super-secret-token"));
    }

    #[test]
    fn test_file_store_round_trip_and_clear() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileSessionStore::new(dir.path().join("nested").join("session.json"));

        assert!(store.load().unwrap().is_none());
        store.save(&Session::new("tok", shopper())).unwrap();

        let loaded = store.load().unwrap().unwrap();
        assert_eq!(loaded.token().expose_secret(), "tok");
        assert_eq!(loaded.user().name, "Asha");

        store.clear().unwrap();
        assert!(store.load().unwrap().is_none());
        // Clearing twice is fine.
        store.clear().unwrap();
    }

    #[cfg(unix)]
    #[test]
    fn test_file_store_is_private() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let store = FileSessionStore::new(dir.path().join("session.json"));
        store.save(&Session::new("tok", shopper())).unwrap();

        let mode = std::fs::metadata(store.path()).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }

    #[test]
    fn test_file_store_corrupt() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        std::fs::write(&path, "{not json").unwrap();

        let store = FileSessionStore::new(path);
        assert!(matches!(store.load(), Err(SessionError::Corrupt(_))));
    }

    #[tokio::test]
    async fn test_handle_lifecycle() {
        let store = Arc::new(MemorySessionStore::new());
        let handle = SessionHandle::new(store.clone());
        assert!(!handle.is_authenticated().await);

        handle.begin(Session::new("tok", shopper())).await.unwrap();
        assert!(handle.is_authenticated().await);
        assert!(store.is_stored());

        let mut renamed = shopper();
        renamed.name = "Asha R".to_string();
        handle.replace_user(renamed).await.unwrap();
        assert_eq!(store.load().unwrap().unwrap().user().name, "Asha R");

        handle.end().await.unwrap();
        assert!(handle.token().await.is_none());
        assert!(!store.is_stored());
    }

    #[tokio::test]
    async fn test_end_if_current_keeps_newer_session() {
        let store = Arc::new(MemorySessionStore::new());
        let handle = SessionHandle::new(store.clone());
        handle.begin(Session::new("old", shopper())).await.unwrap();
        let old = handle.token().await.unwrap();

        handle.begin(Session::new("new", shopper())).await.unwrap();
        assert!(!handle.end_if_current(&old).await.unwrap());
        assert_eq!(handle.token().await.unwrap().expose_secret(), "new");
        assert!(store.is_stored());

        let new = handle.token().await.unwrap();
        assert!(handle.end_if_current(&new).await.unwrap());
        assert!(!handle.is_authenticated().await);
        assert!(!store.is_stored());
    }

    #[tokio::test]
    async fn test_restore_reads_store() {
        let store = Arc::new(MemorySessionStore::new());
        store.save(&Session::new("persisted", shopper())).unwrap();

        let handle = SessionHandle::restore(store).unwrap();
        let token = handle.token().await.unwrap();
        assert_eq!(token.expose_secret(), "persisted");
    }
}
