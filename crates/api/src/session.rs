//! Persisted session record and in-memory authentication state.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError, RwLock};

use serde_json::{Map, Value};
use stockdesk_core::{SESSION_USER_KEY, SessionUser};

use crate::error::SessionError;

/// Key/value persistence for the signed-in user record.
pub trait SessionStore: Send + Sync {
    /// Load the persisted user, `None` when nobody is signed in.
    fn load_user(&self) -> Result<Option<SessionUser>, SessionError>;

    fn save_user(&self, user: &SessionUser) -> Result<(), SessionError>;

    /// Remove the persisted user. Succeeds when there is nothing to remove.
    fn remove_user(&self) -> Result<(), SessionError>;
}

/// Session store backed by a JSON object file; the user lives under the
/// `user` key and other keys are preserved.
#[derive(Debug)]
pub struct FileSessionStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl FileSessionStore {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into(), write_lock: Mutex::new(()) }
    }

    /// `<data_local_dir>/stockdesk/session.json`.
    ///
    /// # Errors
    /// Returns an error if the platform has no local data directory.
    pub fn default_path() -> Result<PathBuf, SessionError> {
        dirs::data_local_dir()
            .map(|dir| dir.join("stockdesk").join("session.json"))
            .ok_or(SessionError::NoLocation)
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_error(&self, source: std::io::Error) -> SessionError {
        SessionError::Io { path: self.path.display().to_string(), source }
    }

    fn read_map(&self) -> Result<Map<String, Value>, SessionError> {
        match fs::read_to_string(&self.path) {
            Ok(raw) if raw.trim().is_empty() => Ok(Map::new()),
            Ok(raw) => Ok(serde_json::from_str(&raw)?),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(Map::new()),
            Err(e) => Err(self.io_error(e)),
        }
    }

    fn write_map(&self, map: &Map<String, Value>) -> Result<(), SessionError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|e| self.io_error(e))?;
        }
        let tmp = self.path.with_extension("json.tmp");
        let body = serde_json::to_string_pretty(map)?;
        fs::write(&tmp, body).map_err(|e| self.io_error(e))?;
        fs::rename(&tmp, &self.path).map_err(|e| self.io_error(e))
    }
}

impl SessionStore for FileSessionStore {
    fn load_user(&self) -> Result<Option<SessionUser>, SessionError> {
        let mut map = self.read_map()?;
        match map.remove(SESSION_USER_KEY) {
            Some(Value::Null) | None => Ok(None),
            Some(value) => Ok(Some(serde_json::from_value(value)?)),
        }
    }

    fn save_user(&self, user: &SessionUser) -> Result<(), SessionError> {
        let _guard = self.write_lock.lock().unwrap_or_else(PoisonError::into_inner);
        let mut map = self.read_map()?;
        map.insert(SESSION_USER_KEY.to_owned(), serde_json::to_value(user)?);
        self.write_map(&map)
    }

    fn remove_user(&self) -> Result<(), SessionError> {
        let _guard = self.write_lock.lock().unwrap_or_else(PoisonError::into_inner);
        let mut map = self.read_map()?;
        if map.remove(SESSION_USER_KEY).is_none() {
            return Ok(());
        }
        self.write_map(&map)
    }
}

/// Session store that lives only as long as the process.
#[derive(Debug, Default)]
pub struct MemorySessionStore {
    user: Mutex<Option<SessionUser>>,
}

impl MemorySessionStore {
    #[must_use]
    pub fn with_user(user: SessionUser) -> Self {
        Self { user: Mutex::new(Some(user)) }
    }
}

impl SessionStore for MemorySessionStore {
    fn load_user(&self) -> Result<Option<SessionUser>, SessionError> {
        Ok(self.user.lock().unwrap_or_else(PoisonError::into_inner).clone())
    }

    fn save_user(&self, user: &SessionUser) -> Result<(), SessionError> {
        *self.user.lock().unwrap_or_else(PoisonError::into_inner) = Some(user.clone());
        Ok(())
    }

    fn remove_user(&self) -> Result<(), SessionError> {
        self.user.lock().unwrap_or_else(PoisonError::into_inner).take();
        Ok(())
    }
}

/// In-memory authentication state.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AuthState {
    pub token: Option<String>,
    pub user: Option<SessionUser>,
    pub loading: bool,
    pub error: Option<String>,
}

/// Capability that tears the current session down.
pub trait SessionClearer: Send + Sync {
    fn clear_session(&self) -> Result<(), SessionError>;
}

/// Authentication state seeded from, and written through to, a
/// [`SessionStore`].
pub struct AuthStore {
    state: RwLock<AuthState>,
    store: Arc<dyn SessionStore>,
}

impl std::fmt::Debug for AuthStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.snapshot();
        f.debug_struct("AuthStore")
            .field("signed_in", &state.token.is_some())
            .field("loading", &state.loading)
            .finish_non_exhaustive()
    }
}

impl AuthStore {
    /// Seeds the state from the persisted record. A corrupt record is logged
    /// and treated as signed out.
    #[must_use]
    pub fn load(store: Arc<dyn SessionStore>) -> Self {
        let user = match store.load_user() {
            Ok(user) => user,
            Err(e) => {
                tracing::warn!(error = %e, "ignoring unreadable session record");
                None
            },
        };
        let state = AuthState {
            token: user.as_ref().map(|u| u.token.clone()).filter(|t| !t.is_empty()),
            user,
            loading: false,
            error: None,
        };
        Self { state: RwLock::new(state), store }
    }

    #[must_use]
    pub fn snapshot(&self) -> AuthState {
        self.state.read().unwrap_or_else(PoisonError::into_inner).clone()
    }

    #[must_use]
    pub fn token(&self) -> Option<String> {
        self.state.read().unwrap_or_else(PoisonError::into_inner).token.clone()
    }

    #[must_use]
    pub fn is_signed_in(&self) -> bool {
        self.token().is_some()
    }

    #[must_use]
    pub fn store(&self) -> &Arc<dyn SessionStore> {
        &self.store
    }

    /// Stores the signed-in user in memory and persists it.
    ///
    /// # Errors
    /// Returns an error if the record cannot be persisted; memory is updated anyway.
    pub fn set_user(&self, user: SessionUser) -> Result<(), SessionError> {
        {
            let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
            state.token = Some(user.token.clone()).filter(|t| !t.is_empty());
            state.user = Some(user.clone());
            state.error = None;
        }
        self.store.save_user(&user)
    }

    pub fn set_loading(&self, loading: bool) {
        self.state.write().unwrap_or_else(PoisonError::into_inner).loading = loading;
    }

    pub fn set_error(&self, error: Option<String>) {
        self.state.write().unwrap_or_else(PoisonError::into_inner).error = error;
    }

    /// Resets memory to signed out and removes the persisted record.
    ///
    /// # Errors
    /// Returns an error if the persisted record cannot be removed.
    pub fn clear_auth(&self) -> Result<(), SessionError> {
        *self.state.write().unwrap_or_else(PoisonError::into_inner) = AuthState::default();
        self.store.remove_user()
    }
}

impl SessionClearer for AuthStore {
    fn clear_session(&self) -> Result<(), SessionError> {
        self.clear_auth()
    }
}
