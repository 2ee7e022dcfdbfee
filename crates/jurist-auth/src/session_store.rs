//! Where the signed-in session lives between process runs.
//!
//! The keyring store is the default. When the OS keychain is unavailable it
//! falls back to a `0600` JSON file under `~/.jurist/`.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use crate::error::AuthError;
use crate::session::Session;

const KEYRING_USER: &str = "supabase-session";
const SESSION_FILE_NAME: &str = "session.json";

/// Persistence for the provider session. Implementations are synchronous;
/// every call is a single small read or write.
pub trait SessionStore: Send + Sync {
    /// The stored session, or `None` when nothing usable is stored.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::SessionStore` when the backing store cannot be read.
    fn load(&self) -> Result<Option<Session>, AuthError>;

    /// # Errors
    ///
    /// Returns `AuthError::SessionStore` when the session cannot be written.
    fn save(&self, session: &Session) -> Result<(), AuthError>;

    /// Remove any stored session. Clearing an empty store succeeds.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::SessionStore` when the stored session cannot be removed.
    fn clear(&self) -> Result<(), AuthError>;

    /// Short label for the tier currently holding a session (for status display).
    fn source(&self) -> Option<&'static str>;
}

// --- Keyring ---

/// OS keychain entry keyed by `service`, with a file fallback.
#[derive(Debug, Clone)]
pub struct KeyringSessionStore {
    service: String,
    fallback: FileSessionStore,
}

impl KeyringSessionStore {
    #[must_use]
    pub fn new(service: impl Into<String>, fallback: FileSessionStore) -> Self {
        Self {
            service: service.into(),
            fallback,
        }
    }

    /// Keyring store for `service` falling back to `~/.jurist/session.json`.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::SessionStore` if the home directory cannot be found.
    pub fn with_default_fallback(service: impl Into<String>) -> Result<Self, AuthError> {
        Ok(Self::new(service, FileSessionStore::at_default_path()?))
    }

    fn entry(&self) -> Option<keyring::Entry> {
        match keyring::Entry::new(&self.service, KEYRING_USER) {
            Ok(entry) => Some(entry),
            Err(error) => {
                tracing::debug!(%error, "keyring unavailable");
                None
            }
        }
    }

    fn load_keyring(&self) -> Option<Session> {
        let raw = self.entry()?.get_password().ok()?;
        match serde_json::from_str(&raw) {
            Ok(session) => Some(session),
            Err(error) => {
                tracing::warn!(%error, "ignoring unreadable session in keyring");
                None
            }
        }
    }
}

impl SessionStore for KeyringSessionStore {
    fn load(&self) -> Result<Option<Session>, AuthError> {
        if let Some(session) = self.load_keyring() {
            return Ok(Some(session));
        }
        self.fallback.load()
    }

    fn save(&self, session: &Session) -> Result<(), AuthError> {
        let raw = encode(session)?;
        let path = self.fallback.path().display();
        match self.entry() {
            Some(entry) => match entry.set_password(&raw) {
                // Platforms without a native backend accept the write but keep nothing.
                Ok(()) if self.load_keyring().is_some() => Ok(()),
                Ok(()) => {
                    tracing::warn!(%path, "keyring did not retain the session; falling back to file");
                    self.fallback.save(session)
                }
                Err(error) => {
                    tracing::warn!(%error, %path, "keyring store failed; falling back to file");
                    self.fallback.save(session)
                }
            },
            None => {
                tracing::warn!(%path, "keyring unavailable; falling back to file");
                self.fallback.save(session)
            }
        }
    }

    fn clear(&self) -> Result<(), AuthError> {
        // Either tier may hold the session; an absent keyring entry is fine.
        if let Some(entry) = self.entry() {
            let _ = entry.delete_credential();
        }
        self.fallback.clear()
    }

    fn source(&self) -> Option<&'static str> {
        if self.load_keyring().is_some() {
            return Some("keyring");
        }
        self.fallback.source()
    }
}

// --- File ---

/// JSON file holding one session, written with owner-only permissions.
#[derive(Debug, Clone)]
pub struct FileSessionStore {
    path: PathBuf,
}

impl FileSessionStore {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// `~/.jurist/session.json`.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::SessionStore` if the home directory cannot be found.
    pub fn at_default_path() -> Result<Self, AuthError> {
        dirs::home_dir()
            .map(|home| Self::new(home.join(".jurist").join(SESSION_FILE_NAME)))
            .ok_or_else(|| {
                AuthError::SessionStore("home directory not found; cannot store session".into())
            })
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SessionStore for FileSessionStore {
    fn load(&self) -> Result<Option<Session>, AuthError> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(error) if error.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(AuthError::SessionStore(format!(
                    "read {}: {e}",
                    self.path.display()
                )));
            }
        };
        if raw.trim().is_empty() {
            return Ok(None);
        }
        match serde_json::from_str(&raw) {
            Ok(session) => Ok(Some(session)),
            Err(error) => {
                tracing::warn!(%error, path = %self.path.display(), "ignoring unreadable session file");
                Ok(None)
            }
        }
    }

    fn save(&self, session: &Session) -> Result<(), AuthError> {
        let raw = encode(session)?;
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .map_err(|e| AuthError::SessionStore(format!("mkdir {}: {e}", parent.display())))?;
            #[cfg(unix)]
            {
                use std::os::unix::fs::PermissionsExt;
                if let Err(e) = fs::set_permissions(parent, fs::Permissions::from_mode(0o700)) {
                    tracing::warn!("failed to chmod 0700 {}: {e}", parent.display());
                }
            }
        }
        fs::write(&self.path, raw)
            .map_err(|e| AuthError::SessionStore(format!("write {}: {e}", self.path.display())))?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(&self.path, fs::Permissions::from_mode(0o600)).map_err(|e| {
                AuthError::SessionStore(format!("chmod {}: {e}", self.path.display()))
            })?;
        }

        Ok(())
    }

    fn clear(&self) -> Result<(), AuthError> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(error) if error.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(AuthError::SessionStore(format!(
                "failed to delete {}: {e}",
                self.path.display()
            ))),
        }
    }

    fn source(&self) -> Option<&'static str> {
        self.load().ok().flatten().map(|_| "file")
    }
}

// --- Memory ---

/// Process-local store, used when persistence is turned off.
#[derive(Debug, Default)]
pub struct MemorySessionStore {
    session: Mutex<Option<Session>>,
}

impl MemorySessionStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl SessionStore for MemorySessionStore {
    fn load(&self) -> Result<Option<Session>, AuthError> {
        Ok(self
            .session
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone())
    }

    fn save(&self, session: &Session) -> Result<(), AuthError> {
        *self.session.lock().unwrap_or_else(PoisonError::into_inner) = Some(session.clone());
        Ok(())
    }

    fn clear(&self) -> Result<(), AuthError> {
        *self.session.lock().unwrap_or_else(PoisonError::into_inner) = None;
        Ok(())
    }

    fn source(&self) -> Option<&'static str> {
        self.session
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .map(|_| "memory")
    }
}

fn encode(session: &Session) -> Result<String, AuthError> {
    serde_json::to_string(session)
        .map_err(|e| AuthError::SessionStore(format!("encode session: {e}")))
}
