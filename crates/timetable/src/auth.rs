//! Authentication context and the persisted login session.
//!
//! The backend issues a bearer token at login. It lives in an
//! [`AuthContext`] that callers pass to every client call; nothing holds the
//! token globally. A [`SessionStore`] writes the session to disk so a later
//! run can pick it up again.

use crate::types::{Role, User};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

/// A short, non-reversible identifier for a token, safe to log.
#[derive(Debug, Clone, Hash, Eq, PartialEq)]
pub struct SessionFingerprint(String);

impl SessionFingerprint {
    /// Hashes the token so it never has to be logged.
    pub fn from_token(token: &str) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(token.as_bytes());
        let result = hasher.finalize();
        // First 16 bytes are plenty to tell sessions apart
        Self(hex::encode(&result[..16]))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for SessionFingerprint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}...", &self.0[..8.min(self.0.len())])
    }
}

mod hex {
    pub fn encode(bytes: &[u8]) -> String {
        bytes.iter().map(|b| format!("{:02x}", b)).collect()
    }
}

/// A logged-in user and the token the backend issued for them.
#[derive(Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub token: String,
    pub user: User,
}

impl Session {
    pub fn fingerprint(&self) -> SessionFingerprint {
        SessionFingerprint::from_token(&self.token)
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("token", &self.fingerprint())
            .field("user", &self.user)
            .finish()
    }
}

/// Who is making requests.
///
/// Starts anonymous, holds a session after login, and returns to anonymous
/// on logout.
#[derive(Debug, Clone, Default)]
pub struct AuthContext {
    session: Option<Session>,
}

impl AuthContext {
    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn with_session(session: Session) -> Self {
        Self {
            session: Some(session),
        }
    }

    /// Installs a freshly issued session, replacing any previous one.
    pub fn acquire(&mut self, session: Session) {
        info!(
            session = %session.fingerprint(),
            role = %session.user.role,
            "Session acquired"
        );
        self.session = Some(session);
    }

    /// Logs out, returning the session that was held.
    pub fn clear(&mut self) -> Option<Session> {
        let previous = self.session.take();
        if let Some(s) = &previous {
            info!(session = %s.fingerprint(), "Session cleared");
        }
        previous
    }

    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    pub fn user(&self) -> Option<&User> {
        self.session.as_ref().map(|s| &s.user)
    }

    pub fn role(&self) -> Option<Role> {
        self.user().map(|u| u.role)
    }

    pub fn is_authenticated(&self) -> bool {
        self.session.is_some()
    }

    /// Token for the `Authorization` header, if logged in.
    pub fn bearer_token(&self) -> Option<&str> {
        self.session.as_ref().map(|s| s.token.as_str())
    }
}

/// Errors from reading or writing the session file.
#[derive(Debug, Error)]
pub enum SessionStoreError {
    #[error("Session file {path} could not be accessed: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Session file {path} is corrupt: {source}")]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// JSON file holding the current session.
#[derive(Debug, Clone)]
pub struct SessionStore {
    path: PathBuf,
}

impl SessionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads the stored session; a missing file means nobody is logged in.
    pub fn load(&self) -> Result<Option<Session>, SessionStoreError> {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(source) => {
                return Err(SessionStoreError::Io {
                    path: self.path.clone(),
                    source,
                })
            }
        };
        let session: Session =
            serde_json::from_str(&content).map_err(|source| SessionStoreError::Corrupt {
                path: self.path.clone(),
                source,
            })?;
        debug!(session = %session.fingerprint(), "Loaded stored session");
        Ok(Some(session))
    }

    /// Loads the stored session into a context, anonymous if there is none.
    pub fn restore(&self) -> Result<AuthContext, SessionStoreError> {
        Ok(self
            .load()?
            .map(AuthContext::with_session)
            .unwrap_or_default())
    }

    pub fn save(&self, session: &Session) -> Result<(), SessionStoreError> {
        let io_err = |source| SessionStoreError::Io {
            path: self.path.clone(),
            source,
        };
        let content = serde_json::to_string_pretty(session).map_err(|source| {
            SessionStoreError::Corrupt {
                path: self.path.clone(),
                source,
            }
        })?;
        std::fs::write(&self.path, content).map_err(io_err)
    }

    /// Removes the stored session. Succeeds if there was none.
    pub fn clear(&self) -> Result<(), SessionStoreError> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(source) => Err(SessionStoreError::Io {
                path: self.path.clone(),
                source,
            }),
        }
    }
}
