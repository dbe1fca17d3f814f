//! Persistent auth token storage.
//!
//! The token lives in a single file (default `~/.querymind/auth_token`). Only
//! `login` and `logout` write it; everything else reads it once and passes it
//! down explicitly.

use std::fmt;
use std::path::{Path, PathBuf};

use thiserror::Error;

const STORE_DIR: &str = ".querymind";
const TOKEN_FILE: &str = "auth_token";

/// Errors from the token store and the login flows.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("could not determine home directory")]
    NoHomeDir,

    #[error("failed to access token file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("External API error: {status}")]
    Rejected { status: u16 },

    #[error("login response did not contain an access token")]
    NoToken,
}

/// An opaque, non-empty bearer credential.
#[derive(Clone, PartialEq, Eq)]
pub struct AuthToken(String);

impl AuthToken {
    /// Wrap a raw token. Blank input yields `None`.
    pub fn new(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(Self(trimmed.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

// Keep the credential out of logs.
impl fmt::Debug for AuthToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AuthToken(***)")
    }
}

/// File-backed store for the one auth token.
#[derive(Debug, Clone)]
pub struct TokenStore {
    path: PathBuf,
}

impl TokenStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Store at `~/.querymind/auth_token`.
    pub fn default_location() -> Result<Self, AuthError> {
        let home = dirs::home_dir().ok_or(AuthError::NoHomeDir)?;
        Ok(Self::new(home.join(STORE_DIR).join(TOKEN_FILE)))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the token. A missing or blank file means "not logged in".
    pub fn load(&self) -> Result<Option<AuthToken>, AuthError> {
        match std::fs::read_to_string(&self.path) {
            Ok(content) => Ok(AuthToken::new(&content)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(source) => Err(self.io_error(source)),
        }
    }

    pub fn save(&self, token: &AuthToken) -> Result<(), AuthError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| self.io_error(e))?;
        }
        std::fs::write(&self.path, token.as_str()).map_err(|e| self.io_error(e))
    }

    /// Remove the token. Returns `false` if there was nothing to remove.
    pub fn clear(&self) -> Result<bool, AuthError> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(source) => Err(self.io_error(source)),
        }
    }

    fn io_error(&self, source: std::io::Error) -> AuthError {
        AuthError::Io {
            path: self.path.clone(),
            source,
        }
    }
}
