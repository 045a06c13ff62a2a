//! File-backed persistence of the session record across CLI invocations.
//!
//! This is the pluggable persistence collaborator: `load`/`save`/`clear`
//! over a TOML file next to the config. Only derived tokens are stored,
//! never the password.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::api::types::Session;

/// Errors from the session store.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Failed to read session file '{path}': {source}")]
    ReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse session file '{path}': {source}")]
    ParseError {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Failed to write session file '{path}': {source}")]
    WriteError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to serialize session record: {0}")]
    SerializeError(#[from] toml::ser::Error),
}

/// Persisted session record. Every field is optional: records written by
/// other tooling or older versions still load, and a record is only usable
/// if it carries at least an access token.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct SessionRecord {
    pub access_token: Option<String>,
    pub refresh_token: Option<String>,
    pub customer_id: Option<String>,
    pub customer_order_id: Option<String>,
    pub customer_order_state: Option<String>,
    pub default_branch_id: Option<String>,
    /// Username at the time the record was written. Write-only persistence
    /// fidelity with the shared record format: it is never read back, and
    /// credentials are always re-resolved from their source at login time.
    pub username: Option<String>,
    /// Epoch milliseconds.
    pub expires_at: Option<u64>,
}

impl SessionRecord {
    pub fn from_session(session: &Session, username: &str) -> Self {
        Self {
            access_token: Some(session.access_token.clone()),
            refresh_token: Some(session.refresh_token.clone()),
            customer_id: Some(session.customer_id.clone()),
            customer_order_id: Some(session.customer_order_id.clone()),
            customer_order_state: Some(session.customer_order_state.clone()),
            default_branch_id: Some(session.default_branch_id.clone()),
            username: Some(username.to_string()),
            expires_at: Some(session.expires_at),
        }
    }

    /// Rebuild a session from the record. Requires an access token; any
    /// other missing field defaults to empty, matching a token-only
    /// restore.
    pub fn into_session(self) -> Option<Session> {
        let access_token = self.access_token.filter(|t| !t.is_empty())?;
        Some(Session {
            access_token,
            refresh_token: self.refresh_token.unwrap_or_default(),
            customer_id: self.customer_id.unwrap_or_default(),
            customer_order_id: self.customer_order_id.unwrap_or_default(),
            customer_order_state: self.customer_order_state.unwrap_or_default(),
            default_branch_id: self.default_branch_id.unwrap_or_default(),
            expires_at: self.expires_at.unwrap_or_default(),
        })
    }
}

/// TOML-file session store.
pub struct SessionStore {
    path: PathBuf,
}

impl SessionStore {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    /// `~/.config/trolley/session.toml` (or platform equivalent).
    pub fn default_path() -> PathBuf {
        let config_dir = dirs::config_dir().unwrap_or_else(|| PathBuf::from("."));
        config_dir.join("trolley").join("session.toml")
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the persisted record; a missing file is `None`, not an error.
    pub fn load(&self) -> Result<Option<SessionRecord>, StoreError> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(None),
            Err(err) => {
                return Err(StoreError::ReadError {
                    path: self.path.clone(),
                    source: err,
                })
            }
        };
        let record = toml::from_str(&content).map_err(|e| StoreError::ParseError {
            path: self.path.clone(),
            source: e,
        })?;
        Ok(Some(record))
    }

    /// Write the record, creating parent directories as needed. The file is
    /// restricted to the owner on Unix; it holds a live bearer token.
    pub fn save(&self, record: &SessionRecord) -> Result<(), StoreError> {
        let content = toml::to_string_pretty(record)?;
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|e| StoreError::WriteError {
                path: self.path.clone(),
                source: e,
            })?;
        }
        fs::write(&self.path, content).map_err(|e| StoreError::WriteError {
            path: self.path.clone(),
            source: e,
        })?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(&self.path, fs::Permissions::from_mode(0o600)).map_err(|e| {
                StoreError::WriteError {
                    path: self.path.clone(),
                    source: e,
                }
            })?;
        }

        Ok(())
    }

    /// Delete the persisted record; already absent is fine.
    pub fn clear(&self) -> Result<(), StoreError> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
            Err(err) => Err(StoreError::WriteError {
                path: self.path.clone(),
                source: err,
            }),
        }
    }
}
