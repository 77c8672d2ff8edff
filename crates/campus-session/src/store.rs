//! Persisted credentials.
//!
//! A browser keeps the bearer token, token type and refresh token in
//! cookies and the absolute expiry in local storage. Here those four values
//! travel together as [`StoredCredentials`] behind the [`CredentialStore`]
//! trait, and every save replaces all four at once. Saving a new access
//! token next to a stale refresh token is exactly the half-written state we
//! never want on disk.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use serde::{Deserialize, Serialize};

use crate::SessionError;

/// The persisted half of a session.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredCredentials {
    #[serde(default)]
    pub access_token: Option<String>,
    #[serde(default)]
    pub token_type: Option<String>,
    #[serde(default)]
    pub refresh_token: Option<String>,
    /// Absolute expiry of `access_token`, Unix epoch ms. `0` means unknown.
    #[serde(default)]
    pub expires_at_ms: i64,
}

impl StoredCredentials {
    /// The access token, ignoring empty strings.
    pub fn access_token(&self) -> Option<&str> {
        self.access_token.as_deref().filter(|t| !t.is_empty())
    }

    /// The refresh credential, ignoring empty strings.
    pub fn refresh_token(&self) -> Option<&str> {
        self.refresh_token.as_deref().filter(|t| !t.is_empty())
    }
}

/// Durable storage for [`StoredCredentials`].
///
/// Implementations must make `save` all-or-nothing.
pub trait CredentialStore: Send + Sync + 'static {
    /// Reads the stored credentials. A store that has never been written
    /// returns `StoredCredentials::default()`.
    fn load(&self) -> Result<StoredCredentials, SessionError>;

    /// Replaces every stored field with `credentials`.
    fn save(&self, credentials: &StoredCredentials) -> Result<(), SessionError>;

    /// Forgets everything.
    fn clear(&self) -> Result<(), SessionError>;
}

// ---------------------------------------------------------------------------
// MemoryCredentialStore
// ---------------------------------------------------------------------------

/// Process-local store. Nothing survives a restart.
#[derive(Debug, Default)]
pub struct MemoryCredentialStore {
    inner: Mutex<StoredCredentials>,
}

impl MemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store pre-populated with `credentials`.
    pub fn with(credentials: StoredCredentials) -> Self {
        Self {
            inner: Mutex::new(credentials),
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, StoredCredentials> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl CredentialStore for MemoryCredentialStore {
    fn load(&self) -> Result<StoredCredentials, SessionError> {
        Ok(self.lock().clone())
    }

    fn save(&self, credentials: &StoredCredentials) -> Result<(), SessionError> {
        *self.lock() = credentials.clone();
        Ok(())
    }

    fn clear(&self) -> Result<(), SessionError> {
        *self.lock() = StoredCredentials::default();
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// FileCredentialStore
// ---------------------------------------------------------------------------

/// JSON file on disk.
///
/// Saves write a sibling temp file and rename it over the target, so a
/// crash mid-write leaves either the old or the new credentials, never a
/// mix.
#[derive(Debug, Clone)]
pub struct FileCredentialStore {
    path: PathBuf,
}

impl FileCredentialStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

fn storage_err(context: &str, e: impl std::fmt::Display) -> SessionError {
    SessionError::Storage(format!("{context}: {e}"))
}

impl CredentialStore for FileCredentialStore {
    fn load(&self) -> Result<StoredCredentials, SessionError> {
        match fs::read(&self.path) {
            Ok(bytes) => serde_json::from_slice(&bytes).map_err(|e| storage_err("parse", e)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(StoredCredentials::default()),
            Err(e) => Err(storage_err("read", e)),
        }
    }

    fn save(&self, credentials: &StoredCredentials) -> Result<(), SessionError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| storage_err("create dir", e))?;
        }
        let bytes =
            serde_json::to_vec_pretty(credentials).map_err(|e| storage_err("encode", e))?;
        let tmp = self.temp_path();
        fs::write(&tmp, bytes).map_err(|e| storage_err("write", e))?;
        fs::rename(&tmp, &self.path).map_err(|e| storage_err("rename", e))
    }

    fn clear(&self) -> Result<(), SessionError> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(storage_err("remove", e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> StoredCredentials {
        StoredCredentials {
            access_token: Some("a-1".into()),
            token_type: Some("bearer".into()),
            refresh_token: Some("r-1".into()),
            expires_at_ms: 1_700_000_000_000,
        }
    }

    #[test]
    fn test_accessors_ignore_empty_strings() {
        let creds = StoredCredentials {
            access_token: Some(String::new()),
            refresh_token: Some(String::new()),
            ..StoredCredentials::default()
        };
        assert_eq!(creds.access_token(), None);
        assert_eq!(creds.refresh_token(), None);
        assert_eq!(sample().access_token(), Some("a-1"));
    }

    #[test]
    fn test_memory_store_save_load_clear() {
        let store = MemoryCredentialStore::new();
        assert_eq!(store.load().unwrap(), StoredCredentials::default());

        store.save(&sample()).unwrap();
        assert_eq!(store.load().unwrap(), sample());

        store.clear().unwrap();
        assert_eq!(store.load().unwrap(), StoredCredentials::default());
    }

    #[test]
    fn test_file_store_missing_file_loads_default() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileCredentialStore::new(dir.path().join("creds.json"));
        assert_eq!(store.load().unwrap(), StoredCredentials::default());
    }

    #[test]
    fn test_file_store_persists_across_instances() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("creds.json");

        FileCredentialStore::new(&path).save(&sample()).unwrap();
        let reopened = FileCredentialStore::new(&path);
        assert_eq!(reopened.load().unwrap(), sample());
        assert!(!dir.path().join("nested").join("creds.json.tmp").exists());
    }

    #[test]
    fn test_file_store_clear_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileCredentialStore::new(dir.path().join("creds.json"));
        store.save(&sample()).unwrap();
        store.clear().unwrap();
        store.clear().unwrap();
        assert_eq!(store.load().unwrap(), StoredCredentials::default());
    }

    #[test]
    fn test_file_store_corrupt_file_is_storage_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("creds.json");
        fs::write(&path, b"{oops").unwrap();
        let err = FileCredentialStore::new(&path).load().unwrap_err();
        assert!(matches!(err, SessionError::Storage(_)));
    }
}
