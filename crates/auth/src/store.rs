//! Credential store abstraction
//!
//! The validator needs exactly one read from persistence: every active record
//! whose indexed prefix equals a given value. [`CredentialStore`] is that
//! contract. [`MemoryCredentialStore`] is a prefix-indexed in-process
//! implementation that can be loaded (and hot reloaded) from a TOML file.

use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::str::FromStr;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::RwLock;
use serde::Deserialize;
use tracing::info;

use crate::error::{AuthError, Result};
use crate::record::CredentialRecord;

/// Read access to stored credentials
///
/// Implementations must never return records with `is_active = false`.
/// Connectivity failures are reported as [`AuthError::StoreUnavailable`].
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Return all active records whose `key_prefix` equals `prefix`
    async fn find_active_by_prefix(&self, prefix: &str) -> Result<Vec<CredentialRecord>>;
}

/// Shared store handle
pub type SharedCredentialStore = Arc<dyn CredentialStore>;

/// Thread-safe in-memory credential store
///
/// Records are bucketed by prefix. Inactive records are kept (so a reload
/// can reactivate them) but never returned from lookups.
///
/// # Example
///
/// ```
/// use vito_auth::MemoryCredentialStore;
/// use vito_auth::test_utils::record_for_key;
///
/// let store = MemoryCredentialStore::new();
/// store.insert(record_for_key("key-1", "tenant-1", "vito_test_abc123def456", &["read"]));
/// assert_eq!(store.len(), 1);
/// ```
#[derive(Debug, Default)]
pub struct MemoryCredentialStore {
    inner: RwLock<StoreInner>,
}

#[derive(Debug, Default)]
struct StoreInner {
    /// Records grouped by key prefix
    by_prefix: HashMap<String, Vec<CredentialRecord>>,
    /// Key id to prefix, for replacement and removal
    ids: HashMap<String, String>,
}

impl StoreInner {
    fn insert(&mut self, record: CredentialRecord) -> Option<CredentialRecord> {
        let previous = self.remove(&record.id);
        self.ids.insert(record.id.clone(), record.key_prefix.clone());
        self.by_prefix
            .entry(record.key_prefix.clone())
            .or_default()
            .push(record);
        previous
    }

    fn remove(&mut self, id: &str) -> Option<CredentialRecord> {
        let prefix = self.ids.remove(id)?;
        let bucket = self.by_prefix.get_mut(&prefix)?;
        let pos = bucket.iter().position(|r| r.id == id)?;
        let record = bucket.swap_remove(pos);
        if bucket.is_empty() {
            self.by_prefix.remove(&prefix);
        }
        Some(record)
    }

    fn from_records(records: Vec<CredentialRecord>) -> Result<Self> {
        let mut inner = Self::default();
        for record in records {
            if inner.ids.contains_key(&record.id) {
                return Err(AuthError::duplicate_key(record.id));
            }
            inner.insert(record);
        }
        Ok(inner)
    }
}

/// On-disk layout of a credentials file
#[derive(Debug, Default, Deserialize)]
struct CredentialsFile {
    #[serde(default)]
    keys: Vec<CredentialRecord>,
}

impl MemoryCredentialStore {
    /// Create a new empty store
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Load records from a TOML file
    ///
    /// File format:
    /// ```toml
    /// [[keys]]
    /// id = "key-1"
    /// tenant_id = "tenant-1"
    /// key_prefix = "vito_test_abc123"
    /// key_hash = "<64 hex chars>"
    /// scopes = ["agents:financial"]
    /// expires_at = "2027-01-01T00:00:00Z"
    /// ```
    ///
    /// # Errors
    ///
    /// Returns error if the file cannot be read, is not valid TOML, or
    /// repeats a key id.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path)
            .map_err(|e| AuthError::io_error(path.display().to_string(), e))?;

        Self::from_str(&contents)
    }

    fn parse(contents: &str) -> Result<StoreInner> {
        let file: CredentialsFile = toml::from_str(contents)?;
        StoreInner::from_records(file.keys)
    }

    /// Insert a record
    ///
    /// Returns the previous record with the same id, if any.
    pub fn insert(&self, record: CredentialRecord) -> Option<CredentialRecord> {
        self.inner.write().insert(record)
    }

    /// Remove a record by id
    pub fn remove(&self, id: &str) -> Option<CredentialRecord> {
        self.inner.write().remove(id)
    }

    /// Number of records, active or not
    pub fn len(&self) -> usize {
        self.inner.read().ids.len()
    }

    /// Check if the store is empty
    pub fn is_empty(&self) -> bool {
        self.inner.read().ids.is_empty()
    }

    /// Clear all records
    pub fn clear(&self) {
        let mut inner = self.inner.write();
        inner.by_prefix.clear();
        inner.ids.clear();
    }

    /// Reload records from a file, atomically replacing the current set
    ///
    /// # Errors
    ///
    /// On error the existing records are preserved.
    pub fn reload<P: AsRef<Path>>(&self, path: P) -> Result<usize> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path)
            .map_err(|e| AuthError::io_error(path.display().to_string(), e))?;

        self.reload_from_str(&contents)
    }

    /// Reload records from a TOML string, atomically replacing the current set
    ///
    /// # Errors
    ///
    /// On error the existing records are preserved.
    pub fn reload_from_str(&self, contents: &str) -> Result<usize> {
        // Parse fully before swapping so a bad file leaves the store intact
        let parsed = Self::parse(contents)?;
        let count = parsed.ids.len();
        *self.inner.write() = parsed;

        info!(count, "credential store reloaded");
        Ok(count)
    }

    fn active_by_prefix(&self, prefix: &str) -> Vec<CredentialRecord> {
        self.inner
            .read()
            .by_prefix
            .get(prefix)
            .map(|bucket| bucket.iter().filter(|r| r.is_active).cloned().collect())
            .unwrap_or_default()
    }
}

impl FromStr for MemoryCredentialStore {
    type Err = AuthError;

    fn from_str(s: &str) -> Result<Self> {
        Ok(Self {
            inner: RwLock::new(Self::parse(s)?),
        })
    }
}

#[async_trait]
impl CredentialStore for MemoryCredentialStore {
    async fn find_active_by_prefix(&self, prefix: &str) -> Result<Vec<CredentialRecord>> {
        Ok(self.active_by_prefix(prefix))
    }
}
