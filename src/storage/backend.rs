//! Key/value storage seam.
//!
//! Mirrors the browser's local storage: a flat map of string keys to string
//! values with a byte ceiling shared by every entry.

use super::error::{StorageError, StorageResult};
use super::file::FileBackend;
#[cfg(test)]
use super::memory::MemoryBackend;
use async_trait::async_trait;
use std::path::Path;
use std::sync::Arc;

/// Ceiling most browsers apply to one origin's local storage.
pub const DEFAULT_QUOTA_BYTES: usize = 5 * 1024 * 1024;

#[async_trait]
pub trait StorageBackend: Send + Sync + 'static {
    /// Returns `Ok(None)` when the key is absent.
    async fn get_item(&self, key: &str) -> StorageResult<Option<String>>;

    /// Stores `value` under `key`, replacing any previous value.
    ///
    /// A write that would exceed the backend's quota fails with
    /// [`StorageError::QuotaExceeded`] and leaves the store untouched.
    async fn set_item(&self, key: &str, value: &str) -> StorageResult<()>;

    /// Returns whether a value was actually removed.
    async fn remove_item(&self, key: &str) -> StorageResult<bool>;

    async fn keys(&self) -> StorageResult<Vec<String>>;
}

/// Keys the usage probe writes filler under. They are never persisted.
pub(crate) const SCRATCH_KEY_PREFIX: &str = "__reelfolio_probe_";

pub(crate) fn is_scratch_key(key: &str) -> bool {
    key.starts_with(SCRATCH_KEY_PREFIX)
}

/// Bytes an entry counts against the quota.
pub(crate) fn entry_size(key: &str, value: &str) -> usize {
    key.len() + value.len()
}

/// Rejects a write when replacing `key`'s current value with `value` would
/// push `used` past `quota`.
pub(crate) fn check_quota(
    quota: Option<usize>,
    used: usize,
    key: &str,
    current: Option<&str>,
    value: &str,
) -> StorageResult<()> {
    let Some(limit) = quota else {
        return Ok(());
    };

    let released = current.map(|old| entry_size(key, old)).unwrap_or(0);
    let required = used.saturating_sub(released) + entry_size(key, value);

    if required > limit {
        return Err(StorageError::QuotaExceeded {
            key: key.to_string(),
            required,
            limit,
        });
    }

    Ok(())
}

/// Shared handle to whichever backend the process was configured with.
#[derive(Clone)]
pub struct LocalStorage {
    backend: Arc<dyn StorageBackend>,
}

impl LocalStorage {
    pub fn new(backend: impl StorageBackend) -> Self {
        Self {
            backend: Arc::new(backend),
        }
    }

    #[cfg(test)]
    pub fn memory(quota: Option<usize>) -> Self {
        Self::new(MemoryBackend::with_quota(quota))
    }

    /// Store persisted as a single JSON document at `path`.
    pub async fn file<P: AsRef<Path>>(path: P, quota: Option<usize>) -> StorageResult<Self> {
        let backend = FileBackend::open(path.as_ref(), quota).await?;
        Ok(Self::new(backend))
    }

    pub async fn get_item(&self, key: &str) -> StorageResult<Option<String>> {
        self.backend.get_item(key).await
    }

    pub async fn set_item(&self, key: &str, value: &str) -> StorageResult<()> {
        self.backend.set_item(key, value).await
    }

    pub async fn remove_item(&self, key: &str) -> StorageResult<bool> {
        self.backend.remove_item(key).await
    }

    pub async fn keys(&self) -> StorageResult<Vec<String>> {
        self.backend.keys().await
    }
}
