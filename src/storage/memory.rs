//! In-memory storage backend.

use super::backend::{check_quota, entry_size, StorageBackend};
use super::error::StorageResult;
use async_trait::async_trait;
use dashmap::DashMap;

/// Non-persistent backend. All data is lost when the process exits.
#[derive(Default)]
pub struct MemoryBackend {
    data: DashMap<String, String>,
    quota: Option<usize>,
}

impl MemoryBackend {
    pub fn with_quota(quota: Option<usize>) -> Self {
        Self {
            data: DashMap::new(),
            quota,
        }
    }

    fn used(&self) -> usize {
        self.data
            .iter()
            .map(|entry| entry_size(entry.key(), entry.value()))
            .sum()
    }
}

#[async_trait]
impl StorageBackend for MemoryBackend {
    async fn get_item(&self, key: &str) -> StorageResult<Option<String>> {
        Ok(self.data.get(key).map(|v| v.value().clone()))
    }

    async fn set_item(&self, key: &str, value: &str) -> StorageResult<()> {
        let current = self.data.get(key).map(|v| v.value().clone());
        check_quota(self.quota, self.used(), key, current.as_deref(), value)?;
        self.data.insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn remove_item(&self, key: &str) -> StorageResult<bool> {
        Ok(self.data.remove(key).is_some())
    }

    async fn keys(&self) -> StorageResult<Vec<String>> {
        Ok(self.data.iter().map(|entry| entry.key().clone()).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_get_set_remove() {
        let backend = MemoryBackend::default();

        assert_eq!(backend.get_item("a").await.unwrap(), None);
        backend.set_item("a", "1").await.unwrap();
        assert_eq!(backend.get_item("a").await.unwrap().as_deref(), Some("1"));

        assert!(backend.remove_item("a").await.unwrap());
        assert!(!backend.remove_item("a").await.unwrap());
        assert!(backend.keys().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_quota_rejects_and_keeps_previous_value() {
        let backend = MemoryBackend::with_quota(Some(10));
        backend.set_item("key", "small").await.unwrap();

        let err = backend.set_item("key", "much too large").await.unwrap_err();
        assert!(err.is_quota_exceeded());
        assert_eq!(
            backend.get_item("key").await.unwrap().as_deref(),
            Some("small")
        );
    }

    #[tokio::test]
    async fn test_quota_is_shared_across_keys() {
        let backend = MemoryBackend::with_quota(Some(12));
        backend.set_item("a", "12345").await.unwrap();
        backend.set_item("b", "12345").await.unwrap();

        assert!(backend.set_item("c", "1").await.is_err());

        backend.remove_item("a").await.unwrap();
        backend.set_item("c", "1").await.unwrap();
    }
}
