//! The video collection, stored as one JSON array under a fixed key.
//!
//! Every write replaces the whole array. When the store rejects a write for
//! lack of space, the record being written is retried once without its
//! embedded thumbnail and the caller is told the image was dropped.

use super::error::CatalogResult;
use super::types::{Category, NewVideo, Persisted, VideoPatch, VideoRecord};
use crate::storage::{LocalStorage, StorageResult, VIDEOS_KEY};
use tracing::{debug, info, warn};

#[derive(Clone)]
pub struct VideoStore {
    storage: LocalStorage,
}

impl VideoStore {
    pub fn new(storage: LocalStorage) -> Self {
        Self { storage }
    }

    /// All records in stored order. An absent or unreadable collection reads
    /// as empty.
    pub async fn list(&self) -> Vec<VideoRecord> {
        let stored = match self.storage.get_item(VIDEOS_KEY).await {
            Ok(Some(stored)) => stored,
            Ok(None) => return Vec::new(),
            Err(e) => {
                warn!("Error retrieving videos from storage: {}", e);
                return Vec::new();
            }
        };

        match serde_json::from_str(&stored) {
            Ok(videos) => videos,
            Err(e) => {
                warn!(
                    "Stored video collection is unreadable ({} bytes), treating as empty: {}",
                    stored.len(),
                    e
                );
                Vec::new()
            }
        }
    }

    /// Newest first.
    pub async fn recent(&self) -> Vec<VideoRecord> {
        let mut videos = self.list().await;
        sort_recent_first(&mut videos);
        videos
    }

    pub async fn by_category(&self, category: Category) -> Vec<VideoRecord> {
        let mut videos = self.recent().await;
        videos.retain(|video| video.category == category);
        videos
    }

    pub async fn get(&self, id: &str) -> Option<VideoRecord> {
        self.list().await.into_iter().find(|video| video.id == id)
    }

    pub async fn create(&self, video: NewVideo) -> CatalogResult<Persisted<VideoRecord>> {
        video.validate()?;

        let mut videos = self.list().await;
        videos.push(video.into_record());
        let index = videos.len() - 1;

        let degraded = self.save_with_fallback(&mut videos, index).await?;
        let stored = videos.swap_remove(index);
        info!("Stored video {} ({})", stored.id, stored.title);

        Ok(wrap(stored, degraded))
    }

    /// `Ok(None)` when no record has this id.
    pub async fn update(
        &self,
        id: &str,
        patch: VideoPatch,
    ) -> CatalogResult<Option<Persisted<VideoRecord>>> {
        let mut videos = self.list().await;
        let Some(index) = videos.iter().position(|video| video.id == id) else {
            debug!("No video {} to update", id);
            return Ok(None);
        };

        patch.validate(&videos[index])?;
        patch.apply(&mut videos[index]);

        let degraded = self.save_with_fallback(&mut videos, index).await?;
        let stored = videos.swap_remove(index);
        info!("Updated video {}", stored.id);

        Ok(Some(wrap(stored, degraded)))
    }

    /// Returns whether a record was actually removed.
    pub async fn delete(&self, id: &str) -> StorageResult<bool> {
        let videos = self.list().await;
        let before = videos.len();
        let remaining: Vec<_> = videos.into_iter().filter(|video| video.id != id).collect();

        if remaining.len() == before {
            debug!("No video {} to delete", id);
            return Ok(false);
        }

        self.save(&remaining).await?;
        info!("Deleted video {}", id);
        Ok(true)
    }

    /// Keeps the `keep` most recently added records. Returns whether anything
    /// was dropped.
    pub async fn prune_to_recent(&self, keep: usize) -> StorageResult<bool> {
        let mut videos = self.list().await;
        if videos.len() <= keep {
            return Ok(false);
        }

        let before = videos.len();
        sort_recent_first(&mut videos);
        videos.truncate(keep);
        self.save(&videos).await?;

        info!("Pruned {} old videos, kept {}", before - keep, keep);
        Ok(true)
    }

    /// Drops the whole collection. Profile images live under other keys and
    /// are kept.
    pub async fn clear(&self) -> StorageResult<bool> {
        let removed = self.storage.remove_item(VIDEOS_KEY).await?;
        if removed {
            info!("Cleared all stored videos");
        }
        Ok(removed)
    }

    async fn save(&self, videos: &[VideoRecord]) -> StorageResult<()> {
        let json = serde_json::to_string(videos)?;
        self.storage.set_item(VIDEOS_KEY, &json).await
    }

    /// Returns `true` when the record at `index` had to be stored without
    /// its embedded thumbnail.
    async fn save_with_fallback(
        &self,
        videos: &mut [VideoRecord],
        index: usize,
    ) -> StorageResult<bool> {
        let err = match self.save(videos).await {
            Ok(()) => return Ok(false),
            Err(e) if e.is_quota_exceeded() => e,
            Err(e) => return Err(e),
        };

        let record = &mut videos[index];
        if record.thumbnail_base64.is_none() || !record.has_fallback_thumbnail() {
            warn!("Storage quota exceeded saving video {}: {}", record.id, err);
            return Err(err);
        }

        warn!(
            "Storage quota exceeded saving video {}, retrying with thumbnail URL only",
            record.id
        );
        record.thumbnail_base64 = None;
        self.save(videos).await?;

        Ok(true)
    }
}

fn sort_recent_first(videos: &mut [VideoRecord]) {
    videos.sort_by(|a, b| b.date_added.cmp(&a.date_added));
}

fn wrap(video: VideoRecord, degraded: bool) -> Persisted<VideoRecord> {
    if degraded {
        Persisted::WithoutEmbeddedImage(video)
    } else {
        Persisted::Complete(video)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::error::CatalogError;
    use crate::catalog::types::{Playback, Thumbnail, ValidationError};
    use crate::storage::StorageError;
    use chrono::{Duration, TimeZone, Utc};

    fn commercial(title: &str) -> NewVideo {
        NewVideo {
            title: title.to_string(),
            description: "Spot for a local bakery".to_string(),
            duration: "0:30".to_string(),
            resolution: "4K".to_string(),
            category: Category::Commercial,
            playback: Playback::External {
                url: "https://drive.google.com/file/d/vid123/view".to_string(),
            },
            thumbnail_url: Some("https://drive.google.com/file/d/thumb123/view".to_string()),
            thumbnail_embedded: None,
        }
    }

    fn big_embedded() -> String {
        format!("data:image/jpeg;base64,{}", "A".repeat(8_000))
    }

    fn record_added_at(n: i64) -> VideoRecord {
        let mut record = commercial(&format!("video {n}")).into_record();
        record.date_added = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap() + Duration::days(n);
        record
    }

    async fn seed(storage: &LocalStorage, videos: &[VideoRecord]) {
        storage
            .set_item(VIDEOS_KEY, &serde_json::to_string(videos).unwrap())
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_list_empty_and_corrupt() {
        let storage = LocalStorage::memory(None);
        let store = VideoStore::new(storage.clone());
        assert!(store.list().await.is_empty());

        storage.set_item(VIDEOS_KEY, "{ broken").await.unwrap();
        assert!(store.list().await.is_empty());
    }

    #[tokio::test]
    async fn test_create_then_list() {
        let store = VideoStore::new(LocalStorage::memory(None));
        let before = Utc::now();

        let first = store.create(commercial("First")).await.unwrap();
        let second = store.create(commercial("Second")).await.unwrap();
        assert!(!first.is_degraded());

        let videos = store.list().await;
        assert_eq!(videos.len(), 2);
        assert_eq!(&videos[0], first.get());
        assert_eq!(&videos[1], second.get());
        assert_ne!(videos[0].id, videos[1].id);
        assert!(videos[0].date_added >= before);
        assert_eq!(videos[0].title, "First");
        assert_eq!(videos[0].resolution, "4K");
    }

    #[tokio::test]
    async fn test_create_rejects_invalid_input() {
        let store = VideoStore::new(LocalStorage::memory(None));
        let mut video = commercial("No thumb");
        video.thumbnail_url = None;

        assert!(matches!(
            store.create(video).await,
            Err(CatalogError::Invalid(_))
        ));
        assert!(store.list().await.is_empty());
    }

    #[tokio::test]
    async fn test_create_drops_embedded_image_when_over_quota() {
        let store = VideoStore::new(LocalStorage::memory(Some(2_000)));
        let mut video = commercial("Heavy");
        video.thumbnail_embedded = Some(big_embedded());

        let persisted = store.create(video).await.unwrap();
        assert!(persisted.is_degraded());

        let videos = store.list().await;
        assert_eq!(videos.len(), 1);
        assert_eq!(videos[0].thumbnail_base64, None);
        assert_eq!(
            videos[0].thumbnail_url,
            "https://drive.google.com/file/d/thumb123/view"
        );
        assert_eq!(&videos[0], persisted.get());
    }

    #[tokio::test]
    async fn test_create_over_quota_without_link_fails() {
        let store = VideoStore::new(LocalStorage::memory(Some(2_000)));
        let mut video = commercial("Heavy");
        video.thumbnail_url = None;
        video.thumbnail_embedded = Some(big_embedded());

        let err = store.create(video).await.unwrap_err();
        assert!(matches!(
            err,
            CatalogError::Storage(StorageError::QuotaExceeded { .. })
        ));
        assert!(store.list().await.is_empty());
    }

    #[tokio::test]
    async fn test_update_changes_only_patched_fields() {
        let store = VideoStore::new(LocalStorage::memory(None));
        let original = store.create(commercial("Old")).await.unwrap().into_inner();

        let updated = store
            .update(
                &original.id,
                VideoPatch {
                    title: Some("X".to_string()),
                    ..VideoPatch::default()
                },
            )
            .await
            .unwrap()
            .unwrap()
            .into_inner();

        assert_eq!(
            updated,
            VideoRecord {
                title: "X".to_string(),
                ..original
            }
        );
        assert_eq!(store.list().await, vec![updated]);
    }

    #[tokio::test]
    async fn test_update_missing_id() {
        let store = VideoStore::new(LocalStorage::memory(None));
        store.create(commercial("Only")).await.unwrap();

        let result = store
            .update(
                "does-not-exist",
                VideoPatch {
                    title: Some("X".to_string()),
                    ..VideoPatch::default()
                },
            )
            .await
            .unwrap();
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn test_update_drops_embedded_image_when_over_quota() {
        let store = VideoStore::new(LocalStorage::memory(Some(2_000)));
        let original = store.create(commercial("Light")).await.unwrap().into_inner();

        let persisted = store
            .update(
                &original.id,
                VideoPatch {
                    thumbnail_embedded: Some(big_embedded()),
                    thumbnail_url: Some(original.thumbnail_url.clone()),
                    ..VideoPatch::default()
                },
            )
            .await
            .unwrap()
            .unwrap();

        assert!(persisted.is_degraded());
        let stored = store.get(&original.id).await.unwrap();
        assert_eq!(stored.thumbnail_base64, None);
        assert_eq!(stored.thumbnail_url, original.thumbnail_url);
    }

    #[tokio::test]
    async fn test_update_cannot_blank_the_only_thumbnail() {
        let store = VideoStore::new(LocalStorage::memory(None));
        let mut video = commercial("Embedded only");
        video.thumbnail_url = None;
        video.thumbnail_embedded = Some("data:image/jpeg;base64,AAAA".to_string());
        let original = store.create(video).await.unwrap().into_inner();

        let result = store
            .update(
                &original.id,
                VideoPatch {
                    thumbnail_url: Some("   ".to_string()),
                    ..VideoPatch::default()
                },
            )
            .await;
        assert!(matches!(
            result,
            Err(CatalogError::Invalid(ValidationError::MissingThumbnail))
        ));

        let stored = store.get(&original.id).await.unwrap();
        assert_eq!(stored, original);
        assert_eq!(
            stored.thumbnail(),
            Thumbnail::Embedded("data:image/jpeg;base64,AAAA")
        );
    }

    #[tokio::test]
    async fn test_delete() {
        let store = VideoStore::new(LocalStorage::memory(None));
        let kept = store.create(commercial("Keep")).await.unwrap().into_inner();
        let gone = store.create(commercial("Gone")).await.unwrap().into_inner();

        assert!(!store.delete("missing").await.unwrap());
        assert_eq!(store.list().await.len(), 2);

        assert!(store.delete(&gone.id).await.unwrap());
        assert_eq!(store.list().await, vec![kept]);
    }

    #[tokio::test]
    async fn test_prune_keeps_most_recent() {
        let storage = LocalStorage::memory(None);
        let store = VideoStore::new(storage.clone());
        let videos: Vec<_> = [3, 14, 0, 7, 11, 1, 9, 12, 5, 2, 13, 6, 10, 4, 8]
            .into_iter()
            .map(record_added_at)
            .collect();
        seed(&storage, &videos).await;

        assert!(store.prune_to_recent(10).await.unwrap());

        let remaining = store.list().await;
        assert_eq!(remaining.len(), 10);
        let titles: Vec<_> = remaining.iter().map(|v| v.title.as_str()).collect();
        let expected: Vec<_> = (5..15).rev().map(|n| format!("video {n}")).collect();
        assert_eq!(titles, expected);
    }

    #[tokio::test]
    async fn test_prune_noop_when_small() {
        let storage = LocalStorage::memory(None);
        let store = VideoStore::new(storage.clone());
        let videos: Vec<_> = [2, 0, 1].into_iter().map(record_added_at).collect();
        seed(&storage, &videos).await;

        assert!(!store.prune_to_recent(10).await.unwrap());
        assert_eq!(store.list().await, videos);
    }

    #[tokio::test]
    async fn test_recent_and_by_category() {
        let storage = LocalStorage::memory(None);
        let store = VideoStore::new(storage.clone());
        let mut docu = record_added_at(5);
        docu.category = Category::Documentary;
        let videos = vec![record_added_at(1), docu.clone(), record_added_at(3)];
        seed(&storage, &videos).await;

        let recent: Vec<_> = store.recent().await.into_iter().map(|v| v.title).collect();
        assert_eq!(recent, vec!["video 5", "video 3", "video 1"]);

        assert_eq!(store.by_category(Category::Documentary).await, vec![docu]);
        assert_eq!(store.by_category(Category::Commercial).await.len(), 2);
        assert!(store.by_category(Category::Youtube).await.is_empty());
    }

    #[tokio::test]
    async fn test_clear_keeps_other_keys() {
        let storage = LocalStorage::memory(None);
        let store = VideoStore::new(storage.clone());
        store.create(commercial("Gone")).await.unwrap();
        storage
            .set_item("profile_hero_image", "https://example.com/hero.jpg")
            .await
            .unwrap();

        assert!(store.clear().await.unwrap());
        assert!(!store.clear().await.unwrap());
        assert!(store.list().await.is_empty());
        assert_eq!(storage.keys().await.unwrap(), vec!["profile_hero_image"]);
    }
}
