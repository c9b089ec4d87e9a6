//! The two profile pictures shown on the home page.

use super::error::CatalogResult;
use super::types::ValidationError;
use crate::media::is_embedded_image;
use crate::storage::{LocalStorage, ABOUT_IMAGE_KEY, HERO_IMAGE_KEY};
use std::fmt;
use tracing::{info, warn};
use url::Url;

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum ProfileSlot {
    Hero,
    About,
}

impl ProfileSlot {
    pub const ALL: [ProfileSlot; 2] = [ProfileSlot::Hero, ProfileSlot::About];

    pub fn key(&self) -> &'static str {
        match self {
            ProfileSlot::Hero => HERO_IMAGE_KEY,
            ProfileSlot::About => ABOUT_IMAGE_KEY,
        }
    }
}

impl fmt::Display for ProfileSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProfileSlot::Hero => f.pad("hero"),
            ProfileSlot::About => f.pad("about"),
        }
    }
}

#[derive(Clone)]
pub struct ProfileImages {
    storage: LocalStorage,
}

impl ProfileImages {
    pub fn new(storage: LocalStorage) -> Self {
        Self { storage }
    }

    /// Embedded image or link, `None` when unset or unreadable.
    pub async fn get(&self, slot: ProfileSlot) -> Option<String> {
        match self.storage.get_item(slot.key()).await {
            Ok(value) => value.filter(|v| !v.is_empty()),
            Err(e) => {
                warn!("Error reading {} image: {}", slot, e);
                None
            }
        }
    }

    /// Overwrites the slot with an embedded image or an absolute URL.
    pub async fn set(&self, slot: ProfileSlot, value: &str) -> CatalogResult<()> {
        let value = value.trim();
        if !is_embedded_image(value) && Url::parse(value).is_err() {
            return Err(ValidationError::InvalidImageReference(value.to_string()).into());
        }

        self.storage.set_item(slot.key(), value).await?;
        info!("Saved {} image ({} chars)", slot, value.len());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::CatalogError;

    #[tokio::test]
    async fn test_slots_are_independent() {
        let images = ProfileImages::new(LocalStorage::memory(None));
        assert_eq!(images.get(ProfileSlot::Hero).await, None);

        images
            .set(ProfileSlot::Hero, "data:image/jpeg;base64,AAAA")
            .await
            .unwrap();
        images
            .set(ProfileSlot::About, " https://example.com/about.jpg ")
            .await
            .unwrap();
        images
            .set(ProfileSlot::Hero, "https://example.com/hero.jpg")
            .await
            .unwrap();

        assert_eq!(
            images.get(ProfileSlot::Hero).await.as_deref(),
            Some("https://example.com/hero.jpg")
        );
        assert_eq!(
            images.get(ProfileSlot::About).await.as_deref(),
            Some("https://example.com/about.jpg")
        );
    }

    #[tokio::test]
    async fn test_rejects_relative_reference() {
        let images = ProfileImages::new(LocalStorage::memory(None));
        let err = images.set(ProfileSlot::About, "hero.jpg").await.unwrap_err();
        assert!(matches!(err, CatalogError::Invalid(_)));
    }

    #[tokio::test]
    async fn test_quota_failure_surfaces() {
        let images = ProfileImages::new(LocalStorage::memory(Some(64)));
        let big = format!("data:image/jpeg;base64,{}", "A".repeat(128));

        let err = images.set(ProfileSlot::Hero, &big).await.unwrap_err();
        assert!(err.is_quota_exceeded());
        assert_eq!(images.get(ProfileSlot::Hero).await, None);
    }
}
