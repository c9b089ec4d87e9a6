mod backend;
mod error;
mod file;
#[cfg(test)]
mod memory;
mod usage;

pub use backend::{LocalStorage, DEFAULT_QUOTA_BYTES};
pub use error::{StorageError, StorageResult};
pub use usage::{StorageUsage, UsageEstimator};

/// Key holding the JSON array of video records.
pub const VIDEOS_KEY: &str = "videographer_videos";
pub const HERO_IMAGE_KEY: &str = "profile_hero_image";
pub const ABOUT_IMAGE_KEY: &str = "profile_about_image";
