mod error;
mod profile;
mod types;
mod videos;

pub use error::CatalogError;
pub use profile::{ProfileImages, ProfileSlot};
pub use types::{Category, NewVideo, Persisted, Playback, Thumbnail, VideoPatch, VideoRecord};
pub use videos::VideoStore;
