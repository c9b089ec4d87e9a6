use crate::media::{extract_file_id, is_embedded_image, view_url, youtube_watch_url};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Youtube,
    Commercial,
    Documentary,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Youtube => "youtube",
            Category::Commercial => "commercial",
            Category::Documentary => "documentary",
        }
    }

    /// YouTube entries play from a YouTube id, everything else from a link.
    pub fn is_youtube(&self) -> bool {
        matches!(self, Category::Youtube)
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One portfolio entry, in the layout it is persisted with.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoRecord {
    pub id: String,
    pub title: String,
    pub description: String,
    pub duration: String,
    pub resolution: String,
    pub category: Category,
    pub date_added: DateTime<Utc>,
    #[serde(default)]
    pub thumbnail_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumbnail_base64: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub video_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub youtube_id: Option<String>,
}

/// Where a video plays from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Playback {
    YouTube { id: String },
    External { url: String },
}

impl Playback {
    pub fn link(&self) -> String {
        match self {
            Playback::YouTube { id } => youtube_watch_url(id),
            Playback::External { url } => view_url(url),
        }
    }

    fn matches(&self, category: Category) -> bool {
        matches!(self, Playback::YouTube { .. }) == category.is_youtube()
    }
}

/// Which image to show for a video.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Thumbnail<'a> {
    Embedded(&'a str),
    External(&'a str),
    /// Neither source is usable; render a stand-in.
    Placeholder,
}

fn non_empty(value: Option<&String>) -> Option<&str> {
    value.map(|s| s.trim()).filter(|s| !s.is_empty())
}

impl VideoRecord {
    /// `None` for records missing the target their category needs.
    pub fn playback(&self) -> Option<Playback> {
        if self.category.is_youtube() {
            non_empty(self.youtube_id.as_ref()).map(|id| Playback::YouTube {
                id: id.to_string(),
            })
        } else {
            non_empty(self.video_url.as_ref()).map(|url| Playback::External {
                url: url.to_string(),
            })
        }
    }

    pub fn thumbnail(&self) -> Thumbnail<'_> {
        if let Some(data) = non_empty(self.thumbnail_base64.as_ref()) {
            return Thumbnail::Embedded(data);
        }

        match non_empty(Some(&self.thumbnail_url)) {
            Some(url) if is_embedded_image(url) => Thumbnail::Embedded(url),
            Some(url) => Thumbnail::External(url),
            None => Thumbnail::Placeholder,
        }
    }

    /// An external thumbnail link remains if the embedded copy is dropped.
    pub fn has_fallback_thumbnail(&self) -> bool {
        matches!(non_empty(Some(&self.thumbnail_url)), Some(url) if !is_embedded_image(url))
    }
}

/// Result of a write that may have had to shed the embedded thumbnail.
#[derive(Debug, Clone, PartialEq)]
pub enum Persisted<T> {
    Complete(T),
    /// Saved, but only with the thumbnail link; the embedded image did not fit.
    WithoutEmbeddedImage(T),
}

impl<T> Persisted<T> {
    pub fn is_degraded(&self) -> bool {
        matches!(self, Persisted::WithoutEmbeddedImage(_))
    }

    pub fn get(&self) -> &T {
        match self {
            Persisted::Complete(value) | Persisted::WithoutEmbeddedImage(value) => value,
        }
    }

    #[cfg(test)]
    pub fn into_inner(self) -> T {
        match self {
            Persisted::Complete(value) | Persisted::WithoutEmbeddedImage(value) => value,
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("{0} is required")]
    MissingField(&'static str),

    #[error("{category} videos need a {expected}")]
    PlaybackMismatch {
        category: Category,
        expected: &'static str,
    },

    #[error("invalid Google Drive video URL '{0}', provide a sharing link")]
    InvalidVideoUrl(String),

    #[error("a thumbnail image or thumbnail URL is required")]
    MissingThumbnail,

    #[error("'{0}' is neither an embedded image nor an absolute URL")]
    InvalidImageReference(String),
}

fn require(field: &'static str, value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::MissingField(field));
    }
    Ok(())
}

fn expected_target(category: Category) -> &'static str {
    if category.is_youtube() {
        "YouTube video id"
    } else {
        "video URL"
    }
}

fn validate_embedded(data: Option<&String>) -> Result<(), ValidationError> {
    match non_empty(data) {
        Some(data) if !is_embedded_image(data) => {
            Err(ValidationError::InvalidImageReference(data.to_string()))
        }
        _ => Ok(()),
    }
}

fn validate_playback(category: Category, playback: &Playback) -> Result<(), ValidationError> {
    if !playback.matches(category) {
        return Err(ValidationError::PlaybackMismatch {
            category,
            expected: expected_target(category),
        });
    }

    match playback {
        Playback::YouTube { id } => require("YouTube video id", id),
        Playback::External { url } => {
            require("video URL", url)?;
            if extract_file_id(url).is_none() {
                return Err(ValidationError::InvalidVideoUrl(url.clone()));
            }
            Ok(())
        }
    }
}

/// Input for a new portfolio entry.
#[derive(Debug, Clone)]
pub struct NewVideo {
    pub title: String,
    pub description: String,
    pub duration: String,
    pub resolution: String,
    pub category: Category,
    pub playback: Playback,
    pub thumbnail_url: Option<String>,
    pub thumbnail_embedded: Option<String>,
}

impl NewVideo {
    pub fn validate(&self) -> Result<(), ValidationError> {
        require("title", &self.title)?;
        require("description", &self.description)?;
        require("duration", &self.duration)?;
        require("resolution", &self.resolution)?;
        validate_playback(self.category, &self.playback)?;
        validate_embedded(self.thumbnail_embedded.as_ref())?;

        if non_empty(self.thumbnail_url.as_ref()).is_none()
            && non_empty(self.thumbnail_embedded.as_ref()).is_none()
        {
            return Err(ValidationError::MissingThumbnail);
        }

        Ok(())
    }

    /// Assigns a fresh id and timestamp.
    pub fn into_record(self) -> VideoRecord {
        let (video_url, youtube_id) = match self.playback {
            Playback::YouTube { id } => (None, Some(id)),
            Playback::External { url } => (Some(url), None),
        };

        VideoRecord {
            id: Uuid::new_v4().to_string(),
            title: self.title,
            description: self.description,
            duration: self.duration,
            resolution: self.resolution,
            category: self.category,
            date_added: Utc::now(),
            thumbnail_url: self.thumbnail_url.unwrap_or_default(),
            thumbnail_base64: self.thumbnail_embedded.filter(|data| !data.is_empty()),
            video_url,
            youtube_id,
        }
    }
}

/// Partial edit of an existing entry. `id` and `date_added` are never touched.
#[derive(Debug, Clone, Default)]
pub struct VideoPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub duration: Option<String>,
    pub resolution: Option<String>,
    pub category: Option<Category>,
    pub playback: Option<Playback>,
    pub thumbnail_url: Option<String>,
    pub thumbnail_embedded: Option<String>,
}

impl VideoPatch {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.duration.is_none()
            && self.resolution.is_none()
            && self.category.is_none()
            && self.playback.is_none()
            && self.thumbnail_url.is_none()
            && self.thumbnail_embedded.is_none()
    }

    /// Checks the patch against the record it will be applied to.
    pub fn validate(&self, current: &VideoRecord) -> Result<(), ValidationError> {
        let fields = [
            ("title", &self.title),
            ("description", &self.description),
            ("duration", &self.duration),
            ("resolution", &self.resolution),
        ];
        for (field, value) in fields {
            if let Some(value) = value {
                require(field, value)?;
            }
        }

        let category = self.category.unwrap_or(current.category);
        match &self.playback {
            Some(playback) => validate_playback(category, playback)?,
            None if category.is_youtube() != current.category.is_youtube() => {
                return Err(ValidationError::PlaybackMismatch {
                    category,
                    expected: expected_target(category),
                });
            }
            None => {}
        }

        if self.thumbnail_embedded.is_none() && self.thumbnail_url.is_none() {
            return Ok(());
        }
        validate_embedded(self.thumbnail_embedded.as_ref())?;

        // The edit must leave something to show.
        let mut edited = current.clone();
        apply_thumbnail(
            self.thumbnail_embedded.clone(),
            self.thumbnail_url.clone(),
            &mut edited,
        );
        if edited.thumbnail() == Thumbnail::Placeholder {
            return Err(ValidationError::MissingThumbnail);
        }

        Ok(())
    }

    pub fn apply(self, record: &mut VideoRecord) {
        if let Some(title) = self.title {
            record.title = title;
        }
        if let Some(description) = self.description {
            record.description = description;
        }
        if let Some(duration) = self.duration {
            record.duration = duration;
        }
        if let Some(resolution) = self.resolution {
            record.resolution = resolution;
        }
        if let Some(category) = self.category {
            record.category = category;
        }

        match self.playback {
            Some(Playback::YouTube { id }) => {
                record.youtube_id = Some(id);
                record.video_url = None;
            }
            Some(Playback::External { url }) => {
                record.video_url = Some(url);
                record.youtube_id = None;
            }
            None => {}
        }

        apply_thumbnail(self.thumbnail_embedded, self.thumbnail_url, record);
    }
}

/// A new embedded image alone replaces the link; a new link alone drops the
/// embedded copy.
fn apply_thumbnail(embedded: Option<String>, url: Option<String>, record: &mut VideoRecord) {
    match (embedded, url) {
        (Some(data), Some(url)) => {
            record.thumbnail_base64 = Some(data);
            record.thumbnail_url = url;
        }
        (Some(data), None) => {
            record.thumbnail_base64 = Some(data);
            record.thumbnail_url.clear();
        }
        (None, Some(url)) => {
            record.thumbnail_base64 = None;
            record.thumbnail_url = url;
        }
        (None, None) => {}
    }
}
