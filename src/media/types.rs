use serde::Deserialize;

/// Parameters for turning an uploaded picture into an embedded image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct EncoderSettings {
    pub max_width: u32,
    pub max_height: u32,
    /// JPEG quality, 1-100.
    pub quality: u8,
    /// Longest embedded string accepted, in characters.
    pub max_embedded_len: usize,
}

impl Default for EncoderSettings {
    fn default() -> Self {
        Self {
            max_width: 800,
            max_height: 600,
            quality: 70,
            max_embedded_len: 100 * 1024,
        }
    }
}

/// Upload folders the admin screens point the operator at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriveFolder {
    Thumbnails,
    Videos,
}

impl DriveFolder {
    pub fn id(&self) -> &'static str {
        match self {
            DriveFolder::Thumbnails => "1bsyKTxlk-IZxCZeuPeJSJ8hwQBQNHIuQ",
            DriveFolder::Videos => "1CgmNzIphGygCJcCJqVWzQ_HaZUQ7mfjv",
        }
    }
}
