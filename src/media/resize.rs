use super::types::EncoderSettings;
use super::utils::to_data_url;
use anyhow::{Context, Result};
use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::ImageReader;
use std::io::Cursor;
use std::path::Path;
use tracing::{debug, info, warn};

/// Scales `(width, height)` down to fit the box, keeping the aspect ratio.
/// Never scales up.
pub fn target_dimensions(
    width: u32,
    height: u32,
    max_width: u32,
    max_height: u32,
) -> (u32, u32) {
    let (mut w, mut h) = (width as f64, height as f64);

    if w > max_width as f64 {
        h = (h * max_width as f64 / w).round();
        w = max_width as f64;
    }

    if h > max_height as f64 {
        w = (w * max_height as f64 / h).round();
        h = max_height as f64;
    }

    ((w as u32).max(1), (h as u32).max(1))
}

/// Turns uploaded pictures into size-capped embedded JPEG strings.
#[derive(Debug, Clone, Copy, Default)]
pub struct ImageEncoder {
    settings: EncoderSettings,
}

impl ImageEncoder {
    pub fn new(settings: EncoderSettings) -> Self {
        Self { settings }
    }

    /// Returns `Ok(None)` when the re-encoded image is still too large to
    /// embed and the caller has to use an external link instead.
    pub fn encode(&self, data: &[u8], filename: &str) -> Result<Option<String>> {
        let img = ImageReader::new(Cursor::new(data))
            .with_guessed_format()
            .context("Failed to read image")?
            .decode()
            .with_context(|| format!("Failed to decode image {}", filename))?;

        let (width, height) = target_dimensions(
            img.width(),
            img.height(),
            self.settings.max_width,
            self.settings.max_height,
        );

        let resized = if (width, height) == (img.width(), img.height()) {
            img
        } else {
            debug!(
                "Resizing {} from {}x{} to {}x{}",
                filename,
                img.width(),
                img.height(),
                width,
                height
            );
            img.resize_exact(width, height, FilterType::Triangle)
        };

        let mut jpeg = Vec::new();
        JpegEncoder::new_with_quality(&mut jpeg, self.settings.quality)
            .encode_image(&resized.to_rgb8())
            .with_context(|| format!("Failed to encode {} as JPEG", filename))?;

        let embedded = to_data_url("image/jpeg", &jpeg);

        if embedded.len() > self.settings.max_embedded_len {
            warn!(
                "Image {} too large to embed ({} > {} chars), use a link instead",
                filename,
                embedded.len(),
                self.settings.max_embedded_len
            );
            return Ok(None);
        }

        info!(
            "Encoded {} ({} bytes) as {}x{} embedded image ({} chars)",
            filename,
            data.len(),
            width,
            height,
            embedded.len()
        );

        Ok(Some(embedded))
    }

    pub async fn encode_file(&self, path: &Path) -> Result<Option<String>> {
        let data = tokio::fs::read(path)
            .await
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let filename = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());

        let encoder = *self;
        tokio::task::spawn_blocking(move || encoder.encode(&data, &filename))
            .await
            .context("Failed to join image encode task")?
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::media::utils::{from_data_url, is_embedded_image};
    use image::{ImageFormat, Rgb, RgbImage};

    fn png_bytes(img: &RgbImage) -> Vec<u8> {
        let mut out = Cursor::new(Vec::new());
        img.write_to(&mut out, ImageFormat::Png).unwrap();
        out.into_inner()
    }

    fn solid_png(width: u32, height: u32) -> Vec<u8> {
        png_bytes(&RgbImage::from_pixel(width, height, Rgb([40, 90, 160])))
    }

    fn noise_png(width: u32, height: u32) -> Vec<u8> {
        let mut state: u32 = 0x2545_f491;
        let img = RgbImage::from_fn(width, height, |_, _| {
            let mut next = || {
                state ^= state << 13;
                state ^= state >> 17;
                state ^= state << 5;
                (state & 0xff) as u8
            };
            Rgb([next(), next(), next()])
        });
        png_bytes(&img)
    }

    #[test]
    fn test_target_dimensions_within_box() {
        assert_eq!(target_dimensions(640, 480, 800, 600), (640, 480));
        assert_eq!(target_dimensions(800, 600, 800, 600), (800, 600));
    }

    #[test]
    fn test_target_dimensions_wide_and_tall() {
        assert_eq!(target_dimensions(1600, 600, 800, 600), (800, 300));
        assert_eq!(target_dimensions(600, 1200, 800, 600), (300, 600));
        assert_eq!(target_dimensions(4000, 3000, 800, 600), (800, 600));
    }

    #[test]
    fn test_target_dimensions_never_zero() {
        assert_eq!(target_dimensions(10_000, 1, 800, 600), (800, 1));
    }

    #[test]
    fn test_encode_small_image_is_embedded() {
        let encoder = ImageEncoder::default();
        let embedded = encoder.encode(&solid_png(32, 32), "small.png").unwrap();

        let embedded = embedded.expect("small image should embed");
        assert!(is_embedded_image(&embedded));
        assert!(embedded.starts_with("data:image/jpeg;base64,"));
    }

    #[test]
    fn test_encode_downscales_large_image() {
        let encoder = ImageEncoder::default();
        let embedded = encoder
            .encode(&solid_png(1600, 600), "banner.png")
            .unwrap()
            .unwrap();

        let (mime, bytes) = from_data_url(&embedded).unwrap();
        assert_eq!(mime, "image/jpeg");
        let decoded = image::load_from_memory(&bytes).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (800, 300));
    }

    #[test]
    fn test_encode_oversized_returns_none() {
        let encoder = ImageEncoder::new(EncoderSettings {
            max_embedded_len: 1_000,
            ..EncoderSettings::default()
        });
        let result = encoder.encode(&noise_png(200, 200), "noise.png").unwrap();
        assert!(result.is_none());
    }

    #[test]
    fn test_encode_noisy_photo_exceeds_default_ceiling() {
        let encoder = ImageEncoder::default();
        let result = encoder.encode(&noise_png(800, 600), "noise.png").unwrap();
        assert!(result.is_none());
    }

    #[test]
    fn test_encode_rejects_non_image() {
        let encoder = ImageEncoder::default();
        assert!(encoder.encode(b"definitely not an image", "notes.txt").is_err());
    }

    #[tokio::test]
    async fn test_encode_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("thumb.png");
        std::fs::write(&path, solid_png(64, 48)).unwrap();

        let embedded = ImageEncoder::default().encode_file(&path).await.unwrap();
        assert!(embedded.is_some_and(|value| is_embedded_image(&value)));
    }
}
