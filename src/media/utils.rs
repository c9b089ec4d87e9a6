use base64::Engine;

/// Every embedded image starts with this; external references never do.
pub const EMBEDDED_IMAGE_PREFIX: &str = "data:image";

pub fn is_embedded_image(value: &str) -> bool {
    value.starts_with(EMBEDDED_IMAGE_PREFIX)
}

/// Wraps raw image bytes as a self-describing `data:` string.
pub fn to_data_url(mime: &str, bytes: &[u8]) -> String {
    let payload = base64::engine::general_purpose::STANDARD.encode(bytes);
    format!("data:{};base64,{}", mime, payload)
}

/// Splits a base64 `data:` string back into its MIME type and bytes.
pub fn from_data_url(value: &str) -> Option<(&str, Vec<u8>)> {
    let rest = value.strip_prefix("data:")?;
    let (header, payload) = rest.split_once(',')?;
    let mime = header.strip_suffix(";base64")?;
    let bytes = base64::engine::general_purpose::STANDARD
        .decode(payload)
        .ok()?;
    Some((mime, bytes))
}

pub fn youtube_watch_url(youtube_id: &str) -> String {
    format!("https://www.youtube.com/watch?v={}", youtube_id)
}
