use base64::{engine::general_purpose::STANDARD, Engine as _};

use crate::error::ValidationError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    Gif,
    Png,
    Jpeg,
    Webp,
}

impl ImageFormat {
    /// Sniff the format from magic bytes.
    pub fn detect(bytes: &[u8]) -> Option<Self> {
        if bytes.starts_with(b"GIF87a") || bytes.starts_with(b"GIF89a") {
            Some(ImageFormat::Gif)
        } else if bytes.starts_with(&[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A]) {
            Some(ImageFormat::Png)
        } else if bytes.starts_with(&[0xFF, 0xD8, 0xFF]) {
            Some(ImageFormat::Jpeg)
        } else if bytes.len() >= 12 && &bytes[0..4] == b"RIFF" && &bytes[8..12] == b"WEBP" {
            Some(ImageFormat::Webp)
        } else {
            None
        }
    }
}

/// Validate a fetched chart image and encode it for storage.
///
/// Upstream error pages served with a 2xx status are rejected here instead
/// of replacing a good snapshot.
pub fn encode_chart_image(url: &str, bytes: &[u8]) -> Result<String, ValidationError> {
    if bytes.is_empty() {
        return Err(ValidationError::EmptyPayload {
            url: url.to_string(),
        });
    }

    if ImageFormat::detect(bytes).is_none() {
        return Err(ValidationError::UnrecognisedImage {
            url: url.to_string(),
        });
    }

    Ok(STANDARD.encode(bytes))
}
