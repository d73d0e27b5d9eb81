//! Base64 and data-URL image payloads.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use image::ImageFormat;

use crate::error::{ImageToolError, Result};

/// Raw image bytes recovered from an upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedImage {
    pub bytes: Vec<u8>,
    /// MIME type sniffed from the bytes, not the one the client claimed.
    pub mime_type: &'static str,
}

/// Decode raw base64 or a `data:<mime>;base64,<data>` URL.
///
/// Whitespace inside the base64 body is ignored. The decoded bytes must be a
/// PNG, JPEG, WebP or GIF image.
pub fn decode_image_payload(payload: &str) -> Result<DecodedImage> {
    let payload = payload.trim();
    if payload.is_empty() {
        return Err(ImageToolError::Empty);
    }

    let body = match payload.strip_prefix("data:") {
        Some(rest) => {
            let (header, body) = rest
                .split_once(',')
                .ok_or_else(|| ImageToolError::InvalidDataUrl("missing ','".to_string()))?;
            if !header.ends_with(";base64") {
                return Err(ImageToolError::InvalidDataUrl(
                    "only base64 data URLs are supported".to_string(),
                ));
            }
            if !header.starts_with("image/") {
                return Err(ImageToolError::InvalidDataUrl(format!(
                    "not an image: {}",
                    header.trim_end_matches(";base64")
                )));
            }
            body
        }
        None => payload,
    };

    let cleaned: String = body.chars().filter(|c| !c.is_whitespace()).collect();
    if cleaned.is_empty() {
        return Err(ImageToolError::Empty);
    }

    let bytes = BASE64.decode(cleaned.as_bytes())?;
    let mime_type = sniff_mime_type(&bytes)?;

    Ok(DecodedImage { bytes, mime_type })
}

/// Encode bytes as a `data:` URL.
pub fn to_data_url(bytes: &[u8], mime_type: &str) -> String {
    format!("data:{};base64,{}", mime_type, BASE64.encode(bytes))
}

/// MIME type of encoded image bytes, judged from their magic number.
pub fn sniff_mime_type(bytes: &[u8]) -> Result<&'static str> {
    match image::guess_format(bytes) {
        Ok(ImageFormat::Png) => Ok("image/png"),
        Ok(ImageFormat::Jpeg) => Ok("image/jpeg"),
        Ok(ImageFormat::WebP) => Ok("image/webp"),
        Ok(ImageFormat::Gif) => Ok("image/gif"),
        _ => Err(ImageToolError::UnsupportedFormat),
    }
}
