//! Source photo preparation.

use std::io::Cursor;

use image::imageops::FilterType;
use image::{DynamicImage, ImageFormat};

use crate::error::Result;

/// Longest side sent to the image model.
pub const DEFAULT_MAX_DIMENSION: u32 = 1024;

const UNSHARPEN_SIGMA: f32 = 0.8;
const UNSHARPEN_THRESHOLD: i32 = 2;

/// Downscale so the longer side is at most `max_dimension`, sharpen lightly
/// and re-encode as PNG. Smaller images keep their size.
pub fn prepare_photo(bytes: &[u8], max_dimension: u32) -> Result<Vec<u8>> {
    let image = image::load_from_memory(bytes)?;
    let (width, height) = (image.width(), image.height());

    let image = if width.max(height) > max_dimension {
        image.resize(max_dimension, max_dimension, FilterType::Lanczos3)
    } else {
        image
    };

    let image = image.unsharpen(UNSHARPEN_SIGMA, UNSHARPEN_THRESHOLD);

    tracing::debug!(
        from_width = width,
        from_height = height,
        width = image.width(),
        height = image.height(),
        "Prepared photo"
    );

    encode_png(&DynamicImage::ImageRgba8(image.to_rgba8()))
}

pub(crate) fn encode_png(image: &DynamicImage) -> Result<Vec<u8>> {
    let mut buf = Cursor::new(Vec::new());
    image.write_to(&mut buf, ImageFormat::Png)?;
    Ok(buf.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{png, solid_image};
    use crate::ImageToolError;

    fn dimensions(bytes: &[u8]) -> (u32, u32) {
        let image = image::load_from_memory(bytes).unwrap();
        (image.width(), image.height())
    }

    #[test]
    fn test_downscales_long_side() {
        let source = png(2048, 1024, [10, 20, 30, 255]);
        let prepared = prepare_photo(&source, DEFAULT_MAX_DIMENSION).unwrap();
        assert_eq!(dimensions(&prepared), (1024, 512));
    }

    #[test]
    fn test_keeps_small_images() {
        let source = png(300, 200, [10, 20, 30, 255]);
        let prepared = prepare_photo(&source, DEFAULT_MAX_DIMENSION).unwrap();
        assert_eq!(dimensions(&prepared), (300, 200));
    }

    #[test]
    fn test_output_is_png() {
        let source = solid_image(64, 64, [200, 100, 50, 255], ImageFormat::Jpeg);
        let prepared = prepare_photo(&source, 32).unwrap();
        assert_eq!(image::guess_format(&prepared).unwrap(), ImageFormat::Png);
        assert_eq!(dimensions(&prepared), (32, 32));
    }

    #[test]
    fn test_rejects_garbage() {
        let result = prepare_photo(b"definitely not an image", DEFAULT_MAX_DIMENSION);
        assert!(matches!(result, Err(ImageToolError::Image(_))));
    }
}
