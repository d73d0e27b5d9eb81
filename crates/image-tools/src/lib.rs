//! Image helpers used around generation.
//!
//! - [`decode_image_payload`] - base64 or data-URL uploads to bytes
//! - [`prepare_photo`] - downscale and sharpen a source photo, re-encode as PNG
//! - [`Watermark`] - composite the service logo onto a finished image

mod data_url;
mod error;
mod preprocess;
mod watermark;

pub use data_url::{decode_image_payload, sniff_mime_type, to_data_url, DecodedImage};
pub use error::{ImageToolError, Result};
pub use preprocess::{prepare_photo, DEFAULT_MAX_DIMENSION};
pub use watermark::{Placement, Watermark, MIN_WATERMARK_DIMENSION};

#[cfg(test)]
pub(crate) mod test_support {
    use std::io::Cursor;

    use image::{DynamicImage, ImageFormat, Rgba, RgbaImage};

    /// Encode a solid-color image.
    pub fn solid_image(width: u32, height: u32, color: [u8; 4], format: ImageFormat) -> Vec<u8> {
        let image = DynamicImage::ImageRgba8(RgbaImage::from_pixel(width, height, Rgba(color)));
        let image = if format == ImageFormat::Jpeg {
            DynamicImage::ImageRgb8(image.to_rgb8())
        } else {
            image
        };
        let mut buf = Cursor::new(Vec::new());
        image.write_to(&mut buf, format).unwrap();
        buf.into_inner()
    }

    pub fn png(width: u32, height: u32, color: [u8; 4]) -> Vec<u8> {
        solid_image(width, height, color, ImageFormat::Png)
    }
}
