//! Logo watermark compositing.

use std::path::Path;

use image::imageops::{self, FilterType};
use image::DynamicImage;

use crate::error::Result;
use crate::preprocess::encode_png;

/// Images narrower or shorter than this are returned untouched.
pub const MIN_WATERMARK_DIMENSION: u32 = 100;

/// Logo width as a fraction of the image's shorter side.
const LOGO_SCALE: f64 = 0.10;
/// Padding as a fraction of the shorter side, never below `MIN_PADDING`.
const PADDING_SCALE: f64 = 0.02;
const MIN_PADDING: u32 = 8;

/// Where and how large the logo lands on an image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Placement {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl Placement {
    /// Bottom-right placement for a `logo_width`×`logo_height` logo on a
    /// `width`×`height` image, or `None` if the image is too small.
    pub fn compute(width: u32, height: u32, logo_width: u32, logo_height: u32) -> Option<Self> {
        if width < MIN_WATERMARK_DIMENSION || height < MIN_WATERMARK_DIMENSION {
            return None;
        }
        if logo_width == 0 || logo_height == 0 {
            return None;
        }

        let shorter = f64::from(width.min(height));
        let target_width = ((shorter * LOGO_SCALE).round() as u32).clamp(1, width);
        let aspect = f64::from(logo_height) / f64::from(logo_width);
        let target_height = ((f64::from(target_width) * aspect).round() as u32).clamp(1, height);
        let padding = ((shorter * PADDING_SCALE).round() as u32).max(MIN_PADDING);

        Some(Self {
            x: width.saturating_sub(target_width + padding),
            y: height.saturating_sub(target_height + padding),
            width: target_width,
            height: target_height,
        })
    }
}

/// A logo ready to be stamped onto generated images.
#[derive(Debug, Clone)]
pub struct Watermark {
    logo: DynamicImage,
}

impl Watermark {
    /// Load the logo from encoded bytes (PNG recommended for transparency).
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        Ok(Self {
            logo: image::load_from_memory(bytes)?,
        })
    }

    /// Load the logo from a file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let bytes = std::fs::read(path)?;
        Self::from_bytes(&bytes)
    }

    /// Logo dimensions.
    pub fn logo_size(&self) -> (u32, u32) {
        (self.logo.width(), self.logo.height())
    }

    /// Stamp the logo bottom-right and return PNG bytes.
    ///
    /// Images under 100×100 and anything that fails to decode or encode come
    /// back unchanged.
    pub fn apply(&self, bytes: &[u8]) -> Vec<u8> {
        match self.try_apply(bytes) {
            Ok(Some(stamped)) => stamped,
            Ok(None) => bytes.to_vec(),
            Err(e) => {
                tracing::warn!(error = %e, "Watermark failed, keeping original image");
                bytes.to_vec()
            }
        }
    }

    /// Like [`apply`](Self::apply) but reports skips and failures.
    pub fn try_apply(&self, bytes: &[u8]) -> Result<Option<Vec<u8>>> {
        let mut base = image::load_from_memory(bytes)?.to_rgba8();
        let (logo_width, logo_height) = self.logo_size();

        let Some(placement) = Placement::compute(base.width(), base.height(), logo_width, logo_height)
        else {
            tracing::debug!(
                width = base.width(),
                height = base.height(),
                "Image too small for watermark"
            );
            return Ok(None);
        };

        let logo = self
            .logo
            .resize_exact(placement.width, placement.height, FilterType::Lanczos3)
            .to_rgba8();
        imageops::overlay(&mut base, &logo, i64::from(placement.x), i64::from(placement.y));

        encode_png(&DynamicImage::ImageRgba8(base)).map(Some)
    }
}
