//! Artwork normalization: size check, Lanczos downscale, baseline JPEG re-encode.

use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::{ImageReader, RgbImage};
use std::io::Cursor;

use crate::config::ArtworkConfig;
use crate::error::{PipelineError, PipelineResult};
use crate::types::{BoundingBox, EncodingProfile, NormalizedArtwork};

/// Decides whether artwork is oversized and shrinks it when it is.
#[derive(Debug, Clone)]
pub struct ImageNormalizer {
    bbox: BoundingBox,
    profile: EncodingProfile,
}

impl ImageNormalizer {
    /// Create a normalizer from the artwork section of the config.
    pub fn new(config: &ArtworkConfig) -> Self {
        Self::with_limits(config.bounding_box(), config.encoding_profile())
    }

    pub fn with_limits(bbox: BoundingBox, profile: EncodingProfile) -> Self {
        Self { bbox, profile }
    }

    /// Read the pixel dimensions of an encoded image without decoding pixels.
    pub fn dimensions(bytes: &[u8]) -> PipelineResult<(u32, u32)> {
        let reader = ImageReader::new(Cursor::new(bytes))
            .with_guessed_format()
            .map_err(|e| PipelineError::ImageDecode(format!("Cannot read image: {}", e)))?;
        if reader.format().is_none() {
            return Err(PipelineError::ImageDecode(
                "Unrecognized image format".to_string(),
            ));
        }
        reader
            .into_dimensions()
            .map_err(|e| PipelineError::ImageDecode(e.to_string()))
    }

    /// Strict size check: `Ok(true)` if the artwork exceeds the bounding box
    /// on either axis, an error if it cannot be identified.
    pub fn check(&self, bytes: &[u8]) -> PipelineResult<bool> {
        let (width, height) = Self::dimensions(bytes)?;
        Ok(!self.bbox.contains(width, height))
    }

    /// Whether the artwork exceeds the bounding box on either axis.
    ///
    /// Unidentifiable or undecodable artwork is reported as not oversized
    /// and left alone.
    pub fn is_oversized(&self, bytes: &[u8]) -> bool {
        match self.check(bytes) {
            Ok(oversized) => oversized,
            Err(e) => {
                tracing::warn!("Could not identify image format for size check: {}", e);
                false
            }
        }
    }

    /// Decode, flatten to RGB, shrink to fit and re-encode as baseline JPEG.
    pub fn normalize(&self, bytes: &[u8]) -> PipelineResult<NormalizedArtwork> {
        let image = ImageReader::new(Cursor::new(bytes))
            .with_guessed_format()
            .map_err(|e| PipelineError::ImageDecode(format!("Cannot read image: {}", e)))?
            .decode()
            .map_err(|e| PipelineError::ImageDecode(e.to_string()))?;

        // Alpha and palette information is dropped here.
        let rgb: RgbImage = image.into_rgb8();
        let original = rgb.dimensions();
        let target = fit_within(original.0, original.1, self.bbox);

        let rgb = if target == original {
            rgb
        } else {
            tracing::debug!(
                "Resizing artwork {}x{} -> {}x{}",
                original.0,
                original.1,
                target.0,
                target.1
            );
            image::imageops::resize(&rgb, target.0, target.1, FilterType::Lanczos3)
        };

        let data = encode_jpeg(&rgb, self.profile)?;
        Ok(NormalizedArtwork {
            data,
            original,
            resized: target,
        })
    }
}

/// Largest size with the same aspect ratio that fits inside `bbox`.
///
/// Never upscales; images already inside the box keep their size. Each side
/// is at least one pixel.
pub fn fit_within(width: u32, height: u32, bbox: BoundingBox) -> (u32, u32) {
    if bbox.contains(width, height) || width == 0 || height == 0 {
        return (width, height);
    }

    let (w, h) = (width as u64, height as u64);
    let (max_w, max_h) = (bbox.max_width as u64, bbox.max_height as u64);

    // Compare w/h against max_w/max_h without floating point.
    if w * max_h >= h * max_w {
        let new_h = ((h * max_w) as f64 / w as f64).round() as u32;
        (bbox.max_width, new_h.clamp(1, bbox.max_height))
    } else {
        let new_w = ((w * max_h) as f64 / h as f64).round() as u32;
        (new_w.clamp(1, bbox.max_width), bbox.max_height)
    }
}

/// Encode RGB pixels as a baseline JPEG.
///
/// The `image` JPEG encoder writes sequential (non-progressive) scans with
/// 1x1 sampling on every component, i.e. 4:4:4.
fn encode_jpeg(image: &RgbImage, profile: EncodingProfile) -> PipelineResult<Vec<u8>> {
    let mut buffer = Vec::new();
    let mut encoder = JpegEncoder::new_with_quality(&mut buffer, profile.quality);
    encoder
        .encode_image(image)
        .map_err(|e| PipelineError::ImageEncode(e.to_string()))?;
    Ok(buffer)
}
