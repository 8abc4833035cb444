#![warn(missing_docs)]
//! # fourgrid-compose
//!
//! ## Purpose
//! Composes one bordered 2x2 collage from exactly four decoded pictures.
//!
//! ## Responsibilities
//! - Decode uploaded bytes into validated source bitmaps.
//! - Resize each source to the configured square cell with high-quality
//!   resampling.
//! - Place cells at the fixed quadrant origins on a solid white canvas.
//! - Stamp the bottom-right text watermark (see [`watermark`]).
//! - Encode the finished canvas as JPEG.
//!
//! ## Data flow
//! Uploaded bytes -> [`decode_source`] -> [`compose_collage`] ->
//! [`encode_jpeg`] -> delivery.
//!
//! ## Ownership and lifetimes
//! Collage output owns its byte buffer, enabling downstream delivery and
//! hosting upload without borrowing the source bitmaps.
//!
//! ## Error model
//! Non-four-picture inputs, undecodable blobs, and encoder failures fail with
//! [`ComposeError`]. A decode failure is fatal to the whole submission; no
//! partial collage is ever produced. Font problems are not errors here; the
//! watermark module recovers them internally.

pub mod watermark;

use fourgrid_core::{CoreError, LayoutConfig, REQUIRED_IMAGE_COUNT, SourceImage};
use image::codecs::jpeg::JpegEncoder;
use image::imageops::{self, FilterType};
use image::{ExtendedColorType, ImageBuffer, Rgba, RgbaImage};
use thiserror::Error;

use crate::watermark::WatermarkConfig;

/// MIME type of the encoded collage artifact.
pub const JPEG_CONTENT_TYPE: &str = "image/jpeg";

/// Stock JPEG quality used when callers have no preference.
pub const DEFAULT_JPEG_QUALITY: u8 = 85;

const CANVAS_BACKGROUND: Rgba<u8> = Rgba([255, 255, 255, 255]);

/// Collage canvas produced from one four-picture submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollageImage {
    /// Canvas width in pixels.
    pub width: u32,
    /// Canvas height in pixels.
    pub height: u32,
    /// RGBA bytes in row-major order.
    pub rgba: Vec<u8>,
}

/// Decodes one uploaded blob into a validated source bitmap.
///
/// # Errors
/// Returns [`ComposeError::Decode`] when the bytes are not a decodable image.
/// The caller must fail the whole submission; partial collages are never
/// composed from a mix of decoded and broken inputs.
pub fn decode_source(bytes: &[u8]) -> Result<SourceImage, ComposeError> {
    let decoded = image::load_from_memory(bytes).map_err(ComposeError::Decode)?;
    let rgba = decoded.to_rgba8();
    let (width, height) = rgba.dimensions();

    Ok(SourceImage::new(width, height, rgba.into_raw())?)
}

/// Composes the bordered 2x2 collage with its watermark.
///
/// # Semantics
/// Sources map to quadrants by arrival index through
/// [`LayoutConfig::quadrant_origins`]; each source is resized to the square
/// cell independently, deliberately dropping its aspect ratio.
///
/// # Errors
/// Returns [`ComposeError::InvalidImageCount`] when the input is not exactly
/// four pictures.
pub fn compose_collage(
    sources: &[SourceImage],
    layout: &LayoutConfig,
    watermark: &WatermarkConfig,
) -> Result<CollageImage, ComposeError> {
    if sources.len() != REQUIRED_IMAGE_COUNT {
        return Err(ComposeError::InvalidImageCount {
            expected: REQUIRED_IMAGE_COUNT,
            actual: sources.len(),
        });
    }

    let size = layout.canvas_size();
    let cell = layout.cell_size();
    let mut canvas = RgbaImage::from_pixel(size, size, CANVAS_BACKGROUND);

    for (source, origin) in sources.iter().zip(layout.quadrant_origins()) {
        let bitmap = source_bitmap(source)?;
        let resized = imageops::resize(&bitmap, cell, cell, FilterType::Lanczos3);
        imageops::replace(&mut canvas, &resized, origin.0 as i64, origin.1 as i64);
    }

    watermark::stamp(&mut canvas, watermark);

    Ok(CollageImage {
        width: size,
        height: size,
        rgba: canvas.into_raw(),
    })
}

/// Encodes the collage canvas as a JPEG byte stream.
///
/// # Errors
/// Returns [`ComposeError::Encode`] when the JPEG encoder fails.
pub fn encode_jpeg(collage: &CollageImage, quality: u8) -> Result<Vec<u8>, ComposeError> {
    let rgba: RgbaImage =
        ImageBuffer::from_raw(collage.width, collage.height, collage.rgba.clone())
            .ok_or(ComposeError::SourceBuffer)?;
    let rgb = image::DynamicImage::ImageRgba8(rgba).to_rgb8();

    let mut encoded = Vec::new();
    let mut encoder = JpegEncoder::new_with_quality(&mut encoded, quality);
    encoder
        .encode(
            rgb.as_raw(),
            collage.width,
            collage.height,
            ExtendedColorType::Rgb8,
        )
        .map_err(ComposeError::Encode)?;

    Ok(encoded)
}

fn source_bitmap(source: &SourceImage) -> Result<RgbaImage, ComposeError> {
    ImageBuffer::from_raw(source.width, source.height, source.rgba.clone())
        .ok_or(ComposeError::SourceBuffer)
}

/// Error type for collage composition.
#[derive(Debug, Error)]
pub enum ComposeError {
    /// Input does not contain the required picture count.
    #[error("invalid image count: expected {expected}, got {actual}")]
    InvalidImageCount {
        /// Required picture count.
        expected: usize,
        /// Actual picture count.
        actual: usize,
    },
    /// Uploaded bytes are not a decodable image.
    #[error("image decode failure: {0}")]
    Decode(image::ImageError),
    /// JPEG encoding failed.
    #[error("image encode failure: {0}")]
    Encode(image::ImageError),
    /// Bitmap buffer disagrees with its declared geometry.
    #[error("source buffer does not match declared geometry")]
    SourceBuffer,
    /// Core model validation failure.
    #[error("core error: {0}")]
    Core(#[from] CoreError),
}
