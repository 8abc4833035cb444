#![warn(missing_docs)]
//! # fourgrid-core
//!
//! ## Purpose
//! Defines the pure data model used across the `fourgrid` workspace.
//!
//! ## Responsibilities
//! - Represent uploaded multipart parts and decoded source bitmaps.
//! - Validate that a submission carries exactly four image parts.
//! - Model the 2x2 grid layout with derived cell size and quadrant origins.
//! - Encode/decode the structured collage response payload for delivery.
//!
//! ## Data flow
//! Inbound request handling produces [`UploadedPart`] values.
//! [`select_image_parts`] admits exactly four of them, decoding yields
//! [`SourceImage`] bitmaps, and the composed result is delivered either as an
//! attachment or packaged into [`CollageResponsePayload`].
//!
//! ## Ownership and lifetimes
//! Parts, bitmaps, and payloads own their backing buffers (`Vec<u8>`) to avoid
//! hidden borrow/lifetime coupling between request-handling stages.
//!
//! ## Error model
//! Validation failures (wrong part count, missing field, shape mismatch,
//! unusable layout) return [`CoreError`] variants with caller-actionable
//! categorization; request-shape variants map to client errors.
//!
//! ## Example
//! ```rust
//! use fourgrid_core::{LayoutConfig, UploadedPart, select_image_parts, IMAGE_FIELD_NAME};
//!
//! let parts: Vec<UploadedPart> = (0..4)
//!     .map(|index| UploadedPart::new(IMAGE_FIELD_NAME, format!("{index}.jpg"), vec![0xFF]))
//!     .collect();
//! assert_eq!(select_image_parts(&parts).unwrap().len(), 4);
//!
//! let layout = LayoutConfig::new(1280, 20).unwrap();
//! assert_eq!(layout.cell_size(), 610);
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Canonical schema tag for v1 collage response payloads.
pub const SCHEMA_VERSION_V1: &str = "v1";

/// Multipart field name that carries the uploaded pictures.
pub const IMAGE_FIELD_NAME: &str = "files";

/// Number of pictures required for one collage.
pub const REQUIRED_IMAGE_COUNT: usize = 4;

/// One decoded multipart form part from an inbound submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedPart {
    /// Form field name the part arrived under.
    pub field_name: String,
    /// Client-supplied file name.
    pub file_name: String,
    /// Raw uploaded bytes, not yet decoded as an image.
    pub bytes: Vec<u8>,
}

impl UploadedPart {
    /// Constructs an uploaded part.
    pub fn new(
        field_name: impl Into<String>,
        file_name: impl Into<String>,
        bytes: Vec<u8>,
    ) -> Self {
        Self {
            field_name: field_name.into(),
            file_name: file_name.into(),
            bytes,
        }
    }
}

/// Selects the picture-carrying parts of one submission.
///
/// # Semantics
/// Returned parts keep their arrival order; arrival order is the quadrant
/// order used by composition.
///
/// # Errors
/// Returns [`CoreError::MissingImageField`] when no part uses
/// [`IMAGE_FIELD_NAME`].
/// Returns [`CoreError::WrongImageCount`] when the field carries any count
/// other than [`REQUIRED_IMAGE_COUNT`]. No image processing should be
/// attempted after either failure.
pub fn select_image_parts(parts: &[UploadedPart]) -> Result<Vec<&UploadedPart>, CoreError> {
    let images: Vec<&UploadedPart> = parts
        .iter()
        .filter(|part| part.field_name == IMAGE_FIELD_NAME)
        .collect();

    if images.is_empty() {
        return Err(CoreError::MissingImageField);
    }

    if images.len() != REQUIRED_IMAGE_COUNT {
        return Err(CoreError::WrongImageCount {
            expected: REQUIRED_IMAGE_COUNT,
            actual: images.len(),
        });
    }

    Ok(images)
}

/// Represents one decoded source picture.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceImage {
    /// Bitmap width in pixels.
    pub width: u32,
    /// Bitmap height in pixels.
    pub height: u32,
    /// Raw RGBA pixel buffer (`width * height * 4` bytes).
    pub rgba: Vec<u8>,
}

impl SourceImage {
    /// Constructs a validated source bitmap.
    ///
    /// # Errors
    /// Returns [`CoreError::InvalidImageShape`] when the pixel buffer length
    /// is not exactly `width * height * 4`.
    pub fn new(width: u32, height: u32, rgba: Vec<u8>) -> Result<Self, CoreError> {
        let expected_len = required_rgba_len(width, height)?;
        if rgba.len() != expected_len {
            return Err(CoreError::InvalidImageShape {
                expected: expected_len,
                actual: rgba.len(),
            });
        }

        Ok(Self {
            width,
            height,
            rgba,
        })
    }
}

/// Named 2x2 grid layout configuration.
///
/// Cell size and quadrant origins are derived here rather than scattered as
/// literals through the composer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LayoutConfig {
    canvas_size: u32,
    border: u32,
}

impl LayoutConfig {
    /// Creates a validated layout.
    ///
    /// # Errors
    /// Returns [`CoreError::InvalidLayout`] when the canvas cannot host two
    /// cells and three borders per axis, or when the remaining span does not
    /// split into two equal cells.
    pub fn new(canvas_size: u32, border: u32) -> Result<Self, CoreError> {
        let borders = border
            .checked_mul(3)
            .ok_or_else(|| CoreError::InvalidLayout("border span overflows".to_string()))?;

        if borders >= canvas_size {
            return Err(CoreError::InvalidLayout(format!(
                "canvas {canvas_size} cannot fit three borders of {border}"
            )));
        }

        if (canvas_size - borders) % 2 != 0 {
            return Err(CoreError::InvalidLayout(format!(
                "canvas {canvas_size} minus three borders of {border} must split into two equal cells"
            )));
        }

        Ok(Self {
            canvas_size,
            border,
        })
    }

    /// Returns the square canvas edge length in pixels.
    pub fn canvas_size(&self) -> u32 {
        self.canvas_size
    }

    /// Returns the uniform border thickness in pixels.
    pub fn border(&self) -> u32 {
        self.border
    }

    /// Returns the square cell edge length: `(canvas - 3 * border) / 2`.
    pub fn cell_size(&self) -> u32 {
        (self.canvas_size - self.border * 3) / 2
    }

    /// Returns the quadrant origin table in input order.
    ///
    /// # Semantics
    /// The mapping is a fixed lookup, never inferred: input 0 is top-left,
    /// input 1 top-right, input 2 bottom-left, input 3 bottom-right.
    pub fn quadrant_origins(&self) -> [(u32, u32); REQUIRED_IMAGE_COUNT] {
        let near = self.border;
        let far = self.border * 2 + self.cell_size();

        [(near, near), (far, near), (near, far), (far, far)]
    }
}

impl Default for LayoutConfig {
    /// Returns the stock 1280px canvas with 20px borders (610px cells).
    fn default() -> Self {
        Self {
            canvas_size: 1280,
            border: 20,
        }
    }
}

/// Public URLs reported by the hosting collaborator.
///
/// Both fields are `None` whenever the collaborator call failed; the
/// submission still completes with this degraded value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostedLinks {
    /// Browser-facing viewer page URL.
    pub viewer_url: Option<String>,
    /// Direct image URL.
    pub direct_url: Option<String>,
}

impl HostedLinks {
    /// Returns the degraded value used after a collaborator failure.
    pub fn absent() -> Self {
        Self::default()
    }

    /// Returns `true` when both URLs are present.
    pub fn is_complete(&self) -> bool {
        self.viewer_url.is_some() && self.direct_url.is_some()
    }
}

/// Structured delivery payload returned instead of raw attachment bytes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollageResponsePayload {
    /// Payload schema version for client contract negotiation.
    pub schema_version: String,
    /// Hosting collaborator URLs; explicitly absent on collaborator failure.
    pub links: HostedLinks,
    /// Composed canvas width in pixels.
    pub width: u32,
    /// Composed canvas height in pixels.
    pub height: u32,
    /// MIME type of the encoded artifact.
    pub content_type: String,
    /// Hex SHA-256 checksum of the encoded artifact bytes.
    pub checksum: String,
    /// Optional base64 copy of the encoded artifact.
    pub image_base64: Option<String>,
}

impl CollageResponsePayload {
    /// Serializes the payload to compact JSON bytes.
    ///
    /// # Errors
    /// Returns [`CoreError::Codec`] when JSON serialization fails.
    pub fn to_json_bytes(&self) -> Result<Vec<u8>, CoreError> {
        serde_json::to_vec(self).map_err(CoreError::Codec)
    }

    /// Deserializes a payload from JSON bytes.
    ///
    /// # Errors
    /// Returns [`CoreError::Codec`] when JSON decoding fails.
    pub fn from_json_bytes(raw: &[u8]) -> Result<Self, CoreError> {
        serde_json::from_slice(raw).map_err(CoreError::Codec)
    }
}

/// Error type for core domain validation and codec failures.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Submission has no part under the image field name.
    #[error("no '{IMAGE_FIELD_NAME}' field found in submission")]
    MissingImageField,
    /// Submission carries the wrong number of pictures.
    #[error("exactly {expected} images are required, got {actual}")]
    WrongImageCount {
        /// Required picture count.
        expected: usize,
        /// Actual picture count.
        actual: usize,
    },
    /// Bitmap buffer shape does not match declared geometry.
    #[error("invalid image shape: expected {expected} bytes, got {actual}")]
    InvalidImageShape {
        /// Expected RGBA byte count.
        expected: usize,
        /// Actual RGBA byte count.
        actual: usize,
    },
    /// Layout parameters cannot produce a 2x2 grid.
    #[error("invalid layout: {0}")]
    InvalidLayout(String),
    /// Geometry arithmetic left the representable range.
    #[error("geometry invariant violation: {0}")]
    InvariantViolation(String),
    /// JSON encoding/decoding error.
    #[error("payload codec failure: {0}")]
    Codec(#[from] serde_json::Error),
}

impl CoreError {
    /// Returns `true` when the error describes a malformed client submission.
    pub fn is_request_shape(&self) -> bool {
        matches!(
            self,
            Self::MissingImageField | Self::WrongImageCount { .. }
        )
    }
}

fn required_rgba_len(width: u32, height: u32) -> Result<usize, CoreError> {
    let pixels = (width as usize)
        .checked_mul(height as usize)
        .ok_or_else(|| CoreError::InvariantViolation("image dimensions overflow".to_string()))?;

    pixels
        .checked_mul(4)
        .ok_or_else(|| CoreError::InvariantViolation("rgba length overflow".to_string()))
}
