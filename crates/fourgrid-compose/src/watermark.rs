//! Bottom-right text watermark rendering.
//!
//! Font acquisition is an explicit two-branch step: a preferred TrueType face
//! read from a configured path, or the builtin 8x8 bitmap face when the
//! preferred one is unavailable. The fallback branch cannot fail, so a missing
//! or corrupt font file never aborts a submission.

use std::path::{Path, PathBuf};

use font8x8::{BASIC_FONTS, UnicodeFonts};
use image::{Rgba, RgbaImage};
use rusttype::{Font, Scale, point};

/// Pixel gap between scaled builtin glyphs.
const BUILTIN_GLYPH_DOT: u32 = 8;

/// Watermark text and rendering configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WatermarkConfig {
    /// Text stamped onto the canvas.
    pub text: String,
    /// Fixed pixel font size, independent of layout borders.
    pub font_size: u32,
    /// Distance from the canvas's right and bottom edges.
    pub margin: u32,
    /// Solid RGB text color.
    pub color: [u8; 3],
    /// Optional path to a preferred TrueType font file.
    pub preferred_font: Option<PathBuf>,
}

impl Default for WatermarkConfig {
    fn default() -> Self {
        Self {
            text: "fourgrid".to_string(),
            font_size: 32,
            margin: 24,
            color: [64, 64, 64],
            preferred_font: None,
        }
    }
}

/// Acquired watermark font, either the preferred face or the builtin fallback.
pub enum WatermarkFont {
    /// Preferred TrueType face loaded from the configured path.
    Truetype(Font<'static>),
    /// Builtin 8x8 bitmap face; always available.
    Builtin,
}

impl WatermarkFont {
    /// Acquires a font for watermark rendering.
    ///
    /// # Semantics
    /// Tries the preferred path first; a missing path, unreadable file, or
    /// unparsable face all select [`WatermarkFont::Builtin`]. This function
    /// cannot fail.
    pub fn acquire(preferred: Option<&Path>) -> Self {
        if let Some(path) = preferred
            && let Ok(data) = std::fs::read(path)
            && let Some(font) = Font::try_from_vec(data)
        {
            return Self::Truetype(font);
        }

        Self::Builtin
    }

    /// Returns `true` when the fallback face was selected.
    pub fn is_builtin(&self) -> bool {
        matches!(self, Self::Builtin)
    }

    /// Measures the pixel bounding box of `text` at `font_size`.
    pub fn measure(&self, text: &str, font_size: u32) -> (u32, u32) {
        match self {
            Self::Truetype(font) => {
                let scale = Scale::uniform(font_size as f32);
                let v_metrics = font.v_metrics(scale);
                let mut width = 0f32;
                for glyph in font.layout(text, scale, point(0.0, v_metrics.ascent)) {
                    if let Some(bounds) = glyph.pixel_bounding_box() {
                        width = width.max(bounds.max.x as f32);
                    }
                }

                let height = (v_metrics.ascent - v_metrics.descent).ceil();
                (width.ceil() as u32, height.max(0.0) as u32)
            }
            Self::Builtin => {
                let scale = builtin_scale(font_size);
                let glyphs = text.chars().count() as u32;
                if glyphs == 0 {
                    return (0, BUILTIN_GLYPH_DOT * scale);
                }

                let gap = scale;
                let width = glyphs * BUILTIN_GLYPH_DOT * scale + (glyphs - 1) * gap;
                (width, BUILTIN_GLYPH_DOT * scale)
            }
        }
    }

    /// Draws `text` starting at the top-left corner `(x, y)`.
    ///
    /// Pixels falling outside the canvas are clipped, never wrapped.
    pub fn draw(
        &self,
        canvas: &mut RgbaImage,
        x: u32,
        y: u32,
        text: &str,
        font_size: u32,
        color: [u8; 3],
    ) {
        match self {
            Self::Truetype(font) => draw_truetype(canvas, font, x, y, text, font_size, color),
            Self::Builtin => draw_builtin(canvas, x, y, text, font_size, color),
        }
    }
}

/// Computes the watermark's top-left anchor for a bottom-right placement.
///
/// # Semantics
/// The text's right and bottom edges sit exactly `margin` pixels inside the
/// canvas edges. Oversized text saturates toward the top-left corner so the
/// visible part stays on the canvas.
pub fn anchor(
    canvas_width: u32,
    canvas_height: u32,
    text_width: u32,
    text_height: u32,
    margin: u32,
) -> (u32, u32) {
    (
        canvas_width.saturating_sub(text_width + margin),
        canvas_height.saturating_sub(text_height + margin),
    )
}

/// Stamps the configured watermark onto the canvas.
///
/// Font failures degrade to the builtin face internally; this function cannot
/// fail and must never abort the surrounding submission.
pub fn stamp(canvas: &mut RgbaImage, config: &WatermarkConfig) {
    let font = WatermarkFont::acquire(config.preferred_font.as_deref());
    stamp_with_font(canvas, config, &font);
}

/// Stamps the watermark using an already-acquired font.
pub fn stamp_with_font(canvas: &mut RgbaImage, config: &WatermarkConfig, font: &WatermarkFont) {
    if config.text.is_empty() {
        return;
    }

    let (text_width, text_height) = font.measure(&config.text, config.font_size);
    let (x, y) = anchor(
        canvas.width(),
        canvas.height(),
        text_width,
        text_height,
        config.margin,
    );

    font.draw(canvas, x, y, &config.text, config.font_size, config.color);
}

fn builtin_scale(font_size: u32) -> u32 {
    (font_size / BUILTIN_GLYPH_DOT).max(1)
}

fn draw_truetype(
    canvas: &mut RgbaImage,
    font: &Font<'static>,
    x: u32,
    y: u32,
    text: &str,
    font_size: u32,
    color: [u8; 3],
) {
    let scale = Scale::uniform(font_size as f32);
    let v_metrics = font.v_metrics(scale);
    let origin = point(x as f32, y as f32 + v_metrics.ascent);

    for glyph in font.layout(text, scale, origin) {
        if let Some(bounds) = glyph.pixel_bounding_box() {
            glyph.draw(|gx, gy, coverage| {
                let px = gx as i32 + bounds.min.x;
                let py = gy as i32 + bounds.min.y;
                if px < 0 || py < 0 {
                    return;
                }
                let (px, py) = (px as u32, py as u32);
                if px >= canvas.width() || py >= canvas.height() {
                    return;
                }

                blend_pixel(canvas.get_pixel_mut(px, py), color, coverage);
            });
        }
    }
}

fn draw_builtin(
    canvas: &mut RgbaImage,
    x: u32,
    y: u32,
    text: &str,
    font_size: u32,
    color: [u8; 3],
) {
    let scale = builtin_scale(font_size);
    let gap = scale;
    let mut cursor_x = x;

    for ch in text.chars() {
        let glyph = BASIC_FONTS
            .get(ch)
            .or_else(|| BASIC_FONTS.get('?'))
            .unwrap_or([0; BUILTIN_GLYPH_DOT as usize]);

        for (row, bits) in glyph.iter().enumerate() {
            for col in 0..BUILTIN_GLYPH_DOT {
                if (bits >> col) & 1 == 0 {
                    continue;
                }

                // Nearest-neighbor upscale of one font dot.
                for dx in 0..scale {
                    for dy in 0..scale {
                        let px = cursor_x + col * scale + dx;
                        let py = y + row as u32 * scale + dy;
                        if px >= canvas.width() || py >= canvas.height() {
                            continue;
                        }

                        blend_pixel(canvas.get_pixel_mut(px, py), color, 1.0);
                    }
                }
            }
        }

        cursor_x += BUILTIN_GLYPH_DOT * scale + gap;
    }
}

fn blend_pixel(pixel: &mut Rgba<u8>, color: [u8; 3], coverage: f32) {
    if coverage <= 0.0 {
        return;
    }

    let alpha = coverage.min(1.0);
    let inverse = 1.0 - alpha;
    pixel.0[0] = (color[0] as f32 * alpha + pixel.0[0] as f32 * inverse) as u8;
    pixel.0[1] = (color[1] as f32 * alpha + pixel.0[1] as f32 * inverse) as u8;
    pixel.0[2] = (color[2] as f32 * alpha + pixel.0[2] as f32 * inverse) as u8;
    pixel.0[3] = 255;
}
