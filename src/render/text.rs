//! Label rasterization with ab_glyph
//!
//! Fonts are supplied by the host; nothing here searches the system for one.

use std::path::Path;

use ab_glyph::{Font, FontArc, ScaleFont, point};
use anyhow::{Context, Result};

/// Share of the text size used as x-height when no font is loaded
pub const DEFAULT_X_HEIGHT_RATIO: f32 = 0.5;

/// Coverage below this is treated as empty
const MIN_COVERAGE: f32 = 1.0 / 255.0;

/// Vertical font measurements in device pixels
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct FontMetrics {
    /// Height of a lowercase `x` above the baseline
    pub x_height: f32,
}

impl FontMetrics {
    /// Metrics estimated from the text size alone
    pub fn estimate(size: f32, scale: f32) -> Self {
        Self {
            x_height: size * DEFAULT_X_HEIGHT_RATIO * scale,
        }
    }

    /// Metrics measured from `font` at `size` pixels, multiplied by `scale`
    pub fn measure(font: &FontArc, size: f32, scale: f32) -> Self {
        let scaled = font.as_scaled(size);
        let glyph = scaled.scaled_glyph('x');
        let x_height = font
            .outline_glyph(glyph)
            .map(|outline| outline.px_bounds().height())
            .unwrap_or(size * DEFAULT_X_HEIGHT_RATIO);
        Self {
            x_height: x_height * scale,
        }
    }
}

/// Load a TrueType/OpenType font from disk
pub fn load_font(path: &Path) -> Result<FontArc> {
    let data = std::fs::read(path)
        .with_context(|| format!("Failed to read font file: {}", path.display()))?;
    FontArc::try_from_vec(data)
        .with_context(|| format!("Not a usable font: {}", path.display()))
}

/// Rasterize a single line of text into a coverage buffer.
///
/// `coverage` is `width * height` bytes, row major; existing coverage is kept
/// where it is stronger. The baseline starts at (`x`, `y`).
#[allow(clippy::too_many_arguments)]
pub fn rasterize_line(
    font: &FontArc,
    text: &str,
    x: f32,
    y: f32,
    size: f32,
    fake_bold: bool,
    coverage: &mut [u8],
    width: u32,
    height: u32,
) {
    let scaled = font.as_scaled(size);
    let mut caret_x = x;
    let mut prev_glyph = None;

    let mut plot = |px: i64, py: i64, c: f32| {
        if c < MIN_COVERAGE || px < 0 || py < 0 || px >= width as i64 || py >= height as i64 {
            return;
        }
        let idx = py as usize * width as usize + px as usize;
        let value = (c.min(1.0) * 255.0).round() as u8;
        if value > coverage[idx] {
            coverage[idx] = value;
        }
    };

    for ch in text.chars() {
        let glyph_id = scaled.glyph_id(ch);
        if let Some(prev) = prev_glyph {
            caret_x += scaled.kern(prev, glyph_id);
        }

        let glyph = glyph_id.with_scale_and_position(size, point(caret_x, y));
        if let Some(outline) = font.outline_glyph(glyph) {
            let bounds = outline.px_bounds();
            let min_x = bounds.min.x as i64;
            let min_y = bounds.min.y as i64;
            outline.draw(|gx, gy, c| {
                let px = min_x + gx as i64;
                let py = min_y + gy as i64;
                plot(px, py, c);
                if fake_bold {
                    plot(px + 1, py, c);
                }
            });
        }

        caret_x += scaled.h_advance(glyph_id);
        prev_glyph = Some(glyph_id);
    }
}
