//! Overlay rendering
//!
//! This module contains:
//! - The `Canvas` drawing contract and a tiny-skia implementation
//! - Hole and label geometry
//! - Label rasterization using ab_glyph
//! - The mark registry and per-frame compositor

pub mod canvas;
pub mod compositor;
pub mod geometry;
pub mod text;

pub use canvas::{Canvas, PixmapCanvas, TextRun};
pub use compositor::MarkRegistry;
pub use text::FontMetrics;
