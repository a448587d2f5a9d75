//! Drawing surface contract and its tiny-skia implementation

use ab_glyph::FontArc;
use tiny_skia::{Color, FillRule, Mask, Path, Pixmap, Transform};

use super::text::{self, FontMetrics};
use crate::config::{BackdropPaint, TextStyle};

/// Holes are rasterized without anti-aliasing so their edges are exact
const CLIP_ANTI_ALIAS: bool = false;

/// What the compositor needs from a host-provided drawable.
///
/// Clip and matrix form one state that `save`/`restore` push and pop.
pub trait Canvas {
    /// Erase every pixel to transparent
    fn clear(&mut self);

    /// Push the current clip and matrix
    fn save(&mut self);

    /// Pop back to the last saved clip and matrix
    fn restore(&mut self);

    /// Reset the matrix to identity, leaving the clip untouched
    fn reset_matrix(&mut self);

    /// Narrow the clip by excluding `path`
    fn clip_difference(&mut self, path: &Path);

    /// Fill `rect` with `paint` inside the current clip
    fn fill_rect(&mut self, rect: tiny_skia::Rect, paint: &BackdropPaint);

    /// Font measurements for `style`, multiplied by `scale`
    fn font_metrics(&self, style: &TextStyle, scale: f32) -> FontMetrics;

    /// Draw `text` with its baseline starting at (`x`, `y`)
    fn draw_text(&mut self, text: &str, x: f32, y: f32, style: &TextStyle);
}

/// A label drawn onto a [`PixmapCanvas`]
#[derive(Clone, Debug, PartialEq)]
pub struct TextRun {
    pub text: String,
    pub x: f32,
    pub y: f32,
    pub style: TextStyle,
}

/// Saved clip and matrix
#[derive(Clone)]
struct CanvasState {
    transform: Transform,
    clip: Option<Mask>,
}

/// CPU canvas backed by a tiny-skia pixmap.
///
/// The clip is an 8-bit coverage mask; `None` means the whole surface.
pub struct PixmapCanvas {
    pixmap: Pixmap,
    state: CanvasState,
    stack: Vec<CanvasState>,
    font: Option<FontArc>,
    runs: Vec<TextRun>,
}

impl PixmapCanvas {
    /// Transparent canvas of `width` x `height` pixels, `None` if either is zero
    pub fn new(width: u32, height: u32) -> Option<Self> {
        let pixmap = Pixmap::new(width, height)?;
        Some(Self {
            pixmap,
            state: CanvasState {
                transform: Transform::identity(),
                clip: None,
            },
            stack: Vec::new(),
            font: None,
            runs: Vec::new(),
        })
    }

    /// Rasterize labels with `font` instead of only recording them
    pub fn with_font(mut self, font: FontArc) -> Self {
        self.font = Some(font);
        self
    }

    pub fn set_font(&mut self, font: Option<FontArc>) {
        self.font = font;
    }

    pub fn width(&self) -> u32 {
        self.pixmap.width()
    }

    pub fn height(&self) -> u32 {
        self.pixmap.height()
    }

    pub fn pixmap(&self) -> &Pixmap {
        &self.pixmap
    }

    pub fn into_pixmap(self) -> Pixmap {
        self.pixmap
    }

    /// Labels drawn since the last `clear`, in draw order
    pub fn text_runs(&self) -> &[TextRun] {
        &self.runs
    }

    /// Apply a matrix for subsequent drawing
    pub fn set_transform(&mut self, transform: Transform) {
        self.state.transform = transform;
    }

    /// Premultiplied RGBA at a pixel
    pub fn pixel_rgba(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        let p = self.pixmap.pixel(x, y)?;
        Some([p.red(), p.green(), p.blue(), p.alpha()])
    }

    fn full_mask(&self) -> Option<Mask> {
        let mut mask = Mask::new(self.pixmap.width(), self.pixmap.height())?;
        mask.data_mut().fill(255);
        Some(mask)
    }
}

impl Canvas for PixmapCanvas {
    fn clear(&mut self) {
        self.pixmap.fill(Color::TRANSPARENT);
        self.runs.clear();
    }

    fn save(&mut self) {
        self.stack.push(self.state.clone());
    }

    fn restore(&mut self) {
        match self.stack.pop() {
            Some(state) => self.state = state,
            None => log::warn!("Canvas restore without matching save"),
        }
    }

    fn reset_matrix(&mut self) {
        self.state.transform = Transform::identity();
    }

    fn clip_difference(&mut self, path: &Path) {
        let Some(mut hole) = Mask::new(self.pixmap.width(), self.pixmap.height()) else {
            return;
        };
        hole.fill_path(path, FillRule::Winding, CLIP_ANTI_ALIAS, self.state.transform);

        let Some(mut clip) = self.state.clip.take().or_else(|| self.full_mask()) else {
            return;
        };
        for (c, h) in clip.data_mut().iter_mut().zip(hole.data()) {
            *c = ((*c as u16 * (255 - *h) as u16) / 255) as u8;
        }
        self.state.clip = Some(clip);
    }

    fn fill_rect(&mut self, rect: tiny_skia::Rect, paint: &BackdropPaint) {
        let sk_paint = paint.color.to_paint(paint.anti_alias);
        self.pixmap.fill_rect(
            rect,
            &sk_paint,
            self.state.transform,
            self.state.clip.as_ref(),
        );
    }

    fn font_metrics(&self, style: &TextStyle, scale: f32) -> FontMetrics {
        match &self.font {
            Some(font) => FontMetrics::measure(font, style.size, scale),
            None => FontMetrics::estimate(style.size, scale),
        }
    }

    fn draw_text(&mut self, text: &str, x: f32, y: f32, style: &TextStyle) {
        self.runs.push(TextRun {
            text: text.to_string(),
            x,
            y,
            style: *style,
        });

        let Some(font) = &self.font else {
            return;
        };
        let (width, height) = (self.pixmap.width(), self.pixmap.height());
        let Some(mut coverage) = Mask::new(width, height) else {
            return;
        };

        // Labels are positioned in device pixels; map the baseline through the matrix
        let mut origin = [tiny_skia::Point::from_xy(x, y)];
        self.state.transform.map_points(&mut origin);
        text::rasterize_line(
            font,
            text,
            origin[0].x,
            origin[0].y,
            style.size,
            style.fake_bold,
            coverage.data_mut(),
            width,
            height,
        );

        // Labels ignore the hole clip but honour any clip the host applied
        if let Some(clip) = &self.state.clip {
            for (c, m) in coverage.data_mut().iter_mut().zip(clip.data()) {
                *c = ((*c as u16 * *m as u16) / 255) as u8;
            }
        }

        if let Some(full) = tiny_skia::Rect::from_xywh(0.0, 0.0, width as f32, height as f32) {
            let paint = style.color.to_paint(style.anti_alias);
            self.pixmap
                .fill_rect(full, &paint, Transform::identity(), Some(&coverage));
        }
    }
}
