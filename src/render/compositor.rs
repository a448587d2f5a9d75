//! Mark registry and per-frame compositing
//!
//! A frame is built in a fixed order:
//! 1. clear the canvas
//! 2. subtract every mark's hole from the clip, in insertion order
//! 3. reset the matrix and paint the backdrop through the combined clip
//! 4. pop the clip in one step
//! 5. draw every annotation, in insertion order, unclipped

use super::canvas::Canvas;
use super::geometry;
use crate::config::{OverlayConfig, TextStyle};
use crate::domain::{Annotation, HoleShape, Mark, Rect};

/// Subtract `hole`, placed over the device-pixel `rect`, from the canvas clip
pub fn subtract_hole<C: Canvas + ?Sized>(canvas: &mut C, hole: HoleShape, rect: Rect) {
    match geometry::hole_path(hole, rect) {
        Some(path) => canvas.clip_difference(&path),
        None => log::trace!("Skipping empty hole at {:?}", rect),
    }
}

/// Draw `annotation` next to the device-pixel `rect`
pub fn draw_annotation<C: Canvas + ?Sized>(
    canvas: &mut C,
    annotation: &Annotation,
    rect: Rect,
    scale: f32,
    style: &TextStyle,
) {
    match annotation {
        Annotation::Text(label) => {
            let metrics = canvas.font_metrics(style, scale);
            let (x, y) = geometry::text_anchor(rect, label.position, metrics.x_height);
            canvas.draw_text(&label.text, x, y, style);
        }
    }
}

/// Ordered collection of marks
#[derive(Clone, Debug, Default)]
pub struct MarkRegistry {
    marks: Vec<Mark>,
}

impl MarkRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, mark: Mark) {
        self.marks.push(mark);
    }

    pub fn len(&self) -> usize {
        self.marks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.marks.is_empty()
    }

    pub fn as_slice(&self) -> &[Mark] {
        &self.marks
    }

    /// Render one frame of the overlay.
    ///
    /// `size` is the surface size in device pixels and `scale` the factor from
    /// logical units to device pixels.
    pub fn composite<C: Canvas + ?Sized>(
        &self,
        canvas: &mut C,
        size: (u32, u32),
        scale: f32,
        config: &OverlayConfig,
    ) {
        canvas.clear();

        canvas.save();
        for mark in self {
            subtract_hole(canvas, mark.hole(), mark.rect().scale(scale));
        }

        canvas.reset_matrix();
        match geometry::skia_rect(Rect::new(0.0, 0.0, size.0 as f32, size.1 as f32)) {
            Some(full) => canvas.fill_rect(full, &config.backdrop),
            None => log::debug!("Surface has no area, backdrop skipped"),
        }
        canvas.restore();

        for mark in self {
            draw_annotation(
                canvas,
                mark.annotation(),
                mark.rect().scale(scale),
                scale,
                &config.text,
            );
        }
    }
}

impl<'a> IntoIterator for &'a MarkRegistry {
    type Item = &'a Mark;
    type IntoIter = std::slice::Iter<'a, Mark>;

    fn into_iter(self) -> Self::IntoIter {
        self.marks.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Argb;
    use crate::domain::Position;
    use crate::render::canvas::PixmapCanvas;

    const CLEAR: [u8; 4] = [0, 0, 0, 0];

    fn mark(rect: Rect, hole: HoleShape, text: &str, position: Option<Position>) -> Mark {
        Mark::new(rect, hole, Annotation::text(text, position))
    }

    fn config(backdrop: u32) -> OverlayConfig {
        OverlayConfig::default().with_backdrop_color(Argb(backdrop))
    }

    fn render(marks: &[Mark], size: (u32, u32), scale: f32) -> PixmapCanvas {
        let mut registry = MarkRegistry::new();
        for m in marks {
            registry.push(m.clone());
        }
        let mut canvas = PixmapCanvas::new(size.0, size.1).unwrap();
        registry.composite(&mut canvas, size, scale, &config(0xFF00_0000));
        canvas
    }

    #[test]
    fn test_holes_are_transparent_and_backdrop_elsewhere() {
        let canvas = render(
            &[mark(Rect::new(10.0, 10.0, 20.0, 20.0), HoleShape::RECT, "A", None)],
            (64, 64),
            1.0,
        );
        assert_eq!(canvas.pixel_rgba(15, 15), Some(CLEAR));
        assert_eq!(canvas.pixel_rgba(29, 29), Some(CLEAR));
        assert_eq!(canvas.pixel_rgba(30, 30), Some([0, 0, 0, 255]));
        assert_eq!(canvas.pixel_rgba(5, 5), Some([0, 0, 0, 255]));
    }

    #[test]
    fn test_hole_union_is_order_independent() {
        let a = mark(Rect::new(0.0, 0.0, 30.0, 30.0), HoleShape::RECT, "A", None);
        let b = mark(Rect::new(20.0, 20.0, 30.0, 30.0), HoleShape::Circle, "B", None);
        let ab = render(&[a.clone(), b.clone()], (64, 64), 1.0);
        let ba = render(&[b, a], (64, 64), 1.0);
        assert_eq!(ab.pixmap().data(), ba.pixmap().data());
    }

    #[test]
    fn test_annotation_order_follows_registry() {
        let a = mark(Rect::new(0.0, 0.0, 30.0, 30.0), HoleShape::RECT, "A", None);
        let b = mark(Rect::new(0.0, 0.0, 30.0, 30.0), HoleShape::RECT, "B", None);
        let canvas = render(&[a, b], (64, 64), 1.0);
        let texts: Vec<_> = canvas.text_runs().iter().map(|r| r.text.as_str()).collect();
        assert_eq!(texts, ["A", "B"]);
    }

    #[test]
    fn test_scale_invariance() {
        let r = Rect::new(3.0, 4.0, 10.0, 7.0);
        for k in [0.5, 1.0, 2.0, 3.0] {
            let scaled = render(&[mark(r, HoleShape::RECT, "A", None)], (64, 64), k);
            let logical = render(&[mark(r.scale(k), HoleShape::RECT, "A", None)], (64, 64), 1.0);
            assert_eq!(scaled.pixmap().data(), logical.pixmap().data(), "k = {k}");
        }
    }

    #[test]
    fn test_scale_invariance_rounded_and_circle() {
        let r = Rect::new(4.0, 4.0, 20.0, 20.0);
        for hole in [HoleShape::rounded(4.0), HoleShape::Circle] {
            for k in [0.5, 2.0, 2.5] {
                let scaled = render(&[mark(r, hole, "A", None)], (64, 64), k);
                let logical = render(&[mark(r.scale(k), hole, "A", None)], (64, 64), 1.0);
                assert_eq!(
                    scaled.pixmap().data(),
                    logical.pixmap().data(),
                    "{hole:?} at k = {k}"
                );
            }
        }
    }

    #[test]
    fn test_zero_roundness_matches_plain_rect() {
        let r = Rect::new(8.0, 8.0, 21.0, 13.0);
        let plain = render(&[mark(r, HoleShape::RECT, "A", None)], (48, 48), 1.0);
        let zero = render(&[mark(r, HoleShape::rounded(0.0), "A", None)], (48, 48), 1.0);
        let negative = render(
            &[mark(r, HoleShape::Rect { roundness: -3.0 }, "A", None)],
            (48, 48),
            1.0,
        );
        assert_eq!(plain.pixmap().data(), zero.pixmap().data());
        assert_eq!(plain.pixmap().data(), negative.pixmap().data());
    }

    #[test]
    fn test_rounded_hole_keeps_corners_dimmed() {
        let r = Rect::new(8.0, 8.0, 32.0, 32.0);
        let canvas = render(&[mark(r, HoleShape::rounded(10.0), "A", None)], (48, 48), 1.0);
        assert_eq!(canvas.pixel_rgba(8, 8), Some([0, 0, 0, 255]));
        assert_eq!(canvas.pixel_rgba(24, 24), Some(CLEAR));
        assert_eq!(canvas.pixel_rgba(24, 8), Some(CLEAR));
    }

    #[test]
    fn test_circle_hole_sized_from_width() {
        // 20 wide, 60 tall: circle of radius 10 centred at (20, 40)
        let r = Rect::new(10.0, 10.0, 20.0, 60.0);
        let canvas = render(&[mark(r, HoleShape::Circle, "A", None)], (80, 80), 1.0);
        assert_eq!(canvas.pixel_rgba(20, 40), Some(CLEAR));
        assert_eq!(canvas.pixel_rgba(20, 32), Some(CLEAR));
        // Inside the rectangle but outside the circle
        assert_eq!(canvas.pixel_rgba(20, 15), Some([0, 0, 0, 255]));
        assert_eq!(canvas.pixel_rgba(20, 65), Some([0, 0, 0, 255]));
        assert_eq!(canvas.pixel_rgba(11, 11), Some([0, 0, 0, 255]));
    }

    #[test]
    fn test_text_anchoring_in_frame() {
        let r = Rect::new(10.0, 20.0, 100.0, 30.0);
        let canvas = render(
            &[
                mark(r, HoleShape::RECT, "above", Some(Position::ABOVE)),
                mark(r, HoleShape::RECT, "below", Some(Position::BELOW)),
                mark(r, HoleShape::RECT, "unset", None),
                mark(r, HoleShape::RECT, "none", Some(Position::default())),
            ],
            (128, 128),
            1.0,
        );
        let x_height = canvas.font_metrics(&TextStyle::default(), 1.0).x_height;
        let anchors: Vec<_> = canvas.text_runs().iter().map(|r| (r.x, r.y)).collect();
        assert_eq!(
            anchors,
            [
                (10.0, 20.0),
                (10.0, 50.0 + x_height),
                (10.0, 50.0 + x_height),
                (10.0, 50.0),
            ]
        );
    }

    #[test]
    fn test_empty_rect_leaves_full_backdrop() {
        let canvas = render(
            &[mark(Rect::default(), HoleShape::RECT, "A", None)],
            (16, 16),
            1.0,
        );
        assert!(canvas.pixmap().pixels().iter().all(|p| p.alpha() == 255));
        assert_eq!(canvas.text_runs().len(), 1);
    }

    #[test]
    fn test_composite_clears_previous_frame() {
        let mut registry = MarkRegistry::new();
        registry.push(mark(Rect::new(0.0, 0.0, 8.0, 8.0), HoleShape::RECT, "A", None));
        let mut canvas = PixmapCanvas::new(16, 16).unwrap();
        let config = config(0x8800_0000);
        registry.composite(&mut canvas, (16, 16), 1.0, &config);
        registry.composite(&mut canvas, (16, 16), 1.0, &config);
        assert_eq!(canvas.pixel_rgba(4, 4), Some(CLEAR));
        assert_eq!(canvas.pixel_rgba(12, 12), Some([0, 0, 0, 0x88]));
        assert_eq!(canvas.text_runs().len(), 1);
    }
}
