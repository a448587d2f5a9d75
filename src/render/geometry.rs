//! Shape geometry for holes and label anchors
//!
//! All functions here work on rectangles already scaled to device pixels.

use tiny_skia::{Path, PathBuilder};

use crate::domain::{HoleShape, Position, Rect, Vertical};

/// Shape geometry constants
pub mod shape {
    /// Ellipse bezier approximation constant: 4/3 * (sqrt(2) - 1)
    pub const BEZIER_K: f32 = 0.552_284_8;
}

/// Convert to a tiny-skia rectangle, `None` if empty or non-finite
pub fn skia_rect(rect: Rect) -> Option<tiny_skia::Rect> {
    if rect.is_empty() {
        return None;
    }
    tiny_skia::Rect::from_xywh(rect.left, rect.top, rect.width, rect.height)
}

/// Circle inscribed in `rect`, sized from its width alone
#[inline]
pub fn hole_circle(rect: Rect) -> (f32, f32, f32) {
    let cx = rect.left + rect.width / 2.0;
    let cy = rect.top + rect.height / 2.0;
    (cx, cy, rect.width / 2.0)
}

/// Build the path a hole subtracts from the clip.
///
/// `rect` and the corner radius are both in device pixels. `None` for shapes
/// that cover no area.
pub fn hole_path(hole: HoleShape, rect: Rect) -> Option<Path> {
    match hole {
        HoleShape::Rect { roundness } if roundness > 0.0 => build_round_rect_path(rect, roundness),
        HoleShape::Rect { .. } => skia_rect(rect).map(PathBuilder::from_rect),
        HoleShape::Circle => {
            let (cx, cy, r) = hole_circle(rect);
            build_ellipse_path(cx, cy, r, r)
        }
    }
}

/// Build a rounded rectangle with equal corner radii using cubic beziers
fn build_round_rect_path(rect: Rect, radius: f32) -> Option<Path> {
    skia_rect(rect)?;

    let (l, t, r, b) = (rect.left, rect.top, rect.right(), rect.bottom());
    // Radii larger than half a side collapse to a capsule
    let rad = radius.min(rect.width / 2.0).min(rect.height / 2.0);
    let k = rad * shape::BEZIER_K;

    let mut pb = PathBuilder::new();
    pb.move_to(l + rad, t);

    // Top edge, top-right corner
    pb.line_to(r - rad, t);
    pb.cubic_to(r - rad + k, t, r, t + rad - k, r, t + rad);

    // Right edge, bottom-right corner
    pb.line_to(r, b - rad);
    pb.cubic_to(r, b - rad + k, r - rad + k, b, r - rad, b);

    // Bottom edge, bottom-left corner
    pb.line_to(l + rad, b);
    pb.cubic_to(l + rad - k, b, l, b - rad + k, l, b - rad);

    // Left edge, top-left corner
    pb.line_to(l, t + rad);
    pb.cubic_to(l, t + rad - k, l + rad - k, t, l + rad, t);

    pb.close();
    pb.finish()
}

/// Build an ellipse path using cubic bezier curves
fn build_ellipse_path(cx: f32, cy: f32, rx: f32, ry: f32) -> Option<Path> {
    if !(rx > 0.0 && ry > 0.0) {
        return None;
    }

    let kx = rx * shape::BEZIER_K;
    let ky = ry * shape::BEZIER_K;

    let mut pb = PathBuilder::new();

    // Start at top
    pb.move_to(cx, cy - ry);

    // Top to right
    pb.cubic_to(cx + kx, cy - ry, cx + rx, cy - ky, cx + rx, cy);

    // Right to bottom
    pb.cubic_to(cx + rx, cy + ky, cx + kx, cy + ry, cx, cy + ry);

    // Bottom to left
    pb.cubic_to(cx - kx, cy + ry, cx - rx, cy + ky, cx - rx, cy);

    // Left to top
    pb.cubic_to(cx - rx, cy - ky, cx - kx, cy - ry, cx, cy - ry);

    pb.close();
    pb.finish()
}

/// Baseline origin for a label next to `rect`.
///
/// Labels are left aligned at `rect.left`; the horizontal axis of `position`
/// is not consulted.
pub fn text_anchor(rect: Rect, position: Position, x_height: f32) -> (f32, f32) {
    let y = match position.vertical {
        Vertical::Above => rect.top,
        Vertical::None => rect.bottom(),
        Vertical::Below => rect.bottom() + x_height,
    };
    (rect.left, y)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Horizontal;

    #[test]
    fn test_circle_radius_ignores_height() {
        let (cx, cy, r) = hole_circle(Rect::new(0.0, 0.0, 40.0, 100.0));
        assert_eq!((cx, cy, r), (20.0, 50.0, 20.0));

        let (_, _, r) = hole_circle(Rect::new(0.0, 0.0, 40.0, 4.0));
        assert_eq!(r, 20.0);
    }

    #[test]
    fn test_circle_path_bounds_follow_width() {
        let path = hole_path(HoleShape::Circle, Rect::new(10.0, 10.0, 40.0, 10.0)).unwrap();
        let bounds = path.bounds();
        assert_eq!(bounds.left(), 10.0);
        assert_eq!(bounds.right(), 50.0);
        assert_eq!(bounds.top(), -5.0);
        assert_eq!(bounds.bottom(), 35.0);
    }

    #[test]
    fn test_empty_rect_has_no_path() {
        assert!(hole_path(HoleShape::RECT, Rect::default()).is_none());
        assert!(hole_path(HoleShape::rounded(4.0), Rect::default()).is_none());
        assert!(hole_path(HoleShape::Circle, Rect::default()).is_none());
    }

    #[test]
    fn test_skia_rect_rejects_empty() {
        assert!(skia_rect(Rect::default()).is_none());
        assert!(skia_rect(Rect::new(3.0, 3.0, 0.0, 5.0)).is_none());
        assert!(skia_rect(Rect::new(3.0, 3.0, 2.0, 5.0)).is_some());
    }

    #[test]
    fn test_rounded_rect_path_stays_in_bounds() {
        let rect = Rect::new(5.0, 5.0, 30.0, 20.0);
        let path = hole_path(HoleShape::rounded(100.0), rect).unwrap();
        let bounds = path.bounds();
        assert_eq!(bounds.left(), 5.0);
        assert_eq!(bounds.top(), 5.0);
        assert_eq!(bounds.right(), 35.0);
        assert_eq!(bounds.bottom(), 25.0);
    }

    #[test]
    fn test_text_anchor_by_vertical_position() {
        let rect = Rect::new(10.0, 20.0, 100.0, 30.0);
        assert_eq!(text_anchor(rect, Position::ABOVE, 7.0), (10.0, 20.0));
        assert_eq!(text_anchor(rect, Position::BELOW, 7.0), (10.0, 57.0));
        assert_eq!(text_anchor(rect, Position::default(), 7.0), (10.0, 50.0));
    }

    #[test]
    fn test_text_anchor_ignores_horizontal_axis() {
        let rect = Rect::new(10.0, 20.0, 100.0, 30.0);
        let right_below = Position::new(Horizontal::Right, Vertical::Below);
        assert_eq!(
            text_anchor(rect, right_below, 7.0),
            text_anchor(rect, Position::BELOW, 7.0)
        );
    }
}
