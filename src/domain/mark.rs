//! Mark types: hole shapes, label positions and annotations
//!
//! All rectangles stored here are in surface-local, scale-independent units.

use serde::{Deserialize, Deserializer, Serialize};

use super::geometry::Rect;

/// Shape subtracted from the backdrop clip for a mark
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum HoleShape {
    /// Rectangle, rounded when `roundness` is positive
    Rect {
        #[serde(default, deserialize_with = "non_negative")]
        roundness: f32,
    },
    /// Circle centred in the rectangle with a radius of half its width
    Circle,
}

impl HoleShape {
    /// Plain rectangular hole
    pub const RECT: HoleShape = HoleShape::Rect { roundness: 0.0 };

    /// Rounded rectangle hole, negative radii clamp to zero
    pub fn rounded(roundness: f32) -> Self {
        HoleShape::Rect {
            roundness: roundness.max(0.0),
        }
    }
}

fn non_negative<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f32, D::Error> {
    f32::deserialize(deserializer).map(|r| r.max(0.0))
}

impl Default for HoleShape {
    fn default() -> Self {
        HoleShape::RECT
    }
}

/// Horizontal label preference
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Horizontal {
    #[default]
    None,
    Left,
    Right,
}

/// Vertical label preference
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Vertical {
    #[default]
    None,
    Above,
    Below,
}

/// Where a label sits relative to its mark.
///
/// Only the vertical axis affects placement; labels are always left aligned.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Position {
    #[serde(default)]
    pub horizontal: Horizontal,
    #[serde(default)]
    pub vertical: Vertical,
}

impl Position {
    pub const ABOVE: Position = Position::new(Horizontal::None, Vertical::Above);
    pub const BELOW: Position = Position::new(Horizontal::None, Vertical::Below);
    pub const LEFT: Position = Position::new(Horizontal::Left, Vertical::None);
    pub const RIGHT: Position = Position::new(Horizontal::Right, Vertical::None);

    pub const fn new(horizontal: Horizontal, vertical: Vertical) -> Self {
        Self {
            horizontal,
            vertical,
        }
    }

    /// Position used when the caller expresses no preference
    pub fn or_default_below(position: Option<Position>) -> Position {
        position.unwrap_or(Position::BELOW)
    }
}

/// Text label drawn next to a mark
#[derive(Clone, Debug, PartialEq)]
pub struct TextAnnotation {
    pub text: String,
    pub position: Position,
}

/// Renderable annotation attached to a mark
#[derive(Clone, Debug, PartialEq)]
pub enum Annotation {
    Text(TextAnnotation),
}

impl Annotation {
    /// Text label, `None` position renders below the mark
    pub fn text(text: impl Into<String>, position: Option<Position>) -> Self {
        Annotation::Text(TextAnnotation {
            text: text.into(),
            position: Position::or_default_below(position),
        })
    }
}

/// A highlighted region with its hole shape and annotation
#[derive(Clone, Debug, PartialEq)]
pub struct Mark {
    rect: Rect,
    hole: HoleShape,
    annotation: Annotation,
}

impl Mark {
    pub fn new(rect: Rect, hole: HoleShape, annotation: Annotation) -> Self {
        Self {
            rect,
            hole,
            annotation,
        }
    }

    /// Target rectangle in logical units
    pub fn rect(&self) -> Rect {
        self.rect
    }

    pub fn hole(&self) -> HoleShape {
        self.hole
    }

    pub fn annotation(&self) -> &Annotation {
        &self.annotation
    }
}
