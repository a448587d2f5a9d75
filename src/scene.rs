//! Scene files: a host root, its elements and the marks laid over them
//!
//! ```json
//! {
//!   "width": 400, "height": 300, "scale": 2.0,
//!   "config": { "backdrop": { "color": "#88000000" } },
//!   "elements": [ { "name": "button", "rect": { "left": 20, "top": 40, "width": 80, "height": 30 } } ],
//!   "marks": [
//!     { "target": { "element": "button" }, "text": "Start here", "position": { "vertical": "below" } },
//!     { "target": { "rect": { "left": 150, "top": 20, "width": 40, "height": 40 } },
//!       "text": "Menu", "hole": { "kind": "circle" } }
//!   ]
//! }
//! ```

use std::path::Path;

use anyhow::{Context, Result};
use image::RgbaImage;
use serde::{Deserialize, Serialize};
use tiny_skia::Pixmap;

use crate::config::{Argb, OverlayConfig};
use crate::core::{CoachMarks, OverlayInstance, resolve_on_screen_rect};
use crate::domain::{HoleShape, Position, Rect};
use crate::headless::HeadlessHost;
use crate::render::text;

/// Named element of the host root; `rect` is absent while not laid out
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneElement {
    pub name: String,
    #[serde(default)]
    pub rect: Option<Rect>,
}

/// What a mark highlights
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MarkTarget {
    Rect(Rect),
    Element(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneMark {
    pub target: MarkTarget,
    pub text: String,
    #[serde(default)]
    pub position: Option<Position>,
    #[serde(default)]
    pub hole: HoleShape,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scene {
    /// Root size in device pixels
    pub width: u32,
    pub height: u32,
    #[serde(default = "default_scale")]
    pub scale: f32,
    #[serde(default = "default_background")]
    pub background: Argb,
    #[serde(default)]
    pub config: OverlayConfig,
    #[serde(default)]
    pub elements: Vec<SceneElement>,
    #[serde(default)]
    pub marks: Vec<SceneMark>,
}

fn default_scale() -> f32 {
    1.0
}

fn default_background() -> Argb {
    Argb(0xFFFF_FFFF)
}

impl Scene {
    /// Read a scene from a JSON file
    pub fn from_file(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read scene file: {}", path.display()))?;
        let scene = serde_json::from_str(&json)
            .with_context(|| format!("Failed to parse scene file: {}", path.display()))?;
        Ok(scene)
    }

    /// Build a headless host holding the scene's elements
    pub fn host(&self) -> Result<HeadlessHost> {
        let font = match &self.config.font_path {
            Some(path) => Some(text::load_font(path)?),
            None => None,
        };

        let mut host = HeadlessHost::new(self.width, self.height, self.scale)?
            .with_background(self.background)
            .with_font(font);
        for element in &self.elements {
            match element.rect {
                Some(rect) => host.register_element(element.name.clone(), rect),
                None => host.register_unattached_element(element.name.clone()),
            }
        }
        Ok(host)
    }

    /// Build the overlay for this scene without attaching it
    pub fn overlay(&self, host: &HeadlessHost) -> OverlayInstance {
        let factory = CoachMarks::with_config(self.config.clone());
        let overlay = factory.create(None, None);
        self.marks.iter().fold(overlay, |overlay, mark| {
            let rect = match &mark.target {
                MarkTarget::Rect(rect) => *rect,
                MarkTarget::Element(name) => resolve_on_screen_rect(host, name.as_str()),
            };
            overlay.add_with_hole(rect, mark.hole, mark.text.clone(), mark.position)
        })
    }

    /// Show the overlay on a headless host and return the composited root
    pub fn render(&self) -> Result<Pixmap> {
        let mut host = self.host()?;
        let overlay = self.overlay(&host).show(&mut host);
        let painted = host.paint_pending();
        log::debug!(
            "Painted {} surface(s), overlay {:?}, {} mark(s)",
            painted,
            overlay.state(),
            self.marks.len()
        );
        host.snapshot().context("Failed to allocate the root snapshot")
    }
}

/// Write a pixmap as a PNG with straight (non-premultiplied) alpha
pub fn save_png(pixmap: &Pixmap, path: &Path) -> Result<()> {
    let data: Vec<u8> = pixmap
        .pixels()
        .iter()
        .flat_map(|p| {
            let c = p.demultiply();
            [c.red(), c.green(), c.blue(), c.alpha()]
        })
        .collect();
    let img = RgbaImage::from_raw(pixmap.width(), pixmap.height(), data)
        .context("Pixmap size does not match its pixel data")?;
    img.save(path)
        .with_context(|| format!("Failed to write image: {}", path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const SCENE: &str = r##"{
        "width": 120, "height": 80,
        "background": "#FFFFFFFF",
        "config": { "backdrop": { "color": "#FF000000" } },
        "elements": [
            { "name": "button", "rect": { "left": 10, "top": 10, "width": 20, "height": 10 } },
            { "name": "hidden" }
        ],
        "marks": [
            { "target": { "element": "button" }, "text": "Start", "position": { "vertical": "above" } },
            { "target": { "rect": { "left": 60, "top": 20, "width": 20, "height": 20 } },
              "text": "Menu", "hole": { "kind": "circle" } },
            { "target": { "element": "hidden" }, "text": "Later" }
        ]
    }"##;

    fn rgba(pixmap: &Pixmap, x: u32, y: u32) -> [u8; 4] {
        let p = pixmap.pixel(x, y).unwrap();
        [p.red(), p.green(), p.blue(), p.alpha()]
    }

    #[test]
    fn test_parse_scene_defaults() {
        let scene: Scene = serde_json::from_str(r#"{"width": 10, "height": 10}"#).unwrap();
        assert_eq!(scene.scale, 1.0);
        assert_eq!(scene.background, Argb(0xFFFF_FFFF));
        assert!(scene.marks.is_empty());
        assert_eq!(scene.config, OverlayConfig::default());
    }

    #[test]
    fn test_overlay_resolves_targets() {
        let scene: Scene = serde_json::from_str(SCENE).unwrap();
        let host = scene.host().unwrap();
        let overlay = scene.overlay(&host);
        let marks = overlay.marks();
        assert_eq!(marks.len(), 3);
        assert_eq!(marks[0].rect(), Rect::new(10.0, 10.0, 20.0, 10.0));
        assert_eq!(marks[1].hole(), HoleShape::Circle);
        assert_eq!(marks[2].rect(), Rect::default());
    }

    #[test]
    fn test_render_scene() {
        let scene: Scene = serde_json::from_str(SCENE).unwrap();
        let pixmap = scene.render().unwrap();
        assert_eq!((pixmap.width(), pixmap.height()), (120, 80));

        let element = crate::headless::ELEMENT_COLOR.to_rgba_u8();
        assert_eq!(rgba(&pixmap, 15, 15), element);
        assert_eq!(rgba(&pixmap, 70, 30), [255, 255, 255, 255]);
        assert_eq!(rgba(&pixmap, 100, 70), [0, 0, 0, 255]);
    }

    #[test]
    fn test_missing_font_is_an_error() {
        let mut scene: Scene = serde_json::from_str(SCENE).unwrap();
        scene.config.font_path = Some("/nonexistent/font.ttf".into());
        assert!(scene.render().is_err());
    }

    #[test]
    fn test_save_png_round_trips_size() {
        let scene: Scene = serde_json::from_str(SCENE).unwrap();
        let pixmap = scene.render().unwrap();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.png");
        save_png(&pixmap, &path).unwrap();
        let img = image::open(&path).unwrap().to_rgba8();
        assert_eq!(img.dimensions(), (120, 80));
        assert_eq!(img.get_pixel(100, 70).0, [0, 0, 0, 255]);
    }
}
