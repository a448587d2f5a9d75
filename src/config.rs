//! Overlay paint configuration

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Packed `0xAARRGGBB` colour
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "ColorRepr", into = "u32")]
pub struct Argb(pub u32);

/// Colours may be written as a number or as a `#AARRGGBB` / `#RRGGBB` string
#[derive(Deserialize)]
#[serde(untagged)]
enum ColorRepr {
    Packed(u32),
    Hex(String),
}

impl TryFrom<ColorRepr> for Argb {
    type Error = String;

    fn try_from(repr: ColorRepr) -> std::result::Result<Self, Self::Error> {
        match repr {
            ColorRepr::Packed(v) => Ok(Argb(v)),
            ColorRepr::Hex(s) => Argb::parse_hex(&s).ok_or_else(|| format!("invalid colour: {s}")),
        }
    }
}

impl From<Argb> for u32 {
    fn from(c: Argb) -> Self {
        c.0
    }
}

impl Argb {
    /// Parse `#AARRGGBB` or `#RRGGBB` (opaque)
    pub fn parse_hex(s: &str) -> Option<Self> {
        let t = s.trim();
        let hex = t.strip_prefix('#').unwrap_or(t);
        if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return None;
        }
        let v = u32::from_str_radix(hex, 16).ok()?;
        match hex.len() {
            6 => Some(Argb(0xFF00_0000 | v)),
            8 => Some(Argb(v)),
            _ => None,
        }
    }

    pub fn alpha(self) -> u8 {
        (self.0 >> 24) as u8
    }

    /// Convert to RGBA bytes (0-255)
    pub fn to_rgba_u8(self) -> [u8; 4] {
        [
            (self.0 >> 16) as u8,
            (self.0 >> 8) as u8,
            self.0 as u8,
            self.alpha(),
        ]
    }

    /// Build a tiny-skia paint of this colour
    pub fn to_paint(self, anti_alias: bool) -> tiny_skia::Paint<'static> {
        let [r, g, b, a] = self.to_rgba_u8();
        let mut paint = tiny_skia::Paint::default();
        paint.set_color_rgba8(r, g, b, a);
        paint.anti_alias = anti_alias;
        paint
    }
}

/// Fill paint covering everything outside the holes
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BackdropPaint {
    pub color: Argb,
    pub anti_alias: bool,
}

impl Default for BackdropPaint {
    fn default() -> Self {
        Self {
            color: DEFAULT_BACKDROP,
            anti_alias: false,
        }
    }
}

/// Paint used for mark labels
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TextStyle {
    pub color: Argb,
    /// Text size in device pixels
    pub size: f32,
    pub anti_alias: bool,
    /// Thicken glyphs when the font has no bold face
    pub fake_bold: bool,
}

impl Default for TextStyle {
    fn default() -> Self {
        Self {
            color: Argb(0xFF00_FF00),
            size: 40.0,
            anti_alias: true,
            fake_bold: true,
        }
    }
}

/// Translucent black
pub const DEFAULT_BACKDROP: Argb = Argb(0x7700_0000);

/// Paint settings for an overlay instance
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OverlayConfig {
    pub backdrop: BackdropPaint,
    pub text: TextStyle,
    /// TrueType/OpenType font used by the headless renderer for labels
    pub font_path: Option<PathBuf>,
}

impl OverlayConfig {
    /// Read configuration from a JSON file
    pub fn from_file(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let config = serde_json::from_str(&json)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
        Ok(config)
    }

    /// Load configuration from disk, or return defaults if unavailable
    pub fn load(path: &Path) -> Self {
        match Self::from_file(path) {
            Ok(config) => config,
            Err(err) => {
                log::warn!("Error loading config, using defaults: {:#}", err);
                Self::default()
            }
        }
    }

    /// Config with a different backdrop colour
    pub fn with_backdrop_color(mut self, color: Argb) -> Self {
        self.backdrop.color = color;
        self
    }
}
