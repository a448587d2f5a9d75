//! In-process host backed by tiny-skia pixmaps
//!
//! Stands in for a window system: surfaces are pixmaps stacked over a root of
//! fixed size, redraws are queued until `paint_pending`, and taps go to the
//! topmost surface.

use std::collections::HashMap;

use ab_glyph::FontArc;
use anyhow::{Result, ensure};
use tiny_skia::{Pixmap, PixmapPaint, Transform};

use crate::config::{Argb, BackdropPaint};
use crate::core::{HostSurfaceProvider, SurfaceDelegate, SurfaceId, TapResponse};
use crate::domain::Rect;
use crate::render::{Canvas, PixmapCanvas, geometry};

/// Fill used for host elements in snapshots
pub const ELEMENT_COLOR: Argb = Argb(0xFFD0_D0D0);

struct HostedSurface {
    id: SurfaceId,
    delegate: Box<dyn SurfaceDelegate>,
    canvas: Option<PixmapCanvas>,
    dirty: bool,
}

/// Host root with its own content and any overlay surfaces inserted on top
pub struct HeadlessHost {
    width: u32,
    height: u32,
    scale: f32,
    background: Argb,
    /// Element bounds in logical units; `None` while not attached
    elements: HashMap<String, Option<Rect>>,
    /// Bottom to top
    surfaces: Vec<HostedSurface>,
    next_id: u64,
    redraw_requests: usize,
    font: Option<FontArc>,
}

impl HeadlessHost {
    /// Root of `width` x `height` device pixels at `scale` pixels per logical unit
    pub fn new(width: u32, height: u32, scale: f32) -> Result<Self> {
        ensure!(width > 0 && height > 0, "Root size must be non-zero, got {width}x{height}");
        ensure!(scale > 0.0, "Scale factor must be positive, got {scale}");
        Ok(Self {
            width,
            height,
            scale,
            background: Argb(0xFFFF_FFFF),
            elements: HashMap::new(),
            surfaces: Vec::new(),
            next_id: 1,
            redraw_requests: 0,
            font: None,
        })
    }

    /// Colour of the root content behind the overlay
    pub fn with_background(mut self, background: Argb) -> Self {
        self.background = background;
        self
    }

    /// Font handed to every surface canvas for label rasterization
    pub fn with_font(mut self, font: Option<FontArc>) -> Self {
        self.font = font;
        self
    }

    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn scale(&self) -> f32 {
        self.scale
    }

    /// Place a named element in the root, in logical units
    pub fn register_element(&mut self, name: impl Into<String>, bounds: Rect) {
        self.elements.insert(name.into(), Some(bounds));
    }

    /// Declare an element that exists but has not been laid out yet
    pub fn register_unattached_element(&mut self, name: impl Into<String>) {
        self.elements.insert(name.into(), None);
    }

    pub fn surface_count(&self) -> usize {
        self.surfaces.len()
    }

    pub fn contains_surface(&self, id: SurfaceId) -> bool {
        self.surfaces.iter().any(|s| s.id == id)
    }

    /// Number of redraw requests received so far
    pub fn redraw_requests(&self) -> usize {
        self.redraw_requests
    }

    /// Whether any surface is waiting to be painted
    pub fn has_pending(&self) -> bool {
        self.surfaces.iter().any(|s| s.dirty)
    }

    /// Run one paint cycle over every dirty surface, returning how many were painted
    pub fn paint_pending(&mut self) -> usize {
        let (width, height, scale) = (self.width, self.height, self.scale);
        let mut painted = 0;

        for surface in self.surfaces.iter_mut().filter(|s| s.dirty) {
            if surface.canvas.is_none() {
                surface.canvas = PixmapCanvas::new(width, height).map(|mut canvas| {
                    canvas.set_font(self.font.clone());
                    canvas
                });
            }
            let Some(canvas) = surface.canvas.as_mut() else {
                log::error!("Could not allocate a {}x{} canvas for {}", width, height, surface.id);
                continue;
            };

            surface.delegate.paint(canvas, (width, height), scale);
            surface.dirty = false;
            painted += 1;
        }

        painted
    }

    /// Last painted frame of a surface
    pub fn frame(&self, id: SurfaceId) -> Option<&PixmapCanvas> {
        self.surfaces
            .iter()
            .find(|s| s.id == id)
            .and_then(|s| s.canvas.as_ref())
    }

    /// Deliver a tap to the topmost surface.
    ///
    /// Returns `None` when no surface is inserted. A surface whose delegate
    /// answers `Dismiss` is removed.
    pub fn tap(&mut self) -> Option<TapResponse> {
        let top = self.surfaces.last()?;
        let id = top.id;
        let response = top.delegate.tap();
        if response == TapResponse::Dismiss {
            self.remove_surface(id);
        }
        Some(response)
    }

    /// Root content with every painted surface composited on top
    pub fn snapshot(&self) -> Option<Pixmap> {
        let mut root = PixmapCanvas::new(self.width, self.height)?;
        let full = geometry::skia_rect(Rect::new(0.0, 0.0, self.width as f32, self.height as f32))?;
        root.fill_rect(
            full,
            &BackdropPaint {
                color: self.background,
                anti_alias: false,
            },
        );

        let element_paint = BackdropPaint {
            color: ELEMENT_COLOR,
            anti_alias: false,
        };
        for bounds in self.elements.values().flatten() {
            if let Some(rect) = geometry::skia_rect(bounds.scale(self.scale)) {
                root.fill_rect(rect, &element_paint);
            }
        }

        let mut pixmap = root.into_pixmap();
        for canvas in self.surfaces.iter().filter_map(|s| s.canvas.as_ref()) {
            pixmap.draw_pixmap(
                0,
                0,
                canvas.pixmap().as_ref(),
                &PixmapPaint::default(),
                Transform::identity(),
                None,
            );
        }
        Some(pixmap)
    }
}

impl HostSurfaceProvider for HeadlessHost {
    type Element = str;

    fn insert_surface(&mut self, delegate: Box<dyn SurfaceDelegate>) -> SurfaceId {
        let id = SurfaceId(self.next_id);
        self.next_id += 1;
        self.surfaces.push(HostedSurface {
            id,
            delegate,
            canvas: None,
            dirty: false,
        });
        log::debug!("Inserted {} ({}x{} @ {})", id, self.width, self.height, self.scale);
        id
    }

    fn remove_surface(&mut self, id: SurfaceId) {
        let before = self.surfaces.len();
        self.surfaces.retain(|s| s.id != id);
        if self.surfaces.len() == before {
            log::debug!("Ignoring removal of unknown {}", id);
        } else {
            log::debug!("Removed {}", id);
        }
    }

    fn request_redraw(&mut self, id: SurfaceId) {
        self.redraw_requests += 1;
        match self.surfaces.iter_mut().find(|s| s.id == id) {
            Some(surface) => surface.dirty = true,
            None => log::debug!("Redraw requested for unknown {}", id),
        }
    }

    fn element_bounds(&self, element: &str) -> Option<Rect> {
        self.elements.get(element).copied().flatten()
    }
}
