//! Host surface contract
//!
//! The overlay never talks to a window system directly. A host adapter
//! inserts and removes drawing surfaces, schedules their paint callbacks,
//! delivers taps, and reports where its own elements are on screen.

use std::fmt;

use crate::domain::Rect;
use crate::render::Canvas;

/// Identifier of a surface inserted into a host
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SurfaceId(pub u64);

impl fmt::Display for SurfaceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "surface#{}", self.0)
    }
}

/// What the host should do after delivering a tap
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TapResponse {
    /// The tap was consumed; keep the surface
    Handled,
    /// Remove the surface from the root
    Dismiss,
}

/// Callbacks a host invokes on an inserted surface
pub trait SurfaceDelegate {
    /// Paint a frame. `size` is in device pixels, `scale` maps logical units to them.
    fn paint(&self, canvas: &mut dyn Canvas, size: (u32, u32), scale: f32);

    /// A tap landed on the surface
    fn tap(&self) -> TapResponse;
}

/// Capabilities the overlay needs from the host platform
pub trait HostSurfaceProvider {
    /// Host-side handle for an on-screen element
    type Element: ?Sized;

    /// Insert a transparent, input-capturing surface spanning the root bounds
    fn insert_surface(&mut self, delegate: Box<dyn SurfaceDelegate>) -> SurfaceId;

    /// Remove a previously inserted surface; unknown ids are ignored
    fn remove_surface(&mut self, id: SurfaceId);

    /// Ask for `id` to be painted on the next paint cycle
    fn request_redraw(&mut self, id: SurfaceId);

    /// Bounding rectangle of `element` relative to the root, `None` while it
    /// is not attached
    fn element_bounds(&self, element: &Self::Element) -> Option<Rect>;
}

/// Resolve an element to overlay-local coordinates.
///
/// Returns an empty rectangle when the host cannot place the element yet;
/// call this only after the host's layout pass.
pub fn resolve_on_screen_rect<H: HostSurfaceProvider + ?Sized>(
    host: &H,
    element: &H::Element,
) -> Rect {
    host.element_bounds(element).unwrap_or_else(|| {
        log::debug!("Element has no on-screen bounds yet, using an empty rectangle");
        Rect::default()
    })
}
