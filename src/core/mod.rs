//! Overlay lifecycle and the host contract it is driven through

pub mod host;
pub mod overlay;

pub use host::{
    HostSurfaceProvider, SurfaceDelegate, SurfaceId, TapResponse, resolve_on_screen_rect,
};
pub use overlay::{CoachMarks, OverlayInstance, OverlayState, TouchCallback};
