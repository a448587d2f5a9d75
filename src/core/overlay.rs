//! Overlay lifecycle: building marks, attaching to a host, redraw and dismissal

use std::cell::{Ref, RefCell};
use std::rc::Rc;

use super::host::{self, HostSurfaceProvider, SurfaceDelegate, SurfaceId, TapResponse};
use crate::config::{Argb, OverlayConfig};
use crate::domain::{Annotation, HoleShape, Mark, Position, Rect};
use crate::render::{Canvas, MarkRegistry};

/// Callback that replaces tap-to-dismiss; its response decides whether the
/// surface stays
pub type TouchCallback = Box<dyn FnMut() -> TapResponse>;

/// Lifecycle of an overlay instance
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OverlayState {
    /// No surface created yet
    Unattached,
    /// Surface inserted and its last frame painted
    AttachedIdle(SurfaceId),
    /// Surface inserted with a redraw pending
    AttachedDirty(SurfaceId),
    /// Surface removed; the instance must not be reused
    Detached,
}

impl OverlayState {
    /// Surface currently owned by the overlay
    pub fn surface(self) -> Option<SurfaceId> {
        match self {
            OverlayState::AttachedIdle(id) | OverlayState::AttachedDirty(id) => Some(id),
            OverlayState::Unattached | OverlayState::Detached => None,
        }
    }

    pub fn is_attached(self) -> bool {
        self.surface().is_some()
    }
}

/// State shared between the instance and the delegate the host holds
struct Shared {
    marks: MarkRegistry,
    config: OverlayConfig,
    on_touch: Option<TouchCallback>,
    state: OverlayState,
}

/// Paint and tap callbacks registered with the host
struct OverlayDelegate {
    shared: Rc<RefCell<Shared>>,
}

impl SurfaceDelegate for OverlayDelegate {
    fn paint(&self, canvas: &mut dyn Canvas, size: (u32, u32), scale: f32) {
        let mut shared = self.shared.borrow_mut();
        shared.marks.composite(canvas, size, scale, &shared.config);
        if let OverlayState::AttachedDirty(id) = shared.state {
            shared.state = OverlayState::AttachedIdle(id);
        }
    }

    fn tap(&self) -> TapResponse {
        // Released before the call so the callback can reach its own overlay
        let on_touch = self.shared.borrow_mut().on_touch.take();
        let response = match on_touch {
            Some(mut on_touch) => {
                let response = on_touch();
                let mut shared = self.shared.borrow_mut();
                if shared.on_touch.is_none() {
                    shared.on_touch = Some(on_touch);
                }
                response
            }
            None => TapResponse::Dismiss,
        };

        if response == TapResponse::Dismiss {
            log::debug!("Overlay tapped, dismissing");
            self.shared.borrow_mut().state = OverlayState::Detached;
        }
        response
    }
}

/// Factory for overlay instances
#[derive(Debug, Clone, Default)]
pub struct CoachMarks {
    defaults: OverlayConfig,
}

impl CoachMarks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Factory whose instances start from `defaults`
    pub fn with_config(defaults: OverlayConfig) -> Self {
        Self { defaults }
    }

    /// Create an unattached overlay.
    ///
    /// `backdrop_color` overrides the default translucent black. Without
    /// `on_touch` a tap removes the overlay; with it, the callback's response
    /// decides.
    pub fn create(
        &self,
        backdrop_color: Option<Argb>,
        on_touch: Option<TouchCallback>,
    ) -> OverlayInstance {
        let mut config = self.defaults.clone();
        if let Some(color) = backdrop_color {
            config.backdrop.color = color;
        }
        OverlayInstance::new(config, on_touch)
    }
}

/// One overlay: its marks, paint configuration and attached surface
pub struct OverlayInstance {
    shared: Rc<RefCell<Shared>>,
}

impl OverlayInstance {
    pub fn new(config: OverlayConfig, on_touch: Option<TouchCallback>) -> Self {
        Self {
            shared: Rc::new(RefCell::new(Shared {
                marks: MarkRegistry::new(),
                config,
                on_touch,
                state: OverlayState::Unattached,
            })),
        }
    }

    /// Add a mark with a rectangular hole.
    ///
    /// Marks added after `show` appear on the next `invalidate`.
    pub fn add(self, rect: Rect, text: impl Into<String>, position: Option<Position>) -> Self {
        self.add_with_hole(rect, HoleShape::default(), text, position)
    }

    /// Add a mark with an explicit hole shape
    pub fn add_with_hole(
        self,
        rect: Rect,
        hole: HoleShape,
        text: impl Into<String>,
        position: Option<Position>,
    ) -> Self {
        self.add_mark(Mark::new(rect, hole, Annotation::text(text, position)))
    }

    /// Add a mark over a host element, resolved through the host.
    ///
    /// Call after the host's layout pass; an unplaced element yields an empty
    /// hole.
    pub fn add_element<H: HostSurfaceProvider + ?Sized>(
        self,
        host: &H,
        element: &H::Element,
        text: impl Into<String>,
        position: Option<Position>,
    ) -> Self {
        let rect = host::resolve_on_screen_rect(host, element);
        self.add(rect, text, position)
    }

    /// Add a fully built mark
    pub fn add_mark(self, mark: Mark) -> Self {
        {
            let mut shared = self.shared.borrow_mut();
            if shared.state == OverlayState::Detached {
                log::warn!("Ignoring mark added to a detached overlay");
                debug_assert!(false, "mark added to a detached overlay");
            } else {
                shared.marks.push(mark);
            }
        }
        self
    }

    /// Attach to the host on first call, request a redraw on every call
    pub fn show<H: HostSurfaceProvider + ?Sized>(self, host: &mut H) -> Self {
        match self.state() {
            OverlayState::Unattached => {
                let delegate = OverlayDelegate {
                    shared: Rc::clone(&self.shared),
                };
                let id = host.insert_surface(Box::new(delegate));
                log::debug!("Overlay attached as {}", id);
                self.shared.borrow_mut().state = OverlayState::AttachedIdle(id);
            }
            OverlayState::Detached => {
                log::warn!("Ignoring show on a detached overlay");
                debug_assert!(false, "show called on a detached overlay");
                return self;
            }
            OverlayState::AttachedIdle(_) | OverlayState::AttachedDirty(_) => {}
        }

        self.invalidate(host);
        self
    }

    /// Ask the host to repaint the surface. No-op unless attached.
    pub fn invalidate<H: HostSurfaceProvider + ?Sized>(&self, host: &mut H) {
        let id = {
            let mut shared = self.shared.borrow_mut();
            let Some(id) = shared.state.surface() else {
                return;
            };
            shared.state = OverlayState::AttachedDirty(id);
            id
        };
        log::trace!("Redraw requested for {}", id);
        host.request_redraw(id);
    }

    /// Remove the surface from the host. No-op unless attached.
    pub fn dismiss<H: HostSurfaceProvider + ?Sized>(&self, host: &mut H) {
        let id = {
            let mut shared = self.shared.borrow_mut();
            let Some(id) = shared.state.surface() else {
                return;
            };
            shared.state = OverlayState::Detached;
            id
        };
        log::debug!("Overlay dismissed, removing {}", id);
        host.remove_surface(id);
    }

    pub fn state(&self) -> OverlayState {
        self.shared.borrow().state
    }

    /// Marks in insertion order
    pub fn marks(&self) -> Ref<'_, [Mark]> {
        Ref::map(self.shared.borrow(), |shared| shared.marks.as_slice())
    }

    pub fn config(&self) -> Ref<'_, OverlayConfig> {
        Ref::map(self.shared.borrow(), |shared| &shared.config)
    }
}
