//! Coach mark overlays
//!
//! Dims a host surface with a translucent backdrop, punches transparent
//! holes over the regions being highlighted, and labels each one.
//!
//! ```no_run
//! use coachmarks::{CoachMarks, HeadlessHost, Position, Rect};
//! use coachmarks::config::Argb;
//!
//! let mut host = HeadlessHost::new(400, 300, 2.0)?;
//! let overlay = CoachMarks::new()
//!     .create(Some(Argb(0x8800_0000)), None)
//!     .add(Rect::new(10.0, 10.0, 80.0, 24.0), "Start here", Some(Position::BELOW))
//!     .show(&mut host);
//! host.paint_pending();
//! # drop(overlay);
//! # Ok::<(), anyhow::Error>(())
//! ```

pub mod config;
pub mod core;
pub mod domain;
pub mod headless;
pub mod render;
pub mod scene;

pub use config::OverlayConfig;
pub use crate::core::{CoachMarks, HostSurfaceProvider, OverlayInstance, OverlayState};
pub use domain::{HoleShape, Mark, Position, Rect};
pub use headless::HeadlessHost;
