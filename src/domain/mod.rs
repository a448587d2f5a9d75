//! Pure domain types with minimal dependencies
//!
//! Types here carry no drawing-backend dependencies so the host adapters and
//! the renderer can share them.

pub mod geometry;
pub mod mark;

pub use geometry::*;
pub use mark::*;
