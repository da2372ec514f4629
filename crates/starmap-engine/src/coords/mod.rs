//! Coordinate and geometry types shared by the map core and renderers.
//!
//! Canonical CPU space:
//! - World units (the simulation's coordinate system)
//! - Origin top-left
//! - +X right, +Y down
//!
//! Screen-space sizes (`Viewport`) are converted to world space by dividing by
//! the zoom scale.

mod bounds;
mod rect;
mod vec2;
mod viewport;

pub use bounds::Bounds;
pub use rect::Rect;
pub use vec2::Vec2;
pub use viewport::Viewport;
