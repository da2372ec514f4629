//! Starmap engine crate.
//!
//! Renderer-agnostic primitives shared by the map core and its hosts:
//! world-space geometry, premultiplied colors, the draw stream, CPU-side
//! instance batching, frame timing and logger setup.

pub mod time;

pub mod logging;
pub mod coords;
pub mod render;
pub mod paint;
pub mod scene;
