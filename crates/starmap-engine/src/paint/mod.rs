//! Paint model shared between the map core and renderers.
//!
//! Map geometry is solid-filled; the only paint source is a linear
//! premultiplied [`Color`].

pub mod color;

pub use color::{Color, ColorParseError};
