//! Scene (draw stream) types.
//!
//! Responsibilities:
//! - store renderer-agnostic draw commands produced by the map each frame
//! - provide deterministic ordering (layer + insertion order)
//! - keep shape-specific helpers isolated per shape file under `scene::shapes`

mod cmd;
mod layer;
mod list;

pub mod shapes;

pub use cmd::DrawCmd;
pub use layer::{SortKey, ZIndex};
pub use list::{DrawItem, DrawList};
