use crate::scene::shapes::circle::CircleCmd;
use crate::scene::shapes::quad::QuadCmd;

/// Renderer-agnostic draw command stream.
///
/// Extending the scene:
/// - add a new shape module under `scene::shapes::*`
/// - add a new variant here
/// - implement push helpers inside that shape module
/// - add a matching batcher under `render::*`
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCmd {
    /// Arbitrary convex quad; path segments after rotation.
    Quad(QuadCmd),
    Circle(CircleCmd),
}
