use crate::coords::Vec2;
use crate::paint::Color;
use crate::scene::{DrawCmd, DrawList, ZIndex};

/// Convex quad payload in world units.
///
/// Corners are in winding order. Path segments are emitted as quads because
/// they are rotated rectangles, which an axis-aligned rect cannot express.
#[derive(Debug, Clone, PartialEq)]
pub struct QuadCmd {
    pub corners: [Vec2; 4],
    pub color: Color,
}

impl QuadCmd {
    /// Axis-aligned bounds of the four corners as `(min, max)`.
    pub fn extent(&self) -> (Vec2, Vec2) {
        let [a, b, c, d] = self.corners;
        (a.min(b).min(c).min(d), a.max(b).max(c).max(d))
    }
}

impl DrawList {
    /// Records a solid quad draw command.
    #[inline]
    pub fn push_solid_quad(&mut self, z: ZIndex, corners: [Vec2; 4], color: Color) {
        self.push(z, DrawCmd::Quad(QuadCmd { corners, color }));
    }
}
