use crate::coords::Vec2;
use crate::paint::Color;
use crate::scene::{DrawCmd, DrawList, ZIndex};

/// Filled circle payload; the map uses it for star and mover markers.
#[derive(Debug, Clone, PartialEq)]
pub struct CircleCmd {
    pub center: Vec2,
    pub radius: f32,
    pub color: Color,
}

impl DrawList {
    /// Records a solid circle.
    #[inline]
    pub fn push_solid_circle(&mut self, z: ZIndex, center: Vec2, radius: f32, color: Color) {
        self.push(z, DrawCmd::Circle(CircleCmd { center, radius, color }));
    }
}
