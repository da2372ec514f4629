use bytemuck::{Pod, Zeroable};

use crate::scene::{DrawCmd, DrawList};

/// GPU instance for one quad: four corners + premultiplied color.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct QuadInstance {
    pub corners: [[f32; 2]; 4],
    pub color: [f32; 4],
}

/// GPU instance for one circle.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct CircleInstance {
    pub center: [f32; 2],
    pub radius: f32,
    pub _pad: f32, // 16-byte alignment
    pub color: [f32; 4],
}

/// Per-frame instance arrays in paint order.
///
/// Buffers are reused across frames; call [`rebuild`](Self::rebuild) once per
/// frame after the draw list is recorded.
#[derive(Debug, Default)]
pub struct InstanceBatch {
    quads: Vec<QuadInstance>,
    circles: Vec<CircleInstance>,
    skipped: usize,
}

impl InstanceBatch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Re-fills the instance arrays from `draw_list`.
    ///
    /// Commands with non-finite coordinates are dropped (counted in
    /// [`skipped`](Self::skipped)) so a single bad input cannot poison the
    /// whole upload.
    pub fn rebuild(&mut self, draw_list: &mut DrawList) {
        self.quads.clear();
        self.circles.clear();
        self.skipped = 0;

        for item in draw_list.iter_in_paint_order() {
            match &item.cmd {
                DrawCmd::Quad(q) => {
                    if !q.corners.iter().all(|c| c.is_finite()) || !q.color.is_finite() {
                        self.skipped += 1;
                        continue;
                    }
                    self.quads.push(QuadInstance {
                        corners: q.corners.map(|c| [c.x, c.y]),
                        color: q.color.to_array(),
                    });
                }
                DrawCmd::Circle(c) => {
                    if !c.center.is_finite() || !c.radius.is_finite() || !c.color.is_finite() {
                        self.skipped += 1;
                        continue;
                    }
                    self.circles.push(CircleInstance {
                        center: [c.center.x, c.center.y],
                        radius: c.radius,
                        _pad: 0.0,
                        color: c.color.to_array(),
                    });
                }
            }
        }

        if self.skipped > 0 {
            log::debug!("InstanceBatch: dropped {} non-finite draw commands", self.skipped);
        }
    }

    #[inline]
    pub fn quads(&self) -> &[QuadInstance] {
        &self.quads
    }

    #[inline]
    pub fn circles(&self) -> &[CircleInstance] {
        &self.circles
    }

    #[inline]
    pub fn skipped(&self) -> usize {
        self.skipped
    }

    /// Raw bytes of the quad instance array, ready for upload.
    #[inline]
    pub fn quad_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.quads)
    }

    /// Raw bytes of the circle instance array, ready for upload.
    #[inline]
    pub fn circle_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.circles)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coords::Vec2;
    use crate::paint::Color;
    use crate::scene::ZIndex;

    #[test]
    fn splits_commands_by_kind() {
        let mut list = DrawList::new();
        list.push_solid_circle(ZIndex::STARS, Vec2::new(4.0, 5.0), 2.0, Color::white());
        list.push_solid_quad(ZIndex::PATHS, [Vec2::zero(); 4], Color::white());

        let mut batch = InstanceBatch::new();
        batch.rebuild(&mut list);
        assert_eq!(batch.quads().len(), 1);
        assert_eq!(batch.circles().len(), 1);
        assert_eq!(batch.circles()[0].center, [4.0, 5.0]);
        assert_eq!(batch.quad_bytes().len(), std::mem::size_of::<QuadInstance>());
        assert_eq!(batch.circle_bytes().len(), std::mem::size_of::<CircleInstance>());
        assert_eq!(std::mem::size_of::<CircleInstance>(), 32);
    }

    #[test]
    fn drops_non_finite_geometry() {
        let mut list = DrawList::new();
        list.push_solid_circle(ZIndex::STARS, Vec2::new(f32::NAN, 0.0), 1.0, Color::white());

        let mut batch = InstanceBatch::new();
        batch.rebuild(&mut list);
        assert!(batch.circles().is_empty());
        assert_eq!(batch.skipped(), 1);
    }
}
