use super::Vec2;

/// World-space rectangle, `origin` at the top-left corner.
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct Rect {
    pub origin: Vec2,
    pub size: Vec2,
}

impl Rect {
    #[inline]
    pub const fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self::from_origin_size(Vec2::new(x, y), Vec2::new(w, h))
    }

    #[inline]
    pub const fn from_origin_size(origin: Vec2, size: Vec2) -> Self {
        Self { origin, size }
    }

    /// Bottom-right corner.
    #[inline]
    pub fn max(self) -> Vec2 {
        self.origin + self.size
    }

    /// Same area with a non-negative size; a negative extent flips the origin
    /// to the opposite edge.
    pub fn normalized(self) -> Self {
        let min = self.origin.min(self.max());
        let max = self.origin.max(self.max());
        Self::from_origin_size(min, max - min)
    }
}
