use super::{Rect, Vec2};

/// Screen viewport size in logical pixels.
///
/// Map hosts pass this each frame together with the camera; the world-space
/// view rectangle is derived from it with [`world_rect`](Self::world_rect).
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

impl Viewport {
    #[inline]
    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    #[inline]
    pub fn is_valid(self) -> bool {
        self.width > 0.0 && self.height > 0.0 && self.width.is_finite() && self.height.is_finite()
    }

    /// World-space rectangle seen through this viewport.
    ///
    /// `origin` is the world position of the top-left screen corner and `scale`
    /// is screen pixels per world unit (1.0 = 100% zoom).
    #[inline]
    pub fn world_rect(self, origin: Vec2, scale: f32) -> Rect {
        debug_assert!(scale > 0.0, "Viewport::world_rect: non-positive scale {scale}");
        Rect::from_origin_size(origin, Vec2::new(self.width / scale, self.height / scale))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zooming_in_shrinks_world_rect() {
        let vp = Viewport::new(800.0, 600.0);
        let r = vp.world_rect(Vec2::new(100.0, 50.0), 2.0);
        assert_eq!(r, Rect::new(100.0, 50.0, 400.0, 300.0));
    }

    #[test]
    fn zero_size_is_invalid() {
        assert!(!Viewport::new(0.0, 10.0).is_valid());
        assert!(Viewport::new(1.0, 1.0).is_valid());
    }
}
