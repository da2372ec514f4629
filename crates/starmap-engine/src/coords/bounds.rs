use super::Vec2;

/// Closed axis-aligned bounds `[min, max]` over a set of world points.
///
/// Both edges are inclusive: a point sitting exactly on `max` belongs to the
/// extent.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Bounds {
    pub min: Vec2,
    pub max: Vec2,
}

impl Bounds {
    #[inline]
    pub const fn new(min: Vec2, max: Vec2) -> Self {
        Self { min, max }
    }

    /// Degenerate bounds containing exactly `p`.
    #[inline]
    pub const fn point(p: Vec2) -> Self {
        Self { min: p, max: p }
    }

    /// Smallest bounds containing every point, or `None` for an empty iterator.
    pub fn from_points<I>(points: I) -> Option<Self>
    where
        I: IntoIterator<Item = Vec2>,
    {
        let mut iter = points.into_iter();
        let first = iter.next()?;
        Some(iter.fold(Self::point(first), |b, p| b.including(p)))
    }

    #[inline]
    pub fn including(self, p: Vec2) -> Self {
        Self { min: self.min.min(p), max: self.max.max(p) }
    }

    #[inline]
    pub fn is_finite(self) -> bool {
        self.min.is_finite() && self.max.is_finite()
    }
}
