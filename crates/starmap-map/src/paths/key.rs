use core::fmt;

use crate::world::EntityId;

/// Direction-independent identity of an edge between two entities.
///
/// Endpoints are stored in descending order, so `new(a, b) == new(b, a)`.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PathKey {
    hi: EntityId,
    lo: EntityId,
}

impl PathKey {
    #[inline]
    pub fn new(a: EntityId, b: EntityId) -> Self {
        if a >= b { Self { hi: a, lo: b } } else { Self { hi: b, lo: a } }
    }

    #[inline]
    pub fn hi(self) -> EntityId {
        self.hi
    }

    #[inline]
    pub fn lo(self) -> EntityId {
        self.lo
    }

    /// Whether `id` is one of the two endpoints.
    #[inline]
    pub fn touches(self, id: EntityId) -> bool {
        self.hi == id || self.lo == id
    }
}

impl fmt::Display for PathKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.hi, self.lo)
    }
}
