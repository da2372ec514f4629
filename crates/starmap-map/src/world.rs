//! World objects as the map sees them.
//!
//! The simulation layer hands over plain snapshots; the map keeps only ids and
//! locations. Rendering nodes stay with the host and are reached through LOD
//! callbacks.

use core::fmt;

use starmap_engine::coords::{Bounds, Vec2};
use starmap_engine::paint::Color;

/// Opaque simulation id of a star or mover.
///
/// The total order on ids is what makes path keys direction-independent.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct EntityId(pub u64);

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum ObjectKind {
    Star,
    Mover,
}

/// A stationary or moving entity placed on the map.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct WorldObject {
    pub id: EntityId,
    pub location: Vec2,
    pub kind: ObjectKind,
}

impl WorldObject {
    #[inline]
    pub fn star(id: u64, x: f32, y: f32) -> Self {
        Self { id: EntityId(id), location: Vec2::new(x, y), kind: ObjectKind::Star }
    }

    #[inline]
    pub fn mover(id: u64, x: f32, y: f32) -> Self {
        Self { id: EntityId(id), location: Vec2::new(x, y), kind: ObjectKind::Mover }
    }
}

/// One hop of a mover's route.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Leg {
    pub source: EntityId,
    pub dest: EntityId,
}

impl Leg {
    #[inline]
    pub fn new(source: u64, dest: u64) -> Self {
        Self { source: EntityId(source), dest: EntityId(dest) }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct StarSnapshot {
    pub id: EntityId,
    pub location: Vec2,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MoverSnapshot {
    pub id: EntityId,
    pub location: Vec2,
    pub route: Vec<Leg>,
    /// Looped routes return to their start and are drawn as shared paths.
    pub looped: bool,
}

/// Full simulation state handed to the map on reload.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WorldSnapshot {
    pub stars: Vec<StarSnapshot>,
    pub movers: Vec<MoverSnapshot>,
}

impl WorldSnapshot {
    /// Every star and mover as a [`WorldObject`], stars first.
    pub fn objects(&self) -> impl Iterator<Item = WorldObject> + '_ {
        let stars = self.stars.iter().map(|s| WorldObject {
            id: s.id,
            location: s.location,
            kind: ObjectKind::Star,
        });
        let movers = self.movers.iter().map(|m| WorldObject {
            id: m.id,
            location: m.location,
            kind: ObjectKind::Mover,
        });
        stars.chain(movers)
    }

    /// Union of star and mover coordinates, `None` for an empty world.
    pub fn bounds(&self) -> Option<Bounds> {
        Bounds::from_points(self.objects().map(|o| o.location))
    }
}

/// Resolved path endpoint.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Endpoint {
    pub id: EntityId,
    pub location: Vec2,
}

/// Location lookup for path endpoints.
///
/// A `None` answer means the entity vanished between frames; path builders
/// skip the segment instead of failing.
pub trait EndpointSource {
    fn endpoint(&self, id: EntityId) -> Option<Endpoint>;
}

/// Presentation inputs for path drawing.
///
/// These come from the host's presentation settings and are treated as opaque
/// numbers; the defaults give full alpha and no owner colour.
pub trait Presentation {
    /// Depth-based alpha of the edge between `a` and `b`, in [0, 1].
    fn depth_alpha(&self, a: EntityId, b: EntityId) -> f32 {
        let _ = (a, b);
        1.0
    }

    /// Colour of whoever owns `id`, if it has one.
    fn owning_colour(&self, id: EntityId) -> Option<Color> {
        let _ = id;
        None
    }
}

/// Everything a path builder needs: endpoints plus presentation.
pub trait PathEnvironment: EndpointSource + Presentation {}

impl<T: EndpointSource + Presentation + ?Sized> PathEnvironment for T {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snapshot_bounds_cover_stars_and_movers() {
        let snapshot = WorldSnapshot {
            stars: vec![StarSnapshot { id: EntityId(1), location: Vec2::new(0.0, 0.0) }],
            movers: vec![MoverSnapshot {
                id: EntityId(2),
                location: Vec2::new(-50.0, 900.0),
                route: vec![],
                looped: false,
            }],
        };
        let b = snapshot.bounds().unwrap();
        assert_eq!(b.min, Vec2::new(-50.0, 0.0));
        assert_eq!(b.max, Vec2::new(0.0, 900.0));
    }

    #[test]
    fn empty_snapshot_has_no_bounds() {
        assert!(WorldSnapshot::default().bounds().is_none());
    }
}
