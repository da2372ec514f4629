//! Shared and unique path registry.
//!
//! Every path node lives in one arena keyed by [`PathHandle`]. Shared paths
//! are additionally registered under their [`PathKey`] with the set of
//! carriers travelling the edge; a shared path exists iff that set is
//! non-empty. Unique paths belong to exactly one mover.
//!
//! Nodes are homed either in a chunk of the path grid (both endpoints in the
//! same chunk) or in the chunkless set, which is never culled.

use std::collections::{BTreeSet, HashMap};
use std::fmt;

use starmap_engine::coords::{Bounds, Rect, Vec2};
use starmap_engine::paint::Color;
use starmap_engine::scene::{DrawList, ZIndex};

use crate::chunk::{ChunkCoord, ChunkGrid, CullCounts};
use crate::config::{PathConfig, PathStyle};
use crate::paths::geometry::PathGeometry;
use crate::paths::key::PathKey;
use crate::paths::scale::y_scale;
use crate::world::{EntityId, PathEnvironment};

/// Alpha added per carrier of a shared path.
pub const ALPHA_PER_CARRIER: f32 = 0.1;

/// Arena handle of a path node.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PathHandle(u64);

impl PathHandle {
    #[inline]
    pub fn raw(self) -> u64 {
        self.0
    }
}

impl fmt::Display for PathHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "path#{}", self.0)
    }
}

/// Container a path node is drawn from.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum PathHost {
    Chunk(ChunkCoord),
    /// Spans chunks; always drawn, rescaled on every non-idle tick.
    Chunkless,
}

/// Registry entry of a shared path.
#[derive(Debug, Clone)]
pub struct SharedPath {
    key: PathKey,
    handle: PathHandle,
    members: BTreeSet<EntityId>,
    depth_alpha: f32,
}

impl SharedPath {
    #[inline]
    pub fn key(&self) -> PathKey {
        self.key
    }

    #[inline]
    pub fn handle(&self) -> PathHandle {
        self.handle
    }

    /// Carriers currently travelling the edge, ascending.
    pub fn members(&self) -> impl Iterator<Item = EntityId> + '_ {
        self.members.iter().copied()
    }

    #[inline]
    pub fn member_count(&self) -> usize {
        self.members.len()
    }

    #[inline]
    pub fn contains(&self, carrier: EntityId) -> bool {
        self.members.contains(&carrier)
    }
}

#[derive(Debug, Copy, Clone)]
struct UniquePath {
    owner: EntityId,
}

#[derive(Debug, Clone)]
struct Node {
    geometry: PathGeometry,
    from: Vec2,
    to: Vec2,
    host: PathHost,
}

/// Outcome of one [`PathCache::on_tick`].
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub struct PathTickReport {
    pub idle: bool,
    pub chunks: CullCounts,
    /// Paths whose y-scale was recomputed this tick.
    pub rescaled: usize,
}

/// Owner of all path geometry.
pub struct PathCache {
    config: PathConfig,
    colour: Color,
    chunk_size: f32,
    grid: Option<ChunkGrid<PathHandle>>,
    nodes: HashMap<PathHandle, Node>,
    next_handle: u64,
    shared: HashMap<PathKey, SharedPath>,
    unique: HashMap<PathHandle, UniquePath>,
    chunkless: BTreeSet<PathHandle>,
    stale: bool,
    zoom_percent: f32,
    /// Mutations outside the current grid, including those of replaced grids.
    mutations: u64,
    refresh_buf: Vec<ChunkCoord>,
}

impl PathCache {
    pub fn new(config: PathConfig, chunk_size: f32) -> Self {
        let colour = config.resolved_colour();
        Self {
            config,
            colour,
            chunk_size,
            grid: None,
            nodes: HashMap::new(),
            next_handle: 0,
            shared: HashMap::new(),
            unique: HashMap::new(),
            chunkless: BTreeSet::new(),
            stale: true,
            zoom_percent: 100.0,
            mutations: 0,
            refresh_buf: Vec::new(),
        }
    }

    #[inline]
    pub fn config(&self) -> &PathConfig {
        &self.config
    }

    // ── shared paths ──────────────────────────────────────────────────────

    /// Registers `carrier` on the edge `a`-`b`, creating the path on first use.
    ///
    /// Returns `None` without side effects if an endpoint cannot be resolved.
    pub fn add_shared_path<E>(
        &mut self,
        env: &E,
        a: EntityId,
        b: EntityId,
        carrier: EntityId,
    ) -> Option<PathKey>
    where
        E: PathEnvironment + ?Sized,
    {
        let key = PathKey::new(a, b);

        if !self.shared.contains_key(&key) {
            let (Some(src), Some(dst)) = (env.endpoint(key.hi()), env.endpoint(key.lo())) else {
                log::debug!("shared path {key}: endpoint missing, skipped");
                return None;
            };

            let geometry = self.build_geometry(src.location, dst.location, true, self.colour);
            let handle = self.insert_node(geometry, src.location, dst.location);
            let depth_alpha = env.depth_alpha(key.hi(), key.lo());
            self.shared.insert(
                key,
                SharedPath { key, handle, members: BTreeSet::new(), depth_alpha },
            );
            log::debug!("shared path {key} created as {handle}");
        }

        let clamp = self.config.clamp_alpha;
        let path = self.shared.get_mut(&key)?;
        path.members.insert(carrier);
        let alpha = shared_alpha(path.depth_alpha, path.members.len(), clamp);
        let handle = path.handle;
        if let Some(node) = self.nodes.get_mut(&handle) {
            node.geometry.set_alpha(alpha);
        }

        Some(key)
    }

    /// Drops `carrier` from the edge; the path is destroyed with its last
    /// carrier. Returns whether anything was removed.
    ///
    /// Removing an unknown key or a non-member is a caller bug: it asserts in
    /// debug builds and is logged and ignored otherwise.
    pub fn remove_shared_path(&mut self, key: PathKey, carrier: EntityId) -> bool {
        let Some(path) = self.shared.get_mut(&key) else {
            debug_assert!(false, "remove_shared_path: unknown key {key}");
            log::warn!("remove_shared_path: unknown key {key}");
            return false;
        };
        if !path.members.remove(&carrier) {
            debug_assert!(false, "remove_shared_path: {carrier} not on {key}");
            log::warn!("remove_shared_path: {carrier} not on {key}");
            return false;
        }

        let handle = path.handle;
        if path.members.is_empty() {
            self.shared.remove(&key);
            self.destroy_node(handle);
            log::debug!("shared path {key} destroyed");
        } else {
            let alpha = shared_alpha(path.depth_alpha, path.members.len(), self.config.clamp_alpha);
            if let Some(node) = self.nodes.get_mut(&handle) {
                node.geometry.set_alpha(alpha);
            }
        }
        true
    }

    // ── unique paths ──────────────────────────────────────────────────────

    /// Path owned by `mover`, from its current location to `dest`.
    pub fn add_unique_path<E>(
        &mut self,
        env: &E,
        mover: EntityId,
        dest: EntityId,
        looped: bool,
        colour: Option<Color>,
    ) -> Option<PathHandle>
    where
        E: PathEnvironment + ?Sized,
    {
        self.add_unique_leg(env, mover, mover, dest, looped, colour)
    }

    /// Path owned by `owner` between two other entities, for the later legs
    /// of a direct route.
    pub fn add_unique_leg<E>(
        &mut self,
        env: &E,
        owner: EntityId,
        from: EntityId,
        to: EntityId,
        looped: bool,
        colour: Option<Color>,
    ) -> Option<PathHandle>
    where
        E: PathEnvironment + ?Sized,
    {
        let (Some(src), Some(dst)) = (env.endpoint(from), env.endpoint(to)) else {
            log::debug!("unique path {from}->{to} of {owner}: endpoint missing, skipped");
            return None;
        };

        let colour = colour
            .or_else(|| env.owning_colour(owner))
            .unwrap_or(self.colour);
        let mut geometry = self.build_geometry(src.location, dst.location, looped, colour);
        geometry.set_alpha(shared_alpha(env.depth_alpha(from, to), 1, self.config.clamp_alpha));

        let handle = self.insert_node(geometry, src.location, dst.location);
        self.unique.insert(handle, UniquePath { owner });
        Some(handle)
    }

    /// Destroys a unique path. Unknown handles assert in debug builds.
    pub fn remove_unique_path(&mut self, handle: PathHandle) -> bool {
        if self.unique.remove(&handle).is_none() {
            debug_assert!(false, "remove_unique_path: unknown {handle}");
            log::warn!("remove_unique_path: unknown {handle}");
            return false;
        }
        self.destroy_node(handle);
        true
    }

    /// Unique paths owned by `owner`, ascending.
    pub fn unique_paths_of(&self, owner: EntityId) -> Vec<PathHandle> {
        let mut handles: Vec<PathHandle> = self
            .unique
            .iter()
            .filter(|(_, u)| u.owner == owner)
            .map(|(&h, _)| h)
            .collect();
        handles.sort();
        handles
    }

    /// Owner of a unique path.
    pub fn owner_of(&self, handle: PathHandle) -> Option<EntityId> {
        self.unique.get(&handle).map(|u| u.owner)
    }

    /// Destroys every path. The grid and its visibility are kept.
    pub fn clear(&mut self) {
        let handles: Vec<PathHandle> = self.nodes.keys().copied().collect();
        for handle in handles {
            self.destroy_node(handle);
        }
        self.shared.clear();
        self.unique.clear();
    }

    // ── grid ──────────────────────────────────────────────────────────────

    /// Rebuilds the path grid over `bounds` and re-homes every node.
    ///
    /// All chunks start hidden; the next tick runs the full pass.
    pub fn rebuild_grid(&mut self, bounds: Option<Bounds>) {
        if let Some(old) = self.grid.as_ref() {
            self.mutations += old.mutation_count();
        }
        self.grid = bounds.map(|b| ChunkGrid::build(b, self.chunk_size));
        self.chunkless.clear();
        self.stale = true;

        let Self { grid, nodes, chunkless, .. } = self;
        for (&handle, node) in nodes.iter_mut() {
            node.host = home(grid.as_mut(), chunkless, handle, node.from, node.to);
        }

        log::debug!(
            "path grid rebuilt: {} paths, {} chunkless",
            self.nodes.len(),
            self.chunkless.len()
        );
    }

    #[inline]
    pub fn grid(&self) -> Option<&ChunkGrid<PathHandle>> {
        self.grid.as_ref()
    }

    // ── per frame ─────────────────────────────────────────────────────────

    /// Culls the path grid and corrects y-scale where needed.
    ///
    /// Chunk members are rescaled on reveal, or on zoom while visible.
    /// Chunkless paths are rescaled on every non-idle tick.
    pub fn on_tick(
        &mut self,
        position_changed: bool,
        zoom_changed: bool,
        zoom_percent: f32,
        view: Rect,
    ) -> PathTickReport {
        if !position_changed && !zoom_changed && !self.stale {
            return PathTickReport { idle: true, ..PathTickReport::default() };
        }
        self.stale = false;
        self.zoom_percent = zoom_percent;

        let scale = y_scale(zoom_percent, &self.config.scaling);
        let Self { grid, nodes, chunkless, refresh_buf, mutations, .. } = self;

        let mut rescaled = 0;
        let mut chunks = CullCounts::default();
        if let Some(grid) = grid.as_mut() {
            refresh_buf.clear();
            chunks = grid.cull(view, zoom_changed, refresh_buf);
            for &coord in refresh_buf.iter() {
                for handle in grid.chunk(coord).members() {
                    if let Some(node) = nodes.get_mut(&handle) {
                        node.geometry.set_y_scale(scale);
                        rescaled += 1;
                    }
                }
            }
        }

        for handle in chunkless.iter() {
            if let Some(node) = nodes.get_mut(handle) {
                node.geometry.set_y_scale(scale);
                rescaled += 1;
            }
        }
        *mutations += rescaled as u64;

        log::trace!(
            "path tick: +{} -{} rescaled={} scale={:.3}",
            chunks.revealed,
            chunks.hidden,
            rescaled,
            scale
        );

        PathTickReport { idle: false, chunks, rescaled }
    }

    /// Pushes one quad per solid span of every path that is currently shown.
    pub fn draw(&self, list: &mut DrawList) {
        let mut handles: Vec<PathHandle> = match self.grid.as_ref() {
            Some(grid) => grid.visible_members().collect(),
            None => Vec::new(),
        };
        handles.sort();
        handles.extend(self.chunkless.iter().copied());

        for handle in handles {
            let Some(node) = self.nodes.get(&handle) else { continue };
            let colour = node.geometry.draw_colour();
            for corners in node.geometry.quads() {
                list.push_solid_quad(ZIndex::PATHS, corners, colour);
            }
        }
    }

    // ── queries ───────────────────────────────────────────────────────────

    #[inline]
    pub fn shared_len(&self) -> usize {
        self.shared.len()
    }

    #[inline]
    pub fn unique_len(&self) -> usize {
        self.unique.len()
    }

    /// Live path nodes, shared and unique.
    #[inline]
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    #[inline]
    pub fn chunkless_len(&self) -> usize {
        self.chunkless.len()
    }

    #[inline]
    pub fn shared(&self, key: PathKey) -> Option<&SharedPath> {
        self.shared.get(&key)
    }

    /// Carriers on `key`; 0 if the path does not exist.
    #[inline]
    pub fn member_count(&self, key: PathKey) -> usize {
        self.shared.get(&key).map_or(0, |p| p.member_count())
    }

    #[inline]
    pub fn geometry(&self, handle: PathHandle) -> Option<&PathGeometry> {
        self.nodes.get(&handle).map(|n| &n.geometry)
    }

    #[inline]
    pub fn host_of(&self, handle: PathHandle) -> Option<PathHost> {
        self.nodes.get(&handle).map(|n| n.host)
    }

    /// Whether the node is alive and held by a chunk or the chunkless set.
    pub fn is_attached(&self, handle: PathHandle) -> bool {
        match self.host_of(handle) {
            Some(PathHost::Chunkless) => self.chunkless.contains(&handle),
            Some(PathHost::Chunk(coord)) => {
                self.grid.as_ref().is_some_and(|g| g.chunk(coord).contains(&handle))
            }
            None => false,
        }
    }

    /// Whether the node would be drawn this frame.
    pub fn is_shown(&self, handle: PathHandle) -> bool {
        match self.host_of(handle) {
            Some(PathHost::Chunkless) => true,
            Some(PathHost::Chunk(coord)) => {
                self.grid.as_ref().is_some_and(|g| g.chunk(coord).is_visible())
            }
            None => false,
        }
    }

    /// Registry, placement, visibility and scale changes so far.
    pub fn mutation_count(&self) -> u64 {
        self.mutations + self.grid.as_ref().map_or(0, |g| g.mutation_count())
    }

    // ── internal ──────────────────────────────────────────────────────────

    fn build_geometry(&self, from: Vec2, to: Vec2, looped: bool, colour: Color) -> PathGeometry {
        let half_width = self.config.width / 2.0;
        let mut geometry = if looped && self.config.style == PathStyle::Dashed {
            PathGeometry::dashed(from, to, self.config.dash_length, half_width, colour)
        } else {
            PathGeometry::solid(from, to, half_width, colour)
        };
        geometry.set_y_scale(y_scale(self.zoom_percent, &self.config.scaling));
        geometry
    }

    fn insert_node(&mut self, geometry: PathGeometry, from: Vec2, to: Vec2) -> PathHandle {
        let handle = PathHandle(self.next_handle);
        self.next_handle += 1;

        let host = home(self.grid.as_mut(), &mut self.chunkless, handle, from, to);
        self.nodes.insert(handle, Node { geometry, from, to, host });
        self.mutations += 1;
        handle
    }

    fn destroy_node(&mut self, handle: PathHandle) {
        let Some(node) = self.nodes.remove(&handle) else {
            return;
        };
        match node.host {
            PathHost::Chunk(coord) => {
                if let Some(grid) = self.grid.as_mut() {
                    grid.remove(coord, handle);
                }
            }
            PathHost::Chunkless => {
                self.chunkless.remove(&handle);
            }
        }
        self.mutations += 1;
    }
}

/// Places a node in the chunk holding both endpoints, or in the chunkless set.
fn home(
    grid: Option<&mut ChunkGrid<PathHandle>>,
    chunkless: &mut BTreeSet<PathHandle>,
    handle: PathHandle,
    from: Vec2,
    to: Vec2,
) -> PathHost {
    if let Some(grid) = grid {
        match (grid.try_cell_of(from), grid.try_cell_of(to)) {
            (Some(a), Some(b)) if a == b => {
                grid.insert(a, handle);
                return PathHost::Chunk(a);
            }
            (None, _) | (_, None) => {
                log::debug!("{handle}: endpoint outside path grid, kept chunkless");
            }
            _ => {}
        }
    }
    chunkless.insert(handle);
    PathHost::Chunkless
}

/// `depth_alpha / 2 + 0.1 * carriers`, optionally clamped to [0, 1].
fn shared_alpha(depth_alpha: f32, carriers: usize, clamp: bool) -> f32 {
    let alpha = depth_alpha / 2.0 + ALPHA_PER_CARRIER * carriers as f32;
    if clamp { alpha.clamp(0.0, 1.0) } else { alpha }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ScalingConfig, ScalingMode};
    use crate::world::{Endpoint, EndpointSource, Presentation};

    /// Entity `n` sits at `(n * 10, 0)` unless listed in `missing`.
    struct Line {
        missing: Vec<u64>,
        depth: f32,
    }

    impl Line {
        fn new() -> Self {
            Self { missing: Vec::new(), depth: 1.0 }
        }
    }

    impl EndpointSource for Line {
        fn endpoint(&self, id: EntityId) -> Option<Endpoint> {
            if self.missing.contains(&id.0) {
                return None;
            }
            Some(Endpoint { id, location: Vec2::new(id.0 as f32 * 10.0, 0.0) })
        }
    }

    impl Presentation for Line {
        fn depth_alpha(&self, _: EntityId, _: EntityId) -> f32 {
            self.depth
        }
    }

    fn id(n: u64) -> EntityId {
        EntityId(n)
    }

    /// Cache over a grid of 100-unit chunks spanning x in [0, 399].
    fn cache() -> PathCache {
        let mut cache = PathCache::new(PathConfig::default(), 100.0);
        cache.rebuild_grid(Some(Bounds::new(Vec2::zero(), Vec2::new(399.0, 99.0))));
        cache
    }

    // ── reference counting ────────────────────────────────────────────────

    #[test]
    fn carriers_share_one_path() {
        let env = Line::new();
        let mut c = cache();
        let k1 = c.add_shared_path(&env, id(1), id(2), id(100)).unwrap();
        let k2 = c.add_shared_path(&env, id(2), id(1), id(101)).unwrap();
        assert_eq!(k1, k2);
        assert_eq!(c.shared_len(), 1);
        assert_eq!(c.node_count(), 1);
        assert_eq!(c.member_count(k1), 2);
    }

    #[test]
    fn adding_same_carrier_twice_is_idempotent() {
        let env = Line::new();
        let mut c = cache();
        let k = c.add_shared_path(&env, id(1), id(2), id(100)).unwrap();
        c.add_shared_path(&env, id(1), id(2), id(100)).unwrap();
        assert_eq!(c.member_count(k), 1);
    }

    #[test]
    fn path_lives_exactly_as_long_as_its_carriers() {
        let env = Line::new();
        let mut c = cache();
        let carriers: Vec<EntityId> = (100..105).map(id).collect();
        let mut key = None;
        for &carrier in &carriers {
            key = c.add_shared_path(&env, id(3), id(4), carrier);
        }
        let key = key.unwrap();
        let handle = c.shared(key).unwrap().handle();

        for (i, &carrier) in carriers.iter().enumerate() {
            assert!(c.remove_shared_path(key, carrier));
            let left = carriers.len() - i - 1;
            assert_eq!(c.member_count(key), left);
            assert_eq!(c.shared(key).is_some(), left > 0);
            assert_eq!(c.is_attached(handle), left > 0);
        }
        assert_eq!(c.node_count(), 0);
    }

    #[test]
    fn missing_endpoint_skips_construction() {
        let env = Line { missing: vec![2], depth: 1.0 };
        let mut c = cache();
        assert!(c.add_shared_path(&env, id(1), id(2), id(100)).is_none());
        assert!(c.add_unique_path(&env, id(100), id(2), false, None).is_none());
        assert_eq!(c.node_count(), 0);
        assert_eq!(c.shared_len(), 0);
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "unknown key")]
    fn removing_unknown_key_asserts_in_debug() {
        let mut c = cache();
        c.remove_shared_path(PathKey::new(id(1), id(2)), id(100));
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "not on")]
    fn removing_non_member_asserts_in_debug() {
        let env = Line::new();
        let mut c = cache();
        let k = c.add_shared_path(&env, id(1), id(2), id(100)).unwrap();
        c.remove_shared_path(k, id(999));
    }

    // ── alpha ─────────────────────────────────────────────────────────────

    #[test]
    fn alpha_tracks_carrier_count() {
        let env = Line { missing: Vec::new(), depth: 0.4 };
        let mut c = cache();
        let k = c.add_shared_path(&env, id(1), id(2), id(100)).unwrap();
        let h = c.shared(k).unwrap().handle();
        assert!((c.geometry(h).unwrap().alpha() - 0.3).abs() < 1e-6);

        c.add_shared_path(&env, id(1), id(2), id(101)).unwrap();
        assert!((c.geometry(h).unwrap().alpha() - 0.4).abs() < 1e-6);

        c.remove_shared_path(k, id(100));
        assert!((c.geometry(h).unwrap().alpha() - 0.3).abs() < 1e-6);
    }

    #[test]
    fn alpha_clamp_is_configurable() {
        let env = Line::new();
        let mut clamped = cache();
        let mut open = PathCache::new(PathConfig { clamp_alpha: false, ..PathConfig::default() }, 100.0);
        for carrier in 100..120 {
            clamped.add_shared_path(&env, id(1), id(2), id(carrier));
            open.add_shared_path(&env, id(1), id(2), id(carrier));
        }
        let k = PathKey::new(id(1), id(2));
        let a = clamped.geometry(clamped.shared(k).unwrap().handle()).unwrap().alpha();
        let b = open.geometry(open.shared(k).unwrap().handle()).unwrap().alpha();
        assert_eq!(a, 1.0);
        assert!((b - 2.5).abs() < 1e-5);
    }

    // ── geometry & placement ──────────────────────────────────────────────

    #[test]
    fn shared_paths_follow_style_unique_direct_paths_are_solid() {
        let env = Line::new();
        let mut c = cache();
        // 1 -> 9 is 80 units long: long enough to dash.
        let k = c.add_shared_path(&env, id(1), id(9), id(100)).unwrap();
        let shared = c.geometry(c.shared(k).unwrap().handle()).unwrap();
        assert!(shared.is_dashed());
        // Source is the higher id.
        assert_eq!(shared.origin(), Vec2::new(90.0, 0.0));

        let u = c.add_unique_path(&env, id(1), id(9), false, None).unwrap();
        assert!(!c.geometry(u).unwrap().is_dashed());
        assert_eq!(c.geometry(u).unwrap().origin(), Vec2::new(10.0, 0.0));

        let mut solid = PathCache::new(PathConfig { style: PathStyle::Solid, ..PathConfig::default() }, 100.0);
        let k = solid.add_shared_path(&env, id(1), id(9), id(100)).unwrap();
        assert!(!solid.geometry(solid.shared(k).unwrap().handle()).unwrap().is_dashed());
    }

    #[test]
    fn same_chunk_paths_are_chunk_hosted_others_chunkless() {
        let env = Line::new();
        let mut c = cache();
        let inside = c.add_unique_leg(&env, id(100), id(1), id(5), false, None).unwrap();
        let across = c.add_unique_leg(&env, id(100), id(5), id(15), false, None).unwrap();
        assert_eq!(c.host_of(inside), Some(PathHost::Chunk(ChunkCoord::new(0, 0))));
        assert_eq!(c.host_of(across), Some(PathHost::Chunkless));
        assert!(c.is_attached(inside) && c.is_attached(across));
        assert_eq!(c.chunkless_len(), 1);
    }

    #[test]
    fn owner_colour_beats_config_colour() {
        struct Owned(Line);
        impl EndpointSource for Owned {
            fn endpoint(&self, id: EntityId) -> Option<Endpoint> {
                self.0.endpoint(id)
            }
        }
        impl Presentation for Owned {
            fn owning_colour(&self, _: EntityId) -> Option<Color> {
                Some(Color::transparent())
            }
        }

        let mut c = cache();
        let owned = c.add_unique_path(&Owned(Line::new()), id(1), id(2), false, None).unwrap();
        let plain = c.add_unique_path(&Line::new(), id(1), id(2), false, None).unwrap();
        let explicit = c
            .add_unique_path(&Owned(Line::new()), id(1), id(2), false, Some(Color::white()))
            .unwrap();
        assert_eq!(c.geometry(owned).unwrap().colour(), Color::transparent());
        assert_eq!(c.geometry(plain).unwrap().colour(), Color::white());
        assert_eq!(c.geometry(explicit).unwrap().colour(), Color::white());
        assert_eq!(c.unique_paths_of(id(1)), vec![owned, plain, explicit]);
    }

    #[test]
    fn rebuild_grid_rehomes_nodes() {
        let env = Line::new();
        let mut c = PathCache::new(PathConfig::default(), 100.0);
        let h = c.add_unique_leg(&env, id(100), id(1), id(5), false, None).unwrap();
        assert_eq!(c.host_of(h), Some(PathHost::Chunkless));

        c.rebuild_grid(Some(Bounds::new(Vec2::zero(), Vec2::new(99.0, 99.0))));
        assert_eq!(c.host_of(h), Some(PathHost::Chunk(ChunkCoord::new(0, 0))));
        assert_eq!(c.chunkless_len(), 0);
        assert!(c.is_attached(h));
    }

    // ── tick ──────────────────────────────────────────────────────────────

    fn zoomed_cache() -> (PathCache, PathHandle, PathHandle, PathHandle) {
        let env = Line::new();
        let mut c = cache();
        let near = c.add_unique_leg(&env, id(100), id(1), id(5), false, None).unwrap();
        let far = c.add_unique_leg(&env, id(100), id(31), id(35), false, None).unwrap();
        let across = c.add_unique_leg(&env, id(100), id(5), id(25), false, None).unwrap();
        (c, near, far, across)
    }

    #[test]
    fn reveal_and_zoom_rescale_only_visible_chunks() {
        let (mut c, near, far, across) = zoomed_cache();
        let view = Rect::new(0.0, 0.0, 90.0, 50.0);

        let r = c.on_tick(true, true, 25.0, view);
        assert_eq!(r.rescaled, 2);
        assert!((c.geometry(near).unwrap().y_scale() - 2.0).abs() < 1e-6);
        assert!((c.geometry(across).unwrap().y_scale() - 2.0).abs() < 1e-6);
        // Hidden chunk keeps the scale it was built with.
        assert_eq!(c.geometry(far).unwrap().y_scale(), 1.0);
        assert!(c.is_shown(near) && c.is_shown(across) && !c.is_shown(far));
    }

    #[test]
    fn pan_rescales_chunkless_but_not_visible_chunks() {
        let (mut c, near, _, across) = zoomed_cache();
        let view = Rect::new(0.0, 0.0, 90.0, 50.0);
        c.on_tick(true, true, 100.0, view);

        let r = c.on_tick(true, false, 100.0, Rect::new(5.0, 0.0, 90.0, 50.0));
        assert_eq!(r.chunks.revealed, 0);
        assert_eq!(r.rescaled, 1);
        assert!(c.is_shown(near));
        assert!(c.is_shown(across));
    }

    #[test]
    fn idle_tick_changes_nothing() {
        let (mut c, ..) = zoomed_cache();
        let view = Rect::new(0.0, 0.0, 90.0, 50.0);
        c.on_tick(true, true, 100.0, view);
        let before = c.mutation_count();
        let r = c.on_tick(false, false, 100.0, view);
        assert!(r.idle);
        assert_eq!(c.mutation_count(), before);
    }

    #[test]
    fn new_paths_pick_up_current_zoom() {
        let env = Line::new();
        let mut c = cache();
        c.on_tick(true, true, 400.0, Rect::new(0.0, 0.0, 10.0, 10.0));
        let h = c.add_unique_leg(&env, id(100), id(1), id(2), false, None).unwrap();
        assert!((c.geometry(h).unwrap().y_scale() - 0.5).abs() < 1e-6);
    }

    #[test]
    fn unscaled_mode_never_rescales_width() {
        let env = Line::new();
        let paths = PathConfig {
            scaling: ScalingConfig { mode: ScalingMode::Unscaled, ..ScalingConfig::default() },
            ..PathConfig::default()
        };
        let mut c = PathCache::new(paths, 100.0);
        let h = c.add_unique_leg(&env, id(100), id(1), id(30), false, None).unwrap();
        c.on_tick(true, true, 10.0, Rect::new(0.0, 0.0, 10.0, 10.0));
        assert_eq!(c.geometry(h).unwrap().y_scale(), 1.0);
    }

    // ── draw ──────────────────────────────────────────────────────────────

    #[test]
    fn draw_emits_visible_and_chunkless_spans() {
        let (mut c, ..) = zoomed_cache();
        c.on_tick(true, false, 100.0, Rect::new(0.0, 0.0, 90.0, 50.0));
        let mut list = DrawList::new();
        c.draw(&mut list);
        // near (solid, 1 quad) + across (solid, 1 quad); far is culled.
        assert_eq!(list.len(), 2);
    }
}
