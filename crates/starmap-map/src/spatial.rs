//! Viewport culling and LOD dispatch for stars and movers.
//!
//! The visibility test runs per chunk; LOD callbacks run per object only when
//! its chunk is revealed or the zoom changed. Panning over already visible
//! chunks costs O(chunks) and touches no object.

use std::collections::HashMap;

use starmap_engine::coords::{Bounds, Rect, Vec2};

use crate::chunk::{Chunk, ChunkCoord, ChunkGrid, CullCounts};
use crate::world::{Endpoint, EndpointSource, EntityId, WorldObject};

/// Level-of-detail refresh hook registered by the host's entity renderer.
///
/// Receives the current zoom percent (100 = 1:1).
pub type LodCallback = Box<dyn FnMut(f32)>;

/// Where an added or moved object ended up.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Placement {
    Placed(ChunkCoord),
    /// The location was outside the grid; the grid was rebuilt over grown
    /// bounds before placing. Every chunk is hidden again until the next tick.
    Regrown(ChunkCoord),
}

impl Placement {
    #[inline]
    pub fn coord(self) -> ChunkCoord {
        match self {
            Placement::Placed(c) | Placement::Regrown(c) => c,
        }
    }

    #[inline]
    pub fn regrew(self) -> bool {
        matches!(self, Placement::Regrown(_))
    }
}

/// Outcome of one [`SpatialChunkIndex::on_tick`].
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub struct CullReport {
    /// `true` when the tick took the no-op fast path.
    pub idle: bool,
    pub chunks: CullCounts,
    /// LOD callbacks invoked this tick.
    pub lod_refreshes: usize,
}

struct Entry {
    object: WorldObject,
    chunk: ChunkCoord,
    on_lod: Option<LodCallback>,
}

/// Chunked index over the world's stars and movers.
pub struct SpatialChunkIndex {
    chunk_size: f32,
    grid: Option<ChunkGrid<EntityId>>,
    /// Mutations recorded by grids that have since been replaced.
    retired_mutations: u64,
    entries: HashMap<EntityId, Entry>,
    /// Set by rebuilds; forces the next tick through the full pass.
    stale: bool,
    last_zoom: Option<f32>,
    refresh_buf: Vec<ChunkCoord>,
}

impl SpatialChunkIndex {
    pub fn new(chunk_size: f32) -> Self {
        Self {
            chunk_size,
            grid: None,
            retired_mutations: 0,
            entries: HashMap::new(),
            stale: true,
            last_zoom: None,
            refresh_buf: Vec::new(),
        }
    }

    /// Recomputes extents from `objects` and repopulates every chunk.
    ///
    /// LOD callbacks of ids present before and after the rebuild are kept.
    /// O(objects).
    pub fn rebuild<I>(&mut self, objects: I)
    where
        I: IntoIterator<Item = WorldObject>,
    {
        let objects: Vec<WorldObject> = objects.into_iter().collect();
        let mut old = std::mem::take(&mut self.entries);

        self.retired_mutations += self.grid.as_ref().map_or(0, |g| g.mutation_count());
        self.grid = Bounds::from_points(objects.iter().map(|o| o.location))
            .map(|b| ChunkGrid::build(b, self.chunk_size));
        self.stale = true;

        let Some(grid) = self.grid.as_mut() else {
            log::debug!("spatial index rebuilt empty");
            return;
        };

        for object in objects {
            let chunk = grid.cell_of(object.location);
            grid.insert(chunk, object.id);
            let on_lod = old.remove(&object.id).and_then(|e| e.on_lod);
            self.entries.insert(object.id, Entry { object, chunk, on_lod });
        }

        let (nx, ny) = grid.dims();
        log::debug!(
            "spatial index rebuilt: {} objects in {}x{} chunks",
            self.entries.len(),
            nx,
            ny
        );
    }

    /// Adds an object, rebuilding the grid first if it lies outside.
    ///
    /// If the object lands in a chunk that is already visible, its LOD
    /// callback fires immediately with the last ticked zoom.
    pub fn add_object(&mut self, object: WorldObject, on_lod: Option<LodCallback>) -> Placement {
        if self.entries.contains_key(&object.id) {
            log::debug!("add_object: {} already indexed, replacing", object.id);
            self.remove_object(object.id);
        }

        let (grid, regrown) = Self::ensure_covers(
            &mut self.grid,
            &mut self.retired_mutations,
            &mut self.entries,
            self.chunk_size,
            object.location,
        );
        self.stale |= regrown;
        let chunk = grid.cell_of(object.location);
        grid.insert(chunk, object.id);
        let visible = grid.chunk(chunk).is_visible();

        let mut entry = Entry { object, chunk, on_lod };
        if visible {
            if let (Some(cb), Some(zoom)) = (entry.on_lod.as_mut(), self.last_zoom) {
                cb(zoom);
            }
        }
        self.entries.insert(object.id, entry);

        if regrown { Placement::Regrown(chunk) } else { Placement::Placed(chunk) }
    }

    /// Removes an object. Returns it if it was indexed.
    pub fn remove_object(&mut self, id: EntityId) -> Option<WorldObject> {
        let entry = self.entries.remove(&id)?;
        if let Some(grid) = self.grid.as_mut() {
            grid.remove(entry.chunk, id);
        }
        Some(entry.object)
    }

    /// Updates an object's location and chunk membership.
    ///
    /// Returns `None` if the id is unknown.
    pub fn move_object(&mut self, id: EntityId, location: Vec2) -> Option<Placement> {
        if !self.entries.contains_key(&id) {
            return None;
        }

        let (grid, regrown) = Self::ensure_covers(
            &mut self.grid,
            &mut self.retired_mutations,
            &mut self.entries,
            self.chunk_size,
            location,
        );
        self.stale |= regrown;
        let entry = self.entries.get_mut(&id)?;

        let old_chunk = entry.chunk;
        let new_chunk = grid.cell_of(location);
        entry.object.location = location;

        if new_chunk != old_chunk || regrown {
            grid.remove(old_chunk, id);
            grid.insert(new_chunk, id);
            entry.chunk = new_chunk;

            let was_visible = !regrown && grid.chunk(old_chunk).is_visible();
            if grid.chunk(new_chunk).is_visible() && !was_visible {
                if let (Some(cb), Some(zoom)) = (entry.on_lod.as_mut(), self.last_zoom) {
                    cb(zoom);
                }
            }
        }

        Some(if regrown { Placement::Regrown(new_chunk) } else { Placement::Placed(new_chunk) })
    }

    /// Registers (or replaces) the LOD callback of an indexed object.
    ///
    /// Returns `false` if the id is unknown.
    pub fn set_lod_callback(&mut self, id: EntityId, on_lod: LodCallback) -> bool {
        match self.entries.get_mut(&id) {
            Some(entry) => {
                entry.on_lod = Some(on_lod);
                true
            }
            None => false,
        }
    }

    /// Per-frame culling and LOD dispatch.
    ///
    /// 1. Neither flag set (and no rebuild pending): return at once.
    /// 2. Resolve visibility of every chunk against `view`.
    /// 3. Refresh LOD of members of revealed chunks, and of every visible
    ///    chunk when the zoom changed. Hidden chunks' members are not touched.
    pub fn on_tick(
        &mut self,
        position_changed: bool,
        zoom_changed: bool,
        zoom_percent: f32,
        view: Rect,
    ) -> CullReport {
        if !position_changed && !zoom_changed && !self.stale {
            return CullReport { idle: true, ..CullReport::default() };
        }

        // After a rebuild every chunk is hidden; this pass re-reveals the view.
        self.stale = false;
        self.last_zoom = Some(zoom_percent);

        let Self { grid, entries, refresh_buf, .. } = self;
        let Some(grid) = grid.as_mut() else {
            return CullReport::default();
        };

        refresh_buf.clear();
        let chunks = grid.cull(view, zoom_changed, refresh_buf);

        // Visibility is fully resolved before any callback runs.
        let mut lod_refreshes = 0;
        for &coord in refresh_buf.iter() {
            for id in grid.chunk(coord).members() {
                let Some(cb) = entries.get_mut(&id).and_then(|e| e.on_lod.as_mut()) else {
                    continue;
                };
                cb(zoom_percent);
                lod_refreshes += 1;
            }
        }

        log::trace!(
            "spatial tick: +{} -{} visible={} lod={}",
            chunks.revealed,
            chunks.hidden,
            chunks.visible,
            lod_refreshes
        );

        CullReport { idle: false, chunks, lod_refreshes }
    }

    // ── queries ───────────────────────────────────────────────────────────

    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[inline]
    pub fn contains(&self, id: EntityId) -> bool {
        self.entries.contains_key(&id)
    }

    #[inline]
    pub fn grid(&self) -> Option<&ChunkGrid<EntityId>> {
        self.grid.as_ref()
    }

    /// Bounds the current grid was built over.
    #[inline]
    pub fn bounds(&self) -> Option<Bounds> {
        self.grid.as_ref().map(|g| g.bounds())
    }

    #[inline]
    pub fn object(&self, id: EntityId) -> Option<&WorldObject> {
        self.entries.get(&id).map(|e| &e.object)
    }

    #[inline]
    pub fn location(&self, id: EntityId) -> Option<Vec2> {
        self.entries.get(&id).map(|e| e.object.location)
    }

    #[inline]
    pub fn chunk_of(&self, id: EntityId) -> Option<ChunkCoord> {
        self.entries.get(&id).map(|e| e.chunk)
    }

    pub fn is_visible(&self, id: EntityId) -> bool {
        self.chunk_state(id, |c| c.is_visible())
    }

    pub fn is_interactive(&self, id: EntityId) -> bool {
        self.chunk_state(id, |c| c.is_interactive())
    }

    /// Objects in visible chunks, in no particular order.
    pub fn visible_objects(&self) -> impl Iterator<Item = &WorldObject> + '_ {
        self.grid
            .iter()
            .flat_map(|g| g.visible_members())
            .filter_map(|id| self.entries.get(&id).map(|e| &e.object))
    }

    /// Membership and visibility changes, including those of replaced grids.
    pub fn mutation_count(&self) -> u64 {
        self.retired_mutations + self.grid.as_ref().map_or(0, |g| g.mutation_count())
    }

    // ── internal ──────────────────────────────────────────────────────────

    fn chunk_state(&self, id: EntityId, f: impl Fn(&Chunk<EntityId>) -> bool) -> bool {
        match (self.grid.as_ref(), self.entries.get(&id)) {
            (Some(g), Some(e)) => f(g.chunk(e.chunk)),
            _ => false,
        }
    }

    /// Rebuilds over grown bounds if `location` has no chunk, re-placing every
    /// entry. Returns the grid and whether a rebuild happened.
    fn ensure_covers<'a>(
        grid: &'a mut Option<ChunkGrid<EntityId>>,
        retired: &mut u64,
        entries: &mut HashMap<EntityId, Entry>,
        chunk_size: f32,
        location: Vec2,
    ) -> (&'a mut ChunkGrid<EntityId>, bool) {
        let bounds = match grid.as_ref() {
            Some(g) if g.try_cell_of(location).is_some() => None,
            Some(g) => Some(g.bounds().including(location)),
            None => Some(Bounds::point(location)),
        };

        let regrown = bounds.is_some();
        if let Some(bounds) = bounds {
            let mut rebuilt = ChunkGrid::build(bounds, chunk_size);
            for entry in entries.values_mut() {
                entry.chunk = rebuilt.cell_of(entry.object.location);
                rebuilt.insert(entry.chunk, entry.object.id);
            }
            let (nx, ny) = rebuilt.dims();
            log::info!("spatial grid regrown to {nx}x{ny} chunks for {location:?}");
            *retired += grid.as_ref().map_or(0, |g| g.mutation_count());
            *grid = Some(rebuilt);
        }

        (grid.get_or_insert_with(|| ChunkGrid::build(Bounds::point(location), chunk_size)), regrown)
    }
}

impl EndpointSource for SpatialChunkIndex {
    fn endpoint(&self, id: EntityId) -> Option<Endpoint> {
        self.location(id).map(|location| Endpoint { id, location })
    }
}
