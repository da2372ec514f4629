//! Static 2D partition of world space into square chunks.
//!
//! The grid is built once over the bounds of everything it will hold and is
//! rebuilt (not resized) when those bounds grow. Membership is by id only; the
//! grid never owns the things it indexes.

use std::collections::HashSet;
use std::hash::Hash;

use starmap_engine::coords::{Bounds, Rect, Vec2};

/// Chunk position relative to the grid's first chunk.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ChunkCoord {
    pub cx: usize,
    pub cy: usize,
}

impl ChunkCoord {
    #[inline]
    pub const fn new(cx: usize, cy: usize) -> Self {
        Self { cx, cy }
    }
}

/// Inclusive range of local chunk indices. May be empty or extend past the grid.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct ChunkRange {
    pub first_x: i64,
    pub last_x: i64,
    pub first_y: i64,
    pub last_y: i64,
}

impl ChunkRange {
    #[inline]
    pub fn contains(&self, c: ChunkCoord) -> bool {
        let (x, y) = (c.cx as i64, c.cy as i64);
        x >= self.first_x && x <= self.last_x && y >= self.first_y && y <= self.last_y
    }
}

/// One cell of the grid.
#[derive(Debug, Clone)]
pub struct Chunk<M> {
    coord: ChunkCoord,
    members: HashSet<M>,
    visible: bool,
    interactive: bool,
}

impl<M: Copy + Eq + Hash> Chunk<M> {
    fn new(coord: ChunkCoord) -> Self {
        Self { coord, members: HashSet::new(), visible: false, interactive: false }
    }

    #[inline]
    pub fn coord(&self) -> ChunkCoord {
        self.coord
    }

    #[inline]
    pub fn members(&self) -> impl Iterator<Item = M> + '_ {
        self.members.iter().copied()
    }

    #[inline]
    pub fn contains(&self, m: &M) -> bool {
        self.members.contains(m)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.members.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    #[inline]
    pub fn is_visible(&self) -> bool {
        self.visible
    }

    /// Whether members may receive pointer input. Follows visibility.
    #[inline]
    pub fn is_interactive(&self) -> bool {
        self.interactive
    }
}

/// Visibility transitions produced by one [`ChunkGrid::cull`] pass.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub struct CullCounts {
    /// Chunks that went from hidden to visible.
    pub revealed: usize,
    /// Chunks that went from visible to hidden.
    pub hidden: usize,
    /// Chunks inside the view after the pass.
    pub visible: usize,
}

/// Fixed-size square partition of a bounded region.
///
/// Chunks are stored row-major; `chunks[cy * num_x + cx]`.
#[derive(Debug, Clone)]
pub struct ChunkGrid<M> {
    chunk_size: f32,
    bounds: Bounds,
    first_x: i64,
    first_y: i64,
    last_x: i64,
    last_y: i64,
    num_x: usize,
    num_y: usize,
    chunks: Vec<Chunk<M>>,
    mutations: u64,
}

impl<M: Copy + Eq + Hash> ChunkGrid<M> {
    /// Builds an empty grid covering `bounds`. All chunks start hidden.
    ///
    /// # Panics
    /// Panics if `chunk_size` is not a positive finite number or `bounds` is
    /// not finite.
    pub fn build(bounds: Bounds, chunk_size: f32) -> Self {
        assert!(
            chunk_size.is_finite() && chunk_size > 0.0,
            "ChunkGrid::build: invalid chunk size {chunk_size}"
        );
        assert!(bounds.is_finite(), "ChunkGrid::build: non-finite bounds {bounds:?}");

        let first_x = chunk_index(bounds.min.x, chunk_size);
        let first_y = chunk_index(bounds.min.y, chunk_size);
        let last_x = chunk_index(bounds.max.x, chunk_size);
        let last_y = chunk_index(bounds.max.y, chunk_size);

        let num_x = (last_x - first_x + 1) as usize;
        let num_y = (last_y - first_y + 1) as usize;

        let mut chunks = Vec::with_capacity(num_x * num_y);
        for cy in 0..num_y {
            for cx in 0..num_x {
                chunks.push(Chunk::new(ChunkCoord::new(cx, cy)));
            }
        }

        Self {
            chunk_size,
            bounds,
            first_x,
            first_y,
            last_x,
            last_y,
            num_x,
            num_y,
            chunks,
            mutations: 0,
        }
    }

    #[inline]
    pub fn chunk_size(&self) -> f32 {
        self.chunk_size
    }

    /// Bounds the grid was built over.
    #[inline]
    pub fn bounds(&self) -> Bounds {
        self.bounds
    }

    /// Absolute index of the first chunk per axis (`floor(min / size)`).
    #[inline]
    pub fn first(&self) -> (i64, i64) {
        (self.first_x, self.first_y)
    }

    /// Absolute index of the last chunk per axis (`floor(max / size)`).
    #[inline]
    pub fn last(&self) -> (i64, i64) {
        (self.last_x, self.last_y)
    }

    /// Number of chunks per axis.
    #[inline]
    pub fn dims(&self) -> (usize, usize) {
        (self.num_x, self.num_y)
    }

    #[inline]
    pub fn chunk_count(&self) -> usize {
        self.chunks.len()
    }

    /// Membership and visibility changes since the grid was built.
    #[inline]
    pub fn mutation_count(&self) -> u64 {
        self.mutations
    }

    /// Chunk holding `location`, or `None` if no chunk covers it.
    pub fn try_cell_of(&self, location: Vec2) -> Option<ChunkCoord> {
        if !location.is_finite() {
            return None;
        }
        let cx = chunk_index(location.x, self.chunk_size) - self.first_x;
        let cy = chunk_index(location.y, self.chunk_size) - self.first_y;
        if cx < 0 || cy < 0 || cx >= self.num_x as i64 || cy >= self.num_y as i64 {
            return None;
        }
        Some(ChunkCoord::new(cx as usize, cy as usize))
    }

    /// Chunk holding `location`.
    ///
    /// # Panics
    /// Panics if `location` lies outside every chunk. Hosts must rebuild the
    /// grid over grown bounds before placing such a location.
    pub fn cell_of(&self, location: Vec2) -> ChunkCoord {
        match self.try_cell_of(location) {
            Some(c) => c,
            None => panic!(
                "ChunkGrid::cell_of: {location:?} outside chunks {:?}..={:?}",
                self.first(),
                self.last()
            ),
        }
    }

    /// World-space box of a chunk: `[(first + c) * size, (first + c + 1) * size)`.
    pub fn chunk_bounds(&self, coord: ChunkCoord) -> Rect {
        let x = (self.first_x + coord.cx as i64) as f32 * self.chunk_size;
        let y = (self.first_y + coord.cy as i64) as f32 * self.chunk_size;
        Rect::new(x, y, self.chunk_size, self.chunk_size)
    }

    /// Local chunk range touched by `view` (edges inclusive).
    pub fn covered_range(&self, view: Rect) -> ChunkRange {
        let view = view.normalized();
        let max = view.max();
        ChunkRange {
            first_x: chunk_index(view.origin.x, self.chunk_size) - self.first_x,
            last_x: chunk_index(max.x, self.chunk_size) - self.first_x,
            first_y: chunk_index(view.origin.y, self.chunk_size) - self.first_y,
            last_y: chunk_index(max.y, self.chunk_size) - self.first_y,
        }
    }

    #[inline]
    pub fn chunk(&self, coord: ChunkCoord) -> &Chunk<M> {
        &self.chunks[self.index(coord)]
    }

    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = &Chunk<M>> {
        self.chunks.iter()
    }

    /// Members of every visible chunk.
    pub fn visible_members(&self) -> impl Iterator<Item = M> + '_ {
        self.chunks.iter().filter(|c| c.visible).flat_map(|c| c.members())
    }

    /// Adds `member` to a chunk. Returns `false` if it was already there.
    pub fn insert(&mut self, coord: ChunkCoord, member: M) -> bool {
        let i = self.index(coord);
        let added = self.chunks[i].members.insert(member);
        if added {
            self.mutations += 1;
        }
        added
    }

    /// Removes `member` from a chunk. Returns `false` if it was not there.
    pub fn remove(&mut self, coord: ChunkCoord, member: M) -> bool {
        let i = self.index(coord);
        let removed = self.chunks[i].members.remove(&member);
        if removed {
            self.mutations += 1;
        }
        removed
    }

    /// Drops all members, keeping extents and visibility.
    pub fn clear_members(&mut self) {
        for chunk in &mut self.chunks {
            if !chunk.members.is_empty() {
                chunk.members.clear();
                self.mutations += 1;
            }
        }
    }

    /// Resolves visibility of every chunk against `view`.
    ///
    /// Chunks whose members need a refresh this frame are appended to
    /// `refresh`: newly revealed chunks always, already visible chunks only
    /// when `zoom_changed`. Chunks outside the view are hidden and never
    /// listed. Cost is O(chunks) regardless of member count.
    pub fn cull(
        &mut self,
        view: Rect,
        zoom_changed: bool,
        refresh: &mut Vec<ChunkCoord>,
    ) -> CullCounts {
        let range = self.covered_range(view);
        let mut counts = CullCounts::default();

        for chunk in &mut self.chunks {
            if range.contains(chunk.coord) {
                counts.visible += 1;
                if !chunk.visible {
                    chunk.visible = true;
                    chunk.interactive = true;
                    self.mutations += 1;
                    counts.revealed += 1;
                    refresh.push(chunk.coord);
                } else if zoom_changed {
                    refresh.push(chunk.coord);
                }
            } else if chunk.visible || chunk.interactive {
                chunk.visible = false;
                chunk.interactive = false;
                self.mutations += 1;
                counts.hidden += 1;
            }
        }

        counts
    }

    #[inline]
    fn index(&self, coord: ChunkCoord) -> usize {
        debug_assert!(
            coord.cx < self.num_x && coord.cy < self.num_y,
            "ChunkGrid: {coord:?} outside {}x{} grid",
            self.num_x,
            self.num_y
        );
        coord.cy * self.num_x + coord.cx
    }
}

#[inline]
fn chunk_index(v: f32, chunk_size: f32) -> i64 {
    (v / chunk_size).floor() as i64
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid(min: (f32, f32), max: (f32, f32), size: f32) -> ChunkGrid<u32> {
        ChunkGrid::build(Bounds::new(Vec2::new(min.0, min.1), Vec2::new(max.0, max.1)), size)
    }

    // ── build ─────────────────────────────────────────────────────────────

    #[test]
    fn extents_floor_both_edges() {
        let g = grid((-150.0, 20.0), (250.0, 99.0), 100.0);
        assert_eq!(g.first(), (-2, 0));
        assert_eq!(g.last(), (2, 0));
        assert_eq!(g.dims(), (5, 1));
        assert_eq!(g.chunk_count(), 5);
    }

    #[test]
    fn max_on_chunk_boundary_gets_its_own_chunk() {
        let g = grid((0.0, 0.0), (100.0, 100.0), 100.0);
        assert_eq!(g.dims(), (2, 2));
    }

    #[test]
    fn chunks_start_hidden() {
        let g = grid((0.0, 0.0), (300.0, 300.0), 100.0);
        assert!(g.iter().all(|c| !c.is_visible() && !c.is_interactive()));
    }

    // ── cell_of ───────────────────────────────────────────────────────────

    #[test]
    fn cell_of_is_relative_to_first_chunk() {
        let g = grid((-150.0, -150.0), (250.0, 250.0), 100.0);
        assert_eq!(g.cell_of(Vec2::new(-150.0, -150.0)), ChunkCoord::new(0, 0));
        assert_eq!(g.cell_of(Vec2::new(-0.5, 0.0)), ChunkCoord::new(1, 2));
        assert_eq!(g.cell_of(Vec2::new(250.0, 250.0)), ChunkCoord::new(4, 4));
    }

    #[test]
    fn cell_of_is_stable_and_in_range() {
        let g = grid((-1000.0, -1000.0), (1000.0, 1000.0), 64.0);
        let (first_x, _) = g.first();
        let (last_x, _) = g.last();
        for i in 0..200 {
            let p = Vec2::new(-1000.0 + i as f32 * 10.0, 1000.0 - i as f32 * 7.5);
            let a = g.cell_of(p);
            assert_eq!(a, g.cell_of(p));
            let abs = a.cx as i64 + first_x;
            assert!(first_x <= abs && abs <= last_x);
        }
    }

    #[test]
    fn try_cell_of_outside_is_none() {
        let g = grid((0.0, 0.0), (99.0, 99.0), 100.0);
        assert!(g.try_cell_of(Vec2::new(-1.0, 0.0)).is_none());
        assert!(g.try_cell_of(Vec2::new(0.0, 100.0)).is_none());
        assert!(g.try_cell_of(Vec2::new(f32::NAN, 0.0)).is_none());
    }

    #[test]
    #[should_panic(expected = "outside chunks")]
    fn cell_of_outside_panics() {
        let g = grid((0.0, 0.0), (99.0, 99.0), 100.0);
        g.cell_of(Vec2::new(500.0, 0.0));
    }

    #[test]
    fn chunk_bounds_use_absolute_position() {
        let g = grid((-150.0, 0.0), (50.0, 50.0), 100.0);
        assert_eq!(g.chunk_bounds(ChunkCoord::new(0, 0)), Rect::new(-200.0, 0.0, 100.0, 100.0));
        assert_eq!(g.chunk_bounds(ChunkCoord::new(2, 0)), Rect::new(0.0, 0.0, 100.0, 100.0));
    }

    // ── membership ────────────────────────────────────────────────────────

    #[test]
    fn insert_and_remove_count_mutations_once() {
        let mut g = grid((0.0, 0.0), (99.0, 99.0), 100.0);
        let c = ChunkCoord::new(0, 0);
        assert!(g.insert(c, 7));
        assert!(!g.insert(c, 7));
        assert_eq!(g.mutation_count(), 1);
        assert!(g.remove(c, 7));
        assert!(!g.remove(c, 7));
        assert_eq!(g.mutation_count(), 2);
        assert!(g.chunk(c).is_empty());
    }

    // ── cull ──────────────────────────────────────────────────────────────

    #[test]
    fn cull_reveals_covered_chunks_and_lists_them() {
        let mut g = grid((0.0, 0.0), (399.0, 399.0), 100.0);
        let mut refresh = Vec::new();
        let counts = g.cull(Rect::new(50.0, 50.0, 100.0, 100.0), false, &mut refresh);

        assert_eq!(counts, CullCounts { revealed: 4, hidden: 0, visible: 4 });
        refresh.sort();
        assert_eq!(
            refresh,
            vec![
                ChunkCoord::new(0, 0),
                ChunkCoord::new(0, 1),
                ChunkCoord::new(1, 0),
                ChunkCoord::new(1, 1),
            ]
        );
    }

    #[test]
    fn visible_iff_box_intersects_view() {
        let mut g = grid((-500.0, -500.0), (499.0, 499.0), 100.0);
        let view = Rect::new(-130.0, 20.0, 260.0, 150.0);
        g.cull(view, false, &mut Vec::new());

        for chunk in g.iter() {
            let b = g.chunk_bounds(chunk.coord());
            let max = view.max();
            // Closed view against half-open chunk box.
            let hit = b.origin.x <= max.x
                && b.max().x > view.origin.x
                && b.origin.y <= max.y
                && b.max().y > view.origin.y;
            assert_eq!(chunk.is_visible(), hit, "chunk {:?}", chunk.coord());
        }
    }

    #[test]
    fn pan_only_does_not_refresh_already_visible_chunks() {
        let mut g = grid((0.0, 0.0), (399.0, 99.0), 100.0);
        g.cull(Rect::new(0.0, 0.0, 150.0, 50.0), false, &mut Vec::new());

        let mut refresh = Vec::new();
        let counts = g.cull(Rect::new(110.0, 0.0, 150.0, 50.0), false, &mut refresh);
        assert_eq!(counts.revealed, 1);
        assert_eq!(counts.hidden, 1);
        assert_eq!(refresh, vec![ChunkCoord::new(2, 0)]);
    }

    #[test]
    fn zoom_refreshes_every_visible_chunk() {
        let mut g = grid((0.0, 0.0), (399.0, 99.0), 100.0);
        g.cull(Rect::new(0.0, 0.0, 150.0, 50.0), false, &mut Vec::new());

        let mut refresh = Vec::new();
        let counts = g.cull(Rect::new(0.0, 0.0, 150.0, 50.0), true, &mut refresh);
        assert_eq!(counts.revealed, 0);
        assert_eq!(refresh.len(), 2);
    }

    #[test]
    fn repeated_cull_with_same_view_does_not_mutate() {
        let mut g = grid((0.0, 0.0), (399.0, 399.0), 100.0);
        let view = Rect::new(0.0, 0.0, 120.0, 120.0);
        g.cull(view, false, &mut Vec::new());
        let before = g.mutation_count();
        g.cull(view, false, &mut Vec::new());
        assert_eq!(g.mutation_count(), before);
    }
}
