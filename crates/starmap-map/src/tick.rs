//! Per-frame orchestration.
//!
//! [`MapView`] owns the spatial index, the path cache and the timed effects.
//! Each frame the host calls [`MapView::tick`] with the camera; the view
//! derives what changed since the previous frame and drives both subsystems
//! with it, objects first.

use std::collections::HashMap;

use starmap_engine::coords::{Rect, Vec2, Viewport};
use starmap_engine::paint::Color;
use starmap_engine::scene::{DrawList, ZIndex};
use starmap_engine::time::FrameTime;

use crate::config::{MapConfig, parse_colour_or_default};
use crate::effects::{Effect, EffectId, EffectSet};
use crate::paths::{PathCache, PathHandle, PathKey, PathTickReport};
use crate::spatial::{CullReport, LodCallback, Placement, SpatialChunkIndex};
use crate::world::{
    Endpoint, EndpointSource, EntityId, Leg, ObjectKind, Presentation, WorldObject,
    WorldSnapshot,
};

/// Camera state for one frame.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Camera {
    /// World position of the top-left screen corner.
    pub position: Vec2,
    /// 100 = one world unit per screen pixel.
    pub zoom_percent: f32,
}

impl Camera {
    #[inline]
    pub const fn new(position: Vec2, zoom_percent: f32) -> Self {
        Self { position, zoom_percent }
    }

    #[inline]
    pub fn scale(self) -> f32 {
        self.zoom_percent / 100.0
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::new(Vec2::zero(), 100.0)
    }
}

/// Full alpha, configured colours.
#[derive(Debug, Default, Copy, Clone)]
pub struct DefaultPresentation;

impl Presentation for DefaultPresentation {}

/// Endpoint lookups from the index, presentation from the host.
struct Env<'a> {
    index: &'a SpatialChunkIndex,
    presentation: &'a dyn Presentation,
}

impl EndpointSource for Env<'_> {
    fn endpoint(&self, id: EntityId) -> Option<Endpoint> {
        self.index.endpoint(id)
    }
}

impl Presentation for Env<'_> {
    fn depth_alpha(&self, a: EntityId, b: EntityId) -> f32 {
        self.presentation.depth_alpha(a, b)
    }

    fn owning_colour(&self, id: EntityId) -> Option<Color> {
        self.presentation.owning_colour(id)
    }
}

/// Outcome of one [`MapView::tick`].
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct TickReport {
    pub position_changed: bool,
    pub zoom_changed: bool,
    /// World-space rectangle on screen this frame.
    pub view: Rect,
    pub objects: CullReport,
    pub paths: PathTickReport,
}

impl TickReport {
    #[inline]
    pub fn is_idle(&self) -> bool {
        self.objects.idle && self.paths.idle
    }
}

/// Paths currently drawn for one mover.
#[derive(Debug, Clone, Default)]
struct Route {
    legs: Vec<Leg>,
    looped: bool,
    shared: Vec<PathKey>,
    unique: Vec<PathHandle>,
}

/// A map view: culled stars and movers plus their travel paths.
pub struct MapView {
    config: MapConfig,
    index: SpatialChunkIndex,
    paths: PathCache,
    effects: EffectSet,
    routes: HashMap<EntityId, Route>,
    presentation: Box<dyn Presentation>,
    star_colour: Color,
    mover_colour: Color,
    last_camera: Option<Camera>,
    view: Rect,
}

impl MapView {
    /// Builds an empty view. Unusable config values fall back to defaults.
    pub fn new(config: MapConfig) -> Self {
        let config = config.sanitized();
        let star_colour = parse_colour_or_default(&config.markers.star_colour, "markers.star_colour");
        let mover_colour =
            parse_colour_or_default(&config.markers.mover_colour, "markers.mover_colour");
        Self {
            index: SpatialChunkIndex::new(config.chunk_size),
            paths: PathCache::new(config.paths.clone(), config.chunk_size),
            effects: EffectSet::new(),
            routes: HashMap::new(),
            presentation: Box::new(DefaultPresentation),
            star_colour,
            mover_colour,
            last_camera: None,
            view: Rect::default(),
            config,
        }
    }

    /// Replaces the presentation inputs used for paths built from now on.
    pub fn set_presentation(&mut self, presentation: Box<dyn Presentation>) {
        self.presentation = presentation;
    }

    #[inline]
    pub fn config(&self) -> &MapConfig {
        &self.config
    }

    #[inline]
    pub fn index(&self) -> &SpatialChunkIndex {
        &self.index
    }

    #[inline]
    pub fn paths(&self) -> &PathCache {
        &self.paths
    }

    #[inline]
    pub fn effects(&self) -> &EffectSet {
        &self.effects
    }

    /// World rectangle of the last non-idle tick.
    #[inline]
    pub fn view(&self) -> Rect {
        self.view
    }

    // ── reload ────────────────────────────────────────────────────────────

    /// Rebuilds everything from a full simulation snapshot.
    ///
    /// `lod_factory` is asked for a LOD callback per object; returning `None`
    /// keeps the callback an id already had. The next tick runs the full pass.
    pub fn reload(
        &mut self,
        snapshot: &WorldSnapshot,
        lod_factory: &mut dyn FnMut(&WorldObject) -> Option<LodCallback>,
    ) {
        self.paths.clear();
        self.routes.clear();

        self.index.rebuild(snapshot.objects());
        for object in snapshot.objects() {
            if let Some(cb) = lod_factory(&object) {
                self.index.set_lod_callback(object.id, cb);
            }
        }
        self.paths.rebuild_grid(self.index.bounds());

        for mover in &snapshot.movers {
            self.set_route(mover.id, mover.route.clone(), mover.looped);
        }

        let index = &self.index;
        self.effects.retain_owners(|owner| index.contains(owner));
        self.last_camera = None;

        log::info!(
            "map reloaded: {} stars, {} movers, {} shared / {} unique paths",
            snapshot.stars.len(),
            snapshot.movers.len(),
            self.paths.shared_len(),
            self.paths.unique_len()
        );
    }

    // ── per frame ─────────────────────────────────────────────────────────

    /// Culls objects and paths against the camera.
    ///
    /// A camera identical to the previous frame's makes this a no-op. The
    /// first tick after construction or reload always runs the full pass.
    pub fn tick(&mut self, camera: Camera, screen: Viewport) -> TickReport {
        let (position_changed, zoom_changed) = match self.last_camera {
            None => (true, true),
            Some(prev) => (
                prev.position != camera.position,
                prev.zoom_percent != camera.zoom_percent,
            ),
        };

        let scale = camera.scale();
        if !(scale.is_finite() && scale > 0.0) || !screen.is_valid() {
            log::warn!("tick skipped: zoom {}% / screen {:?}", camera.zoom_percent, screen);
            return TickReport {
                position_changed: false,
                zoom_changed: false,
                view: self.view,
                objects: CullReport { idle: true, ..CullReport::default() },
                paths: PathTickReport { idle: true, ..PathTickReport::default() },
            };
        }

        self.last_camera = Some(camera);
        let view = screen.world_rect(camera.position, scale);
        if position_changed || zoom_changed {
            self.view = view;
        }

        let objects =
            self.index.on_tick(position_changed, zoom_changed, camera.zoom_percent, view);
        let paths = self.paths.on_tick(position_changed, zoom_changed, camera.zoom_percent, view);

        if !objects.idle {
            log::debug!(
                "tick: view {:?} zoom {}% objects lod={} paths rescaled={}",
                view,
                camera.zoom_percent,
                objects.lod_refreshes,
                paths.rescaled
            );
        }

        TickReport { position_changed, zoom_changed, view, objects, paths }
    }

    /// Ages timed effects with the frame delta. Returns the ones that expired.
    pub fn advance_effects(&mut self, frame: FrameTime) -> Vec<Effect> {
        self.effects.advance(frame.dt)
    }

    // ── edits ─────────────────────────────────────────────────────────────

    /// Adds a star or mover outside of a reload.
    pub fn add_object(&mut self, object: WorldObject, on_lod: Option<LodCallback>) -> Placement {
        let placement = self.index.add_object(object, on_lod);
        if placement.regrew() {
            self.paths.rebuild_grid(self.index.bounds());
        }
        placement
    }

    /// Replaces a mover's route.
    ///
    /// Looped routes share one path per leg with every other carrier of that
    /// leg. Direct routes get their own paths: mover to first destination,
    /// then one per later leg.
    pub fn set_route(&mut self, mover: EntityId, legs: Vec<Leg>, looped: bool) {
        self.release_route(mover);

        let env = Env { index: &self.index, presentation: self.presentation.as_ref() };
        let mut route = Route { legs, looped, ..Route::default() };

        if looped {
            for leg in &route.legs {
                let Some(key) = self.paths.add_shared_path(&env, leg.source, leg.dest, mover) else {
                    continue;
                };
                if !route.shared.contains(&key) {
                    route.shared.push(key);
                }
            }
        } else if let Some((first, rest)) = route.legs.split_first() {
            route.unique.extend(self.paths.add_unique_path(&env, mover, first.dest, false, None));
            for leg in rest {
                route.unique.extend(
                    self.paths.add_unique_leg(&env, mover, leg.source, leg.dest, false, None),
                );
            }
        }

        if !route.legs.is_empty() {
            self.routes.insert(mover, route);
        }
    }

    /// Relocates a mover; its direct-route paths follow it.
    ///
    /// Returns `false` if the id is unknown.
    pub fn update_mover(&mut self, id: EntityId, location: Vec2) -> bool {
        let Some(placement) = self.index.move_object(id, location) else {
            return false;
        };
        if placement.regrew() {
            self.paths.rebuild_grid(self.index.bounds());
        }

        let direct = self.routes.get(&id).filter(|r| !r.looped).map(|r| r.legs.clone());
        if let Some(legs) = direct {
            self.set_route(id, legs, false);
        }
        true
    }

    /// Removes an object with its routes and effects.
    pub fn remove_object(&mut self, id: EntityId) -> Option<WorldObject> {
        let removed = self.index.remove_object(id);
        self.release_route(id);
        self.effects.cancel_owner(id);
        removed
    }

    /// Starts a ring effect on an object. `None` if the object is unknown.
    pub fn spawn_effect(&mut self, owner: EntityId, radius: f32, life: f32) -> Option<EffectId> {
        let location = self.index.location(owner)?;
        let colour = match self.index.object(owner).map(|o| o.kind) {
            Some(ObjectKind::Mover) => self.mover_colour,
            _ => self.star_colour,
        };
        Some(self.effects.spawn(owner, location, radius, life, colour))
    }

    /// Shared path keys a mover is registered on.
    pub fn shared_keys_of(&self, mover: EntityId) -> &[PathKey] {
        self.routes.get(&mover).map(|r| r.shared.as_slice()).unwrap_or(&[])
    }

    /// Unique path handles a mover owns.
    pub fn unique_paths_of(&self, mover: EntityId) -> &[PathHandle] {
        self.routes.get(&mover).map(|r| r.unique.as_slice()).unwrap_or(&[])
    }

    // ── draw ──────────────────────────────────────────────────────────────

    /// Emits markers for objects in visible chunks, then paths and effects.
    pub fn draw(&self, list: &mut DrawList) {
        let mut visible: Vec<&WorldObject> = self.index.visible_objects().collect();
        visible.sort_by_key(|o| o.id);

        let markers = &self.config.markers;
        for object in visible {
            match object.kind {
                ObjectKind::Star => list.push_solid_circle(
                    ZIndex::STARS,
                    object.location,
                    markers.star_radius,
                    self.star_colour,
                ),
                ObjectKind::Mover => list.push_solid_circle(
                    ZIndex::MOVERS,
                    object.location,
                    markers.mover_radius,
                    self.mover_colour,
                ),
            }
        }

        self.paths.draw(list);
        self.effects.draw(list);
    }

    fn release_route(&mut self, mover: EntityId) {
        let Some(route) = self.routes.remove(&mover) else {
            return;
        };
        for key in route.shared {
            self.paths.remove_shared_path(key, mover);
        }
        for handle in route.unique {
            self.paths.remove_unique_path(handle);
        }
    }
}
