//! Starmap map core.
//!
//! Chunked culling and level-of-detail dispatch for a large 2D strategic map,
//! plus reference-counted travel path geometry. Per-frame cost follows what
//! changed and what is on screen, not how many entities exist.
//!
//! Layering:
//! - `chunk`: generic square partition with per-chunk visibility
//! - `spatial`: stars and movers on a chunk grid, LOD callbacks
//! - `paths`: shared / unique path geometry on its own chunk grid
//! - `effects`: timed visual effects owned by entities
//! - `tick`: [`MapView`], which drives all of the above once per frame

pub mod chunk;
pub mod config;
pub mod effects;
pub mod paths;
pub mod spatial;
pub mod tick;
pub mod world;

pub use config::{ConfigError, MapConfig};
pub use spatial::{LodCallback, SpatialChunkIndex};
pub use tick::{Camera, MapView, TickReport};
pub use world::{EntityId, Leg, Presentation, WorldObject, WorldSnapshot};
