//! Travel paths between stars and movers.
//!
//! - `key`: direction-independent edge identity.
//! - `geometry`: solid / dashed quads along an edge.
//! - `scale`: zoom compensation for path width.
//! - `cache`: shared and unique path registry with chunk culling.

pub mod cache;
pub mod geometry;
pub mod key;
pub mod scale;

pub use cache::{PathCache, PathHandle, PathHost, PathTickReport, SharedPath};
pub use geometry::{PathGeometry, Span};
pub use key::PathKey;
