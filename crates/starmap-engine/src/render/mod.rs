//! CPU-side preparation of draw streams for GPU upload.
//!
//! GPU submission itself belongs to the host; this module only flattens a
//! [`DrawList`](crate::scene::DrawList) into tightly packed instance arrays
//! that can be handed to `queue.write_buffer` as-is.

mod batch;

pub use batch::{CircleInstance, InstanceBatch, QuadInstance};
