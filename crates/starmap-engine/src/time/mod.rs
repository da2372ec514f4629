//! Time subsystem.
//!
//! Provides stable, testable frame timing without coupling to a window loop.
//! Intended usage:
//! - one `FrameClock` per map view
//! - call `tick()` once per presented frame to obtain `FrameTime`
//! - use `FrameClock::fixed` for headless or scripted runs

mod frame_clock;

pub use frame_clock::{FrameClock, FrameTime};
