use std::time::{Duration, Instant};

/// Frame timing snapshot.
#[derive(Debug, Copy, Clone)]
pub struct FrameTime {
    /// Time elapsed since the previous frame tick, in seconds.
    pub dt: f32,

    /// Monotonic frame counter.
    pub frame_index: u64,
}

/// Where a clock gets its time from.
#[derive(Debug, Clone)]
enum Source {
    /// Wall clock (`Instant::now`).
    Wall { last: Instant },
    /// Fixed step; used by headless drivers and tests so runs are reproducible.
    Fixed { step: Duration },
}

/// Frame clock producing `FrameTime` snapshots.
///
/// One clock per map view so that timed effects of separate views do not share
/// delta-time state.
///
/// Delta time is clamped to avoid pathological values when the host is paused
/// by the debugger, minimized, or stalls.
#[derive(Debug, Clone)]
pub struct FrameClock {
    source: Source,
    frame_index: u64,
    dt_min: Duration,
    dt_max: Duration,
}

impl FrameClock {
    /// Wall-clock driven clock with default clamps.
    pub fn new() -> Self {
        Self {
            source: Source::Wall { last: Instant::now() },
            frame_index: 0,
            dt_min: Duration::from_micros(100), // 0.0001s
            dt_max: Duration::from_millis(250), // 0.25s
        }
    }

    /// Clock that advances by exactly `step` per tick (after clamping).
    pub fn fixed(step: Duration) -> Self {
        Self { source: Source::Fixed { step }, ..Self::new() }
    }

    /// Creates a wall clock with custom delta-time clamps.
    pub fn with_clamps(dt_min: Duration, dt_max: Duration) -> Self {
        debug_assert!(dt_min <= dt_max);
        Self { dt_min, dt_max, ..Self::new() }
    }

    /// Resets the clock baseline.
    ///
    /// Useful after a full map reload so the first frame does not see the
    /// reload time as one huge delta.
    pub fn reset(&mut self) {
        if let Source::Wall { last } = &mut self.source {
            *last = Instant::now();
        }
    }

    /// Advances the clock and returns a new `FrameTime`.
    pub fn tick(&mut self) -> FrameTime {
        let raw = match &mut self.source {
            Source::Wall { last } => {
                let now = Instant::now();
                let dt = now.saturating_duration_since(*last);
                *last = now;
                dt
            }
            Source::Fixed { step } => *step,
        };

        let dt = raw.clamp(self.dt_min, self.dt_max);

        let ft = FrameTime {
            dt: dt.as_secs_f32(),
            frame_index: self.frame_index,
        };

        self.frame_index = self.frame_index.wrapping_add(1);

        ft
    }
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new()
    }
}
