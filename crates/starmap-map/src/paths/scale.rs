//! Zoom compensation for path width.

use crate::config::{ScalingConfig, ScalingMode};

/// Y-axis scale for a path at `zoom_percent` (100 = 1:1).
///
/// Inside `[min_scale, max_scale]` the path scales with the world. Outside,
/// the correction cancels the excess so the on-screen width stays at
/// `min_scale` (or `max_scale`) times the world width.
pub fn y_scale(zoom_percent: f32, scaling: &ScalingConfig) -> f32 {
    if scaling.mode == ScalingMode::Unscaled {
        return 1.0;
    }

    let s = zoom_percent / 100.0;
    if !(s.is_finite() && s > 0.0) {
        return 1.0;
    }

    if s < scaling.min_scale {
        scaling.min_scale / s
    } else if s > scaling.max_scale {
        scaling.max_scale / s
    } else {
        1.0
    }
}
