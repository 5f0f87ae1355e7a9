//! Daily Walk - keep your light on through the dark
//!
//! Core modules:
//! - `sim`: Deterministic simulation (kinematics, obstacles, light meter, run state)
//! - `tuning`: Data-driven game balance and behavior policies
//! - `persistence`: Best-score storage
//! - `platform`: Clock, daily seed and share helpers
//! - `reward`: End-of-run verse card

#[cfg(target_arch = "wasm32")]
pub mod audio;
pub mod persistence;
pub mod platform;
pub mod reward;
pub mod settings;
pub mod sim;
pub mod tuning;

pub use settings::Settings;
pub use tuning::{BoundsPolicy, RestartPolicy, StartPolicy, Tuning};

/// Game configuration constants
pub mod consts {
    /// Largest simulation step accepted from the frame clock (seconds)
    pub const MAX_DT: f32 = 0.033;
    /// Nominal display refresh step used for scripted runs and tests
    pub const FRAME_DT: f32 = 1.0 / 60.0;

    /// Player placement as a fraction of the viewport
    pub const PLAYER_X_FRACTION: f32 = 0.28;
    pub const PLAYER_IDLE_Y_FRACTION: f32 = 0.45;
    pub const PLAYER_RADIUS: f32 = 14.0;

    /// How far past the top/bottom edge the player may drift before the run ends
    pub const OUT_OF_BOUNDS_SLACK: f32 = 40.0;

    /// Obstacles are dropped once their right edge is this far past the left edge
    pub const RECYCLE_SLACK: f32 = 30.0;

    /// Normal light ceiling
    pub const LIGHT_MAX: f32 = 1.0;
    /// Ceiling while overcharged
    pub const LIGHT_OVERCHARGE_MAX: f32 = 1.5;
}

/// Viewport size in device-independent pixels
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

impl Viewport {
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            width: width.max(1.0),
            height: height.max(1.0),
        }
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(960.0, 640.0)
    }
}

/// Hermite smoothstep of `x` between `edge0` and `edge1`, in [0, 1]
#[inline]
pub fn smoothstep(edge0: f32, edge1: f32, x: f32) -> f32 {
    if edge1 <= edge0 {
        return if x < edge0 { 0.0 } else { 1.0 };
    }
    let t = ((x - edge0) / (edge1 - edge0)).clamp(0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}

/// Linear interpolation
#[inline]
pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_smoothstep_edges() {
        assert_eq!(smoothstep(0.0, 1.0, -1.0), 0.0);
        assert_eq!(smoothstep(0.0, 1.0, 2.0), 1.0);
        assert!((smoothstep(0.0, 1.0, 0.5) - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_smoothstep_degenerate_range() {
        assert_eq!(smoothstep(1.0, 1.0, 0.5), 0.0);
        assert_eq!(smoothstep(1.0, 1.0, 1.5), 1.0);
    }

    #[test]
    fn test_viewport_never_zero() {
        let v = Viewport::new(0.0, -5.0);
        assert_eq!(v.width, 1.0);
        assert_eq!(v.height, 1.0);
    }
}
