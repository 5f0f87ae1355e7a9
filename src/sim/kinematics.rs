//! Player kinematics
//!
//! Semi-implicit Euler under gravity with a terminal fall speed. A rise sets
//! the vertical velocity outright rather than adding to it.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::tuning::{BoundsPolicy, Tuning};
use crate::{Viewport, lerp, smoothstep};

/// The player's light orb
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Player {
    /// x is fixed for the whole run; y moves
    pub pos: Vec2,
    /// Vertical velocity (px/s, positive = down)
    pub vy: f32,
    pub radius: f32,
    /// Seconds left in the post-rise reduced-gravity window
    pub grace: f32,
}

impl Player {
    /// Player parked at its idle spot for the given viewport
    pub fn idle(viewport: Viewport) -> Self {
        Self {
            pos: idle_position(viewport),
            vy: 0.0,
            radius: PLAYER_RADIUS,
            grace: 0.0,
        }
    }

    /// Leading (right) edge x
    pub fn leading_edge(&self) -> f32 {
        self.pos.x + self.radius
    }

    /// Trailing (left) edge x
    pub fn trailing_edge(&self) -> f32 {
        self.pos.x - self.radius
    }
}

/// Idle position for a viewport
pub fn idle_position(viewport: Viewport) -> Vec2 {
    Vec2::new(
        (viewport.width * PLAYER_X_FRACTION).round(),
        (viewport.height * PLAYER_IDLE_Y_FRACTION).round(),
    )
}

/// Outcome of the vertical bounds check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoundsOutcome {
    Inside,
    /// Player left the viewport (EndRun policy)
    Escaped,
    /// Player was pushed back from an edge (Bounce policy)
    Bounced,
}

/// Advance the player by `dt` seconds.
///
/// `dt` is clamped to `[0, MAX_DT]`. Velocity never exceeds the terminal fall
/// speed after the step.
pub fn integrate(player: &mut Player, tuning: &Tuning, dt: f32) {
    let dt = dt.clamp(0.0, MAX_DT);
    let gravity = if player.grace > 0.0 {
        tuning.gravity * tuning.grace_gravity_scale
    } else {
        tuning.gravity
    };
    player.grace = (player.grace - dt).max(0.0);

    player.vy = (player.vy + gravity * dt).min(tuning.max_fall_speed);
    player.pos.y += player.vy * dt;
}

/// Strength multiplier for a rise.
///
/// `light_fraction` is the meter relative to its normal maximum (may exceed 1
/// while overcharged). `held_ms` is the trigger hold time in variable-rise mode.
pub fn rise_multiplier(tuning: &Tuning, light_fraction: f32, held_ms: Option<f64>) -> f32 {
    let mut mult = 1.0;
    if tuning.thrust_scales_with_light {
        mult *= lerp(tuning.thrust_floor, 1.0, light_fraction.clamp(0.0, 1.0));
    }
    if tuning.variable_rise {
        if let Some(held) = held_ms {
            let t = smoothstep(0.0, tuning.hold_max_ms as f32, held as f32);
            mult *= lerp(tuning.hold_min_multiplier, tuning.hold_max_multiplier, t);
        }
    }
    mult
}

/// Apply a rise: velocity is set, not added, and the grace window reopens
pub fn rise(player: &mut Player, tuning: &Tuning, multiplier: f32) {
    player.vy = tuning.rise_impulse * multiplier;
    player.grace = tuning.grace_seconds;
}

/// Enforce the vertical bounds policy
pub fn check_bounds(player: &mut Player, tuning: &Tuning, viewport: Viewport) -> BoundsOutcome {
    match tuning.bounds {
        BoundsPolicy::EndRun => {
            let y = player.pos.y;
            if y < -OUT_OF_BOUNDS_SLACK || y > viewport.height + OUT_OF_BOUNDS_SLACK {
                BoundsOutcome::Escaped
            } else {
                BoundsOutcome::Inside
            }
        }
        BoundsPolicy::Bounce => {
            let top = player.radius;
            let bottom = (viewport.height - player.radius).max(top);
            if player.pos.y < top || player.pos.y > bottom {
                player.pos.y = player.pos.y.clamp(top, bottom);
                player.vy *= tuning.hit_bounce;
                BoundsOutcome::Bounced
            } else {
                BoundsOutcome::Inside
            }
        }
    }
}
