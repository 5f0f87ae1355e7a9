//! Data-driven game balance
//!
//! Every number the simulation reads lives here. Defaults match the shipped
//! feel of the game; a JSON override can be loaded for playtesting.

use serde::{Deserialize, Serialize};

use crate::consts::*;

/// LocalStorage key (wasm) / environment variable (native) holding a JSON
/// tuning override
pub const TUNING_OVERRIDE_KEY: &str = "daily_walk_tuning";

/// What happens when the player leaves the top or bottom of the viewport
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum BoundsPolicy {
    /// Drifting past the edge (plus slack) ends the run
    #[default]
    EndRun,
    /// The edge acts as a wall: the player bounces and takes a hit
    Bounce,
}

/// What the first trigger does while Idle
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub enum StartPolicy {
    /// Arms the run; the player holds still until the next trigger
    #[default]
    ArmOnly,
    /// Arms the run and applies `fraction` of the rise impulse immediately
    Impulse { fraction: f32 },
}

/// Where the continue action lands after a run ends
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum RestartPolicy {
    /// Back to "tap to start"
    #[default]
    ToIdle,
    /// Straight into a fresh run
    ToRunning,
}

/// Game balance knobs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    // === Kinematics ===
    /// Downward acceleration (px/s²)
    pub gravity: f32,
    /// Velocity set on rise (px/s, negative = up)
    pub rise_impulse: f32,
    /// Terminal fall speed (px/s)
    pub max_fall_speed: f32,
    /// Gravity scale during the post-rise grace window
    pub grace_gravity_scale: f32,
    /// Length of the post-rise grace window (s)
    pub grace_seconds: f32,
    /// Weaker thrust when the light is low
    pub thrust_scales_with_light: bool,
    /// Thrust multiplier at an empty meter (full meter = 1.0)
    pub thrust_floor: f32,
    /// Rise strength follows how long the trigger was held
    pub variable_rise: bool,
    /// Hold time that maps to the strongest rise (ms)
    pub hold_max_ms: f64,
    pub hold_min_multiplier: f32,
    pub hold_max_multiplier: f32,
    /// Minimum time between two accepted triggers (ms)
    pub trigger_lockout_ms: f64,

    // === World ===
    /// Scroll speed at score 0 (px/s)
    pub scroll_speed: f32,
    pub scroll_growth_per_score: f32,
    pub scroll_speed_max: f32,

    // === Obstacles ===
    pub obstacle_width: f32,
    pub gap_base: f32,
    pub gap_tighten_per_score: f32,
    pub gap_min: f32,
    /// Extra gap height while score < `early_bonus_until`
    pub early_gap_bonus: f32,
    pub early_bonus_until: u32,
    /// Vertical margin kept clear of the gap band
    pub gap_margin: f32,
    /// Largest vertical jump between consecutive gap centers
    pub center_delta_base: f32,
    pub center_delta_growth: f32,
    pub center_delta_max: f32,
    pub initial_obstacles: usize,
    pub initial_spacing: f32,
    pub spacing_base: f32,
    pub spacing_tighten_per_score: f32,
    pub min_spacing: f32,
    /// Spawn when the rightmost obstacle is closer than this to the right edge
    pub spawn_lead: f32,

    // === Pickups ===
    pub pickup_chance: f32,
    pub overcharge_share: f32,
    pub pickup_radius: f32,
    pub pickup_edge_inset: f32,

    // === Light ===
    pub light_start: f32,
    pub light_drain_per_sec: f32,
    pub light_coast_bonus: f32,
    pub coast_gate_seconds: f32,
    pub calm_speed: f32,
    pub light_drain_on_hit: f32,
    pub hit_debounce_seconds: f32,
    pub light_regen_on_pass: f32,
    pub light_regen_on_rise: f32,
    pub overcharge_decay_per_sec: f32,
    /// Velocity multiplier applied on obstacle contact
    pub hit_bounce: f32,

    // === Policies ===
    pub bounds: BoundsPolicy,
    pub start: StartPolicy,
    pub restart: RestartPolicy,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            gravity: 1300.0,
            rise_impulse: -420.0,
            max_fall_speed: 900.0,
            grace_gravity_scale: 0.6,
            grace_seconds: 0.12,
            thrust_scales_with_light: false,
            thrust_floor: 0.8,
            variable_rise: false,
            hold_max_ms: 220.0,
            hold_min_multiplier: 0.75,
            hold_max_multiplier: 1.15,
            trigger_lockout_ms: 40.0,

            scroll_speed: 240.0,
            scroll_growth_per_score: 1.5,
            scroll_speed_max: 320.0,

            obstacle_width: 78.0,
            gap_base: 190.0,
            gap_tighten_per_score: 0.8,
            gap_min: 132.0,
            early_gap_bonus: 24.0,
            early_bonus_until: 5,
            gap_margin: 70.0,
            center_delta_base: 170.0,
            center_delta_growth: 2.0,
            center_delta_max: 260.0,
            initial_obstacles: 3,
            initial_spacing: 340.0,
            spacing_base: 340.0,
            spacing_tighten_per_score: 1.5,
            min_spacing: 280.0,
            spawn_lead: 120.0,

            pickup_chance: 0.15,
            overcharge_share: 0.2,
            pickup_radius: 12.0,
            pickup_edge_inset: 22.0,

            light_start: LIGHT_MAX,
            light_drain_per_sec: 0.14,
            light_coast_bonus: 0.08,
            coast_gate_seconds: 0.5,
            calm_speed: 260.0,
            light_drain_on_hit: 0.28,
            hit_debounce_seconds: 0.35,
            light_regen_on_pass: 0.14,
            light_regen_on_rise: 0.01,
            overcharge_decay_per_sec: 0.25,
            hit_bounce: -0.25,

            bounds: BoundsPolicy::EndRun,
            start: StartPolicy::ArmOnly,
            restart: RestartPolicy::ToIdle,
        }
    }
}

impl Tuning {
    /// Parse a JSON override; missing fields keep their defaults.
    /// Invalid JSON falls back to defaults entirely.
    pub fn from_json(json: &str) -> Self {
        match serde_json::from_str::<Tuning>(json) {
            Ok(tuning) => tuning.sanitized(),
            Err(e) => {
                log::warn!("Ignoring invalid tuning override: {}", e);
                Self::default()
            }
        }
    }

    /// Apply an optional override; `None` keeps the defaults
    pub fn with_override(json: Option<&str>) -> Self {
        match json {
            Some(json) if !json.trim().is_empty() => {
                log::info!("Applying tuning override");
                Self::from_json(json)
            }
            _ => Self::default(),
        }
    }

    /// Load the override from LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        let raw = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten()
            .and_then(|s| s.get_item(TUNING_OVERRIDE_KEY).ok().flatten());
        Self::with_override(raw.as_deref())
    }

    /// Load the override from the `DAILY_WALK_TUNING` environment variable
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load() -> Self {
        let raw = std::env::var(TUNING_OVERRIDE_KEY.to_uppercase()).ok();
        Self::with_override(raw.as_deref())
    }

    /// Repair values that would break the fairness invariants
    pub fn sanitized(mut self) -> Self {
        self.gap_min = self.gap_min.max(self.pickup_radius * 2.0 + PLAYER_RADIUS * 2.0);
        self.gap_base = self.gap_base.max(self.gap_min);
        self.min_spacing = self.min_spacing.max(self.obstacle_width);
        self.spacing_base = self.spacing_base.max(self.min_spacing);
        self.initial_spacing = self.initial_spacing.max(self.min_spacing);
        self.max_fall_speed = self.max_fall_speed.max(0.0);
        self.scroll_speed_max = self.scroll_speed_max.max(self.scroll_speed);
        self.center_delta_max = self.center_delta_max.max(self.center_delta_base);
        self.pickup_chance = self.pickup_chance.clamp(0.0, 1.0);
        self.overcharge_share = self.overcharge_share.clamp(0.0, 1.0);
        self
    }

    /// Scroll speed for the current score
    pub fn scroll_for_score(&self, score: u32) -> f32 {
        (self.scroll_speed + score as f32 * self.scroll_growth_per_score)
            .min(self.scroll_speed_max)
    }

    /// Gap height for the current score, never below `gap_min`
    pub fn gap_for_score(&self, score: u32) -> f32 {
        let gap = (self.gap_base - score as f32 * self.gap_tighten_per_score)
            .clamp(self.gap_min, self.gap_base);
        if score < self.early_bonus_until {
            gap + self.early_gap_bonus
        } else {
            gap
        }
    }

    /// Spacing to the next obstacle for the current score, never below `min_spacing`
    pub fn spacing_for_score(&self, score: u32) -> f32 {
        (self.spacing_base - score as f32 * self.spacing_tighten_per_score)
            .clamp(self.min_spacing, self.spacing_base)
    }

    /// Largest allowed change in gap center between consecutive obstacles
    pub fn center_delta_for_score(&self, score: u32) -> f32 {
        (self.center_delta_base + score as f32 * self.center_delta_growth)
            .min(self.center_delta_max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gap_never_below_floor() {
        let t = Tuning::default();
        for score in [0, 10, 100, 1_000, 100_000] {
            assert!(t.gap_for_score(score) >= t.gap_min);
        }
        assert_eq!(t.gap_for_score(1_000), t.gap_min);
    }

    #[test]
    fn test_early_bonus_only_at_start() {
        let t = Tuning::default();
        assert_eq!(t.gap_for_score(0), t.gap_base + t.early_gap_bonus);
        let at_cutoff = t.gap_base - t.early_bonus_until as f32 * t.gap_tighten_per_score;
        assert!((t.gap_for_score(t.early_bonus_until) - at_cutoff).abs() < 1e-4);
    }

    #[test]
    fn test_spacing_floored() {
        let t = Tuning::default();
        assert_eq!(t.spacing_for_score(0), t.spacing_base);
        assert_eq!(t.spacing_for_score(10_000), t.min_spacing);
    }

    #[test]
    fn test_scroll_capped() {
        let t = Tuning::default();
        assert_eq!(t.scroll_for_score(0), 240.0);
        assert_eq!(t.scroll_for_score(10_000), t.scroll_speed_max);
    }

    #[test]
    fn test_from_json_partial_override() {
        let t = Tuning::from_json(r#"{ "gravity": 1350.0, "bounds": "Bounce" }"#);
        assert_eq!(t.gravity, 1350.0);
        assert_eq!(t.bounds, BoundsPolicy::Bounce);
        assert_eq!(t.max_fall_speed, 900.0);
    }

    #[test]
    fn test_from_json_invalid_falls_back() {
        let t = Tuning::from_json("not json");
        assert_eq!(t, Tuning::default());
    }

    #[test]
    fn test_missing_override_keeps_defaults() {
        assert_eq!(Tuning::with_override(None), Tuning::default());
        assert_eq!(Tuning::with_override(Some("  ")), Tuning::default());
        let t = Tuning::with_override(Some(r#"{ "variable_rise": true }"#));
        assert!(t.variable_rise);
    }

    #[test]
    fn test_sanitize_repairs_spacing() {
        let t = Tuning {
            min_spacing: 10.0,
            spacing_base: 5.0,
            ..Default::default()
        }
        .sanitized();
        assert!(t.min_spacing >= t.obstacle_width);
        assert!(t.spacing_base >= t.min_spacing);
    }
}
