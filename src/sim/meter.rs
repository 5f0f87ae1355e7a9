//! Light meter
//!
//! The run's health. It drains slowly all the time and in chunks on contact,
//! recovers on passes and calm flight, and ends the run at zero. An overcharge
//! pickup lifts it above the normal ceiling for a few seconds.

use serde::{Deserialize, Serialize};

use super::obstacles::PickupKind;
use crate::consts::*;
use crate::tuning::Tuning;

/// Meter mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum MeterMode {
    /// At or below the normal ceiling
    #[default]
    Charging,
    /// Above the normal ceiling, decaying back down
    Overcharged,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LightMeter {
    value: f32,
    mode: MeterMode,
    /// Sim time of the last hit that drained the meter
    last_hit_at: Option<f32>,
}

impl LightMeter {
    pub fn new(start: f32) -> Self {
        let mut meter = Self {
            value: start,
            mode: MeterMode::Charging,
            last_hit_at: None,
        };
        meter.clamp();
        meter
    }

    pub fn value(&self) -> f32 {
        self.value
    }

    pub fn mode(&self) -> MeterMode {
        self.mode
    }

    /// Current upper bound
    pub fn ceiling(&self) -> f32 {
        match self.mode {
            MeterMode::Charging => LIGHT_MAX,
            MeterMode::Overcharged => LIGHT_OVERCHARGE_MAX,
        }
    }

    /// Value relative to the normal maximum (above 1.0 while overcharged)
    pub fn fraction(&self) -> f32 {
        self.value / LIGHT_MAX
    }

    pub fn is_empty(&self) -> bool {
        self.value <= 0.0
    }

    /// Passive change over `dt`. While overcharged only the overcharge decay
    /// applies; otherwise the drain is reduced by the coast bonus when calm.
    pub fn update(&mut self, dt: f32, calm: bool, tuning: &Tuning) {
        let dt = dt.max(0.0);
        match self.mode {
            MeterMode::Overcharged => {
                self.value -= tuning.overcharge_decay_per_sec * dt;
                if self.value <= LIGHT_MAX {
                    self.value = LIGHT_MAX;
                    self.mode = MeterMode::Charging;
                }
            }
            MeterMode::Charging => {
                let bonus = if calm { tuning.light_coast_bonus } else { 0.0 };
                self.value -= (tuning.light_drain_per_sec - bonus) * dt;
            }
        }
        self.clamp();
    }

    /// Drain on contact, at most once per debounce window.
    /// Returns true if this hit drained the meter.
    pub fn hit(&mut self, now: f32, tuning: &Tuning) -> bool {
        if let Some(last) = self.last_hit_at {
            if now - last < tuning.hit_debounce_seconds {
                return false;
            }
        }
        self.last_hit_at = Some(now);
        self.value -= tuning.light_drain_on_hit;
        if self.value <= LIGHT_MAX {
            self.mode = MeterMode::Charging;
        }
        self.clamp();
        true
    }

    /// Small top-up; never pushes past the normal maximum
    pub fn regen(&mut self, amount: f32) {
        if self.value < LIGHT_MAX {
            self.value = (self.value + amount).min(LIGHT_MAX);
        }
        self.clamp();
    }

    pub fn apply_pickup(&mut self, kind: PickupKind) {
        match kind {
            PickupKind::Restore => {
                self.value = self.value.max(LIGHT_MAX);
            }
            PickupKind::Overcharge => {
                self.mode = MeterMode::Overcharged;
                self.value = LIGHT_OVERCHARGE_MAX;
            }
        }
        self.clamp();
    }

    fn clamp(&mut self) {
        self.value = self.value.clamp(0.0, self.ceiling());
    }
}

impl Default for LightMeter {
    fn default() -> Self {
        Self::new(LIGHT_MAX)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_passive_drain() {
        let tuning = Tuning::default();
        let mut m = LightMeter::default();
        m.update(1.0, false, &tuning);
        assert!((m.value() - (1.0 - tuning.light_drain_per_sec)).abs() < 1e-5);
    }

    #[test]
    fn test_calm_drains_less() {
        let tuning = Tuning::default();
        let mut calm = LightMeter::default();
        let mut busy = LightMeter::default();
        calm.update(1.0, true, &tuning);
        busy.update(1.0, false, &tuning);
        assert!(calm.value() > busy.value());
    }

    #[test]
    fn test_coast_can_regenerate_up_to_max() {
        let tuning = Tuning {
            light_drain_per_sec: 0.05,
            light_coast_bonus: 0.2,
            ..Default::default()
        };
        let mut m = LightMeter::new(0.5);
        m.update(1.0, true, &tuning);
        assert!((m.value() - 0.65).abs() < 1e-5);
        m.update(100.0, true, &tuning);
        assert_eq!(m.value(), LIGHT_MAX);
    }

    #[test]
    fn test_hit_debounced() {
        let tuning = Tuning::default();
        let mut m = LightMeter::default();
        assert!(m.hit(1.0, &tuning));
        assert!(!m.hit(1.1, &tuning));
        assert!(!m.hit(1.0 + tuning.hit_debounce_seconds * 0.9, &tuning));
        let after_one = m.value();
        assert!((after_one - (1.0 - tuning.light_drain_on_hit)).abs() < 1e-5);
        assert!(m.hit(1.01 + tuning.hit_debounce_seconds, &tuning));
        assert!(m.value() < after_one);
    }

    #[test]
    fn test_hits_exhaust() {
        let tuning = Tuning::default();
        let mut m = LightMeter::default();
        for i in 0..10 {
            m.hit(i as f32, &tuning);
        }
        assert!(m.is_empty());
        assert_eq!(m.value(), 0.0);
    }

    #[test]
    fn test_regen_caps_at_normal_max() {
        let mut m = LightMeter::new(0.95);
        m.regen(0.14);
        assert_eq!(m.value(), LIGHT_MAX);
    }

    #[test]
    fn test_restore_pickup() {
        let mut m = LightMeter::new(0.2);
        m.apply_pickup(PickupKind::Restore);
        assert_eq!(m.value(), LIGHT_MAX);
        assert_eq!(m.mode(), MeterMode::Charging);
    }

    #[test]
    fn test_overcharge_decays_back() {
        let tuning = Tuning::default();
        let mut m = LightMeter::new(0.4);
        m.apply_pickup(PickupKind::Overcharge);
        assert_eq!(m.mode(), MeterMode::Overcharged);
        assert_eq!(m.value(), LIGHT_OVERCHARGE_MAX);

        // Regen does not stack on top of overcharge
        m.regen(0.2);
        assert_eq!(m.value(), LIGHT_OVERCHARGE_MAX);

        m.update(1.0, false, &tuning);
        let expected = LIGHT_OVERCHARGE_MAX - tuning.overcharge_decay_per_sec;
        assert!((m.value() - expected).abs() < 1e-5);

        // Decay is independent of calm
        let mut calm = m.clone();
        calm.update(0.5, true, &tuning);
        let mut busy = m.clone();
        busy.update(0.5, false, &tuning);
        assert_eq!(calm.value(), busy.value());

        for _ in 0..100 {
            m.update(0.1, false, &tuning);
            if m.mode() == MeterMode::Charging {
                break;
            }
        }
        assert_eq!(m.mode(), MeterMode::Charging);
        assert!(m.value() <= LIGHT_MAX);
    }

    #[test]
    fn test_restore_keeps_overcharge() {
        let mut m = LightMeter::default();
        m.apply_pickup(PickupKind::Overcharge);
        m.apply_pickup(PickupKind::Restore);
        assert_eq!(m.value(), LIGHT_OVERCHARGE_MAX);
    }

    #[derive(Debug, Clone)]
    enum Op {
        Update(f32, bool),
        Hit(f32),
        Regen(f32),
        Pickup(bool),
    }

    fn op() -> impl Strategy<Value = Op> {
        prop_oneof![
            (0.0f32..1.0, any::<bool>()).prop_map(|(dt, calm)| Op::Update(dt, calm)),
            (0.0f32..100.0).prop_map(Op::Hit),
            (0.0f32..2.0).prop_map(Op::Regen),
            any::<bool>().prop_map(Op::Pickup),
        ]
    }

    proptest! {
        #[test]
        fn prop_meter_always_bounded(start in -1.0f32..3.0, ops in prop::collection::vec(op(), 0..100)) {
            let tuning = Tuning::default();
            let mut m = LightMeter::new(start);
            prop_assert!(m.value() >= 0.0 && m.value() <= m.ceiling());
            for op in ops {
                match op {
                    Op::Update(dt, calm) => m.update(dt, calm, &tuning),
                    Op::Hit(t) => { m.hit(t, &tuning); }
                    Op::Regen(a) => m.regen(a),
                    Op::Pickup(over) => m.apply_pickup(if over { PickupKind::Overcharge } else { PickupKind::Restore }),
                }
                prop_assert!(m.value() >= 0.0);
                prop_assert!(m.value() <= LIGHT_OVERCHARGE_MAX);
                prop_assert!(m.value() <= m.ceiling());
            }
        }
    }
}
