//! Run state and core simulation types
//!
//! `RunState` is the whole simulation context. Components receive the pieces
//! they need from it by reference; nothing lives in globals.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use super::kinematics::Player;
use super::meter::LightMeter;
use super::obstacles::{ObstacleField, PickupKind};
use super::rng::SimRng;
use crate::Viewport;
use crate::tuning::Tuning;

/// Lifecycle of a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RunPhase {
    /// Waiting for the first trigger, player parked
    Idle,
    /// Physics and scoring active
    Running,
    /// Frozen; reward overlay showing
    Ended,
}

/// Why a run ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EndReason {
    /// Light meter hit zero
    LightOut,
    /// Player left the viewport
    OutOfBounds,
}

/// Things that happened during a tick, for audio/overlay/persistence
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    Started,
    Rise { multiplier: f32 },
    /// Contact that drained the light; `obstacle` is None for an edge bounce
    Hit { obstacle: Option<u32> },
    Passed { obstacle: u32, score: u32 },
    NewBest { best: u32 },
    PickupCollected(PickupKind),
    RunEnded {
        final_score: u32,
        best_score: u32,
        reason: EndReason,
    },
}

/// Complete run state (deterministic, serializable)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunState {
    pub phase: RunPhase,
    pub viewport: Viewport,
    pub player: Player,
    pub field: ObstacleField,
    pub meter: LightMeter,
    /// Gates passed this run
    pub score: u32,
    /// Best score across runs (monotonic)
    pub best: u32,
    /// Ids already credited this run
    pub passed: BTreeSet<u32>,
    pub rng: SimRng,
    /// Seconds of Running simulation this run
    pub time: f32,
    /// Sim time of the last rise
    pub last_rise_at: Option<f32>,
    /// Ticks processed this session
    pub frames: u64,
}

impl RunState {
    /// Fresh state in Idle with the opening gates laid out
    pub fn new(seed: u64, best: u32, tuning: &Tuning, viewport: Viewport) -> Self {
        let mut state = Self {
            phase: RunPhase::Idle,
            viewport,
            player: Player::idle(viewport),
            field: ObstacleField::new(),
            meter: LightMeter::new(tuning.light_start),
            score: 0,
            best,
            passed: BTreeSet::new(),
            rng: SimRng::new(seed),
            time: 0.0,
            last_rise_at: None,
            frames: 0,
        };
        state.reset_run(tuning);
        state
    }

    /// Reset everything that belongs to a single run
    pub fn reset_run(&mut self, tuning: &Tuning) {
        self.phase = RunPhase::Idle;
        self.player = Player::idle(self.viewport);
        self.field.reset(tuning, self.viewport, &mut self.rng);
        self.meter = LightMeter::new(tuning.light_start);
        self.score = 0;
        self.passed.clear();
        self.time = 0.0;
        self.last_rise_at = None;
    }

    /// Apply a new viewport. A parked player follows its idle spot.
    pub fn set_viewport(&mut self, viewport: Viewport) {
        self.viewport = viewport;
        if self.phase == RunPhase::Idle {
            self.player = Player::idle(viewport);
        } else {
            self.player.pos.x = super::kinematics::idle_position(viewport).x;
        }
    }

    /// No rise within the coast gate and vertical speed below the calm threshold
    pub fn is_calm(&self, tuning: &Tuning) -> bool {
        let quiet = self
            .last_rise_at
            .is_none_or(|t| self.time - t > tuning.coast_gate_seconds);
        quiet && self.player.vy.abs() < tuning.calm_speed
    }
}
