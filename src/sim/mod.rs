//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Clamped variable timestep, one step per display refresh
//! - Seeded RNG only
//! - Stable iteration order (gates ordered left to right by id)
//! - No rendering or platform dependencies

pub mod collision;
pub mod controller;
pub mod input;
pub mod kinematics;
pub mod meter;
pub mod obstacles;
pub mod rng;
pub mod state;
pub mod tick;

pub use collision::{Rect, circle_circle_overlap, circle_rect_overlap};
pub use controller::RunController;
pub use input::{TickInput, TriggerLatch};
pub use kinematics::{BoundsOutcome, Player};
pub use meter::{LightMeter, MeterMode};
pub use obstacles::{Obstacle, ObstacleField, Pickup, PickupKind};
pub use rng::SimRng;
pub use state::{EndReason, GameEvent, RunPhase, RunState};
pub use tick::{continue_run, end_run, start_run, tick};
