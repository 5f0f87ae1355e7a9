//! Per-step simulation
//!
//! One call per display refresh. Order within a step is fixed:
//! input → integrate → scroll/spawn/recycle → collisions/scoring →
//! light update → terminal check.

use super::input::TickInput;
use super::kinematics::{self, BoundsOutcome};
use super::state::{EndReason, GameEvent, RunPhase, RunState};
use crate::consts::*;
use crate::tuning::{RestartPolicy, StartPolicy, Tuning};

/// Advance the run by one step of `dt` seconds (clamped to `MAX_DT`)
pub fn tick(
    state: &mut RunState,
    tuning: &Tuning,
    input: &TickInput,
    dt: f32,
    events: &mut Vec<GameEvent>,
) {
    let dt = dt.clamp(0.0, MAX_DT);
    state.frames += 1;

    match state.phase {
        RunPhase::Idle => {
            // Parked: no gravity until the run is armed
            if input.press {
                start_run(state, tuning, events);
            }
        }
        RunPhase::Ended => {}
        RunPhase::Running => step_running(state, tuning, input, dt, events),
    }
}

fn step_running(
    state: &mut RunState,
    tuning: &Tuning,
    input: &TickInput,
    dt: f32,
    events: &mut Vec<GameEvent>,
) {
    // A meter that is already dark ends the run before anything can refill it
    if state.meter.is_empty() {
        end_run(state, EndReason::LightOut, events);
        return;
    }

    state.time += dt;

    // --- Input ---
    let fraction = state.meter.fraction();
    let multiplier = if tuning.variable_rise {
        input
            .release_held_ms
            .map(|held| kinematics::rise_multiplier(tuning, fraction, Some(held)))
    } else if input.press {
        Some(kinematics::rise_multiplier(tuning, fraction, None))
    } else {
        None
    };
    if let Some(multiplier) = multiplier {
        kinematics::rise(&mut state.player, tuning, multiplier);
        state.last_rise_at = Some(state.time);
        state.meter.regen(tuning.light_regen_on_rise);
        events.push(GameEvent::Rise { multiplier });
    }

    // --- Physics ---
    kinematics::integrate(&mut state.player, tuning, dt);
    match kinematics::check_bounds(&mut state.player, tuning, state.viewport) {
        BoundsOutcome::Inside => {}
        BoundsOutcome::Escaped => {
            end_run(state, EndReason::OutOfBounds, events);
            return;
        }
        BoundsOutcome::Bounced => {
            if state.meter.hit(state.time, tuning) {
                events.push(GameEvent::Hit { obstacle: None });
            }
        }
    }

    // --- World ---
    state
        .field
        .update(dt, state.score, tuning, state.viewport, &mut state.rng);

    // --- Collisions ---
    if let Some(id) = state.field.first_hit(&state.player, state.viewport) {
        if state.meter.hit(state.time, tuning) {
            state.player.vy *= tuning.hit_bounce;
            events.push(GameEvent::Hit { obstacle: Some(id) });
        }
    }

    for kind in state.field.collect_pickups(&state.player) {
        state.meter.apply_pickup(kind);
        events.push(GameEvent::PickupCollected(kind));
    }

    // --- Scoring ---
    let newly_passed: Vec<u32> = state
        .field
        .obstacles
        .iter()
        .filter(|o| o.is_behind(&state.player) && !state.passed.contains(&o.id))
        .map(|o| o.id)
        .collect();
    for id in newly_passed {
        if !state.passed.insert(id) {
            continue;
        }
        state.score += 1;
        state.meter.regen(tuning.light_regen_on_pass);
        events.push(GameEvent::Passed {
            obstacle: id,
            score: state.score,
        });
        if state.score > state.best {
            state.best = state.score;
            events.push(GameEvent::NewBest { best: state.best });
        }
    }
    // Recycled gates can never come back, so their ids can be forgotten
    if let Some(first) = state.field.obstacles.first() {
        let first_id = first.id;
        state.passed.retain(|&id| id >= first_id);
    }

    // --- Light ---
    let calm = state.is_calm(tuning);
    state.meter.update(dt, calm, tuning);

    // --- Terminal ---
    if state.meter.is_empty() {
        end_run(state, EndReason::LightOut, events);
    }
}

/// Idle → Running
pub fn start_run(state: &mut RunState, tuning: &Tuning, events: &mut Vec<GameEvent>) {
    if state.phase != RunPhase::Idle {
        return;
    }
    state.phase = RunPhase::Running;
    state.player.vy = 0.0;
    state.last_rise_at = None;
    events.push(GameEvent::Started);
    log::info!("Run started (best {})", state.best);

    if let StartPolicy::Impulse { fraction } = tuning.start {
        kinematics::rise(&mut state.player, tuning, fraction);
        state.last_rise_at = Some(state.time);
        events.push(GameEvent::Rise {
            multiplier: fraction,
        });
    }
}

/// Running → Ended. Only the first call per run has any effect.
pub fn end_run(state: &mut RunState, reason: EndReason, events: &mut Vec<GameEvent>) {
    if state.phase != RunPhase::Running {
        return;
    }
    state.phase = RunPhase::Ended;
    log::info!(
        "Run ended ({:?}): score {} best {}",
        reason,
        state.score,
        state.best
    );
    events.push(GameEvent::RunEnded {
        final_score: state.score,
        best_score: state.best,
        reason,
    });
}

/// Ended → Idle (or straight to Running, per `RestartPolicy`)
pub fn continue_run(state: &mut RunState, tuning: &Tuning, events: &mut Vec<GameEvent>) {
    if state.phase != RunPhase::Ended {
        return;
    }
    state.reset_run(tuning);
    if tuning.restart == RestartPolicy::ToRunning {
        start_run(state, tuning, events);
    }
}
