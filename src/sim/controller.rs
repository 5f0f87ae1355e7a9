//! Run controller
//!
//! The one object the shell talks to. It owns the simulation context, the
//! trigger latch, the frame clock and the best-score store, and exposes the
//! two abstract input signals (`trigger_down` / `trigger_up`), the frame
//! callback, and the continue action.

use super::input::TriggerLatch;
use super::state::{GameEvent, RunPhase, RunState};
use super::tick::{continue_run, tick};
use crate::Viewport;
use crate::persistence::BestScoreStore;
use crate::platform::FrameClock;
use crate::tuning::Tuning;

pub struct RunController<S: BestScoreStore> {
    state: RunState,
    tuning: Tuning,
    latch: TriggerLatch,
    clock: FrameClock,
    store: S,
    events: Vec<GameEvent>,
    /// Step length used by the last `frame`
    last_dt: f32,
}

impl<S: BestScoreStore> RunController<S> {
    /// Boot: read the stored best and park a fresh run in Idle
    pub fn new(tuning: Tuning, viewport: Viewport, seed: u64, store: S) -> Self {
        let best = store.load_best();
        let state = RunState::new(seed, best, &tuning, viewport);
        log::info!("Controller ready (seed {}, best {})", seed, best);
        Self {
            state,
            tuning,
            latch: TriggerLatch::new(),
            clock: FrameClock::new(),
            store,
            events: Vec::new(),
            last_dt: 0.0,
        }
    }

    pub fn state(&self) -> &RunState {
        &self.state
    }

    pub fn tuning(&self) -> &Tuning {
        &self.tuning
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn phase(&self) -> RunPhase {
        self.state.phase
    }

    pub fn score(&self) -> u32 {
        self.state.score
    }

    pub fn best(&self) -> u32 {
        self.state.best
    }

    /// Light meter value
    pub fn light(&self) -> f32 {
        self.state.meter.value()
    }

    /// Pointer-down / key-down. Returns true if the press was accepted.
    pub fn trigger_down(&mut self, now_ms: f64) -> bool {
        self.latch.trigger_down(now_ms, &self.tuning)
    }

    /// Pointer-up / key-up
    pub fn trigger_up(&mut self, now_ms: f64) {
        self.latch.trigger_up(now_ms);
    }

    pub fn resize(&mut self, width: f32, height: f32) {
        self.state.set_viewport(Viewport::new(width, height));
    }

    /// Restart the RNG stream (e.g. daily seed). Takes effect from the next spawn.
    pub fn reseed(&mut self, seed: u64) {
        self.state.rng.reseed(seed);
    }

    /// Display-refresh callback: derive dt from the clock and step once
    pub fn frame(&mut self, now_ms: f64) -> &[GameEvent] {
        let dt = self.clock.tick(now_ms);
        self.last_dt = dt;
        self.step(dt, now_ms)
    }

    /// Clamped step length of the last `frame`, for UI timers that should
    /// follow the simulation clock
    pub fn last_dt(&self) -> f32 {
        self.last_dt
    }

    /// Step with an explicit dt (scripted runs, tests)
    pub fn step(&mut self, dt: f32, now_ms: f64) -> &[GameEvent] {
        let input = self.latch.take(now_ms, &self.tuning);
        self.events.clear();
        tick(&mut self.state, &self.tuning, &input, dt, &mut self.events);
        self.react();
        &self.events
    }

    /// The overlay's continue callback
    pub fn continue_run(&mut self) -> &[GameEvent] {
        self.events.clear();
        if self.state.phase != RunPhase::Ended {
            log::warn!("Continue requested outside of Ended ({:?})", self.state.phase);
            return &self.events;
        }
        continue_run(&mut self.state, &self.tuning, &mut self.events);
        self.latch.clear();
        self.react();
        &self.events
    }

    /// Forget frame timing, e.g. when the page becomes visible again
    pub fn pause_clock(&mut self) {
        self.clock.reset();
    }

    fn react(&mut self) {
        for event in &self.events {
            match event {
                GameEvent::NewBest { best } => {
                    if let Err(e) = self.store.save_best(*best) {
                        log::warn!("Could not persist best score {}: {}", best, e);
                    }
                }
                GameEvent::Started => {
                    // The press that armed the run must not also fire a rise on release
                    self.latch.consume_hold();
                }
                _ => {}
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::*;
    use crate::persistence::MemoryStore;

    fn controller(store: MemoryStore) -> RunController<MemoryStore> {
        RunController::new(Tuning::default(), Viewport::new(900.0, 640.0), 5, store)
    }

    #[test]
    fn test_boot_reads_best() {
        let ctl = controller(MemoryStore::with_raw("12"));
        assert_eq!(ctl.best(), 12);
        assert_eq!(ctl.phase(), RunPhase::Idle);
    }

    #[test]
    fn test_boot_with_garbage_best() {
        let ctl = controller(MemoryStore::with_raw("lots"));
        assert_eq!(ctl.best(), 0);
    }

    #[test]
    fn test_trigger_latched_to_next_frame() {
        let mut ctl = controller(MemoryStore::new());
        ctl.frame(0.0);
        assert!(ctl.trigger_down(10.0));
        assert_eq!(ctl.phase(), RunPhase::Idle);
        let events = ctl.frame(16.0).to_vec();
        assert_eq!(events, vec![GameEvent::Started]);
        assert_eq!(ctl.phase(), RunPhase::Running);
    }

    #[test]
    fn test_new_best_written_immediately() {
        let mut ctl = controller(MemoryStore::new());
        ctl.trigger_down(0.0);
        ctl.step(FRAME_DT, 0.0);
        let mut ms = 0.0;
        // Hover at the gap of whatever gate is next until one is passed
        while ctl.score() == 0 && ctl.phase() == RunPhase::Running {
            ms += 16.0;
            let target = ctl
                .state()
                .field
                .obstacles
                .iter()
                .find(|o| !o.is_behind(&ctl.state().player))
                .map(|o| o.gap_y);
            if let Some(y) = target {
                ctl.state.player.pos.y = y;
                ctl.state.player.vy = 0.0;
            }
            ctl.step(FRAME_DT, ms);
        }
        assert_eq!(ctl.score(), 1);
        assert_eq!(ctl.store().load_best(), 1);
        // Written on the increment, while the run is still going
        assert_eq!(ctl.phase(), RunPhase::Running);
    }

    #[test]
    fn test_blocked_store_does_not_stop_the_run() {
        let mut ctl = controller(MemoryStore::failing());
        ctl.trigger_down(0.0);
        ctl.step(FRAME_DT, 0.0);
        ctl.events = vec![GameEvent::NewBest { best: 3 }];
        ctl.react();
        ctl.step(FRAME_DT, 16.0);
        assert_eq!(ctl.phase(), RunPhase::Running);
        assert_eq!(ctl.store().writes, 0);
    }

    #[test]
    fn test_arming_press_release_does_not_rise() {
        let tuning = Tuning {
            variable_rise: true,
            ..Default::default()
        };
        let mut ctl = RunController::new(tuning, Viewport::new(900.0, 640.0), 5, MemoryStore::new());
        ctl.trigger_down(0.0);
        ctl.step(FRAME_DT, 0.0);
        assert_eq!(ctl.phase(), RunPhase::Running);
        ctl.trigger_up(120.0);
        let events = ctl.step(FRAME_DT, 130.0).to_vec();
        assert!(!events.iter().any(|e| matches!(e, GameEvent::Rise { .. })));
    }

    #[test]
    fn test_second_press_without_release_rises() {
        let mut ctl = controller(MemoryStore::new());
        ctl.trigger_down(0.0);
        ctl.step(FRAME_DT, 0.0);
        ctl.trigger_down(200.0);
        let events = ctl.step(FRAME_DT, 210.0).to_vec();
        assert!(events.iter().any(|e| matches!(e, GameEvent::Rise { .. })));
        // Still no release: a press 300 ms later is accepted and rises again
        assert!(ctl.trigger_down(500.0));
        let events = ctl.step(FRAME_DT, 510.0).to_vec();
        assert!(events.iter().any(|e| matches!(e, GameEvent::Rise { .. })));
    }

    #[test]
    fn test_reseed_reproduces_layout() {
        let layout = |ctl: &RunController<MemoryStore>| -> Vec<(f32, f32, f32)> {
            ctl.state()
                .field
                .obstacles
                .iter()
                .map(|o| (o.x, o.gap_y, o.gap_h))
                .collect()
        };

        let fresh = RunController::new(
            Tuning::default(),
            Viewport::new(900.0, 640.0),
            42,
            MemoryStore::new(),
        );

        let mut ctl = controller(MemoryStore::new());
        assert_ne!(layout(&ctl), layout(&fresh));
        ctl.trigger_down(0.0);
        let mut ms = 0.0;
        while ctl.phase() != RunPhase::Ended {
            ms += 16.0;
            ctl.step(FRAME_DT, ms);
        }
        ctl.reseed(42);
        ctl.continue_run();
        assert_eq!(ctl.phase(), RunPhase::Idle);
        assert_eq!(layout(&ctl), layout(&fresh));
    }

    #[test]
    fn test_frame_reports_clamped_dt() {
        let mut ctl = controller(MemoryStore::new());
        ctl.frame(0.0);
        assert_eq!(ctl.last_dt(), FRAME_DT);
        ctl.frame(5_000.0);
        assert_eq!(ctl.last_dt(), MAX_DT);
        ctl.pause_clock();
        ctl.frame(90_000.0);
        assert_eq!(ctl.last_dt(), FRAME_DT);
    }

    #[test]
    fn test_continue_only_from_ended() {
        let mut ctl = controller(MemoryStore::new());
        assert!(ctl.continue_run().is_empty());
        assert_eq!(ctl.phase(), RunPhase::Idle);
    }

    #[test]
    fn test_resize_updates_viewport() {
        let mut ctl = controller(MemoryStore::new());
        ctl.resize(400.0, 800.0);
        assert_eq!(ctl.state().viewport, Viewport::new(400.0, 800.0));
        assert_eq!(ctl.state().player.pos.x, 112.0);
    }
}
