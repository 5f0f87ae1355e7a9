//! Trigger latch
//!
//! Device events arrive between frames. They are recorded here with their
//! clock timestamps and handed to the simulation as one `TickInput` at the
//! start of the next step.

use crate::tuning::Tuning;

/// Input commands for a single tick (deterministic)
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TickInput {
    /// An accepted trigger press since the last step
    pub press: bool,
    /// A trigger release since the last step, with how long it was held (ms)
    pub release_held_ms: Option<f64>,
}

impl TickInput {
    /// A single press, for scripted runs
    pub fn press() -> Self {
        Self {
            press: true,
            ..Default::default()
        }
    }
}

/// Records trigger edges between steps
#[derive(Debug, Clone, Default)]
pub struct TriggerLatch {
    /// Timestamp of the last accepted press
    last_accepted_ms: Option<f64>,
    /// Start of the hold still being measured
    held_since_ms: Option<f64>,
    pending_press: bool,
    pending_release: Option<f64>,
}

impl TriggerLatch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a press. Presses inside the lockout window are dropped; any
    /// other press is accepted even if no release was seen since the last
    /// one (second thumb, lost key-up). Returns true if the press was accepted.
    pub fn trigger_down(&mut self, now_ms: f64, tuning: &Tuning) -> bool {
        if let Some(last) = self.last_accepted_ms {
            if now_ms - last < tuning.trigger_lockout_ms {
                return false;
            }
        }
        self.last_accepted_ms = Some(now_ms);
        // A new press restarts the hold being measured
        self.held_since_ms = Some(now_ms);
        self.pending_press = true;
        true
    }

    /// Record a release. Also used for pointer-cancel and window blur.
    pub fn trigger_up(&mut self, now_ms: f64) {
        if let Some(since) = self.held_since_ms.take() {
            self.pending_release = Some((now_ms - since).max(0.0));
        }
    }

    /// Stop measuring the current hold; its release will not produce a rise
    pub fn consume_hold(&mut self) {
        self.held_since_ms = None;
        self.pending_release = None;
    }

    /// Drain everything latched since the last step.
    ///
    /// In variable-rise mode a hold that reaches `hold_max_ms` is released
    /// automatically so the strongest rise never waits on the key-up.
    pub fn take(&mut self, now_ms: f64, tuning: &Tuning) -> TickInput {
        let mut release_held_ms = self.pending_release.take();
        if tuning.variable_rise && release_held_ms.is_none() {
            if let Some(since) = self.held_since_ms {
                let held = now_ms - since;
                if held >= tuning.hold_max_ms {
                    release_held_ms = Some(held);
                    self.held_since_ms = None;
                }
            }
        }
        let input = TickInput {
            press: self.pending_press,
            release_held_ms,
        };
        self.pending_press = false;
        input
    }

    /// Forget everything (run reset)
    pub fn clear(&mut self) {
        let last = self.last_accepted_ms;
        *self = Self::default();
        // The lockout outlives the run
        self.last_accepted_ms = last;
    }
}
