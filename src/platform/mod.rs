//! Platform abstraction layer
//!
//! Handles the browser/native seams the simulation must not know about:
//! - Frame timing from a monotonic millisecond clock
//! - The daily seed from the local calendar date
//! - Share text for the last run

use chrono::{Datelike, Local, NaiveDate};

use crate::consts::*;

/// Game URL used in share messages
pub const GAME_URL: &str = "https://adamxreno.github.io/daily-walk/";

/// Turns consecutive refresh-callback timestamps into clamped step lengths
#[derive(Debug, Clone, Default)]
pub struct FrameClock {
    last_ms: Option<f64>,
}

impl FrameClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Step length in seconds for a callback at `now_ms`, clamped to
    /// `[0, MAX_DT]`. The first call yields one nominal frame.
    pub fn tick(&mut self, now_ms: f64) -> f32 {
        let dt = match self.last_ms {
            Some(last) => ((now_ms - last) / 1000.0) as f32,
            None => FRAME_DT,
        };
        self.last_ms = Some(now_ms);
        dt.clamp(0.0, MAX_DT)
    }

    /// Forget the last timestamp (e.g. after the tab was hidden)
    pub fn reset(&mut self) {
        self.last_ms = None;
    }
}

/// Seed for a calendar date: the digits yyyymmdd as an integer
pub fn seed_for_date(date: NaiveDate) -> u64 {
    let y = date.year().max(0) as u64;
    y * 10_000 + date.month() as u64 * 100 + date.day() as u64
}

/// Today's seed in the player's local time zone
pub fn daily_seed() -> u64 {
    seed_for_date(Local::now().date_naive())
}

/// "Jun 1, 2024" style label
pub fn date_label(date: NaiveDate) -> String {
    date.format("%b %-d, %Y").to_string()
}

/// Today's label in local time
pub fn today_label() -> String {
    date_label(Local::now().date_naive())
}

/// Message for the share sheet
pub fn share_text(score: u32) -> String {
    match score {
        0 => format!("I love this new game and think you will too!! 👀 {}", GAME_URL),
        1 => format!("I kept my light through 1 gate. Think you can beat it? 👀 {}", GAME_URL),
        n => format!("I kept my light through {} gates. Think you can beat it? 👀 {}", n, GAME_URL),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_clock_clamps() {
        let mut clock = FrameClock::new();
        assert_eq!(clock.tick(1000.0), FRAME_DT);
        assert!((clock.tick(1016.0) - 0.016).abs() < 1e-6);
        // Tab came back after 10 s
        assert_eq!(clock.tick(11_016.0), MAX_DT);
        // Clock went backwards
        assert_eq!(clock.tick(11_000.0), 0.0);
    }

    #[test]
    fn test_frame_clock_reset() {
        let mut clock = FrameClock::new();
        clock.tick(0.0);
        clock.reset();
        assert_eq!(clock.tick(50_000.0), FRAME_DT);
    }

    #[test]
    fn test_seed_for_date() {
        let date = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
        assert_eq!(seed_for_date(date), 20240601);
        let date = NaiveDate::from_ymd_opt(1999, 12, 31).unwrap();
        assert_eq!(seed_for_date(date), 19991231);
    }

    #[test]
    fn test_date_label() {
        let date = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
        assert_eq!(date_label(date), "Jun 1, 2024");
    }

    #[test]
    fn test_share_text_mentions_url() {
        for score in [0, 1, 12] {
            assert!(share_text(score).contains(GAME_URL));
        }
        assert!(share_text(12).contains("12 gates"));
        assert!(share_text(1).contains("1 gate."));
    }
}
