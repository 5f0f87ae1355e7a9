//! End-of-run reward card
//!
//! Shown when a run ends: the scores, today's verse, and a short countdown
//! before the continue button unlocks. The verse is picked from the date seed
//! so everyone sees the same one on the same day.

use serde::Serialize;

use crate::sim::SimRng;

/// Seconds before Continue unlocks
pub const UNLOCK_SECONDS: u32 = 5;

/// A verse (World English Bible, public domain)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Verse {
    pub reference: &'static str,
    pub text: &'static str,
}

pub const VERSES: [Verse; 6] = [
    Verse {
        reference: "Psalms 46:1",
        text: "God is our refuge and strength,\na very present help in trouble.",
    },
    Verse {
        reference: "Psalms 34:18",
        text: "Yahweh is near to those who have a broken heart,\nand saves those who have a crushed spirit.",
    },
    Verse {
        reference: "Matthew 11:28",
        text: "\u{201c}Come to me, all you who labor and are heavily burdened,\nand I will give you rest.\u{201d}",
    },
    Verse {
        reference: "Isaiah 41:10",
        text: "Don\u{2019}t you be afraid, for I am with you.\nDon\u{2019}t be dismayed, for I am your God.\nI will strengthen you.\nYes, I will help you.\nYes, I will uphold you with the right hand of my righteousness.",
    },
    Verse {
        reference: "Philippians 4:6",
        text: "In nothing be anxious,\nbut in everything,\nby prayer and petition with thanksgiving,\nlet your requests be made known to God.",
    },
    Verse {
        reference: "John 16:33",
        text: "\u{201c}In the world you have oppression;\nbut cheer up!\nI have overcome the world.\u{201d}",
    },
];

/// Today's verse for a date seed
pub fn daily_verse(date_seed: u64) -> &'static Verse {
    let mut rng = SimRng::new(date_seed);
    &VERSES[rng.index(VERSES.len())]
}

/// Everything the overlay displays
#[derive(Debug, Clone, Serialize)]
pub struct RewardCard {
    pub title: &'static str,
    pub meta: &'static str,
    pub date_label: String,
    pub final_score: u32,
    pub best_score: u32,
    pub new_best: bool,
    pub verse: &'static Verse,
}

impl RewardCard {
    /// `new_best` is whether the run raised the best score, i.e. whether a
    /// `NewBest` event fired during it. Tying an earlier best does not count.
    pub fn new(
        final_score: u32,
        best_score: u32,
        new_best: bool,
        date_seed: u64,
        date_label: String,
    ) -> Self {
        Self {
            title: if new_best {
                "New best. Well walked."
            } else {
                "It\u{2019}s okay, try again."
            },
            meta: "Here\u{2019}s your daily verse \u{1f44d}\u{1f3fc}",
            date_label,
            final_score,
            best_score,
            new_best,
            verse: daily_verse(date_seed),
        }
    }
}

/// Continue-button gate: counts whole seconds down from `UNLOCK_SECONDS`
#[derive(Debug, Clone, PartialEq)]
pub struct UnlockCountdown {
    remaining: f32,
}

impl UnlockCountdown {
    pub fn new() -> Self {
        Self::with_seconds(UNLOCK_SECONDS as f32)
    }

    pub fn with_seconds(seconds: f32) -> Self {
        Self {
            remaining: seconds.max(0.0),
        }
    }

    /// Advance by `dt` seconds. Returns true once unlocked.
    pub fn advance(&mut self, dt: f32) -> bool {
        self.remaining = (self.remaining - dt.max(0.0)).max(0.0);
        self.is_unlocked()
    }

    pub fn is_unlocked(&self) -> bool {
        self.remaining <= 0.0
    }

    /// Whole seconds to show ("Continue in 3s")
    pub fn seconds_left(&self) -> u32 {
        self.remaining.ceil() as u32
    }

    pub fn label(&self) -> String {
        format!("Continue in {}s", self.seconds_left())
    }
}

impl Default for UnlockCountdown {
    fn default() -> Self {
        Self::new()
    }
}
