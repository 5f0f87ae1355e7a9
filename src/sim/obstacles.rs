//! Obstacle field
//!
//! A leftward-scrolling row of gates, each a pair of blocks with a passable
//! gap. New gates are spawned by distance: whenever the rightmost gate is
//! within `spawn_lead` of the right edge, another is placed one spacing
//! behind it. This keeps the field full regardless of scroll speed.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::collision::{Rect, circle_circle_overlap, circle_rect_overlap};
use super::kinematics::Player;
use super::rng::SimRng;
use crate::Viewport;
use crate::consts::*;
use crate::tuning::Tuning;

/// Extra clearance over the previous gate's width when enforcing spacing
const WIDTH_CLEARANCE: f32 = 60.0;

/// Pickup types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PickupKind {
    /// Refills the light to at least its normal maximum
    Restore,
    /// Raises the light to the overcharge ceiling
    Overcharge,
}

/// A collectible riding along with its gate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pickup {
    pub kind: PickupKind,
    /// Absolute y; x follows the gate's center
    pub y: f32,
    pub radius: f32,
}

/// A gate: blocks above and below a gap
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Obstacle {
    pub id: u32,
    /// Left edge
    pub x: f32,
    pub width: f32,
    /// Gap center
    pub gap_y: f32,
    /// Gap height
    pub gap_h: f32,
    pub pickup: Option<Pickup>,
}

impl Obstacle {
    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    pub fn gap_top(&self) -> f32 {
        self.gap_y - self.gap_h / 2.0
    }

    pub fn gap_bottom(&self) -> f32 {
        self.gap_y + self.gap_h / 2.0
    }

    /// Blocking rectangles. They reach a full viewport beyond each edge so a
    /// player drifting off-screen still collides.
    pub fn blocks(&self, viewport: Viewport) -> [Rect; 2] {
        let h = viewport.height;
        let top = self.gap_top();
        let bottom = self.gap_bottom();
        [
            Rect::new(self.x, -h, self.width, top + h),
            Rect::new(self.x, bottom, self.width, 2.0 * h - bottom),
        ]
    }

    /// Does the player overlap either block?
    pub fn hits(&self, player: &Player, viewport: Viewport) -> bool {
        self.blocks(viewport)
            .iter()
            .any(|r| circle_rect_overlap(player.pos, player.radius, r))
    }

    /// Has the gate's right edge moved behind the player?
    pub fn is_behind(&self, player: &Player) -> bool {
        self.right() < player.pos.x - 2.0
    }

    /// World position of the attached pickup, if any
    pub fn pickup_pos(&self) -> Option<Vec2> {
        self.pickup
            .as_ref()
            .map(|p| Vec2::new(self.x + self.width / 2.0, p.y))
    }
}

/// Owns the active gates, ordered left to right
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ObstacleField {
    pub obstacles: Vec<Obstacle>,
    /// Ids keep increasing across runs within a session
    next_id: u32,
}

impl ObstacleField {
    pub fn new() -> Self {
        Self::default()
    }

    /// Clear the field and lay out the opening gates at generous fixed spacing
    pub fn reset(&mut self, tuning: &Tuning, viewport: Viewport, rng: &mut SimRng) {
        self.obstacles.clear();
        for i in 0..tuning.initial_obstacles {
            let x = viewport.width + i as f32 * tuning.initial_spacing;
            self.spawn_at(x, 0, tuning, viewport, rng, false);
        }
    }

    pub fn rightmost(&self) -> Option<&Obstacle> {
        self.obstacles.last()
    }

    /// Place a gate at `x` (pushed right if it would crowd the previous one).
    /// Returns the new gate's id.
    pub fn spawn_at(
        &mut self,
        x: f32,
        score: u32,
        tuning: &Tuning,
        viewport: Viewport,
        rng: &mut SimRng,
        allow_pickup: bool,
    ) -> u32 {
        let gap_h = tuning.gap_for_score(score);
        let min_y = tuning.gap_margin + gap_h * 0.35;
        let max_y = viewport.height - tuning.gap_margin - gap_h * 0.35;
        let (min_y, max_y) = if max_y < min_y {
            let mid = viewport.height / 2.0;
            (mid, mid)
        } else {
            (min_y, max_y)
        };

        let mut gap_y = rng.range_f32(min_y, max_y);

        let mut x = x;
        if let Some(prev) = self.obstacles.last() {
            // Smooth: never ask for a vertical traversal larger than the delta cap
            let delta = tuning.center_delta_for_score(score);
            gap_y = gap_y.clamp(prev.gap_y - delta, prev.gap_y + delta);
            let min_x = prev.x + tuning.min_spacing.max(prev.width + WIDTH_CLEARANCE);
            x = x.max(min_x);
        }
        let gap_y = gap_y.clamp(min_y, max_y);

        let pickup = if allow_pickup && rng.chance(tuning.pickup_chance) {
            let kind = if rng.chance(tuning.overcharge_share) {
                PickupKind::Overcharge
            } else {
                PickupKind::Restore
            };
            let inset = tuning.pickup_edge_inset.min(gap_h / 2.0);
            let y = if rng.chance(0.5) {
                gap_y - gap_h / 2.0 + inset
            } else {
                gap_y + gap_h / 2.0 - inset
            };
            Some(Pickup {
                kind,
                y,
                radius: tuning.pickup_radius,
            })
        } else {
            None
        };

        let id = self.next_id;
        self.next_id += 1;
        self.obstacles.push(Obstacle {
            id,
            x,
            width: tuning.obstacle_width,
            gap_y,
            gap_h,
            pickup,
        });
        log::debug!(
            "Spawned gate {} at x={:.0} gap_y={:.0} gap_h={:.0}",
            id,
            x,
            gap_y,
            gap_h
        );
        id
    }

    /// Scroll, top up on the right, drop what has left on the left.
    /// Returns the number of gates spawned.
    pub fn update(
        &mut self,
        dt: f32,
        score: u32,
        tuning: &Tuning,
        viewport: Viewport,
        rng: &mut SimRng,
    ) -> usize {
        let dx = tuning.scroll_for_score(score) * dt;
        for o in &mut self.obstacles {
            o.x -= dx;
        }

        let mut spawned = 0;
        loop {
            let next_x = match self.rightmost() {
                Some(last) if last.x - viewport.width < tuning.spawn_lead => {
                    last.x + tuning.spacing_for_score(score)
                }
                Some(_) => break,
                None => viewport.width,
            };
            self.spawn_at(next_x, score, tuning, viewport, rng, true);
            spawned += 1;
        }

        self.obstacles.retain(|o| o.right() > -RECYCLE_SLACK);
        spawned
    }

    /// First gate the player overlaps, if any
    pub fn first_hit(&self, player: &Player, viewport: Viewport) -> Option<u32> {
        self.obstacles
            .iter()
            .find(|o| o.hits(player, viewport))
            .map(|o| o.id)
    }

    /// Consume every pickup the player touches this step
    pub fn collect_pickups(&mut self, player: &Player) -> Vec<PickupKind> {
        let mut collected = Vec::new();
        for o in &mut self.obstacles {
            let center = o.x + o.width / 2.0;
            let touched = o.pickup.as_ref().is_some_and(|p| {
                circle_circle_overlap(player.pos, player.radius, Vec2::new(center, p.y), p.radius)
            });
            if touched {
                if let Some(p) = o.pickup.take() {
                    collected.push(p.kind);
                }
            }
        }
        collected
    }
}
