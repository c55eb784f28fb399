//! Combo tracking, brick points and ball speed tiers

use serde::{Deserialize, Serialize};

use super::grid::BrickType;
use crate::consts::{COMBO_MULTIPLIER, COMBO_WINDOW_MS};

/// Flat points for each brick caught in a bomb's area clear
pub const AREA_CLEAR_POINTS: u32 = 15;

/// Combo counter driven by brick-break timestamps
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Combo {
    pub count: u32,
    last_break_ms: Option<u64>,
}

impl Combo {
    /// Register a brick break at `now_ms` and return the new combo count.
    /// Breaks closer than the combo window extend the combo; anything else
    /// resets it to zero.
    pub fn register_break(&mut self, now_ms: u64) -> u32 {
        match self.last_break_ms {
            Some(last) if now_ms.saturating_sub(last) < COMBO_WINDOW_MS => self.count += 1,
            _ => self.count = 0,
        }
        self.last_break_ms = Some(now_ms);
        self.count
    }

    pub fn multiplier(&self) -> f32 {
        if self.count > 0 { COMBO_MULTIPLIER } else { 1.0 }
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// Base points for a destroyed brick
pub fn brick_points(row: usize, brick: BrickType) -> u32 {
    match brick {
        BrickType::Hard => 25,
        BrickType::Bomb => 50,
        BrickType::Moving => 30,
        BrickType::Normal if row == 0 => 20,
        BrickType::Normal => 10,
    }
}

/// Apply a multiplier, flooring to whole points
pub fn apply_multiplier(points: u32, multiplier: f32) -> u32 {
    (points as f32 * multiplier).floor() as u32
}

/// Bonus for clearing a level (uses the level just cleared)
pub fn level_bonus(level: u32) -> u64 {
    level as u64 * 100
}

/// Global ball speed multiplier for the level's destroyed-brick count
pub fn speed_tier(destroyed: usize) -> f32 {
    match destroyed {
        30.. => 1.6,
        20.. => 1.4,
        10.. => 1.2,
        _ => 1.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_combo_within_window() {
        let mut combo = Combo::default();
        assert_eq!(combo.register_break(0), 0);
        assert_eq!(combo.register_break(900), 1);
        assert_eq!(combo.multiplier(), 1.5);
        assert_eq!(apply_multiplier(brick_points(1, BrickType::Normal), combo.multiplier()), 15);
    }

    #[test]
    fn test_combo_resets_after_window() {
        let mut combo = Combo::default();
        combo.register_break(0);
        assert_eq!(combo.register_break(1500), 0);
        assert_eq!(combo.multiplier(), 1.0);
    }

    #[test]
    fn test_combo_chain_grows() {
        let mut combo = Combo::default();
        for (i, t) in [0, 500, 1000, 1400].into_iter().enumerate() {
            assert_eq!(combo.register_break(t), i as u32);
        }
        // Exactly one window apart does not extend
        assert_eq!(combo.register_break(2400), 0);
    }

    #[test]
    fn test_first_break_at_time_zero_is_not_a_combo() {
        let mut combo = Combo::default();
        assert_eq!(combo.register_break(0), 0);
    }

    #[test]
    fn test_brick_points_table() {
        assert_eq!(brick_points(0, BrickType::Normal), 20);
        assert_eq!(brick_points(3, BrickType::Normal), 10);
        assert_eq!(brick_points(0, BrickType::Hard), 25);
        assert_eq!(brick_points(2, BrickType::Bomb), 50);
        assert_eq!(brick_points(5, BrickType::Moving), 30);
        assert_eq!(apply_multiplier(25, 1.5), 37);
    }

    #[test]
    fn test_speed_tiers() {
        assert_eq!(speed_tier(0), 1.0);
        assert_eq!(speed_tier(9), 1.0);
        assert_eq!(speed_tier(10), 1.2);
        assert_eq!(speed_tier(25), 1.4);
        assert_eq!(speed_tier(30), 1.6);
        assert_eq!(speed_tier(120), 1.6);
    }
}
