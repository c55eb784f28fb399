//! Achievements
//!
//! Each achievement unlocks at most once. Evaluation runs after stats have
//! absorbed the same event, so lifetime thresholds see the updated counts.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::sim::GameEvent;
use crate::stats::Stats;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Achievement {
    FirstBrick,
    Centurion,
    ComboFive,
    Demolition,
    Collector,
    HalfwayThere,
    Untouchable,
    HighRoller,
    Champion,
}

impl Achievement {
    pub const ALL: [Achievement; 9] = [
        Achievement::FirstBrick,
        Achievement::Centurion,
        Achievement::ComboFive,
        Achievement::Demolition,
        Achievement::Collector,
        Achievement::HalfwayThere,
        Achievement::Untouchable,
        Achievement::HighRoller,
        Achievement::Champion,
    ];

    pub fn title(self) -> &'static str {
        match self {
            Achievement::FirstBrick => "First Brick",
            Achievement::Centurion => "Centurion",
            Achievement::ComboFive => "Combo Master",
            Achievement::Demolition => "Demolition",
            Achievement::Collector => "Collector",
            Achievement::HalfwayThere => "Halfway There",
            Achievement::Untouchable => "Untouchable",
            Achievement::HighRoller => "High Roller",
            Achievement::Champion => "Champion",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Achievement::FirstBrick => "Destroy your first brick",
            Achievement::Centurion => "Destroy 100 bricks",
            Achievement::ComboFive => "Reach a 5x combo",
            Achievement::Demolition => "Detonate a bomb brick",
            Achievement::Collector => "Collect 10 power-ups",
            Achievement::HalfwayThere => "Reach level 5",
            Achievement::Untouchable => "Clear a level without losing a life",
            Achievement::HighRoller => "Score 5000 points in one game",
            Achievement::Champion => "Clear every level",
        }
    }
}

const CENTURION_BRICKS: u64 = 100;
const COMBO_TARGET: u32 = 5;
const COLLECTOR_POWER_UPS: u64 = 10;
const HALFWAY_LEVEL: u32 = 5;
const HIGH_ROLLER_SCORE: u64 = 5000;

/// Unlocked set plus the per-level tracking some achievements need
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Achievements {
    #[serde(default)]
    unlocked: BTreeSet<Achievement>,
    /// A ball was lost since the current level started
    #[serde(skip)]
    life_lost_this_level: bool,
}

impl Achievements {
    pub fn from_unlocked(unlocked: impl IntoIterator<Item = Achievement>) -> Self {
        Self {
            unlocked: unlocked.into_iter().collect(),
            life_lost_this_level: false,
        }
    }

    pub fn is_unlocked(&self, achievement: Achievement) -> bool {
        self.unlocked.contains(&achievement)
    }

    pub fn unlocked(&self) -> impl Iterator<Item = Achievement> + '_ {
        self.unlocked.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.unlocked.len()
    }

    pub fn is_empty(&self) -> bool {
        self.unlocked.is_empty()
    }

    /// Check an event against every locked achievement. `score` is the
    /// session score after the event. Returns newly unlocked entries.
    pub fn evaluate(&mut self, event: &GameEvent, stats: &Stats, score: u64) -> Vec<Achievement> {
        let mut candidates = Vec::new();
        match event {
            GameEvent::LevelStarted { level, .. } => {
                self.life_lost_this_level = false;
                if *level >= HALFWAY_LEVEL {
                    candidates.push(Achievement::HalfwayThere);
                }
            }
            GameEvent::BallLost { .. } => self.life_lost_this_level = true,
            GameEvent::BrickDestroyed { .. } => {
                candidates.push(Achievement::FirstBrick);
                if stats.bricks_destroyed >= CENTURION_BRICKS {
                    candidates.push(Achievement::Centurion);
                }
            }
            GameEvent::BombExploded { .. } => candidates.push(Achievement::Demolition),
            GameEvent::Combo(count) if *count >= COMBO_TARGET => {
                candidates.push(Achievement::ComboFive);
            }
            GameEvent::PowerUpCollected(_) if stats.power_ups_collected >= COLLECTOR_POWER_UPS => {
                candidates.push(Achievement::Collector);
            }
            GameEvent::LevelCleared { .. } if !self.life_lost_this_level => {
                candidates.push(Achievement::Untouchable);
            }
            GameEvent::GameWin { .. } => candidates.push(Achievement::Champion),
            _ => {}
        }
        if score >= HIGH_ROLLER_SCORE {
            candidates.push(Achievement::HighRoller);
        }

        candidates
            .into_iter()
            .filter(|a| self.unlocked.insert(*a))
            .inspect(|a| log::info!("Achievement unlocked: {}", a.title()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::{BrickType, HitSource};

    fn destroyed() -> GameEvent {
        GameEvent::BrickDestroyed {
            row: 0,
            col: 0,
            brick: BrickType::Normal,
            color: 0,
            source: HitSource::Ball,
            points: 10,
        }
    }

    #[test]
    fn test_unlocks_only_once() {
        let mut achievements = Achievements::default();
        let mut stats = Stats::default();
        stats.record(&destroyed());
        assert_eq!(
            achievements.evaluate(&destroyed(), &stats, 10),
            vec![Achievement::FirstBrick]
        );
        assert!(achievements.evaluate(&destroyed(), &stats, 20).is_empty());
        assert_eq!(achievements.len(), 1);
    }

    #[test]
    fn test_untouchable_needs_clean_level() {
        let stats = Stats::default();
        let cleared = GameEvent::LevelCleared {
            level: 1,
            bonus: 100,
            score: 400,
        };
        let mut achievements = Achievements::default();
        achievements.evaluate(&GameEvent::LevelStarted { level: 1, bricks: 32 }, &stats, 0);
        achievements.evaluate(&GameEvent::BallLost { lives_left: 2 }, &stats, 0);
        assert!(achievements.evaluate(&cleared, &stats, 400).is_empty());

        achievements.evaluate(&GameEvent::LevelStarted { level: 2, bricks: 32 }, &stats, 400);
        assert_eq!(
            achievements.evaluate(&cleared, &stats, 800),
            vec![Achievement::Untouchable]
        );
    }

    #[test]
    fn test_high_roller_from_running_score() {
        let mut achievements = Achievements::default();
        let unlocked = achievements.evaluate(&GameEvent::WallHit, &Stats::default(), 5000);
        assert_eq!(unlocked, vec![Achievement::HighRoller]);
    }

    #[test]
    fn test_stored_set_round_trips_through_json() {
        let achievements =
            Achievements::from_unlocked([Achievement::Champion, Achievement::FirstBrick]);
        let json = serde_json::to_string(&achievements).unwrap();
        let restored: Achievements = serde_json::from_str(&json).unwrap();
        assert!(restored.is_unlocked(Achievement::Champion));
        assert!(!restored.is_unlocked(Achievement::Collector));
    }
}
