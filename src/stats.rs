//! Lifetime statistics
//!
//! Flat counters folded from simulation events. Persisted as a single JSON
//! object; unknown or missing keys fall back to zero.

use serde::{Deserialize, Serialize};

use crate::sim::GameEvent;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Stats {
    pub games_played: u32,
    pub games_won: u32,
    pub games_lost: u32,
    pub total_score: u64,
    pub best_score: u64,
    pub bricks_destroyed: u64,
    pub bombs_detonated: u64,
    pub power_ups_collected: u64,
    pub lasers_fired: u64,
    pub balls_lost: u64,
    pub best_combo: u32,
    pub highest_level: u32,
}

impl Stats {
    /// Fold one event into the counters
    pub fn record(&mut self, event: &GameEvent) {
        match event {
            GameEvent::SessionStarted { .. } => self.games_played += 1,
            GameEvent::LevelStarted { level, .. } => {
                self.highest_level = self.highest_level.max(*level);
            }
            GameEvent::BrickDestroyed { .. } => self.bricks_destroyed += 1,
            GameEvent::BombExploded { .. } => self.bombs_detonated += 1,
            GameEvent::Combo(count) => self.best_combo = self.best_combo.max(*count),
            GameEvent::PowerUpCollected(_) => self.power_ups_collected += 1,
            GameEvent::LaserFired => self.lasers_fired += 1,
            GameEvent::BallLost { .. } => self.balls_lost += 1,
            GameEvent::GameOver { score, .. } => {
                self.balls_lost += 1;
                self.games_lost += 1;
                self.finish_game(*score);
            }
            GameEvent::GameWin { score } => {
                self.games_won += 1;
                self.finish_game(*score);
            }
            _ => {}
        }
    }

    fn finish_game(&mut self, score: u64) {
        self.total_score += score;
        self.best_score = self.best_score.max(score);
    }

    /// Games that reached game over or a win
    pub fn games_finished(&self) -> u32 {
        self.games_won + self.games_lost
    }

    /// Mean final score over finished games; abandoned sessions don't count
    pub fn average_score(&self) -> u64 {
        match self.games_finished() {
            0 => 0,
            finished => self.total_score / finished as u64,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::{BrickType, HitSource};

    #[test]
    fn test_counts_session_events() {
        let mut stats = Stats::default();
        let events = [
            GameEvent::SessionStarted { seed: 1 },
            GameEvent::LevelStarted { level: 1, bricks: 32 },
            GameEvent::BrickDestroyed {
                row: 0,
                col: 0,
                brick: BrickType::Bomb,
                color: 0,
                source: HitSource::Ball,
                points: 50,
            },
            GameEvent::BombExploded {
                row: 0,
                col: 0,
                cleared: 3,
            },
            GameEvent::Combo(4),
            GameEvent::Combo(2),
            GameEvent::BallLost { lives_left: 2 },
            GameEvent::GameOver {
                score: 900,
                level: 1,
            },
        ];
        for event in &events {
            stats.record(event);
        }
        assert_eq!(stats.games_played, 1);
        assert_eq!(stats.bricks_destroyed, 1);
        assert_eq!(stats.bombs_detonated, 1);
        assert_eq!(stats.best_combo, 4);
        assert_eq!(stats.balls_lost, 2);
        assert_eq!(stats.best_score, 900);
        assert_eq!(stats.average_score(), 900);
    }

    #[test]
    fn test_average_ignores_abandoned_sessions() {
        let mut stats = Stats::default();
        stats.record(&GameEvent::SessionStarted { seed: 1 });
        stats.record(&GameEvent::GameWin { score: 1000 });
        stats.record(&GameEvent::SessionStarted { seed: 2 });
        stats.record(&GameEvent::GameOver { score: 200, level: 2 });
        stats.record(&GameEvent::SessionStarted { seed: 3 });
        assert_eq!(stats.games_played, 3);
        assert_eq!(stats.games_finished(), 2);
        assert_eq!(stats.average_score(), 600);
    }

    #[test]
    fn test_malformed_keys_default() {
        let stats: Stats = serde_json::from_str(r#"{"games_played": 4, "mystery": true}"#).unwrap();
        assert_eq!(stats.games_played, 4);
        assert_eq!(stats.best_score, 0);
    }
}
