//! Events emitted by the simulation
//!
//! The core pushes these into `GameSession::events` during a tick; the frame
//! driver drains them after the tick and fans them out to stats,
//! achievements, particles and audio.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::grid::BrickType;
use super::state::PowerUpKind;

/// What destroyed a brick
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HitSource {
    Ball,
    Laser,
    /// Caught in a bomb's area clear
    Explosion,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    /// Session left the start screen
    SessionStarted { seed: u64 },
    /// A fresh grid is in play
    LevelStarted { level: u32, bricks: usize },
    Paused,
    Resumed,
    WallHit,
    PaddleHit,
    BallCaught,
    BallReleased,
    /// Brick took a hit but survived (hard bricks)
    BrickHit { row: usize, col: usize, hits_left: u8 },
    BrickDestroyed {
        row: usize,
        col: usize,
        brick: BrickType,
        color: u32,
        source: HitSource,
        points: u32,
    },
    /// Visual burst request for the presentation layer
    ParticleBurst { pos: Vec2, color: u32, count: u32 },
    BombExploded { row: usize, col: usize, cleared: u32 },
    Combo(u32),
    /// Global ball speed tier changed
    SpeedUp { multiplier: f32 },
    PowerUpSpawned(PowerUpKind),
    PowerUpCollected(PowerUpKind),
    PowerUpExpired(PowerUpKind),
    LaserFired,
    /// Last ball lost; a life was spent
    BallLost { lives_left: u8 },
    LevelCleared { level: u32, bonus: u64, score: u64 },
    GameOver { score: u64, level: u32 },
    GameWin { score: u64 },
}
