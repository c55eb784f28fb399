//! Brickfall - A brick-breaker arcade game
//!
//! Core modules:
//! - `sim`: Deterministic simulation (layout, physics, collisions, game state)
//! - `game`: Frame driver wiring the simulation to its collaborators
//! - `stats` / `achievements`: Event sinks fed by simulation events
//! - `effects`: Presentation-side particle field
//! - `platform`: Renderer / audio / input interfaces
//! - `persistence`: Key/value storage for scores, stats, settings
//! - `tuning`: Data-driven game balance

pub mod achievements;
pub mod autopilot;
pub mod effects;
pub mod game;
pub mod highscores;
pub mod persistence;
pub mod platform;
pub mod settings;
pub mod sim;
pub mod stats;
pub mod tuning;

pub use game::Game;
pub use highscores::HighScores;
pub use settings::{Difficulty, Settings};
pub use tuning::Tuning;

/// Game configuration constants
pub mod consts {
    /// Fixed simulation rate
    pub const SIM_HZ: u64 = 60;
    /// Fixed simulation timestep
    pub const SIM_DT: f32 = 1.0 / SIM_HZ as f32;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;

    /// Default viewport (headless runner, tests)
    pub const DEFAULT_WIDTH: f32 = 800.0;
    pub const DEFAULT_HEIGHT: f32 = 600.0;

    /// Paddle defaults
    pub const PADDLE_WIDTH: f32 = 100.0;
    pub const PADDLE_HEIGHT: f32 = 15.0;
    /// Pixels per second (8 px per frame at 60 Hz)
    pub const PADDLE_SPEED: f32 = 480.0;
    /// Distance from the bottom edge to the paddle's top edge
    pub const PADDLE_BOTTOM_OFFSET: f32 = 50.0;

    /// Ball defaults
    pub const BALL_RADIUS: f32 = 8.0;
    /// Pixels per second (5 px per frame at 60 Hz)
    pub const BALL_BASE_SPEED: f32 = 300.0;
    /// Distance from the bottom edge to a freshly served ball
    pub const BALL_START_OFFSET: f32 = 80.0;

    pub const START_LIVES: u8 = 3;
    /// Clearing this level wins the game
    pub const MAX_LEVEL: u32 = 10;

    /// Brick layout
    pub const BRICK_MARGIN: f32 = 40.0;
    pub const BRICK_PADDING: f32 = 5.0;
    pub const BRICK_OFFSET_TOP: f32 = 80.0;
    pub const BRICK_BASE_HEIGHT: f32 = 20.0;

    /// Falling pickups
    pub const POWERUP_DROP_CHANCE: f64 = 0.2;
    pub const POWERUP_SIZE: f32 = 20.0;
    pub const POWERUP_FALL_SPEED: f32 = 120.0;

    /// Laser bolts
    pub const LASER_SPEED: f32 = 420.0;
    pub const LASER_WIDTH: f32 = 4.0;
    pub const LASER_HEIGHT: f32 = 15.0;
    pub const MAX_LASERS: usize = 3;

    /// Combo window between brick breaks
    pub const COMBO_WINDOW_MS: u64 = 1000;
    pub const COMBO_MULTIPLIER: f32 = 1.5;

    /// Power-up effect strengths and durations
    pub const PADDLE_SIZE_MULTIPLIER: f32 = 1.5;
    pub const SLOW_MOTION_FACTOR: f32 = 0.5;
    pub const PADDLE_SIZE_SECS: u64 = 10;
    pub const SLOW_MOTION_SECS: u64 = 5;
    pub const LASER_SECS: u64 = 15;
    pub const CATCH_SECS: u64 = 20;

    /// Pause between a level clear and the next grid
    pub const LEVEL_TRANSITION_MS: u64 = 1000;
}

/// Convert whole seconds to simulation ticks
#[inline]
pub fn secs_to_ticks(secs: u64) -> u64 {
    secs * consts::SIM_HZ
}

/// Convert milliseconds to simulation ticks (rounded up)
#[inline]
pub fn ms_to_ticks(ms: u64) -> u64 {
    (ms * consts::SIM_HZ).div_ceil(1000)
}

/// Convert simulation ticks to elapsed milliseconds
#[inline]
pub fn ticks_to_ms(ticks: u64) -> u64 {
    ticks * 1000 / consts::SIM_HZ
}
