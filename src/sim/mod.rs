//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Seeded RNG only
//! - Stable iteration order (row-major grid, balls by id)
//! - No rendering, audio or storage dependencies

pub mod collision;
pub mod events;
pub mod grid;
pub mod layout;
pub mod physics;
pub mod scoring;
pub mod state;
pub mod tick;

pub use events::{GameEvent, HitSource};
pub use grid::{Brick, BrickGrid, BrickKind, BrickStatus, BrickType, HitOutcome};
pub use layout::{Layout, compute_layout};
pub use scoring::Combo;
pub use state::{
    ActivePowerUps, Ball, GamePhase, GameSession, InvalidDirection, Laser, Paddle,
    PaddleDirection, PowerUp, PowerUpKind,
};
pub use tick::{Intent, TickInput, tick};
