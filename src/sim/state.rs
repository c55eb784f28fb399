//! Game state and core simulation types
//!
//! Everything the simulation mutates lives in `GameSession`; components take
//! it by reference instead of reading ambient state.

use std::str::FromStr;

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::collision::{launch_velocity, rescale};
use super::events::GameEvent;
use super::grid::BrickGrid;
use super::layout::{Layout, compute_layout};
use super::scoring::{Combo, speed_tier};
use crate::consts::*;
use crate::tuning::Tuning;
use crate::{secs_to_ticks, ticks_to_ms};

/// Current phase of the session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Waiting on the start screen
    Start,
    /// Active gameplay
    Playing,
    /// Game is paused; nothing steps, clock frozen
    Paused,
    /// Out of lives
    Over,
    /// Cleared the final level
    Win,
}

impl GamePhase {
    pub fn is_terminal(self) -> bool {
        matches!(self, GamePhase::Over | GamePhase::Win)
    }
}

/// Held paddle direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PaddleDirection {
    Left,
    #[default]
    None,
    Right,
}

/// Raw direction value outside the recognised set
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid paddle direction: {0}")]
pub struct InvalidDirection(pub String);

impl PaddleDirection {
    pub fn sign(self) -> f32 {
        match self {
            PaddleDirection::Left => -1.0,
            PaddleDirection::None => 0.0,
            PaddleDirection::Right => 1.0,
        }
    }
}

impl TryFrom<i32> for PaddleDirection {
    type Error = InvalidDirection;

    fn try_from(code: i32) -> Result<Self, Self::Error> {
        match code {
            -1 => Ok(PaddleDirection::Left),
            0 => Ok(PaddleDirection::None),
            1 => Ok(PaddleDirection::Right),
            other => Err(InvalidDirection(other.to_string())),
        }
    }
}

impl FromStr for PaddleDirection {
    type Err = InvalidDirection;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "left" => Ok(PaddleDirection::Left),
            "none" | "" => Ok(PaddleDirection::None),
            "right" => Ok(PaddleDirection::Right),
            _ => Err(InvalidDirection(s.to_string())),
        }
    }
}

/// A ball entity
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Ball {
    pub id: u32,
    pub pos: Vec2,
    pub vel: Vec2,
    /// Current speed tier magnitude
    pub speed: f32,
    pub base_speed: f32,
    pub radius: f32,
}

impl Ball {
    pub fn new(id: u32, pos: Vec2, base_speed: f32, radius: f32) -> Self {
        Self {
            id,
            pos,
            vel: Vec2::new(1.0, -1.0).normalize() * base_speed,
            speed: base_speed,
            base_speed,
            radius,
        }
    }

    /// Change speed, keeping direction. A held (motionless) ball keeps zero
    /// velocity and launches at the new speed.
    pub fn set_speed(&mut self, speed: f32) {
        self.speed = speed;
        self.vel = rescale(self.vel, speed);
    }

    /// Launch at an angle from straight up
    pub fn launch(&mut self, angle: f32) {
        self.vel = launch_velocity(angle, self.speed);
    }

    pub fn is_moving(&self) -> bool {
        self.vel != Vec2::ZERO
    }
}

/// The player's paddle
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Paddle {
    /// Top-left corner
    pub pos: Vec2,
    pub width: f32,
    pub base_width: f32,
    pub height: f32,
    /// Pixels per second for held direction input
    pub speed: f32,
    pub direction: PaddleDirection,
    pub width_multiplier: f32,
}

impl Paddle {
    /// Width is capped to the viewport; `base_width` keeps the tuned value
    /// so a later resize can restore it.
    pub fn new(tuning: &Tuning, viewport: Vec2) -> Self {
        let mut paddle = Self {
            pos: Vec2::ZERO,
            width: tuning.paddle_width.min(viewport.x.max(0.0)),
            base_width: tuning.paddle_width,
            height: tuning.paddle_height,
            speed: tuning.paddle_speed,
            direction: PaddleDirection::None,
            width_multiplier: 1.0,
        };
        paddle.recenter(viewport);
        paddle
    }

    pub fn size(&self) -> Vec2 {
        Vec2::new(self.width, self.height)
    }

    pub fn center_x(&self) -> f32 {
        self.pos.x + self.width / 2.0
    }

    /// Centre horizontally and sit at the standard height
    pub fn recenter(&mut self, viewport: Vec2) {
        self.pos.x = viewport.x / 2.0 - self.width / 2.0;
        self.pos.y = viewport.y - PADDLE_BOTTOM_OFFSET;
        self.clamp(viewport.x);
    }

    /// Keep the paddle inside [0, canvas_width - width]
    pub fn clamp(&mut self, canvas_width: f32) {
        let max_x = (canvas_width - self.width).max(0.0);
        self.pos.x = self.pos.x.clamp(0.0, max_x);
    }

    /// Move by the held direction
    pub fn step(&mut self, dt: f32, canvas_width: f32) {
        self.pos.x += self.direction.sign() * self.speed * dt;
        self.clamp(canvas_width);
    }

    /// Pointer-drag: centre the paddle on an absolute x
    pub fn move_to(&mut self, center_x: f32, canvas_width: f32) {
        if !center_x.is_finite() {
            return;
        }
        self.pos.x = center_x - self.width / 2.0;
        self.clamp(canvas_width);
    }

    /// Resize around the current centre
    pub fn set_width_multiplier(&mut self, multiplier: f32, canvas_width: f32) {
        let center = self.center_x();
        self.width_multiplier = multiplier;
        self.width = (self.base_width * multiplier).min(canvas_width);
        self.pos.x = center - self.width / 2.0;
        self.clamp(canvas_width);
    }
}

/// Power-up types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PowerUpKind {
    MultiBall,
    PaddleSize,
    SlowMotion,
    Laser,
    Catch,
}

impl PowerUpKind {
    pub const ALL: [PowerUpKind; 5] = [
        PowerUpKind::MultiBall,
        PowerUpKind::PaddleSize,
        PowerUpKind::SlowMotion,
        PowerUpKind::Laser,
        PowerUpKind::Catch,
    ];

    /// Effect duration in ticks; `None` for untimed effects
    pub fn duration_ticks(self) -> Option<u64> {
        match self {
            PowerUpKind::MultiBall => None,
            PowerUpKind::PaddleSize => Some(secs_to_ticks(PADDLE_SIZE_SECS)),
            PowerUpKind::SlowMotion => Some(secs_to_ticks(SLOW_MOTION_SECS)),
            PowerUpKind::Laser => Some(secs_to_ticks(LASER_SECS)),
            PowerUpKind::Catch => Some(secs_to_ticks(CATCH_SECS)),
        }
    }

    pub fn color(self) -> u32 {
        match self {
            PowerUpKind::MultiBall => 0x00E5FF,
            PowerUpKind::PaddleSize => 0x76FF03,
            PowerUpKind::SlowMotion => 0x2979FF,
            PowerUpKind::Laser => 0xFF3D00,
            PowerUpKind::Catch => 0xFFEA00,
        }
    }
}

/// A falling pickup
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PowerUp {
    pub id: u32,
    pub kind: PowerUpKind,
    /// Centre
    pub pos: Vec2,
}

impl PowerUp {
    pub fn top_left(&self) -> Vec2 {
        self.pos - Vec2::splat(POWERUP_SIZE / 2.0)
    }

    pub fn size(&self) -> Vec2 {
        Vec2::splat(POWERUP_SIZE)
    }
}

/// A laser bolt
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Laser {
    pub id: u32,
    /// Top-left corner
    pub pos: Vec2,
}

impl Laser {
    /// Leading point used for brick hits
    pub fn tip(&self) -> Vec2 {
        Vec2::new(self.pos.x + LASER_WIDTH / 2.0, self.pos.y)
    }
}

/// Active power-up effects. Each timed effect carries the tick it expires
/// on; reactivation overwrites the tick rather than adding a second timer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActivePowerUps {
    pub multiball: bool,
    /// Paddle width multiplier (1.0 when inactive)
    pub paddle_size: f32,
    pub slow_motion: bool,
    pub laser: bool,
    pub catch: bool,
    paddle_size_until: Option<u64>,
    slow_motion_until: Option<u64>,
    laser_until: Option<u64>,
    catch_until: Option<u64>,
}

impl Default for ActivePowerUps {
    fn default() -> Self {
        Self {
            multiball: false,
            paddle_size: 1.0,
            slow_motion: false,
            laser: false,
            catch: false,
            paddle_size_until: None,
            slow_motion_until: None,
            laser_until: None,
            catch_until: None,
        }
    }
}

impl ActivePowerUps {
    fn timer_mut(&mut self, kind: PowerUpKind) -> Option<&mut Option<u64>> {
        match kind {
            PowerUpKind::MultiBall => None,
            PowerUpKind::PaddleSize => Some(&mut self.paddle_size_until),
            PowerUpKind::SlowMotion => Some(&mut self.slow_motion_until),
            PowerUpKind::Laser => Some(&mut self.laser_until),
            PowerUpKind::Catch => Some(&mut self.catch_until),
        }
    }

    /// Tick on which a timed effect expires
    pub fn expires_at(&self, kind: PowerUpKind) -> Option<u64> {
        match kind {
            PowerUpKind::MultiBall => None,
            PowerUpKind::PaddleSize => self.paddle_size_until,
            PowerUpKind::SlowMotion => self.slow_motion_until,
            PowerUpKind::Laser => self.laser_until,
            PowerUpKind::Catch => self.catch_until,
        }
    }

    pub fn is_active(&self, kind: PowerUpKind) -> bool {
        match kind {
            PowerUpKind::MultiBall => self.multiball,
            PowerUpKind::PaddleSize => self.paddle_size != 1.0,
            PowerUpKind::SlowMotion => self.slow_motion,
            PowerUpKind::Laser => self.laser,
            PowerUpKind::Catch => self.catch,
        }
    }

    /// Set the flag and (re)start its expiry. Returns true when the effect
    /// was not already running.
    pub fn activate(&mut self, kind: PowerUpKind, now: u64) -> bool {
        let was_active = self.is_active(kind);
        match kind {
            PowerUpKind::MultiBall => self.multiball = true,
            PowerUpKind::PaddleSize => self.paddle_size = PADDLE_SIZE_MULTIPLIER,
            PowerUpKind::SlowMotion => self.slow_motion = true,
            PowerUpKind::Laser => self.laser = true,
            PowerUpKind::Catch => self.catch = true,
        }
        if let (Some(duration), Some(timer)) = (kind.duration_ticks(), self.timer_mut(kind)) {
            *timer = Some(now + duration);
        }
        !was_active
    }

    /// Clear an effect and its timer
    pub fn clear(&mut self, kind: PowerUpKind) {
        match kind {
            PowerUpKind::MultiBall => self.multiball = false,
            PowerUpKind::PaddleSize => self.paddle_size = 1.0,
            PowerUpKind::SlowMotion => self.slow_motion = false,
            PowerUpKind::Laser => self.laser = false,
            PowerUpKind::Catch => self.catch = false,
        }
        if let Some(timer) = self.timer_mut(kind) {
            *timer = None;
        }
    }

    /// Clear every effect whose timer has run out and return them. Each
    /// expiry is reported exactly once.
    pub fn take_expired(&mut self, now: u64) -> Vec<PowerUpKind> {
        let mut expired = Vec::new();
        for kind in PowerUpKind::ALL {
            if self.expires_at(kind).is_some_and(|until| now >= until) {
                self.clear(kind);
                expired.push(kind);
            }
        }
        expired
    }
}

/// Complete session state (deterministic given seed and inputs)
#[derive(Debug, Clone, Serialize)]
pub struct GameSession {
    /// Run seed for reproducibility
    pub seed: u64,
    #[serde(skip)]
    pub rng: Pcg32,
    pub phase: GamePhase,
    pub score: u64,
    pub lives: u8,
    pub combo: Combo,
    /// Current level (1-based; past MAX_LEVEL means the game is won)
    pub level: u32,
    /// Simulation tick counter; only advances while playing
    pub time_ticks: u64,
    /// Canvas size in pixels
    pub viewport: Vec2,
    pub tuning: Tuning,
    pub layout: Layout,
    pub grid: BrickGrid,
    pub paddle: Paddle,
    /// Active balls (sorted by id)
    pub balls: Vec<Ball>,
    pub power_ups: Vec<PowerUp>,
    pub lasers: Vec<Laser>,
    pub active: ActivePowerUps,
    /// Ball held by the catch power-up (at most one)
    pub caught_ball: Option<u32>,
    /// Tick at which the next level's grid is built
    pub level_transition: Option<u64>,
    /// Current ball speed tier multiplier
    pub speed_multiplier: f32,
    /// Events produced since the last drain
    #[serde(skip)]
    pub events: Vec<GameEvent>,
    next_id: u32,
}

impl GameSession {
    /// Create a session on the start screen with level 1 laid out
    pub fn new(seed: u64, width: f32, height: f32, tuning: Tuning) -> Self {
        let viewport = Vec2::new(width, height);
        let mut rng = Pcg32::seed_from_u64(seed);
        let layout = compute_layout(1, width, height);
        let grid = BrickGrid::generate(1, &layout, &mut rng);
        let paddle = Paddle::new(&tuning, viewport);

        let mut session = Self {
            seed,
            rng,
            phase: GamePhase::Start,
            score: 0,
            lives: tuning.lives,
            combo: Combo::default(),
            level: 1,
            time_ticks: 0,
            viewport,
            tuning,
            layout,
            grid,
            paddle,
            balls: Vec::new(),
            power_ups: Vec::new(),
            lasers: Vec::new(),
            active: ActivePowerUps::default(),
            caught_ball: None,
            level_transition: None,
            speed_multiplier: 1.0,
            events: Vec::new(),
            next_id: 1,
        };
        session.reset_balls();
        session
    }

    /// Leave the start screen
    pub fn start(&mut self) {
        if self.phase != GamePhase::Start {
            return;
        }
        self.phase = GamePhase::Playing;
        log::info!("Session started (seed {})", self.seed);
        self.emit(GameEvent::SessionStarted { seed: self.seed });
        self.emit(GameEvent::LevelStarted {
            level: self.level,
            bricks: self.grid.total(),
        });
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Elapsed session time in milliseconds
    pub fn now_ms(&self) -> u64 {
        ticks_to_ms(self.time_ticks)
    }

    pub fn emit(&mut self, event: GameEvent) {
        self.events.push(event);
    }

    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    /// Where a fresh ball is served from
    pub fn ball_start(&self) -> Vec2 {
        Vec2::new(self.viewport.x / 2.0, self.viewport.y - BALL_START_OFFSET)
    }

    /// Magnitude every free ball should have right now
    pub fn target_ball_speed(&self) -> f32 {
        let slow = if self.active.slow_motion {
            SLOW_MOTION_FACTOR
        } else {
            1.0
        };
        self.tuning.ball_speed * self.speed_multiplier * slow
    }

    /// Rescale every ball to the current target speed
    pub fn apply_ball_speed(&mut self) {
        let speed = self.target_ball_speed();
        for ball in self.balls.iter_mut() {
            ball.set_speed(speed);
        }
    }

    /// Recompute the speed tier from the level's destroyed count
    pub fn update_speed_tier(&mut self) {
        let tier = speed_tier(self.grid.destroyed());
        if tier != self.speed_multiplier {
            self.speed_multiplier = tier;
            self.emit(GameEvent::SpeedUp { multiplier: tier });
        }
        self.apply_ball_speed();
    }

    /// Replace all balls with one served ball and recentre the paddle
    pub fn reset_balls(&mut self) {
        self.balls.clear();
        self.caught_ball = None;
        self.paddle.recenter(self.viewport);
        let id = self.next_entity_id();
        let ball = Ball::new(
            id,
            self.ball_start(),
            self.tuning.ball_speed,
            self.tuning.ball_radius,
        );
        self.balls.push(ball);
        self.apply_ball_speed();
    }

    /// Balls beyond the first
    pub fn secondary_ball_count(&self) -> usize {
        self.balls.len().saturating_sub(1)
    }

    pub fn ball_mut(&mut self, id: u32) -> Option<&mut Ball> {
        self.balls.iter_mut().find(|b| b.id == id)
    }

    /// Viewport change: re-derive layout, reposition bricks and paddle
    pub fn resize(&mut self, width: f32, height: f32) {
        if !(width > 0.0 && height > 0.0) {
            return;
        }
        self.viewport = Vec2::new(width, height);
        self.layout = compute_layout(self.level.min(MAX_LEVEL), width, height);
        self.grid.apply_layout(&self.layout);
        self.paddle.width = (self.paddle.base_width * self.paddle.width_multiplier).min(width);
        self.paddle.pos.y = height - PADDLE_BOTTOM_OFFSET;
        self.paddle.clamp(width);
        for ball in self.balls.iter_mut() {
            ball.pos.x = ball.pos.x.clamp(ball.radius, (width - ball.radius).max(ball.radius));
        }
        log::debug!("Resized to {}x{}", width, height);
    }

    /// Ensure deterministic ordering
    pub fn normalize_order(&mut self) {
        self.balls.sort_by_key(|b| b.id);
        self.power_ups.sort_by_key(|p| p.id);
        self.lasers.sort_by_key(|l| l.id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_session_defaults() {
        let session = GameSession::new(1, 800.0, 600.0, Tuning::default());
        assert_eq!(session.phase, GamePhase::Start);
        assert_eq!(session.lives, 3);
        assert_eq!(session.level, 1);
        assert_eq!(session.balls.len(), 1);
        let ball = session.balls[0];
        assert_eq!(ball.pos, Vec2::new(400.0, 520.0));
        assert!((ball.vel.length() - ball.speed).abs() < 0.001);
    }

    #[test]
    fn test_direction_parsing() {
        assert_eq!(PaddleDirection::try_from(-1), Ok(PaddleDirection::Left));
        assert_eq!(PaddleDirection::try_from(1), Ok(PaddleDirection::Right));
        assert!(PaddleDirection::try_from(7).is_err());
        assert_eq!("RIGHT".parse::<PaddleDirection>(), Ok(PaddleDirection::Right));
        assert!("up".parse::<PaddleDirection>().is_err());
    }

    #[test]
    fn test_paddle_clamps_to_canvas() {
        let mut paddle = Paddle::new(&Tuning::default(), Vec2::new(800.0, 600.0));
        paddle.move_to(-500.0, 800.0);
        assert_eq!(paddle.pos.x, 0.0);
        paddle.move_to(5000.0, 800.0);
        assert_eq!(paddle.pos.x, 700.0);
        paddle.move_to(f32::NAN, 800.0);
        assert_eq!(paddle.pos.x, 700.0);
    }

    #[test]
    fn test_paddle_widen_near_edge_stays_inside() {
        let mut paddle = Paddle::new(&Tuning::default(), Vec2::new(800.0, 600.0));
        paddle.move_to(800.0, 800.0);
        paddle.set_width_multiplier(PADDLE_SIZE_MULTIPLIER, 800.0);
        assert_eq!(paddle.width, 150.0);
        assert!(paddle.pos.x + paddle.width <= 800.0);
        paddle.set_width_multiplier(1.0, 800.0);
        assert_eq!(paddle.width, paddle.base_width);
    }

    #[test]
    fn test_paddle_fits_narrow_viewport() {
        use crate::sim::{TickInput, tick};

        let mut session = GameSession::new(1, 80.0, 600.0, Tuning::default());
        assert_eq!(session.paddle.width, 80.0);
        assert_eq!(session.paddle.base_width, PADDLE_WIDTH);
        session.start();
        tick(&mut session, &TickInput::default());
        assert!(session.paddle.pos.x >= 0.0);
        assert!(session.paddle.pos.x + session.paddle.width <= 80.0);

        session.resize(800.0, 600.0);
        assert_eq!(session.paddle.width, PADDLE_WIDTH);
    }

    #[test]
    fn test_reactivation_restarts_timer() {
        let mut active = ActivePowerUps::default();
        assert!(active.activate(PowerUpKind::PaddleSize, 0));
        let first = active.expires_at(PowerUpKind::PaddleSize).unwrap();
        assert!(!active.activate(PowerUpKind::PaddleSize, 300));
        let second = active.expires_at(PowerUpKind::PaddleSize).unwrap();
        assert_eq!(second, first + 300);

        // The original deadline no longer fires
        assert!(active.take_expired(first).is_empty());
        assert_eq!(active.take_expired(second), vec![PowerUpKind::PaddleSize]);
        assert!(active.take_expired(second + 1).is_empty());
        assert_eq!(active.paddle_size, 1.0);
    }

    #[test]
    fn test_multiball_has_no_timer() {
        let mut active = ActivePowerUps::default();
        active.activate(PowerUpKind::MultiBall, 0);
        assert!(active.multiball);
        assert!(active.take_expired(u64::MAX).is_empty());
    }

    #[test]
    fn test_resize_keeps_paddle_inside() {
        let mut session = GameSession::new(1, 800.0, 600.0, Tuning::default());
        session.paddle.move_to(790.0, 800.0);
        session.resize(400.0, 300.0);
        assert!(session.paddle.pos.x + session.paddle.width <= 400.0);
        assert_eq!(session.paddle.pos.y, 250.0);
        assert_eq!(session.layout, compute_layout(1, 400.0, 300.0));
    }
}
