//! Fixed timestep simulation tick
//!
//! Core game loop that advances simulation deterministically.

use super::events::GameEvent;
use super::grid::BrickGrid;
use super::layout::compute_layout;
use super::physics;
use super::scoring::level_bonus;
use super::state::{GamePhase, GameSession, Laser, PaddleDirection, PowerUpKind};
use crate::consts::*;
use crate::ms_to_ticks;

/// Release angle from straight up toward the held direction (15 degrees)
const RELEASE_ANGLE: f32 = std::f32::consts::PI / 12.0;

/// A single player intent from any input source
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Intent {
    /// Held direction (keyboard / buttons)
    Direction(PaddleDirection),
    /// Absolute paddle centre (pointer drag)
    Pointer(f32),
    TogglePause,
    ReleaseBall,
    FireLaser,
    /// Leave the start screen
    Start,
}

/// Input commands for a single tick (deterministic)
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// Held paddle direction
    pub direction: PaddleDirection,
    /// Target paddle centre from mouse/touch position
    pub pointer_x: Option<f32>,
    /// Pause toggle
    pub toggle_pause: bool,
    /// Release a caught ball
    pub release_ball: bool,
    pub fire_laser: bool,
    pub start: bool,
}

impl TickInput {
    /// Fold an intent into this tick's input
    pub fn apply(&mut self, intent: Intent) {
        match intent {
            Intent::Direction(direction) => self.direction = direction,
            Intent::Pointer(x) if x.is_finite() => self.pointer_x = Some(x),
            Intent::Pointer(_) => {}
            Intent::TogglePause => self.toggle_pause = !self.toggle_pause,
            Intent::ReleaseBall => self.release_ball = true,
            Intent::FireLaser => self.fire_laser = true,
            Intent::Start => self.start = true,
        }
    }

    /// Clear one-shot actions, keeping the held direction
    pub fn clear_actions(&mut self) {
        *self = Self {
            direction: self.direction,
            ..Self::default()
        };
    }
}

/// Advance the game state by one fixed timestep
pub fn tick(state: &mut GameSession, input: &TickInput) {
    let dt = SIM_DT;

    if input.start && state.phase == GamePhase::Start {
        state.start();
    }

    if input.toggle_pause {
        match state.phase {
            GamePhase::Playing => {
                state.phase = GamePhase::Paused;
                state.emit(GameEvent::Paused);
                return;
            }
            GamePhase::Paused => {
                state.phase = GamePhase::Playing;
                state.emit(GameEvent::Resumed);
            }
            _ => {}
        }
    }

    // Nothing moves, and no timer advances, outside of play
    if state.phase != GamePhase::Playing {
        return;
    }

    state.time_ticks += 1;

    // Paddle
    let width = state.viewport.x;
    state.paddle.direction = input.direction;
    if let Some(x) = input.pointer_x {
        state.paddle.move_to(x, width);
    } else {
        state.paddle.step(dt, width);
    }

    // Between levels: hold everything until the next grid is built
    if let Some(ready_at) = state.level_transition {
        if state.time_ticks < ready_at {
            return;
        }
        begin_level(state);
    }

    expire_power_ups(state);

    if input.release_ball {
        release_caught_ball(state, input.direction);
    }
    if input.fire_laser {
        fire_laser(state);
    }

    physics::step(state, dt);

    if state.balls.len() <= 1 {
        state.active.multiball = false;
    }

    if state.balls.is_empty() {
        lose_life(state);
        if state.phase != GamePhase::Playing {
            return;
        }
    }

    if state.grid.is_cleared() && state.level_transition.is_none() {
        clear_level(state);
    }

    state.normalize_order();
}

fn expire_power_ups(state: &mut GameSession) {
    for kind in state.active.take_expired(state.time_ticks) {
        match kind {
            PowerUpKind::PaddleSize => {
                let width = state.viewport.x;
                state.paddle.set_width_multiplier(1.0, width);
            }
            PowerUpKind::SlowMotion => state.apply_ball_speed(),
            PowerUpKind::Catch => {
                if let Some(id) = state.caught_ball {
                    launch_held(state, id, 0.0);
                }
            }
            PowerUpKind::Laser | PowerUpKind::MultiBall => {}
        }
        state.emit(GameEvent::PowerUpExpired(kind));
        log::debug!("Power-up {:?} expired", kind);
    }
}

fn release_caught_ball(state: &mut GameSession, direction: PaddleDirection) {
    if let Some(id) = state.caught_ball {
        launch_held(state, id, direction.sign() * RELEASE_ANGLE);
    }
}

fn launch_held(state: &mut GameSession, id: u32, angle: f32) {
    state.caught_ball = None;
    let speed = state.target_ball_speed();
    if let Some(ball) = state.ball_mut(id) {
        ball.speed = speed;
        ball.launch(angle);
        state.emit(GameEvent::BallReleased);
    }
}

fn fire_laser(state: &mut GameSession) {
    if !state.active.laser || state.lasers.len() >= MAX_LASERS {
        return;
    }
    let id = state.next_entity_id();
    let pos = glam::Vec2::new(
        state.paddle.center_x() - LASER_WIDTH / 2.0,
        state.paddle.pos.y - LASER_HEIGHT,
    );
    state.lasers.push(Laser { id, pos });
    state.emit(GameEvent::LaserFired);
}

fn lose_life(state: &mut GameSession) {
    state.lives = state.lives.saturating_sub(1);
    state.combo.reset();
    if state.lives == 0 {
        state.phase = GamePhase::Over;
        log::info!("Game over: score {} on level {}", state.score, state.level);
        state.emit(GameEvent::GameOver {
            score: state.score,
            level: state.level,
        });
        return;
    }
    log::debug!("Ball lost, {} lives left", state.lives);
    state.emit(GameEvent::BallLost {
        lives_left: state.lives,
    });
    state.reset_balls();
}

fn clear_level(state: &mut GameSession) {
    let bonus = level_bonus(state.level);
    state.score += bonus;
    state.emit(GameEvent::LevelCleared {
        level: state.level,
        bonus,
        score: state.score,
    });
    log::info!("Level {} cleared, score {}", state.level, state.score);
    state.level += 1;

    if state.level > MAX_LEVEL {
        state.phase = GamePhase::Win;
        state.emit(GameEvent::GameWin { score: state.score });
        return;
    }

    state.level_transition = Some(state.time_ticks + ms_to_ticks(LEVEL_TRANSITION_MS));
    state.speed_multiplier = 1.0;
    state.power_ups.clear();
    state.lasers.clear();
    state.active.clear(PowerUpKind::MultiBall);
    state.active.clear(PowerUpKind::SlowMotion);
    state.reset_balls();
}

/// Build the grid for the current level and serve a fresh ball
fn begin_level(state: &mut GameSession) {
    state.level_transition = None;
    state.layout = compute_layout(state.level, state.viewport.x, state.viewport.y);
    state.grid = BrickGrid::generate(state.level, &state.layout, &mut state.rng);
    state.combo.reset();
    state.reset_balls();
    state.emit(GameEvent::LevelStarted {
        level: state.level,
        bricks: state.grid.total(),
    });
}
