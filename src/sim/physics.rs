//! Per-tick integration and collision resolution
//!
//! Order within a step: moving bricks, balls (walls, paddle, bricks),
//! lasers, falling pickups, then out-of-bounds removal.

use glam::Vec2;
use rand::Rng;

use super::collision::{
    ball_below, ball_paddle_overlap, launch_velocity, paddle_bounce, rects_overlap,
    wall_collision,
};
use super::events::{GameEvent, HitSource};
use super::grid::HitOutcome;
use super::scoring::{AREA_CLEAR_POINTS, apply_multiplier, brick_points};
use super::state::{Ball, GameSession, PowerUp, PowerUpKind};
use crate::consts::*;

/// Particles requested for a destroyed brick
const BURST_PARTICLES: u32 = 12;
/// Particles for a brick caught in an area clear
const AREA_BURST_PARTICLES: u32 = 8;
/// Extra multiball balls fan out this far from the source ball's heading
const MULTIBALL_SPREAD: f32 = std::f32::consts::FRAC_PI_6;

/// Advance every entity by `dt` seconds and resolve collisions
pub fn step(state: &mut GameSession, dt: f32) {
    state.grid.update_moving(&state.layout, dt);
    step_balls(state, dt);
    step_lasers(state, dt);
    step_power_ups(state, dt);
    remove_lost_balls(state);
}

fn step_balls(state: &mut GameSession, dt: f32) {
    let width = state.viewport.x;
    let mut i = 0;
    while i < state.balls.len() {
        let mut ball = state.balls[i];

        if state.caught_ball == Some(ball.id) {
            ball.pos = Vec2::new(state.paddle.center_x(), state.paddle.pos.y - ball.radius);
            state.balls[i] = ball;
            i += 1;
            continue;
        }

        ball.pos += ball.vel * dt;

        if let Some(contact) = wall_collision(ball.pos, ball.vel, ball.radius, width) {
            ball.pos = contact.pos;
            ball.vel = contact.vel;
            state.emit(GameEvent::WallHit);
        }

        if ball.vel.y > 0.0
            && ball_paddle_overlap(ball.pos, ball.radius, state.paddle.pos, state.paddle.size())
        {
            if state.active.catch && state.caught_ball.is_none() {
                ball.vel = Vec2::ZERO;
                ball.pos = Vec2::new(state.paddle.center_x(), state.paddle.pos.y - ball.radius);
                state.caught_ball = Some(ball.id);
                state.emit(GameEvent::BallCaught);
            } else {
                ball.vel = paddle_bounce(
                    ball.pos.x,
                    state.paddle.pos.x,
                    state.paddle.width,
                    ball.speed,
                );
                ball.pos.y = state.paddle.pos.y - ball.radius;
                state.emit(GameEvent::PaddleHit);
            }
        }

        state.balls[i] = ball;

        if let Some((row, col)) = state.grid.hit_test(ball.pos, &state.layout) {
            state.balls[i].vel.y = -state.balls[i].vel.y;
            hit_brick(state, row, col, HitSource::Ball);
        }

        i += 1;
    }
}

fn step_lasers(state: &mut GameSession, dt: f32) {
    let mut i = 0;
    while i < state.lasers.len() {
        state.lasers[i].pos.y -= LASER_SPEED * dt;
        let laser = &state.lasers[i];
        if laser.pos.y + LASER_HEIGHT < 0.0 {
            state.lasers.remove(i);
            continue;
        }
        if let Some((row, col)) = state.grid.hit_test(laser.tip(), &state.layout) {
            state.lasers.remove(i);
            hit_brick(state, row, col, HitSource::Laser);
            continue;
        }
        i += 1;
    }
}

fn step_power_ups(state: &mut GameSession, dt: f32) {
    let height = state.viewport.y;
    let mut collected = Vec::new();
    let paddle_pos = state.paddle.pos;
    let paddle_size = state.paddle.size();

    state.power_ups.retain_mut(|p| {
        p.pos.y += POWERUP_FALL_SPEED * dt;
        if rects_overlap(p.top_left(), p.size(), paddle_pos, paddle_size) {
            collected.push(p.kind);
            return false;
        }
        p.pos.y - POWERUP_SIZE / 2.0 <= height
    });

    for kind in collected {
        activate_power_up(state, kind);
    }
}

fn remove_lost_balls(state: &mut GameSession) {
    let height = state.viewport.y;
    let caught = state.caught_ball;
    state
        .balls
        .retain(|b| Some(b.id) == caught || !ball_below(b.pos, b.radius, height));
}

/// Apply a collected power-up to the session
pub fn activate_power_up(state: &mut GameSession, kind: PowerUpKind) {
    let now = state.time_ticks;
    state.active.activate(kind, now);
    state.emit(GameEvent::PowerUpCollected(kind));
    log::debug!("Power-up {:?} active until {:?}", kind, state.active.expires_at(kind));

    match kind {
        PowerUpKind::MultiBall => {
            if state.secondary_ball_count() == 0 {
                spawn_extra_balls(state);
            }
        }
        PowerUpKind::PaddleSize => {
            let width = state.viewport.x;
            let multiplier = state.active.paddle_size;
            state.paddle.set_width_multiplier(multiplier, width);
        }
        PowerUpKind::SlowMotion => state.apply_ball_speed(),
        PowerUpKind::Laser | PowerUpKind::Catch => {}
    }
}

fn spawn_extra_balls(state: &mut GameSession) {
    let Some(source) = state.balls.first().copied() else {
        return;
    };
    // A held ball has no heading; fan out around straight up
    let heading = if source.is_moving() {
        source.vel.normalize()
    } else {
        launch_velocity(0.0, 1.0)
    };
    let speed = state.target_ball_speed();
    for angle in [-MULTIBALL_SPREAD, MULTIBALL_SPREAD] {
        let id = state.next_entity_id();
        let mut ball = Ball::new(id, source.pos, state.tuning.ball_speed, state.tuning.ball_radius);
        ball.speed = speed;
        ball.vel = Vec2::from_angle(angle).rotate(heading) * speed;
        state.balls.push(ball);
    }
}

/// Resolve one hit on the brick at (row, col).
///
/// Ball hits drive the combo; laser hits score at the base rate and leave
/// the combo untouched. Bombs clear their active neighbours for a flat
/// bonus each, without chaining into neighbouring bombs.
pub fn hit_brick(
    state: &mut GameSession,
    row: usize,
    col: usize,
    source: HitSource,
) -> Option<HitOutcome> {
    let brick = state.grid.get(row, col)?;
    let brick_type = brick.kind.brick_type()?;
    let color = brick.color();
    let center = brick.center(&state.layout);

    let outcome = state.grid.hit(row, col)?;
    if let HitOutcome::Damaged { hits_left } = outcome {
        state.emit(GameEvent::BrickHit { row, col, hits_left });
        return Some(outcome);
    }

    let multiplier = match source {
        HitSource::Ball => {
            let now = state.now_ms();
            let count = state.combo.register_break(now);
            if count > 0 {
                state.emit(GameEvent::Combo(count));
            }
            state.combo.multiplier()
        }
        HitSource::Laser | HitSource::Explosion => 1.0,
    };
    let points = apply_multiplier(brick_points(row, brick_type), multiplier);
    state.score += points as u64;
    state.emit(GameEvent::BrickDestroyed {
        row,
        col,
        brick: brick_type,
        color,
        source,
        points,
    });
    state.emit(GameEvent::ParticleBurst {
        pos: center,
        color,
        count: BURST_PARTICLES,
    });
    roll_drop(state, center);

    if outcome == HitOutcome::Detonated {
        let mut cleared = 0;
        for (r, c) in state.grid.neighbors(row, col) {
            if clear_area_brick(state, r, c) {
                cleared += 1;
            }
        }
        log::debug!("Bomb at ({}, {}) cleared {} bricks", row, col, cleared);
        state.emit(GameEvent::BombExploded { row, col, cleared });
    }

    state.update_speed_tier();
    Some(outcome)
}

/// Destroy a neighbour of a detonated bomb
fn clear_area_brick(state: &mut GameSession, row: usize, col: usize) -> bool {
    let Some(brick) = state.grid.get(row, col) else {
        return false;
    };
    let Some(brick_type) = brick.kind.brick_type() else {
        return false;
    };
    let color = brick.color();
    let center = brick.center(&state.layout);
    if !state.grid.destroy(row, col) {
        return false;
    }

    state.score += AREA_CLEAR_POINTS as u64;
    state.emit(GameEvent::BrickDestroyed {
        row,
        col,
        brick: brick_type,
        color,
        source: HitSource::Explosion,
        points: AREA_CLEAR_POINTS,
    });
    state.emit(GameEvent::ParticleBurst {
        pos: center,
        color,
        count: AREA_BURST_PARTICLES,
    });
    roll_drop(state, center);
    true
}

fn roll_drop(state: &mut GameSession, pos: Vec2) {
    if !state.rng.random_bool(POWERUP_DROP_CHANCE) {
        return;
    }
    let kind = PowerUpKind::ALL[state.rng.random_range(0..PowerUpKind::ALL.len())];
    let id = state.next_entity_id();
    state.power_ups.push(PowerUp { id, kind, pos });
    state.emit(GameEvent::PowerUpSpawned(kind));
}
