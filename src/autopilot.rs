//! Autopilot input source for demo/attract mode
//!
//! Tracks the lowest descending ball, nudging off-centre over time so the
//! rally does not settle into a loop. When every ball is safely on its way
//! up it goes after the nearest pickup instead.

use crate::platform::InputSource;
use crate::sim::{GamePhase, GameSession, Intent};

/// Balls above this fraction of the viewport height are not a threat yet
const SAFE_HEIGHT_FRACTION: f32 = 0.6;

#[derive(Debug, Default)]
pub struct AutoPilot {
    /// Polls until the next laser shot is allowed
    laser_cooldown: u32,
}

impl AutoPilot {
    pub fn new() -> Self {
        Self::default()
    }

    fn target_x(&self, session: &GameSession) -> Option<f32> {
        let caught = session.caught_ball;
        let free = session.balls.iter().filter(|b| Some(b.id) != caught);

        let threat = free
            .clone()
            .filter(|b| b.vel.y > 0.0)
            .max_by(|a, b| a.pos.y.total_cmp(&b.pos.y));

        let safe_line = session.viewport.y * SAFE_HEIGHT_FRACTION;
        let all_safe = free.clone().all(|b| b.vel.y < 0.0 || b.pos.y < safe_line);

        if all_safe {
            let paddle_x = session.paddle.center_x();
            let pickup = session
                .power_ups
                .iter()
                .min_by(|a, b| {
                    (a.pos.x - paddle_x)
                        .abs()
                        .total_cmp(&(b.pos.x - paddle_x).abs())
                })
                .map(|p| p.pos.x);
            if pickup.is_some() {
                return pickup;
            }
        }

        threat.or_else(|| free.max_by(|a, b| a.pos.y.total_cmp(&b.pos.y))).map(|ball| {
            // Oscillating offset varies the bounce angle
            let wobble = (session.time_ticks as f32 * 0.01).sin();
            ball.pos.x + wobble * session.paddle.width * 0.3
        })
    }
}

impl InputSource for AutoPilot {
    fn poll(&mut self, session: &GameSession) -> Vec<Intent> {
        let mut intents = Vec::new();
        match session.phase {
            GamePhase::Start => {
                intents.push(Intent::Start);
                return intents;
            }
            GamePhase::Playing => {}
            _ => return intents,
        }

        if let Some(x) = self.target_x(session) {
            intents.push(Intent::Pointer(x));
        }
        if session.caught_ball.is_some() {
            intents.push(Intent::ReleaseBall);
        }

        self.laser_cooldown = self.laser_cooldown.saturating_sub(1);
        if session.active.laser && self.laser_cooldown == 0 {
            intents.push(Intent::FireLaser);
            self.laser_cooldown = 20;
        }
        intents
    }
}
