//! Data-driven game balance
//!
//! A `Tuning` is fixed for the lifetime of a session. It starts from the
//! defaults in `consts`, can be overridden from JSON, and is then scaled by
//! the player's difficulty and sensitivity settings.

use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::settings::Settings;

/// Per-session gameplay numbers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    /// Ball base speed (pixels/second) before speed tiers
    pub ball_speed: f32,
    pub ball_radius: f32,
    pub paddle_width: f32,
    pub paddle_height: f32,
    /// Paddle speed (pixels/second) for held direction input
    pub paddle_speed: f32,
    pub lives: u8,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            ball_speed: BALL_BASE_SPEED,
            ball_radius: BALL_RADIUS,
            paddle_width: PADDLE_WIDTH,
            paddle_height: PADDLE_HEIGHT,
            paddle_speed: PADDLE_SPEED,
            lives: START_LIVES,
        }
    }
}

impl Tuning {
    /// Parse a tuning override; missing or unusable fields keep their defaults
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str::<Self>(json).map(|tuning| tuning.sanitized())
    }

    /// Copy with non-positive or non-finite values replaced by defaults
    pub fn sanitized(&self) -> Self {
        let defaults = Self::default();
        let positive = |value: f32, fallback: f32| {
            if value.is_finite() && value > 0.0 {
                value
            } else {
                fallback
            }
        };
        Self {
            ball_speed: positive(self.ball_speed, defaults.ball_speed),
            ball_radius: positive(self.ball_radius, defaults.ball_radius),
            paddle_width: positive(self.paddle_width, defaults.paddle_width),
            paddle_height: positive(self.paddle_height, defaults.paddle_height),
            paddle_speed: positive(self.paddle_speed, defaults.paddle_speed),
            lives: if self.lives == 0 { defaults.lives } else { self.lives },
        }
    }

    /// Apply difficulty and sensitivity multipliers
    pub fn with_settings(&self, settings: &Settings) -> Self {
        let difficulty = settings.difficulty;
        Self {
            ball_speed: self.ball_speed * difficulty.ball_speed_multiplier(),
            paddle_width: self.paddle_width * difficulty.paddle_width_multiplier(),
            paddle_speed: self.paddle_speed * settings.effective_sensitivity(),
            ..self.clone()
        }
    }

    /// Defaults scaled by settings
    pub fn for_settings(settings: &Settings) -> Self {
        Self::default().with_settings(settings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::Difficulty;

    #[test]
    fn test_partial_json_keeps_defaults() {
        let tuning = Tuning::from_json(r#"{ "ball_speed": 420.0 }"#).unwrap();
        assert_eq!(tuning.ball_speed, 420.0);
        assert_eq!(tuning.paddle_width, PADDLE_WIDTH);
        assert_eq!(tuning.lives, START_LIVES);
    }

    #[test]
    fn test_unusable_values_fall_back() {
        let json = r#"{ "ball_speed": 0.0, "paddle_width": -5.0, "lives": 0, "paddle_speed": 900.0 }"#;
        let tuning = Tuning::from_json(json).unwrap();
        assert_eq!(tuning.ball_speed, BALL_BASE_SPEED);
        assert_eq!(tuning.paddle_width, PADDLE_WIDTH);
        assert_eq!(tuning.lives, START_LIVES);
        assert_eq!(tuning.paddle_speed, 900.0);
    }

    #[test]
    fn test_hard_difficulty_is_faster_and_narrower() {
        let settings = Settings {
            difficulty: Difficulty::Hard,
            sensitivity: 1.5,
            ..Settings::default()
        };
        let tuning = Tuning::for_settings(&settings);
        assert!(tuning.ball_speed > BALL_BASE_SPEED);
        assert!(tuning.paddle_width < PADDLE_WIDTH);
        assert!((tuning.paddle_speed - PADDLE_SPEED * 1.5).abs() < 0.001);
    }
}
