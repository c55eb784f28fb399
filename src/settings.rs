//! Game settings and preferences
//!
//! Persisted separately from scores and stats. The simulation only reads
//! `difficulty` and `sensitivity`; the rest is for presentation layers.

use serde::{Deserialize, Serialize};

/// Difficulty levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum Difficulty {
    Easy,
    #[default]
    Normal,
    Hard,
}

impl Difficulty {
    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Easy => "Easy",
            Difficulty::Normal => "Normal",
            Difficulty::Hard => "Hard",
        }
    }

    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "easy" => Some(Difficulty::Easy),
            "normal" | "medium" => Some(Difficulty::Normal),
            "hard" => Some(Difficulty::Hard),
            _ => None,
        }
    }

    /// Ball base speed multiplier
    pub fn ball_speed_multiplier(&self) -> f32 {
        match self {
            Difficulty::Easy => 0.8,
            Difficulty::Normal => 1.0,
            Difficulty::Hard => 1.2,
        }
    }

    /// Paddle base width multiplier
    pub fn paddle_width_multiplier(&self) -> f32 {
        match self {
            Difficulty::Easy => 1.2,
            Difficulty::Normal => 1.0,
            Difficulty::Hard => 0.8,
        }
    }
}

/// Color themes (presentation only)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum Theme {
    #[default]
    Classic,
    Neon,
    HighContrast,
}

/// Sensitivity bounds
pub const MIN_SENSITIVITY: f32 = 0.5;
pub const MAX_SENSITIVITY: f32 = 2.0;

/// Game settings/preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub difficulty: Difficulty,
    /// Master volume (0.0 - 1.0)
    pub volume: f32,
    /// Paddle speed multiplier
    pub sensitivity: f32,
    pub particles_enabled: bool,
    pub theme: Theme,
    /// Screen-reader friendly announcements, reduced motion
    pub accessibility_mode: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            difficulty: Difficulty::Normal,
            volume: 0.8,
            sensitivity: 1.0,
            particles_enabled: true,
            theme: Theme::Classic,
            accessibility_mode: false,
        }
    }
}

impl Settings {
    /// Sensitivity clamped to the supported range (NaN falls back to 1.0)
    pub fn effective_sensitivity(&self) -> f32 {
        if self.sensitivity.is_nan() {
            1.0
        } else {
            self.sensitivity.clamp(MIN_SENSITIVITY, MAX_SENSITIVITY)
        }
    }

    /// Effective volume, clamped
    pub fn effective_volume(&self) -> f32 {
        if self.volume.is_nan() {
            0.0
        } else {
            self.volume.clamp(0.0, 1.0)
        }
    }

    /// Particles are suppressed in accessibility mode
    pub fn effective_particles(&self) -> bool {
        self.particles_enabled && !self.accessibility_mode
    }

    /// Copy with out-of-range values pulled back into range
    pub fn sanitized(&self) -> Self {
        Self {
            volume: self.effective_volume(),
            sensitivity: self.effective_sensitivity(),
            ..self.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_difficulty_from_str() {
        assert_eq!(Difficulty::from_str("HARD"), Some(Difficulty::Hard));
        assert_eq!(Difficulty::from_str("medium"), Some(Difficulty::Normal));
        assert_eq!(Difficulty::from_str("nightmare"), None);
    }

    #[test]
    fn test_partial_blob_uses_defaults() {
        let settings: Settings = serde_json::from_str(r#"{ "difficulty": "Easy" }"#).unwrap();
        assert_eq!(settings.difficulty, Difficulty::Easy);
        assert_eq!(settings.sensitivity, 1.0);
        assert!(settings.particles_enabled);
    }

    #[test]
    fn test_sanitized_clamps() {
        let settings = Settings {
            volume: 3.0,
            sensitivity: 0.1,
            ..Settings::default()
        }
        .sanitized();
        assert_eq!(settings.volume, 1.0);
        assert_eq!(settings.sensitivity, MIN_SENSITIVITY);
    }
}
