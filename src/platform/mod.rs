//! Platform abstraction layer
//!
//! Narrow interfaces the core calls into:
//! - `Renderer`: draws a read-only snapshot
//! - `AudioSink`: fire-and-forget sound cues
//! - `InputSource`: produces player intents
//!
//! Plus logging setup and wall-clock dates, which differ between native and
//! the browser.

use serde::Serialize;

use crate::effects::ParticleField;
use crate::settings::Settings;
use crate::sim::{GameEvent, GameSession, Intent, PowerUpKind};

#[cfg(target_arch = "wasm32")]
pub mod web;

/// Sounds the core can ask for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SoundCue {
    BrickBreak,
    PaddleHit,
    WallHit,
    GameOver,
    GameWin,
    Combo(u32),
    PowerUp(PowerUpKind),
    LevelUp,
    BallLost,
    BombExplode,
    Catch,
}

impl SoundCue {
    /// Map a simulation event to its cue, if it has one
    pub fn from_event(event: &GameEvent) -> Option<Self> {
        Some(match event {
            GameEvent::BrickDestroyed { .. } => SoundCue::BrickBreak,
            GameEvent::PaddleHit => SoundCue::PaddleHit,
            GameEvent::WallHit => SoundCue::WallHit,
            GameEvent::GameOver { .. } => SoundCue::GameOver,
            GameEvent::GameWin { .. } => SoundCue::GameWin,
            GameEvent::Combo(n) => SoundCue::Combo(*n),
            GameEvent::PowerUpCollected(kind) => SoundCue::PowerUp(*kind),
            GameEvent::LevelCleared { .. } => SoundCue::LevelUp,
            GameEvent::BallLost { .. } => SoundCue::BallLost,
            GameEvent::BombExploded { .. } => SoundCue::BombExplode,
            GameEvent::BallCaught => SoundCue::Catch,
            _ => return None,
        })
    }
}

/// Fire-and-forget audio. Implementations must not block and must tolerate
/// a missing backend.
pub trait AudioSink {
    fn play(&mut self, cue: SoundCue);

    fn set_volume(&mut self, _volume: f32) {}
}

/// Silent sink
#[derive(Debug, Default)]
pub struct NullAudio;

impl AudioSink for NullAudio {
    fn play(&mut self, _cue: SoundCue) {}
}

/// Sink that only logs, for headless runs
#[derive(Debug, Default)]
pub struct LogAudio {
    volume: f32,
    pub played: u64,
}

impl AudioSink for LogAudio {
    fn play(&mut self, cue: SoundCue) {
        self.played += 1;
        if self.volume > 0.0 {
            log::trace!("audio: {:?} at volume {:.2}", cue, self.volume);
        }
    }

    fn set_volume(&mut self, volume: f32) {
        self.volume = volume;
    }
}

/// Read-only view of everything a frame needs to draw
#[derive(Debug, Serialize)]
pub struct Snapshot<'a> {
    pub session: &'a GameSession,
    pub particles: &'a ParticleField,
    pub settings: &'a Settings,
}

pub trait Renderer {
    fn render(&mut self, snapshot: &Snapshot<'_>);
}

/// Source of player intents, polled once per frame
pub trait InputSource {
    fn poll(&mut self, session: &GameSession) -> Vec<Intent>;
}

/// Install the platform logger
#[cfg(not(target_arch = "wasm32"))]
pub fn init_logging() {
    let env = env_logger::Env::default().default_filter_or("info");
    // A second init (tests, embedding) keeps the first logger
    let _ = env_logger::Builder::from_env(env).try_init();
}

#[cfg(target_arch = "wasm32")]
pub fn init_logging() {
    console_error_panic_hook::set_once();
    let _ = console_log::init_with_level(log::Level::Info);
}

/// Today's date as `YYYY-MM-DD`
#[cfg(not(target_arch = "wasm32"))]
pub fn today() -> String {
    let format = time::macros::format_description!("[year]-[month]-[day]");
    time::OffsetDateTime::now_utc()
        .format(&format)
        .unwrap_or_default()
}

#[cfg(target_arch = "wasm32")]
pub fn today() -> String {
    let date = js_sys::Date::new_0();
    format!(
        "{:04}-{:02}-{:02}",
        date.get_full_year(),
        date.get_month() + 1,
        date.get_date()
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cues_for_events() {
        assert_eq!(
            SoundCue::from_event(&GameEvent::BallCaught),
            Some(SoundCue::Catch)
        );
        assert_eq!(
            SoundCue::from_event(&GameEvent::Combo(3)),
            Some(SoundCue::Combo(3))
        );
        assert_eq!(SoundCue::from_event(&GameEvent::LaserFired), None);
    }

    #[test]
    fn test_today_is_iso_date() {
        let date = today();
        assert_eq!(date.len(), 10);
        assert_eq!(&date[4..5], "-");
    }
}
