//! Browser binding
//!
//! JS owns the canvas, the event listeners and the `requestAnimationFrame`
//! loop; it forwards input here, calls `frame` with the elapsed time and
//! draws from `snapshot_json`.

use wasm_bindgen::prelude::*;

use super::{AudioSink, SoundCue};
use crate::Game;
use crate::persistence::{JsonStore, LocalStorage};
use crate::sim::{Intent, PaddleDirection};
use crate::tuning::Tuning;

/// Queues cues for JS to play after each frame
#[derive(Default)]
struct QueuedAudio {
    cues: std::rc::Rc<std::cell::RefCell<Vec<SoundCue>>>,
}

impl AudioSink for QueuedAudio {
    fn play(&mut self, cue: SoundCue) {
        self.cues.borrow_mut().push(cue);
    }
}

#[wasm_bindgen]
pub struct WebGame {
    game: Game,
    cues: std::rc::Rc<std::cell::RefCell<Vec<SoundCue>>>,
}

#[wasm_bindgen]
impl WebGame {
    #[wasm_bindgen(constructor)]
    pub fn new(width: f32, height: f32) -> WebGame {
        super::init_logging();
        log::info!("Brickfall starting ({}x{})", width, height);

        let audio = QueuedAudio::default();
        let cues = audio.cues.clone();
        let game = Game::new(
            Box::new(JsonStore::new(LocalStorage::new())),
            Box::new(audio),
            Tuning::default(),
            width,
            height,
        );
        WebGame { game, cues }
    }

    /// Start a new session; pass `Date.now()` or any seed
    pub fn start(&mut self, seed: f64) {
        self.game.start(seed as u64);
    }

    /// Advance by `dt` seconds. Returns ticks run.
    pub fn frame(&mut self, dt: f32) -> u32 {
        self.game.frame(dt)
    }

    /// -1 left, 0 none, 1 right. Anything else is ignored.
    pub fn set_direction(&mut self, code: i32) {
        match PaddleDirection::try_from(code) {
            Ok(direction) => self.game.handle(Intent::Direction(direction)),
            Err(e) => log::debug!("Ignoring input: {}", e),
        }
    }

    /// Pointer-drag to an absolute paddle centre
    pub fn set_pointer(&mut self, x: f32) {
        self.game.handle(Intent::Pointer(x));
    }

    pub fn toggle_pause(&mut self) {
        self.game.handle(Intent::TogglePause);
    }

    pub fn release_ball(&mut self) {
        self.game.handle(Intent::ReleaseBall);
    }

    pub fn fire_laser(&mut self) {
        self.game.handle(Intent::FireLaser);
    }

    pub fn resize(&mut self, width: f32, height: f32) {
        self.game.resize(width, height);
    }

    /// Replace settings from a JSON blob. Malformed input is ignored.
    pub fn set_settings_json(&mut self, json: &str) {
        match serde_json::from_str(json) {
            Ok(settings) => self.game.apply_settings(settings),
            Err(e) => log::warn!("Ignoring settings: {}", e),
        }
    }

    /// Current frame state for the JS renderer
    pub fn snapshot_json(&self) -> String {
        serde_json::to_string(&self.game.snapshot()).unwrap_or_default()
    }

    /// Sound cues since the last call, as debug names
    pub fn take_sounds(&mut self) -> Vec<JsValue> {
        self.cues
            .borrow_mut()
            .drain(..)
            .map(|cue| JsValue::from_str(&format!("{cue:?}")))
            .collect()
    }

    /// Achievements unlocked since the last call, as titles
    pub fn take_achievements(&mut self) -> Vec<JsValue> {
        self.game
            .take_unlocked()
            .into_iter()
            .map(|a| JsValue::from_str(a.title()))
            .collect()
    }

    pub fn high_scores_json(&self) -> String {
        serde_json::to_string(&self.game.high_scores().entries).unwrap_or_default()
    }

    pub fn stats_json(&self) -> String {
        serde_json::to_string(self.game.stats()).unwrap_or_default()
    }
}
