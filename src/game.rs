//! Frame driver
//!
//! Owns a `GameSession` plus everything around it. Each frame it runs the
//! fixed-step simulation from accumulated wall time, then fans the tick's
//! events out in a fixed order: stats, achievements, particles, audio.
//! High scores, stats and achievements are saved when a session ends.

use crate::achievements::{Achievement, Achievements};
use crate::consts::*;
use crate::effects::ParticleField;
use crate::highscores::HighScores;
use crate::persistence::PersistenceStore;
use crate::platform::{self, AudioSink, Renderer, Snapshot, SoundCue};
use crate::settings::Settings;
use crate::sim::{GameEvent, GameSession, Intent, TickInput, tick};
use crate::stats::Stats;
use crate::tuning::Tuning;

/// Longest frame the accumulator accepts (seconds)
const MAX_FRAME_DT: f32 = 0.1;

pub struct Game {
    pub session: GameSession,
    settings: Settings,
    /// Tuning before settings are applied
    base_tuning: Tuning,
    stats: Stats,
    achievements: Achievements,
    high_scores: HighScores,
    particles: ParticleField,
    store: Box<dyn PersistenceStore>,
    audio: Box<dyn AudioSink>,
    input: TickInput,
    accumulator: f32,
    /// Unlocked since the last `take_unlocked`
    unlocked: Vec<Achievement>,
    /// Leaderboard rank of the last finished session
    last_rank: Option<usize>,
    /// Session end already recorded
    recorded: bool,
}

impl Game {
    /// Load persisted data and sit on the start screen
    pub fn new(
        store: Box<dyn PersistenceStore>,
        mut audio: Box<dyn AudioSink>,
        base_tuning: Tuning,
        width: f32,
        height: f32,
    ) -> Self {
        let settings = store.load_settings();
        let stats = store.load_stats();
        let achievements = store.load_achievements();
        let high_scores = store.load_high_scores();
        audio.set_volume(settings.effective_volume());

        let tuning = base_tuning.with_settings(&settings);
        let session = GameSession::new(0, width, height, tuning);
        let particles = ParticleField::new(0, settings.effective_particles());

        Self {
            session,
            settings,
            base_tuning,
            stats,
            achievements,
            high_scores,
            particles,
            store,
            audio,
            input: TickInput::default(),
            accumulator: 0.0,
            unlocked: Vec::new(),
            last_rank: None,
            recorded: false,
        }
    }

    /// Start a fresh session. Anything pending from the previous one
    /// (power-up timers, level transition, queued input) is discarded.
    pub fn start(&mut self, seed: u64) {
        let viewport = self.session.viewport;
        let tuning = self.base_tuning.with_settings(&self.settings);
        self.session = GameSession::new(seed, viewport.x, viewport.y, tuning);
        self.particles = ParticleField::new(seed, self.settings.effective_particles());
        self.input = TickInput::default();
        self.accumulator = 0.0;
        self.recorded = false;
        self.last_rank = None;

        self.session.start();
        self.dispatch_events();
    }

    /// Queue an intent for the next tick
    pub fn handle(&mut self, intent: Intent) {
        self.input.apply(intent);
    }

    /// Advance by `dt` seconds of wall time. Returns the number of ticks run.
    pub fn frame(&mut self, dt: f32) -> u32 {
        let dt = if dt.is_finite() {
            dt.clamp(0.0, MAX_FRAME_DT)
        } else {
            0.0
        };
        self.accumulator += dt;

        let mut substeps = 0;
        while self.accumulator >= SIM_DT && substeps < MAX_SUBSTEPS {
            tick(&mut self.session, &self.input);
            self.accumulator -= SIM_DT;
            substeps += 1;

            // Clear one-shot inputs after processing
            self.input.clear_actions();
            self.dispatch_events();
        }
        if substeps == MAX_SUBSTEPS {
            // Drop the backlog rather than spiral
            self.accumulator = self.accumulator.min(SIM_DT);
        }

        self.particles.update(dt);
        substeps
    }

    fn dispatch_events(&mut self) {
        let events = self.session.drain_events();
        let mut newly_unlocked = false;
        for event in &events {
            self.stats.record(event);
            let unlocked = self
                .achievements
                .evaluate(event, &self.stats, self.session.score);
            newly_unlocked |= !unlocked.is_empty();
            self.unlocked.extend(unlocked);
            self.particles.handle(event);
            if let Some(cue) = SoundCue::from_event(event) {
                self.audio.play(cue);
            }
            if matches!(event, GameEvent::GameOver { .. } | GameEvent::GameWin { .. }) {
                self.record_session_end();
            }
        }
        if newly_unlocked {
            self.store.save_achievements(&self.achievements);
        }
    }

    fn record_session_end(&mut self) {
        if self.recorded {
            return;
        }
        self.recorded = true;
        let score = self.session.score;
        let level = self.session.level.min(MAX_LEVEL);
        self.last_rank = self.high_scores.add_score(score, level, platform::today());
        if let Some(rank) = self.last_rank {
            log::info!("New high score #{}: {}", rank, score);
            self.store.save_high_scores(&self.high_scores);
        }
        self.store.save_stats(&self.stats);
        self.store.save_achievements(&self.achievements);
    }

    /// Replace settings. Difficulty and sensitivity take effect next session.
    pub fn apply_settings(&mut self, settings: Settings) {
        self.settings = settings.sanitized();
        self.particles.set_enabled(self.settings.effective_particles());
        self.audio.set_volume(self.settings.effective_volume());
        self.store.save_settings(&self.settings);
    }

    pub fn resize(&mut self, width: f32, height: f32) {
        self.session.resize(width, height);
    }

    pub fn snapshot(&self) -> Snapshot<'_> {
        Snapshot {
            session: &self.session,
            particles: &self.particles,
            settings: &self.settings,
        }
    }

    pub fn render(&self, renderer: &mut dyn Renderer) {
        renderer.render(&self.snapshot());
    }

    /// Achievements unlocked since the last call
    pub fn take_unlocked(&mut self) -> Vec<Achievement> {
        std::mem::take(&mut self.unlocked)
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn stats(&self) -> &Stats {
        &self.stats
    }

    pub fn achievements(&self) -> &Achievements {
        &self.achievements
    }

    pub fn high_scores(&self) -> &HighScores {
        &self.high_scores
    }

    pub fn particles(&self) -> &ParticleField {
        &self.particles
    }

    pub fn last_rank(&self) -> Option<usize> {
        self.last_rank
    }
}

#[cfg(test)]
mod tests {
    use glam::Vec2;

    use super::*;
    use crate::persistence::{
        JsonStore, MemoryStorage, NullStore, PersistenceStore, STATS_KEY, Storage,
    };
    use crate::platform::NullAudio;
    use crate::settings::Difficulty;
    use crate::sim::{BrickGrid, BrickKind, GamePhase};

    fn game_with(storage: MemoryStorage) -> Game {
        Game::new(
            Box::new(JsonStore::new(storage)),
            Box::new(NullAudio),
            Tuning::default(),
            DEFAULT_WIDTH,
            DEFAULT_HEIGHT,
        )
    }

    #[test]
    fn test_frame_runs_fixed_ticks() {
        let mut game = game_with(MemoryStorage::new());
        game.start(3);
        for _ in 0..10 {
            game.frame(SIM_DT);
        }
        assert_eq!(game.session.time_ticks, 10);
        assert!(game.frame(10.0) <= MAX_SUBSTEPS);
        assert_eq!(game.frame(f32::NAN), 0);
    }

    #[test]
    fn test_pause_intent_reaches_session() {
        let mut game = game_with(MemoryStorage::new());
        game.start(3);
        game.handle(Intent::TogglePause);
        game.frame(SIM_DT);
        assert_eq!(game.session.phase, GamePhase::Paused);
        game.frame(SIM_DT);
        assert_eq!(game.session.phase, GamePhase::Paused);
    }

    #[test]
    fn test_game_over_records_score_once() {
        let storage = MemoryStorage::new();
        let mut game = game_with(storage.clone());
        game.start(3);
        game.session.lives = 1;
        game.session.score = 750;
        game.session.balls[0].pos = Vec2::new(400.0, 700.0);
        game.session.balls[0].vel = Vec2::new(0.0, 300.0);
        game.frame(SIM_DT);
        game.frame(SIM_DT);

        assert_eq!(game.session.phase, GamePhase::Over);
        assert_eq!(game.last_rank(), Some(1));
        assert_eq!(game.high_scores().entries.len(), 1);
        assert_eq!(game.stats().games_played, 1);
        assert_eq!(game.stats().best_score, 750);

        let reloaded = JsonStore::new(storage.clone());
        assert_eq!(reloaded.load_high_scores().top_score(), Some(750));
        assert!(storage.get(STATS_KEY).unwrap().is_some());
    }

    #[test]
    fn test_restart_discards_pending_timers() {
        let mut game = game_with(MemoryStorage::new());
        game.start(3);
        crate::sim::physics::activate_power_up(
            &mut game.session,
            crate::sim::PowerUpKind::PaddleSize,
        );
        game.handle(Intent::FireLaser);
        game.start(4);
        assert_eq!(game.session.paddle.width, PADDLE_WIDTH);
        assert_eq!(
            game.session
                .active
                .expires_at(crate::sim::PowerUpKind::PaddleSize),
            None
        );
        assert_eq!(game.session.phase, GamePhase::Playing);
    }

    #[test]
    fn test_difficulty_applies_next_session() {
        let mut game = Game::new(
            Box::new(NullStore),
            Box::new(NullAudio),
            Tuning::default(),
            DEFAULT_WIDTH,
            DEFAULT_HEIGHT,
        );
        game.start(1);
        game.apply_settings(Settings {
            difficulty: Difficulty::Hard,
            ..Settings::default()
        });
        assert_eq!(game.session.tuning.ball_speed, BALL_BASE_SPEED);
        game.start(2);
        assert_eq!(game.session.tuning.ball_speed, BALL_BASE_SPEED * 1.2);
        assert_eq!(game.session.paddle.width, PADDLE_WIDTH * 0.8);
    }

    #[test]
    fn test_first_brick_achievement_reported() {
        let mut game = game_with(MemoryStorage::new());
        game.start(5);
        game.session.grid = BrickGrid::from_kinds(&game.session.layout, &[BrickKind::Normal; 32]);
        let target = game
            .session
            .grid
            .get(3, 3)
            .map(|b| b.center(&game.session.layout))
            .unwrap();
        game.session.balls[0].pos = target + Vec2::new(0.0, 4.0);
        game.session.balls[0].vel = Vec2::new(0.0, -300.0);
        game.frame(SIM_DT);
        assert!(game.take_unlocked().contains(&Achievement::FirstBrick));
        assert!(game.take_unlocked().is_empty());
        assert_eq!(game.stats().bricks_destroyed, 1);
    }
}
