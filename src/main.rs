//! Brickfall entry point
//!
//! Native builds run a headless session driven by the autopilot and print a
//! summary. The browser build enters through `platform::web::WebGame`.

#[cfg(not(target_arch = "wasm32"))]
mod native {
    use std::path::PathBuf;
    use std::process::ExitCode;

    use clap::Parser;

    use brickfall::Game;
    use brickfall::autopilot::AutoPilot;
    use brickfall::consts::*;
    use brickfall::persistence::{FileStorage, JsonStore, NullStore, PersistenceStore};
    use brickfall::platform::{self, InputSource, LogAudio, Renderer, Snapshot};
    use brickfall::settings::Difficulty;
    use brickfall::sim::GamePhase;
    use brickfall::tuning::Tuning;

    #[derive(Parser, Debug)]
    #[command(author, version, about = "Run a headless Brickfall session on autopilot", long_about = None)]
    struct Args {
        /// RNG seed for the session
        #[arg(long, default_value_t = 42)]
        seed: u64,
        /// Frames to simulate at 60 Hz
        #[arg(long, default_value_t = 3600)]
        frames: u32,
        #[arg(long, default_value_t = DEFAULT_WIDTH)]
        width: f32,
        #[arg(long, default_value_t = DEFAULT_HEIGHT)]
        height: f32,
        /// easy, normal or hard
        #[arg(long)]
        difficulty: Option<String>,
        /// Directory for high scores, stats, settings and achievements
        #[arg(long)]
        data_dir: Option<PathBuf>,
        /// JSON file overriding gameplay tuning
        #[arg(long)]
        tuning: Option<PathBuf>,
        /// Print the final snapshot as JSON
        #[arg(long)]
        dump: bool,
    }

    #[derive(thiserror::Error, Debug)]
    enum RunError {
        #[error("IO error: {0}")]
        Io(#[from] std::io::Error),

        #[error("JSON error: {0}")]
        Json(#[from] serde_json::Error),

        #[error("Unknown difficulty: {0}")]
        UnknownDifficulty(String),
    }

    /// Logs a one-line HUD once per simulated second
    #[derive(Default)]
    struct LogRenderer {
        frames: u64,
    }

    impl Renderer for LogRenderer {
        fn render(&mut self, snapshot: &Snapshot<'_>) {
            self.frames += 1;
            if self.frames % SIM_HZ != 0 {
                return;
            }
            let s = snapshot.session;
            log::debug!(
                "t={}s level={} score={} lives={} balls={} bricks={}/{} particles={}",
                s.time_ticks / SIM_HZ,
                s.level,
                s.score,
                s.lives,
                s.balls.len(),
                s.grid.destroyed(),
                s.grid.total(),
                snapshot.particles.len()
            );
        }
    }

    fn run(args: Args) -> Result<(), RunError> {
        let tuning = match &args.tuning {
            Some(path) => Tuning::from_json(&std::fs::read_to_string(path)?)?,
            None => Tuning::default(),
        };

        let store: Box<dyn PersistenceStore> = match &args.data_dir {
            Some(dir) => Box::new(JsonStore::new(FileStorage::new(dir))),
            None => Box::new(NullStore),
        };

        let mut game = Game::new(
            store,
            Box::new(LogAudio::default()),
            tuning,
            args.width,
            args.height,
        );

        if let Some(name) = &args.difficulty {
            let difficulty =
                Difficulty::from_str(name).ok_or_else(|| RunError::UnknownDifficulty(name.clone()))?;
            let mut settings = game.settings().clone();
            settings.difficulty = difficulty;
            game.apply_settings(settings);
        }

        log::info!(
            "Running seed {} for {} frames at {}x{} ({})",
            args.seed,
            args.frames,
            args.width,
            args.height,
            game.settings().difficulty.as_str()
        );

        let mut pilot = AutoPilot::new();
        let mut renderer = LogRenderer::default();
        game.start(args.seed);

        for _ in 0..args.frames {
            for intent in pilot.poll(&game.session) {
                game.handle(intent);
            }
            game.frame(SIM_DT);
            game.render(&mut renderer);
            for achievement in game.take_unlocked() {
                println!("Achievement: {} - {}", achievement.title(), achievement.description());
            }
            if game.session.phase.is_terminal() {
                break;
            }
        }

        let session = &game.session;
        let outcome = match session.phase {
            GamePhase::Win => "won",
            GamePhase::Over => "game over",
            _ => "stopped",
        };
        println!(
            "Seed {}: {} on level {} with {} points ({} lives left, {:.1}s)",
            session.seed,
            outcome,
            session.level.min(MAX_LEVEL),
            session.score,
            session.lives,
            session.time_ticks as f32 / SIM_HZ as f32
        );
        if let Some(rank) = game.last_rank() {
            println!("High score rank #{} ({})", rank, platform::today());
        }

        if args.dump {
            println!("{}", serde_json::to_string_pretty(&game.snapshot())?);
        }
        Ok(())
    }

    pub fn main() -> ExitCode {
        platform::init_logging();
        match run(Args::parse()) {
            Ok(()) => ExitCode::SUCCESS,
            Err(e) => {
                log::error!("{}", e);
                ExitCode::FAILURE
            }
        }
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() -> std::process::ExitCode {
    native::main()
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is WebGame, this is just to satisfy the compiler
}
