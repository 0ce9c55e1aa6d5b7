// Entry point for the math quiz TUI application
// Loads optional configuration, sets up logging and audio, and launches the main UI

use std::error::Error;
use std::fs::File;
use std::sync::Mutex;
use tracing::{info, warn};

// Module declarations
mod xtq_audio;    // Optional correct/wrong sound cues
mod xtq_button;   // Clickable on-screen buttons
mod xtq_color;    // Palette and terminal color depth matching
mod xtq_config;   // Read-only user configuration
mod xtq_error;    // Shared error type
mod xtq_game;     // Quiz state machine
mod xtq_lang;     // Multi-language string resources
mod xtq_question; // Arithmetic question generation
mod xtq_ui;       // Terminal UI rendering and event handling

use xtq_audio::Sounds;
use xtq_color::Depth;
use xtq_config::{load_config, Config};
use xtq_game::Game;
use xtq_lang::Lang;
use xtq_ui::{run as run_ui, Ui};

/// Install a file logger when one is configured
/// stderr is not used because it would draw over the alternate screen
fn setup_logging(cfg: &Config) {
    let Some(path) = &cfg.log_file else {
        return;
    };
    match File::create(path) {
        Ok(file) => {
            tracing_subscriber::fmt()
                .with_max_level(cfg.level())
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .init();
        }
        Err(e) => eprintln!("cannot open log file {}: {}", path.display(), e),
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    // A broken config file falls back to the defaults
    let (cfg, cfg_err) = match load_config() {
        Ok(cfg) => (cfg, None),
        Err(e) => (Config::default(), Some(e)),
    };
    setup_logging(&cfg);
    if let Some(e) = cfg_err {
        warn!(error = %e, "ignoring config file");
    }
    let lang = Lang::new(&cfg.language);
    let sounds = Sounds::load(&cfg);
    info!(version = env!("CARGO_PKG_VERSION"), language = %lang.current_lang, audio = sounds.enabled(), "starting");

    let mut ui = Ui::new(&lang, cfg.ascii_icons, Depth::detect());
    let mut game = Game::new();

    run_ui(&mut game, &mut ui, &lang, &sounds)?;
    info!(score = game.score(), "exiting");
    Ok(())
}
