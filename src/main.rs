/// Entry point: config, logging, one session, teardown, outcome message.

use std::fs::File;
use std::io;
use std::panic;
use std::sync::Mutex;

use crossterm::style::ResetColor;
use crossterm::terminal::{self, LeaveAlternateScreen};
use crossterm::{cursor, execute};
use tracing::{error, warn};
use tracing_subscriber::EnvFilter;

use threadless::config::{GameConfig, LogConfig};
use threadless::sim::game::GameLoop;
use threadless::ui::terminal::TerminalSurface;

fn main() {
    let config = GameConfig::load();
    init_tracing(&config.log);
    for w in &config.warnings {
        warn!("{w}");
    }
    install_panic_hook();

    let surface = TerminalSurface::new(&config);
    let mut game = match GameLoop::new(surface, config.game.clone()) {
        Ok(game) => game,
        Err(e) => {
            error!(error = %e, "startup failed");
            println!("{e:?}");
            return;
        }
    };

    // `run` releases the terminal before returning, on every path.
    match game.run() {
        Ok(cause) => {
            println!();
            println!("{}", cause.message());
        }
        Err(e) => {
            error!(error = %e, "session aborted");
            println!("Unexpected failure: {e}");
            println!("{e:?}");
        }
    }
}

/// The default hook writes to stderr on the alternate screen, where leaving
/// it wipes the text. Restore the terminal first, then report on stdout.
fn install_panic_hook() {
    panic::set_hook(Box::new(|info| {
        let _ = execute!(io::stdout(), ResetColor, cursor::Show, LeaveAlternateScreen);
        let _ = terminal::disable_raw_mode();
        error!(%info, "panic");
        println!("{info}");
    }));
}

/// Log to a file: the terminal belongs to the game while it runs.
/// `RUST_LOG` overrides the configured level.
fn init_tracing(log: &LogConfig) {
    let file = match File::create(&log.file) {
        Ok(f) => f,
        Err(_) => return,
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&log.level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_target(false)
        .try_init();
}
