/// Failures that end a session abnormally.
///
/// Gameplay refusals (blocked moves, boxed-in enemies) are not errors and
/// never show up here; neither is the player being caught, which is a
/// normal way for the loop to stop.

use std::io;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum GameError {
    #[error("terminal I/O failed: {0}")]
    Io(#[from] io::Error),

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("terminal is too small to play ({width}x{height})")]
    SurfaceTooSmall { width: u16, height: u16 },

    #[error("session panicked: {0}")]
    Panicked(String),
}
