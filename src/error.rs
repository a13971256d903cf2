use std::io;

use thiserror::Error;

use crate::geometry::ScreenSize;

pub type Result<T> = std::result::Result<T, SnakeError>;

#[derive(Debug, Error)]
pub enum SnakeError {
    /// The terminal could not be set up, drawn to or read from.
    #[error("terminal error: {0}")]
    Terminal(#[from] crossterm::ErrorKind),
    #[error("i/o error: {0}")]
    Io(#[from] io::Error),
    /// A failure reported by the render or input side while playing.
    #[error("fatal terminal error: {0}")]
    Render(String),
    #[error("a snake of length {length} does not fit a {}x{} grid", .bounds.width, .bounds.height)]
    GridTooSmall { bounds: ScreenSize, length: usize },
    #[error("the scene was drawn after the game ended")]
    GameOver,
    #[error("cannot install the signal handler: {0}")]
    Signal(#[from] ctrlc::Error),
    #[error("invalid configuration: {0}")]
    Config(String),
}
