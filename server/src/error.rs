//! Error types for board generation and the network layer.

use thiserror::Error;

/// Failures while building the board. All of them are fatal at startup.
#[derive(Debug, Error)]
pub enum GenerateError {
    #[error(
        "board {width}x{height} is too small for the treasure structure \
         (need at least {min_width}x{min_height})"
    )]
    BoardTooSmall {
        width: usize,
        height: usize,
        min_width: usize,
        min_height: usize,
    },

    #[error("could not place {item} after {attempts} attempts")]
    PlacementExhausted { item: &'static str, attempts: usize },

    #[error("spawn cell ({x}, {y}) is not free")]
    SpawnBlocked { x: usize, y: usize },
}

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("board generation failed: {0}")]
    Generate(#[from] GenerateError),
}
