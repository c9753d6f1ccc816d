//! Wire vocabulary shared by the treasure hunt server and its terminal client.
//!
//! The server pushes one fixed-length payload per state change: the grid in
//! row-major order (one symbol byte per cell) followed by a status line padded
//! to exactly `width` bytes. When the game has been won the whole payload is
//! [`GAME_OVER_BYTE`] repeated. Clients answer with bare direction tokens.

use std::fmt;
use std::str::FromStr;
use thiserror::Error;

pub const DEFAULT_WIDTH: usize = 80;
pub const DEFAULT_HEIGHT: usize = 30;
pub const DEFAULT_PORT: u16 = 65000;

/// Fills the entire payload once somebody has reached the goal.
pub const GAME_OVER_BYTE: u8 = b'W';
/// First byte of a status line that must not be rendered.
pub const EMPTY_MESSAGE_BYTE: u8 = b'@';

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PlayerId {
    One,
    Two,
}

impl PlayerId {
    pub const ALL: [PlayerId; 2] = [PlayerId::One, PlayerId::Two];

    /// The 1-based number shown to players.
    pub fn number(self) -> u8 {
        match self {
            PlayerId::One => 1,
            PlayerId::Two => 2,
        }
    }

    pub fn index(self) -> usize {
        self.number() as usize - 1
    }

    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }
}

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.number())
    }
}

/// Contents of a single grid position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Cell {
    #[default]
    Empty,
    Wall,
    Player(PlayerId),
    Key,
    Gate,
    Goal,
}

impl Cell {
    pub fn symbol(self) -> u8 {
        match self {
            Cell::Empty => b' ',
            Cell::Wall => b'#',
            Cell::Player(PlayerId::One) => b'1',
            Cell::Player(PlayerId::Two) => b'2',
            Cell::Key => b'K',
            Cell::Gate => b'=',
            Cell::Goal => b'*',
        }
    }

    pub fn from_symbol(symbol: u8) -> Option<Self> {
        match symbol {
            b' ' => Some(Cell::Empty),
            b'#' => Some(Cell::Wall),
            b'1' => Some(Cell::Player(PlayerId::One)),
            b'2' => Some(Cell::Player(PlayerId::Two)),
            b'K' => Some(Cell::Key),
            b'=' => Some(Cell::Gate),
            b'*' => Some(Cell::Goal),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    pub const ALL: [Direction; 4] = [
        Direction::Up,
        Direction::Down,
        Direction::Left,
        Direction::Right,
    ];

    /// The literal token a client sends for this direction.
    pub fn token(self) -> &'static str {
        match self {
            Direction::Up => "up",
            Direction::Down => "down",
            Direction::Left => "left",
            Direction::Right => "right",
        }
    }

    /// Unit vector in grid coordinates; y grows downwards.
    pub fn delta(self) -> (isize, isize) {
        match self {
            Direction::Up => (0, -1),
            Direction::Down => (0, 1),
            Direction::Left => (-1, 0),
            Direction::Right => (1, 0),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown direction token {0:?}")]
pub struct UnknownDirection(pub String);

impl FromStr for Direction {
    type Err = UnknownDirection;

    fn from_str(token: &str) -> Result<Self, Self::Err> {
        Direction::ALL
            .into_iter()
            .find(|direction| direction.token() == token)
            .ok_or_else(|| UnknownDirection(token.to_string()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FrameError {
    #[error("frame layout {width}x{height} has no cells")]
    EmptyLayout { width: usize, height: usize },

    #[error("expected {expected} bytes, got {actual}")]
    Length { expected: usize, actual: usize },

    #[error("unknown cell symbol {byte:#04x} at offset {offset}")]
    UnknownSymbol { offset: usize, byte: u8 },
}

/// Board dimensions, fixed for the lifetime of a server process.
///
/// Only constructed through [`FrameLayout::new`] or `Default`, so both
/// dimensions are always non-zero and every frame has at least one grid byte
/// and one status byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameLayout {
    width: usize,
    height: usize,
}

impl FrameLayout {
    pub fn new(width: usize, height: usize) -> Result<Self, FrameError> {
        if width == 0 || height == 0 {
            return Err(FrameError::EmptyLayout { width, height });
        }
        Ok(Self { width, height })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn grid_len(&self) -> usize {
        self.width * self.height
    }

    /// Total payload size: the grid plus one status line.
    pub fn frame_len(&self) -> usize {
        self.grid_len() + self.width
    }
}

impl Default for FrameLayout {
    fn default() -> Self {
        Self {
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
        }
    }
}

/// One server-to-client payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StateFrame {
    Board {
        /// Row-major, `layout.grid_len()` entries.
        cells: Vec<Cell>,
        /// `None` is sent as the empty-message marker.
        message: Option<String>,
    },
    GameOver,
}

impl StateFrame {
    pub fn encode(&self, layout: FrameLayout) -> Result<Vec<u8>, FrameError> {
        let (cells, message) = match self {
            StateFrame::GameOver => return Ok(vec![GAME_OVER_BYTE; layout.frame_len()]),
            StateFrame::Board { cells, message } => (cells, message),
        };

        if cells.len() != layout.grid_len() {
            return Err(FrameError::Length {
                expected: layout.grid_len(),
                actual: cells.len(),
            });
        }

        let mut bytes = Vec::with_capacity(layout.frame_len());
        bytes.extend(cells.iter().map(|cell| cell.symbol()));
        bytes.extend_from_slice(&encode_message(message.as_deref(), layout.width()));
        Ok(bytes)
    }

    pub fn decode(bytes: &[u8], layout: FrameLayout) -> Result<Self, FrameError> {
        if bytes.len() != layout.frame_len() {
            return Err(FrameError::Length {
                expected: layout.frame_len(),
                actual: bytes.len(),
            });
        }

        if bytes.first() == Some(&GAME_OVER_BYTE) {
            return Ok(StateFrame::GameOver);
        }

        let (grid, status) = bytes.split_at(layout.grid_len());
        let cells = grid
            .iter()
            .enumerate()
            .map(|(offset, &byte)| {
                Cell::from_symbol(byte).ok_or(FrameError::UnknownSymbol { offset, byte })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let message = if status.first() == Some(&EMPTY_MESSAGE_BYTE) {
            None
        } else {
            Some(String::from_utf8_lossy(status).trim_end().to_string())
        };

        Ok(StateFrame::Board { cells, message })
    }

    /// Splits the grid into rows of symbols, for drawing and debug dumps.
    pub fn rows(&self, layout: FrameLayout) -> Vec<String> {
        match self {
            StateFrame::GameOver => Vec::new(),
            StateFrame::Board { cells, .. } => cells
                .chunks(layout.width())
                .map(|row| row.iter().map(|cell| cell.symbol() as char).collect())
                .collect(),
        }
    }
}

/// Pads (or truncates) a status line to exactly `width` bytes.
pub fn encode_message(message: Option<&str>, width: usize) -> Vec<u8> {
    match message {
        None => vec![EMPTY_MESSAGE_BYTE; width],
        Some(text) => {
            let mut line: Vec<u8> = text.bytes().take(width).collect();
            line.resize(width, b' ');
            line
        }
    }
}
