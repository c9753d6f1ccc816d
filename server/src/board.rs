//! The grid the whole game is played on.

use shared::{Cell, Direction, FrameError, FrameLayout};
use std::fmt;

/// A grid coordinate; `(0, 0)` is the top-left corner and y grows downwards
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Position {
    pub x: usize,
    pub y: usize,
}

impl Position {
    /// Creates a position. Usable in constants such as the spawn table.
    pub const fn new(x: usize, y: usize) -> Self {
        Self { x, y }
    }

    /// The neighbouring position, or None when it would leave the first quadrant.
    pub fn step(self, direction: Direction) -> Option<Position> {
        let (dx, dy) = direction.delta();
        Some(Position {
            x: self.x.checked_add_signed(dx)?,
            y: self.y.checked_add_signed(dy)?,
        })
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Fixed-size grid stored row-major
///
/// The board is the single source of truth for what occupies each cell.
/// Players are written onto it as `Cell::Player` so the wire encoding is a
/// straight copy of the cells. Reads and writes outside the grid never panic:
/// `get` returns None and `set` does nothing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Board {
    width: usize,
    height: usize,
    cells: Vec<Cell>,
}

impl Board {
    /// Creates a board of the given size with every cell empty
    ///
    /// Used directly by tests; real games start from [`Board::bordered`].
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            cells: vec![Cell::Empty; width * height],
        }
    }

    /// An empty board with a one-cell-thick wall around the edge.
    pub fn bordered(width: usize, height: usize) -> Self {
        let mut board = Self::new(width, height);
        for x in 0..width {
            board.set(Position::new(x, 0), Cell::Wall);
            board.set(Position::new(x, height.saturating_sub(1)), Cell::Wall);
        }
        for y in 0..height {
            board.set(Position::new(0, y), Cell::Wall);
            board.set(Position::new(width.saturating_sub(1), y), Cell::Wall);
        }
        board
    }

    /// Number of columns, which is also the status line length on the wire
    pub fn width(&self) -> usize {
        self.width
    }

    /// Frame layout matching this board's dimensions
    ///
    /// Fails for a board with a zero dimension, which has no valid wire form.
    pub fn layout(&self) -> Result<FrameLayout, FrameError> {
        FrameLayout::new(self.width, self.height)
    }

    /// Whether `pos` lies inside the grid
    pub fn contains(&self, pos: Position) -> bool {
        pos.x < self.width && pos.y < self.height
    }

    fn index(&self, pos: Position) -> Option<usize> {
        self.contains(pos).then(|| pos.y * self.width + pos.x)
    }

    /// Reads a cell, or None when `pos` is outside the grid
    pub fn get(&self, pos: Position) -> Option<Cell> {
        self.index(pos).map(|i| self.cells[i])
    }

    /// Writes a cell; positions outside the grid are ignored.
    pub fn set(&mut self, pos: Position, cell: Cell) {
        if let Some(i) = self.index(pos) {
            self.cells[i] = cell;
        }
    }

    /// All cells in row-major order, as they are sent on the wire
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    /// Every position currently holding `cell`.
    pub fn positions_of(&self, cell: Cell) -> Vec<Position> {
        self.cells
            .iter()
            .enumerate()
            .filter(|(_, c)| **c == cell)
            .map(|(i, _)| Position::new(i % self.width, i / self.width))
            .collect()
    }

    /// How many cells currently hold `cell`
    pub fn count(&self, cell: Cell) -> usize {
        self.cells.iter().filter(|c| **c == cell).count()
    }

    /// Rows as printable strings, used for debug dumps.
    pub fn rows(&self) -> Vec<String> {
        self.cells
            .chunks(self.width.max(1))
            .map(|row| row.iter().map(|cell| cell.symbol() as char).collect())
            .collect()
    }
}
