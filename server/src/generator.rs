//! Procedural board generation: border, treasure structure, obstacles and keys.
//!
//! The treasure structure is a double-walled box with the goal in the middle:
//!
//! ```text
//! ###############
//! #             #
//! #  #########  #
//! #  #       #  #
//! =  #   *   =  #
//! #  #       #  #
//! #  #########  #
//! #             #
//! ###############
//! ```
//!
//! A player has to open the outer gate on the left, walk round the ring and
//! open the inner gate on the right. Each key opens exactly one gate.

use crate::board::{Board, Position};
use crate::config::{ServerConfig, DEFAULT_MESSAGE_EXPIRY, DEFAULT_OBSTACLES};
use crate::error::GenerateError;
use crate::game::GameState;
use log::info;
use rand::Rng;
use shared::Cell;
use std::time::Duration;

pub const OUTER_WIDTH: usize = 15;
pub const OUTER_HEIGHT: usize = 9;
pub const INNER_WIDTH: usize = 9;
pub const INNER_HEIGHT: usize = 5;
const INNER_OFFSET_X: usize = 3;
const INNER_OFFSET_Y: usize = 2;
const GATE_ROW: usize = 4;

/// Smallest distance between the structure and the top/left edges.
pub const MIN_OFFSET: usize = 10;
/// Keeps a free lane between the structure and the bottom/right border.
pub const EDGE_MARGIN: usize = 2;

pub const SPAWNS: [Position; 2] = [Position::new(1, 1), Position::new(2, 1)];
pub const KEY_COUNT: usize = 2;
pub const DEFAULT_MAX_ATTEMPTS: usize = 1000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TreasureStructure {
    /// Top-left corner of the outer rim.
    pub origin: Position,
}

impl TreasureStructure {
    pub fn outer_gate(&self) -> Position {
        Position::new(self.origin.x, self.origin.y + GATE_ROW)
    }

    pub fn inner_gate(&self) -> Position {
        Position::new(
            self.origin.x + INNER_OFFSET_X + INNER_WIDTH - 1,
            self.origin.y + GATE_ROW,
        )
    }

    pub fn goal(&self) -> Position {
        Position::new(
            self.origin.x + INNER_OFFSET_X + INNER_WIDTH / 2,
            self.origin.y + GATE_ROW,
        )
    }

    /// The cell in front of the outer gate, kept free of obstacles.
    pub fn approach(&self) -> Position {
        Position::new(self.origin.x - 1, self.origin.y + GATE_ROW)
    }

    pub fn footprint_contains(&self, pos: Position) -> bool {
        (self.origin.x..self.origin.x + OUTER_WIDTH).contains(&pos.x)
            && (self.origin.y..self.origin.y + OUTER_HEIGHT).contains(&pos.y)
    }

    /// Blocks item placement on the whole footprint and the approach cell.
    pub fn reserves(&self, pos: Position) -> bool {
        self.footprint_contains(pos) || pos == self.approach()
    }

    fn draw(&self, board: &mut Board) {
        draw_rim(board, self.origin, OUTER_WIDTH, OUTER_HEIGHT);
        draw_rim(
            board,
            Position::new(
                self.origin.x + INNER_OFFSET_X,
                self.origin.y + INNER_OFFSET_Y,
            ),
            INNER_WIDTH,
            INNER_HEIGHT,
        );

        board.set(self.approach(), Cell::Empty);
        board.set(self.outer_gate(), Cell::Gate);
        board.set(self.inner_gate(), Cell::Gate);
        board.set(self.goal(), Cell::Goal);
    }
}

fn draw_rim(board: &mut Board, origin: Position, width: usize, height: usize) {
    for dx in 0..width {
        board.set(Position::new(origin.x + dx, origin.y), Cell::Wall);
        board.set(Position::new(origin.x + dx, origin.y + height - 1), Cell::Wall);
    }
    for dy in 0..height {
        board.set(Position::new(origin.x, origin.y + dy), Cell::Wall);
        board.set(Position::new(origin.x + width - 1, origin.y + dy), Cell::Wall);
    }
}

/// Builds a fresh, valid board for one game.
#[derive(Debug, Clone)]
pub struct PuzzleGenerator {
    width: usize,
    height: usize,
    obstacles: usize,
    max_attempts: usize,
    message_expiry: Duration,
}

impl PuzzleGenerator {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            obstacles: DEFAULT_OBSTACLES,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            message_expiry: DEFAULT_MESSAGE_EXPIRY,
        }
    }

    pub fn from_config(config: &ServerConfig) -> Self {
        Self::new(config.width, config.height)
            .with_obstacles(config.obstacles)
            .with_message_expiry(config.message_expiry)
    }

    pub fn with_obstacles(mut self, obstacles: usize) -> Self {
        self.obstacles = obstacles;
        self
    }

    /// Bounds the resampling loop for each obstacle and key.
    pub fn with_max_attempts(mut self, max_attempts: usize) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    pub fn with_message_expiry(mut self, message_expiry: Duration) -> Self {
        self.message_expiry = message_expiry;
        self
    }

    pub fn min_dimensions() -> (usize, usize) {
        (
            MIN_OFFSET + OUTER_WIDTH + EDGE_MARGIN,
            MIN_OFFSET + OUTER_HEIGHT + EDGE_MARGIN,
        )
    }

    /// Generates the board and puts both players on their spawn cells.
    pub fn initialize<R: Rng>(&self, rng: &mut R) -> Result<GameState, GenerateError> {
        let (board, structure) = self.build_board(rng)?;
        info!(
            "Generated {}x{} board: treasure at {}, {} obstacles, {} keys",
            self.width, self.height, structure.origin, self.obstacles, KEY_COUNT
        );
        GameState::new(board, SPAWNS, self.message_expiry)
    }

    pub fn build_board<R: Rng>(
        &self,
        rng: &mut R,
    ) -> Result<(Board, TreasureStructure), GenerateError> {
        let (min_width, min_height) = Self::min_dimensions();
        if self.width < min_width || self.height < min_height {
            return Err(GenerateError::BoardTooSmall {
                width: self.width,
                height: self.height,
                min_width,
                min_height,
            });
        }

        let mut board = Board::bordered(self.width, self.height);

        let origin = Position::new(
            rng.gen_range(MIN_OFFSET..=self.width - OUTER_WIDTH - EDGE_MARGIN),
            rng.gen_range(MIN_OFFSET..=self.height - OUTER_HEIGHT - EDGE_MARGIN),
        );
        let structure = TreasureStructure { origin };
        structure.draw(&mut board);

        self.scatter(&mut board, &structure, Cell::Wall, self.obstacles, "obstacle", rng)?;
        self.scatter(&mut board, &structure, Cell::Key, KEY_COUNT, "key", rng)?;

        Ok((board, structure))
    }

    fn scatter<R: Rng>(
        &self,
        board: &mut Board,
        structure: &TreasureStructure,
        cell: Cell,
        count: usize,
        item: &'static str,
        rng: &mut R,
    ) -> Result<(), GenerateError> {
        for _ in 0..count {
            let pos = (0..self.max_attempts)
                .map(|_| {
                    Position::new(
                        rng.gen_range(1..self.width - 1),
                        rng.gen_range(1..self.height - 1),
                    )
                })
                .find(|&pos| {
                    board.get(pos) == Some(Cell::Empty)
                        && !structure.reserves(pos)
                        && !SPAWNS.contains(&pos)
                })
                .ok_or(GenerateError::PlacementExhausted {
                    item,
                    attempts: self.max_attempts,
                })?;

            board.set(pos, cell);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use shared::{Direction, PlayerId};
    use std::collections::{HashSet, VecDeque};

    /// Cells reachable from `start`, treating `blocked` symbols as walls.
    fn reachable(board: &Board, start: Position, blocked: &[Cell]) -> HashSet<Position> {
        let mut seen = HashSet::from([start]);
        let mut queue = VecDeque::from([start]);

        while let Some(pos) = queue.pop_front() {
            for direction in Direction::ALL {
                let Some(next) = pos.step(direction) else {
                    continue;
                };
                match board.get(next) {
                    Some(cell) if cell != Cell::Wall && !blocked.contains(&cell) => {
                        if seen.insert(next) {
                            queue.push_back(next);
                        }
                    }
                    _ => {}
                }
            }
        }
        seen
    }

    fn generate(seed: u64) -> (Board, TreasureStructure) {
        let mut rng = StdRng::seed_from_u64(seed);
        PuzzleGenerator::new(80, 30).build_board(&mut rng).unwrap()
    }

    #[test]
    fn test_border_is_always_walled() {
        for seed in 0..50 {
            let (board, _) = generate(seed);
            for x in 0..80 {
                assert_eq!(board.get(Position::new(x, 0)), Some(Cell::Wall));
                assert_eq!(board.get(Position::new(x, 29)), Some(Cell::Wall));
            }
            for y in 0..30 {
                assert_eq!(board.get(Position::new(0, y)), Some(Cell::Wall));
                assert_eq!(board.get(Position::new(79, y)), Some(Cell::Wall));
            }
        }
    }

    #[test]
    fn test_structure_has_two_gates_and_one_goal() {
        for seed in 0..50 {
            let (board, structure) = generate(seed);

            assert_eq!(
                board.positions_of(Cell::Gate),
                {
                    let mut gates = vec![structure.outer_gate(), structure.inner_gate()];
                    gates.sort_by_key(|p| (p.y, p.x));
                    gates
                }
            );
            assert_eq!(board.positions_of(Cell::Goal), vec![structure.goal()]);
        }
    }

    #[test]
    fn test_structure_stays_inside_margins() {
        for seed in 0..200 {
            let (_, structure) = generate(seed);
            assert!(structure.origin.x >= MIN_OFFSET);
            assert!(structure.origin.y >= MIN_OFFSET);
            assert!(structure.origin.x + OUTER_WIDTH + EDGE_MARGIN <= 80);
            assert!(structure.origin.y + OUTER_HEIGHT + EDGE_MARGIN <= 30);
        }
    }

    #[test]
    fn test_goal_requires_crossing_both_gates() {
        for seed in 0..50 {
            let (board, structure) = generate(seed);
            let approach = structure.approach();
            let ring_entry = Position::new(structure.origin.x + 1, structure.origin.y + 4);

            let gates_closed = reachable(&board, approach, &[Cell::Gate]);
            assert!(!gates_closed.contains(&structure.goal()));
            assert!(!gates_closed.contains(&ring_entry));

            // From inside the ring, the inner gate is still in the way
            let inside_ring = reachable(&board, ring_entry, &[Cell::Gate]);
            assert!(!inside_ring.contains(&structure.goal()));

            let gates_open = reachable(&board, approach, &[]);
            assert!(gates_open.contains(&structure.goal()));
        }
    }

    #[test]
    fn test_keys_and_obstacles_avoid_structure() {
        for seed in 0..50 {
            let mut rng = StdRng::seed_from_u64(seed);
            let generator = PuzzleGenerator::new(80, 30).with_obstacles(200);
            let (board, structure) = generator.build_board(&mut rng).unwrap();

            let keys = board.positions_of(Cell::Key);
            assert_eq!(keys.len(), KEY_COUNT);
            for key in keys {
                assert!(!structure.reserves(key));
            }

            let mut bare = Board::bordered(80, 30);
            structure.draw(&mut bare);
            for wall in board.positions_of(Cell::Wall) {
                if bare.get(wall) != Some(Cell::Wall) {
                    assert!(!structure.reserves(wall), "obstacle at {} inside structure", wall);
                }
            }
            assert_eq!(
                board.count(Cell::Wall),
                bare.count(Cell::Wall) + 200,
                "every obstacle lands on a distinct free cell"
            );
            assert_eq!(board.get(structure.approach()), Some(Cell::Empty));
        }
    }

    #[test]
    fn test_initialize_spawns_players_on_distinct_cells() {
        let mut rng = StdRng::seed_from_u64(7);
        let game = PuzzleGenerator::new(80, 30).initialize(&mut rng).unwrap();

        assert_eq!(game.player(PlayerId::One).position, SPAWNS[0]);
        assert_eq!(game.player(PlayerId::Two).position, SPAWNS[1]);
        assert_eq!(
            game.board().get(SPAWNS[0]),
            Some(Cell::Player(PlayerId::One))
        );
        assert_eq!(
            game.board().get(SPAWNS[1]),
            Some(Cell::Player(PlayerId::Two))
        );
        assert!(!game.winner());
    }

    #[test]
    fn test_board_too_small() {
        let mut rng = StdRng::seed_from_u64(1);
        let result = PuzzleGenerator::new(20, 10).build_board(&mut rng);

        assert!(matches!(
            result,
            Err(GenerateError::BoardTooSmall {
                width: 20,
                height: 10,
                min_width: 27,
                min_height: 21
            })
        ));
    }

    #[test]
    fn test_smallest_board_generates() {
        let (min_width, min_height) = PuzzleGenerator::min_dimensions();
        let mut rng = StdRng::seed_from_u64(3);
        let generator = PuzzleGenerator::new(min_width, min_height).with_obstacles(5);

        let (_, structure) = generator.build_board(&mut rng).unwrap();
        assert_eq!(structure.origin, Position::new(MIN_OFFSET, MIN_OFFSET));
    }

    #[test]
    fn test_placement_gives_up_when_board_is_full() {
        let mut rng = StdRng::seed_from_u64(11);
        let generator = PuzzleGenerator::new(80, 30)
            .with_obstacles(10_000)
            .with_max_attempts(50);

        let result = generator.build_board(&mut rng);
        assert!(matches!(
            result,
            Err(GenerateError::PlacementExhausted {
                item: "obstacle",
                attempts: 50
            })
        ));
    }
}
