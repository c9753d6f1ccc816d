//! Authoritative game state and the move transition engine.

use crate::board::{Board, Position};
use crate::error::GenerateError;
use log::{debug, error, info, warn};
use shared::{Cell, Direction, PlayerId, StateFrame};
use std::time::{Duration, Instant};

/// Status line shown when a session sends something other than a direction
pub const INVALID_MOVE_MESSAGE: &str = "Invalid move sent to server";

/// One player's position and key inventory
///
/// The inventory is a tiny state machine: no key, holding a key, and used
/// a key. A player who has used a key stays in the last state for the rest of
/// the game and can never pick up another.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Player {
    pub id: PlayerId,
    /// Current cell; always holds `Cell::Player(id)` on the board
    pub position: Position,
    /// Holding an unused key that can open one gate
    pub has_key: bool,
    /// Once set, the player may never pick up another key.
    pub has_used_key: bool,
}

impl Player {
    /// Creates a player at `position` with an empty inventory
    pub fn new(id: PlayerId, position: Position) -> Self {
        Self {
            id,
            position,
            has_key: false,
            has_used_key: false,
        }
    }
}

/// Status line shown under the board until it expires.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusMessage {
    pub text: String,
    pub created_at: Instant,
}

impl StatusMessage {
    /// True once the message has been visible for longer than `expiry`
    pub fn is_expired(&self, now: Instant, expiry: Duration) -> bool {
        now.saturating_duration_since(self.created_at) > expiry
    }
}

/// Why a move left the board untouched
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    Wall,
    OutOfBounds,
    Occupied,
    AlreadyHoldingKey,
    KeyAlreadyUsed,
    GateLocked,
}

/// What stepping onto the target cell did besides moving the player
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveEffect {
    None,
    PickedUpKey,
    UsedKey,
    ReachedGoal,
}

/// Result of a single `attempt_move` call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveOutcome {
    Moved {
        from: Position,
        to: Position,
        effect: MoveEffect,
    },
    Rejected(RejectReason),
    /// The goal has been reached; the board no longer changes.
    GameOver,
}

impl MoveOutcome {
    pub fn is_moved(&self) -> bool {
        matches!(self, MoveOutcome::Moved { .. })
    }
}

/// The authoritative game: board, players, status line and winner flag
///
/// All mutation goes through [`GameState::attempt_move`] and the message
/// setters. The winner flag is monotonic; once set, moves are ignored and
/// every snapshot is the game-over frame.
#[derive(Debug, Clone)]
pub struct GameState {
    board: Board,
    players: [Player; 2],
    message: Option<StatusMessage>,
    message_expiry: Duration,
    winner: bool,
}

impl GameState {
    /// Puts both players on their spawn cells, which must be empty.
    pub fn new(
        mut board: Board,
        spawns: [Position; 2],
        message_expiry: Duration,
    ) -> Result<Self, GenerateError> {
        for spawn in spawns {
            if board.get(spawn) != Some(Cell::Empty) || spawns[0] == spawns[1] {
                return Err(GenerateError::SpawnBlocked {
                    x: spawn.x,
                    y: spawn.y,
                });
            }
        }

        let players = PlayerId::ALL.map(|id| Player::new(id, spawns[id.index()]));
        for player in &players {
            board.set(player.position, Cell::Player(player.id));
        }

        Ok(Self {
            board,
            players,
            message: None,
            message_expiry,
            winner: false,
        })
    }

    /// Read-only view of the grid
    pub fn board(&self) -> &Board {
        &self.board
    }

    /// Position and inventory of one player
    pub fn player(&self, id: PlayerId) -> &Player {
        &self.players[id.index()]
    }

    /// Both players, indexed by `PlayerId::index`
    pub fn players(&self) -> &[Player; 2] {
        &self.players
    }

    /// Current status line text, or None when it is blank
    pub fn message(&self) -> Option<&str> {
        self.message.as_ref().map(|m| m.text.as_str())
    }

    /// Whether someone has reached the goal
    pub fn winner(&self) -> bool {
        self.winner
    }

    /// Replaces the status line. Text that does not fit under the board is cut.
    pub fn set_message(&mut self, text: &str) {
        self.set_message_at(text, Instant::now());
    }

    fn set_message_at(&mut self, text: &str, now: Instant) {
        let limit = self.board.width().saturating_sub(1);
        let text = if text.len() > limit {
            warn!("Status message too long for the board, truncating: {}", text);
            let mut end = limit;
            while !text.is_char_boundary(end) {
                end -= 1;
            }
            text[..end].to_string()
        } else {
            text.to_string()
        };

        self.message = Some(StatusMessage {
            text,
            created_at: now,
        });
    }

    /// Drops the status line once it has been shown for longer than the expiry window.
    pub fn expire_message(&mut self, now: Instant) {
        if self
            .message
            .as_ref()
            .is_some_and(|m| m.is_expired(now, self.message_expiry))
        {
            self.message = None;
        }
    }

    /// Moves `id` one step in `direction` if the rules allow it
    ///
    /// See [`GameState::attempt_move_at`]; this uses the current time for
    /// message expiry.
    pub fn attempt_move(&mut self, id: PlayerId, direction: Direction) -> MoveOutcome {
        self.attempt_move_at(id, direction, Instant::now())
    }

    /// Validates and applies one step. Illegal moves leave the board untouched.
    pub fn attempt_move_at(&mut self, id: PlayerId, direction: Direction, now: Instant) -> MoveOutcome {
        if self.winner {
            return MoveOutcome::GameOver;
        }

        let outcome = match self.validate(id, direction) {
            Ok((target, cell)) => self.apply(id, target, cell, now),
            Err(reason) => MoveOutcome::Rejected(reason),
        };

        self.expire_message(now);

        debug!(
            "Player {} {:?} -> {:?}; inventories: {:?}",
            id, direction, outcome, self.players
        );
        outcome
    }

    fn validate(&self, id: PlayerId, direction: Direction) -> Result<(Position, Cell), RejectReason> {
        let player = self.player(id);
        let target = player
            .position
            .step(direction)
            .ok_or(RejectReason::OutOfBounds)?;
        let cell = self.board.get(target).ok_or(RejectReason::OutOfBounds)?;

        match cell {
            Cell::Wall => Err(RejectReason::Wall),
            Cell::Player(_) => Err(RejectReason::Occupied),
            Cell::Key if player.has_key => Err(RejectReason::AlreadyHoldingKey),
            Cell::Key if player.has_used_key => Err(RejectReason::KeyAlreadyUsed),
            Cell::Gate if !player.has_key => Err(RejectReason::GateLocked),
            _ => Ok((target, cell)),
        }
    }

    fn apply(&mut self, id: PlayerId, target: Position, cell: Cell, now: Instant) -> MoveOutcome {
        let from = self.player(id).position;
        self.board.set(from, Cell::Empty);

        let effect = match cell {
            Cell::Key => {
                self.players[id.index()].has_key = true;
                self.set_message_at(&format!("Player {} picked up a new key!", id), now);
                MoveEffect::PickedUpKey
            }
            Cell::Gate => {
                let player = &mut self.players[id.index()];
                player.has_key = false;
                player.has_used_key = true;
                self.set_message_at(&format!("Player {} used their key to open a gate!", id), now);
                MoveEffect::UsedKey
            }
            Cell::Goal => {
                info!("Player {} reached the goal", id);
                self.winner = true;
                MoveEffect::ReachedGoal
            }
            _ => MoveEffect::None,
        };

        self.players[id.index()].position = target;
        self.board.set(target, Cell::Player(id));

        MoveOutcome::Moved {
            from,
            to: target,
            effect,
        }
    }

    /// The frame every session should currently display
    pub fn snapshot(&self) -> StateFrame {
        if self.winner {
            return StateFrame::GameOver;
        }
        StateFrame::Board {
            cells: self.board.cells().to_vec(),
            message: self.message.as_ref().map(|m| m.text.clone()),
        }
    }

    /// Serializes the current state into one wire payload.
    ///
    /// A board that cannot be encoded yields an empty payload. `new` only
    /// accepts boards holding both spawns, so this does not happen in practice.
    pub fn encode_frame(&self) -> Vec<u8> {
        let encoded = self
            .board
            .layout()
            .and_then(|layout| self.snapshot().encode(layout));

        encoded.unwrap_or_else(|e| {
            error!("Failed to encode game state: {}", e);
            Vec::new()
        })
    }

    /// Dumps the board rows at debug level
    pub fn log_board(&self) {
        if log::log_enabled!(log::Level::Debug) {
            for row in self.board.rows() {
                debug!("{}", row);
            }
        }
    }
}
