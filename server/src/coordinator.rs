//! Serializes move submissions from concurrent sessions into the engine.

use crate::broadcast::Broadcaster;
use crate::game::{GameState, MoveOutcome, INVALID_MOVE_MESSAGE};
use log::{debug, info};
use shared::{Direction, PlayerId};
use std::sync::Arc;
use tokio::sync::Mutex;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnResult {
    Applied(MoveOutcome),
    /// Not one of the four direction tokens; only the status line changed.
    InvalidToken,
}

pub struct TurnCoordinator {
    /// The turn lock. Held only while a move is validated and applied.
    state: Mutex<GameState>,
    broadcaster: Broadcaster,
}

impl TurnCoordinator {
    pub fn new(state: GameState, broadcaster: Broadcaster) -> Self {
        Self {
            state: Mutex::new(state),
            broadcaster,
        }
    }

    /// Applies one token for `player` and broadcasts the resulting state.
    pub async fn submit(&self, player: PlayerId, token: &str) -> TurnResult {
        let (result, frame) = {
            let mut state = self.state.lock().await;
            let result = match token.parse::<Direction>() {
                Ok(direction) => TurnResult::Applied(state.attempt_move(player, direction)),
                Err(e) => {
                    info!("Player {} sent {}", player, e);
                    state.set_message(INVALID_MOVE_MESSAGE);
                    TurnResult::InvalidToken
                }
            };
            state.log_board();
            (result, Arc::<[u8]>::from(state.encode_frame()))
        };

        debug!("Player {} {:?} -> {:?}", player, token, result);
        self.broadcaster.broadcast(frame);
        result
    }

    /// The payload a newly accepted session receives first.
    pub async fn current_frame(&self) -> Arc<[u8]> {
        Arc::from(self.state.lock().await.encode_frame())
    }

    /// Runs `f` against the state under the turn lock.
    pub async fn inspect<T>(&self, f: impl FnOnce(&GameState) -> T) -> T {
        f(&*self.state.lock().await)
    }
}
