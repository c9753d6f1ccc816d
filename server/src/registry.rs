//! Fixed two-slot table of connected sessions
//!
//! Each slot corresponds to one player. A slot is taken when a connection is
//! accepted and freed when that connection's handler observes a disconnect,
//! after which the next incoming connection takes over the same player without
//! resetting their position or inventory.

use log::info;
use shared::PlayerId;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Instant;
use tokio::sync::mpsc;

/// Encoded state payloads queued for one session's writer task.
pub type FrameSender = mpsc::UnboundedSender<Arc<[u8]>>;

/// A live connection bound to one player slot
///
/// Holds the sending half of the session's writer channel. Dropping the
/// session (on release) closes that channel, which ends the writer task.
#[derive(Debug)]
pub struct Session {
    /// The player this connection controls
    pub player_id: PlayerId,
    /// Peer address, for logging
    pub addr: SocketAddr,
    /// When the connection was admitted
    pub connected_at: Instant,
    sender: FrameSender,
}

impl Session {
    fn new(player_id: PlayerId, addr: SocketAddr, sender: FrameSender) -> Self {
        Self {
            player_id,
            addr,
            connected_at: Instant::now(),
            sender,
        }
    }
}

/// Table of exactly two session slots, one per player
///
/// Internally synchronized so accept and disconnect can race safely. The lock
/// is independent of the turn lock and is never held across an await.
#[derive(Debug, Default)]
pub struct SessionRegistry {
    slots: Mutex<[Option<Session>; 2]>,
}

impl SessionRegistry {
    /// Creates a registry with both slots free
    pub fn new() -> Self {
        Self::default()
    }

    fn slots(&self) -> MutexGuard<'_, [Option<Session>; 2]> {
        self.slots.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Binds a connection to the first free slot
    ///
    /// Returns the player the connection now controls, or None when both
    /// slots are taken and the connection should be closed.
    pub fn register(&self, addr: SocketAddr, sender: FrameSender) -> Option<PlayerId> {
        let mut slots = self.slots();
        let index = slots.iter().position(Option::is_none)?;
        let player_id = PlayerId::from_index(index)?;

        slots[index] = Some(Session::new(player_id, addr, sender));
        info!("Player {} bound to connection from {}", player_id, addr);

        Some(player_id)
    }

    /// Frees a slot. Returns false if it was already empty.
    pub fn release(&self, player_id: PlayerId) -> bool {
        match self.slots()[player_id.index()].take() {
            Some(session) => {
                info!(
                    "Player {} slot released ({} was connected for {:?})",
                    player_id,
                    session.addr,
                    session.connected_at.elapsed()
                );
                true
            }
            None => false,
        }
    }

    /// Address of the session currently controlling a player.
    pub fn lookup(&self, player_id: PlayerId) -> Option<SocketAddr> {
        self.slots()[player_id.index()]
            .as_ref()
            .map(|session| session.addr)
    }

    /// Snapshot of every registered session's outgoing queue.
    pub fn senders(&self) -> Vec<(PlayerId, FrameSender)> {
        self.slots()
            .iter()
            .flatten()
            .map(|session| (session.player_id, session.sender.clone()))
            .collect()
    }

    /// Number of occupied slots
    pub fn len(&self) -> usize {
        self.slots().iter().flatten().count()
    }

    /// True when nobody is connected
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// True when both players are connected and new connections are refused
    pub fn is_full(&self) -> bool {
        self.len() == PlayerId::ALL.len()
    }
}
