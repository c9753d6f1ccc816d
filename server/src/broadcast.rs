//! Fan-out of encoded state to every registered session.

use crate::registry::SessionRegistry;
use log::{debug, warn};
use std::sync::Arc;

pub struct Broadcaster {
    registry: Arc<SessionRegistry>,
}

impl Broadcaster {
    pub fn new(registry: Arc<SessionRegistry>) -> Self {
        Self { registry }
    }

    /// Queues one payload for every session and returns how many accepted it
    ///
    /// A session whose writer has already gone away is logged and skipped. Its
    /// slot stays taken until its own handler notices the disconnect.
    pub fn broadcast(&self, frame: Arc<[u8]>) -> usize {
        let mut delivered = 0;

        for (player_id, sender) in self.registry.senders() {
            match sender.send(Arc::clone(&frame)) {
                Ok(()) => delivered += 1,
                Err(_) => warn!("Failed to deliver state to player {}: writer closed", player_id),
            }
        }

        debug!("Broadcast {} bytes to {} session(s)", frame.len(), delivered);
        delivered
    }
}
