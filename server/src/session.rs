//! Per-connection receive loop and outgoing writer.

use crate::coordinator::TurnCoordinator;
use crate::registry::SessionRegistry;
use log::{debug, error, info, warn};
use shared::{Direction, PlayerId};
use std::io;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::sync::mpsc;
use tokio::time::timeout;

const READ_BUFFER_SIZE: usize = 1024;

/// Reassembles move tokens from a byte stream
///
/// TCP gives no message boundaries, so a token may arrive split over several
/// reads or run together with the next one. Tokens are separated by ASCII
/// whitespace, or follow each other directly: the four direction tokens are
/// prefix-free, so `"rightup"` splits unambiguously. A strict prefix of a
/// direction (`"rig"`) is held back until more bytes arrive. Anything else
/// runs to the next whitespace, or to the end of the buffered bytes, and is
/// emitted as one unrecognized token. Whitespace alone produces nothing.
#[derive(Debug, Default)]
pub struct TokenStream {
    pending: Vec<u8>,
}

impl TokenStream {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends one read's bytes and returns every token now complete
    pub fn push(&mut self, bytes: &[u8]) -> Vec<String> {
        self.pending.extend_from_slice(bytes);

        let mut tokens = Vec::new();
        let mut start = 0;

        loop {
            while self
                .pending
                .get(start)
                .is_some_and(|b| b.is_ascii_whitespace())
            {
                start += 1;
            }
            let rest = &self.pending[start..];
            if rest.is_empty() {
                break;
            }

            if let Some(direction) = leading_direction(rest) {
                let token = direction.token();
                tokens.push(token.to_string());
                start += token.len();
                continue;
            }

            if is_partial_direction(rest) {
                break;
            }

            let end = rest
                .iter()
                .position(|b| b.is_ascii_whitespace())
                .unwrap_or(rest.len());
            tokens.push(String::from_utf8_lossy(&rest[..end]).into_owned());
            start += end;
        }

        self.pending.drain(..start);
        tokens
    }

    /// Bytes held back as a possible partial token
    pub fn pending(&self) -> &[u8] {
        &self.pending
    }
}

/// A direction at the front of `bytes` that ends cleanly: at the end of the
/// buffer, at whitespace, or where another token could begin.
fn leading_direction(bytes: &[u8]) -> Option<Direction> {
    Direction::ALL.into_iter().find(|direction| {
        let token = direction.token().as_bytes();
        bytes.starts_with(token) && {
            let after = &bytes[token.len()..];
            after.is_empty() || after[0].is_ascii_whitespace() || begins_direction(after)
        }
    })
}

/// Whether `bytes` starts with a direction or is cut off partway through one.
fn begins_direction(bytes: &[u8]) -> bool {
    Direction::ALL.into_iter().any(|direction| {
        let token = direction.token().as_bytes();
        let n = token.len().min(bytes.len());
        bytes[..n] == token[..n]
    })
}

/// Whether all of `bytes` is the start of a direction that has not arrived yet.
fn is_partial_direction(bytes: &[u8]) -> bool {
    Direction::ALL
        .into_iter()
        .any(|direction| direction.token().as_bytes().starts_with(bytes))
}

/// How a session's receive loop finished.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEnd {
    /// The peer closed the connection (empty read).
    Closed,
    TimedOut,
    Failed(io::ErrorKind),
}

/// Receives tokens from one session until it disconnects, then frees its slot.
pub async fn run_session<R>(
    mut reader: R,
    player: PlayerId,
    coordinator: Arc<TurnCoordinator>,
    registry: Arc<SessionRegistry>,
    recv_timeout: Duration,
) -> SessionEnd
where
    R: AsyncRead + Unpin,
{
    let mut buffer = [0u8; READ_BUFFER_SIZE];
    let mut tokens = TokenStream::new();

    let end = loop {
        let len = match timeout(recv_timeout, reader.read(&mut buffer)).await {
            Err(_) => break SessionEnd::TimedOut,
            Ok(Err(e)) => break SessionEnd::Failed(e.kind()),
            Ok(Ok(0)) => break SessionEnd::Closed,
            Ok(Ok(len)) => len,
        };

        debug!(
            "Received from player {}: {:?}",
            player,
            String::from_utf8_lossy(&buffer[..len])
        );

        for token in tokens.push(&buffer[..len]) {
            coordinator.submit(player, &token).await;
        }
    };

    if !tokens.pending().is_empty() {
        debug!(
            "Discarding partial token from player {}: {:?}",
            player,
            String::from_utf8_lossy(tokens.pending())
        );
    }

    match end {
        SessionEnd::Closed => info!("Player {} disconnected", player),
        SessionEnd::TimedOut => warn!("Player {} timed out after {:?}", player, recv_timeout),
        SessionEnd::Failed(kind) => warn!("Player {} connection failed: {:?}", player, kind),
    }
    registry.release(player);

    end
}

/// Drains a session's outgoing queue onto its socket.
///
/// Stops at the first write error; later broadcasts to this session then fail
/// at the channel and are skipped.
pub async fn run_writer<W>(mut writer: W, player: PlayerId, mut frames: mpsc::UnboundedReceiver<Arc<[u8]>>)
where
    W: AsyncWrite + Unpin,
{
    while let Some(frame) = frames.recv().await {
        if let Err(e) = writer.write_all(&frame).await {
            error!("Failed to send state to player {}: {}", player, e);
            return;
        }
    }
    let _ = writer.shutdown().await;
}
