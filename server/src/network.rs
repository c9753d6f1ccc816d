//! Server network layer: accepts TCP sessions and wires them to the engine

use crate::broadcast::Broadcaster;
use crate::config::ServerConfig;
use crate::coordinator::TurnCoordinator;
use crate::error::ServerError;
use crate::game::GameState;
use crate::registry::SessionRegistry;
use crate::session::{run_session, run_writer};
use log::{error, info, warn};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc;

/// Main server owning the listener and the shared game
pub struct Server {
    listener: TcpListener,
    registry: Arc<SessionRegistry>,
    coordinator: Arc<TurnCoordinator>,
    recv_timeout: Duration,
}

impl Server {
    pub async fn bind(addr: &str, state: GameState, config: &ServerConfig) -> Result<Self, ServerError> {
        let listener = TcpListener::bind(addr).await?;
        info!("Server listening on {}", listener.local_addr()?);

        let registry = Arc::new(SessionRegistry::new());
        let coordinator = Arc::new(TurnCoordinator::new(
            state,
            Broadcaster::new(Arc::clone(&registry)),
        ));

        Ok(Server {
            listener,
            registry,
            coordinator,
            recv_timeout: config.recv_timeout,
        })
    }

    pub fn local_addr(&self) -> Result<SocketAddr, ServerError> {
        Ok(self.listener.local_addr()?)
    }

    pub fn registry(&self) -> Arc<SessionRegistry> {
        Arc::clone(&self.registry)
    }

    pub fn coordinator(&self) -> Arc<TurnCoordinator> {
        Arc::clone(&self.coordinator)
    }

    /// Accepts connections until the task is dropped
    pub async fn run(&self) -> Result<(), ServerError> {
        info!("Server started successfully");

        loop {
            match self.listener.accept().await {
                Ok((stream, addr)) => self.admit(stream, addr).await,
                Err(e) => {
                    error!("Error accepting connection: {}", e);
                    tokio::time::sleep(Duration::from_millis(10)).await;
                }
            }
        }
    }

    /// Registers a new connection, sends it the current state and spawns its tasks
    async fn admit(&self, stream: TcpStream, addr: SocketAddr) {
        let (frame_tx, frame_rx) = mpsc::unbounded_channel();

        let Some(player) = self.registry.register(addr, frame_tx.clone()) else {
            warn!("Rejecting {}: both player slots are taken", addr);
            return;
        };
        info!("Connected by {} as player {}", addr, player);

        let (reader, writer) = stream.into_split();
        tokio::spawn(run_writer(writer, player, frame_rx));

        if frame_tx.send(self.coordinator.current_frame().await).is_err() {
            warn!("Player {} writer closed before the first frame", player);
        }

        tokio::spawn(run_session(
            reader,
            player,
            Arc::clone(&self.coordinator),
            Arc::clone(&self.registry),
            self.recv_timeout,
        ));
    }
}
