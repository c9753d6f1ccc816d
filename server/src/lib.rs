//! # Treasure Hunt Server Library
//!
//! The authoritative server for a two-player terminal board game. It owns the
//! only copy of the board, validates every move, and pushes a full redraw to
//! both players after each one.
//!
//! ## Core Responsibilities
//!
//! ### Puzzle Generation
//! Builds a walled board with a double-walled treasure structure, two gates,
//! a goal, random obstacles and two keys. Placement is bounded: a board that
//! cannot hold everything is a startup error rather than an endless retry.
//!
//! ### Move Validation
//! Each direction token becomes at most one step. Walls, the other player,
//! locked gates and keys a player may not take all reject the move without
//! touching the board. Reaching the goal ends the game for good.
//!
//! ### Session Handling
//! At most two connections are active at a time, one per player. A player who
//! drops out can reconnect and pick up exactly where they left off.
//!
//! ## Architecture Design
//!
//! ### Task Per Connection
//! Every accepted connection gets a receive task and a writer task. Receive
//! tasks funnel moves through the [`coordinator::TurnCoordinator`], whose lock
//! is the only critical section: validate and apply happen under it, the
//! broadcast happens after it is released.
//!
//! ### Fixed-Length Frames
//! The wire format is a raw byte grid plus a padded status line, defined in the
//! `shared` crate so the client decodes exactly what the server encodes.
//!
//! ## Module Organization
//!
//! - `board`: grid storage and positions
//! - `generator`: border, treasure structure, obstacles and keys
//! - `game`: player inventory, status line and the move transition engine
//! - `registry`: the two session slots
//! - `broadcast`: fan-out of encoded state
//! - `coordinator`: the turn lock
//! - `session`: per-connection receive loop and writer
//! - `network`: TCP listener and connection admission
//!
//! ## Usage Example
//!
//! ```rust,no_run
//! use server::config::ServerConfig;
//! use server::generator::PuzzleGenerator;
//! use server::network::Server;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ServerConfig::default();
//!     let state = PuzzleGenerator::from_config(&config).initialize(&mut rand::thread_rng())?;
//!
//!     let server = Server::bind(&config.address(), state, &config).await?;
//!     server.run().await?;
//!
//!     Ok(())
//! }
//! ```

pub mod board;
pub mod broadcast;
pub mod config;
pub mod coordinator;
pub mod error;
pub mod game;
pub mod generator;
pub mod network;
pub mod registry;
pub mod session;
