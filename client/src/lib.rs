//! # Treasure Hunt Terminal Client
//!
//! A thin consumer of the server's frame protocol. The client keeps no game
//! state of its own: every frame it receives is a complete redraw, and every
//! key press it cares about becomes one direction token sent to the server.
//!
//! ## Module Organization
//!
//! ### Input Module (`input`)
//! Maps W/A/S/D and the arrow keys to directions, and q/Esc to quitting.
//!
//! ### Network Module (`network`)
//! Reads fixed-length frames from the TCP stream and forwards commands back.
//! Frames are read on their own task so a half-received payload is never
//! abandoned when a key press arrives.
//!
//! ### Rendering Module (`rendering`)
//! Draws the grid and status line with crossterm, or a winner banner once the
//! game is over.

pub mod input;
pub mod network;
pub mod rendering;
