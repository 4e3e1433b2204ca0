//! # Snake Arena Authority
//!
//! This library is the authoritative side of the multiplayer snake game. It
//! owns the canonical state of every match, applies player steering each
//! tick, decides who dies, and streams rate-limited snapshots to the players
//! of each room.
//!
//! ## Core Responsibilities
//!
//! ### Authoritative Simulation
//! Clients only send a target heading and a boost flag. Movement, growth,
//! food and deaths are decided here and nowhere else.
//!
//! ### Session Management
//! Players create or join rooms, wait in a lobby until the host starts the
//! match, and leave by disconnecting. A room lives until its last player is
//! gone.
//!
//! ### State Broadcasting
//! Ticks run at a fixed rate (60 Hz by default) while snapshots go out at
//! most every 50 ms per room, with snake bodies rounded to whole units.
//!
//! ## Architecture Design
//!
//! ### Single Sequencer
//! One `tokio::select!` loop owns all rooms and connections. Socket tasks
//! only decode and encode; every state change happens on the loop, so room
//! logic needs no locks.
//!
//! ### Two Topologies, One Simulation
//! A dedicated server hosts many rooms for remote clients. A peer host runs a
//! single room inside a player's own process, with the host linked through an
//! in-process channel. Both implement [`topology::Topology`] on top of the same
//! dispatcher and simulation code.
//!
//! ## Module Organization
//!
//! - `simulation`: steering, movement, body follow, length control and the
//!   per-tick pass over a room
//! - `collision`: wall and trail checks with kill attribution
//! - `food`: spawning, consumption, boost drops and death remains
//! - `room`: the lobby/active state machine and tick entry point
//! - `broadcast`: snapshot building, leaderboard and the rate gate
//! - `registry` and `directory`: the room table and the connection table
//! - `dispatcher`: client message handling and the multi-room tick driver
//! - `topology` and `peer`: the dedicated server and the peer host
//! - `network`: WebSocket transport and the event loop
//! - `config` and `error`: configuration loading and boundary errors
//!
//! ## Usage Example
//!
//! ```rust,no_run
//! use server::network::Server;
//! use server::topology::DedicatedServer;
//! use shared::GameConfig;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = GameConfig::default();
//!     let tick = config.tick_duration();
//!     let server = Server::bind("127.0.0.1:8080", DedicatedServer::new(config, 64), tick).await?;
//!
//!     server.run().await?;
//!     Ok(())
//! }
//! ```

pub mod broadcast;
pub mod collision;
pub mod config;
pub mod directory;
pub mod dispatcher;
pub mod error;
pub mod food;
pub mod network;
pub mod peer;
pub mod registry;
pub mod room;
pub mod simulation;
pub mod topology;

pub use error::{AuthorityError, ErrorKind};
pub use network::{LocalPlayer, Server, TransportEvent};
pub use peer::PeerHost;
pub use topology::{DedicatedServer, Topology};
