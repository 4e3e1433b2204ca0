//! # Snake Arena Client Library
//!
//! Headless client for the snake authority. It links to a dedicated server
//! over WebSocket, or hosts a match itself by embedding a peer host and
//! linking to it in-process. Drawing is left to whatever front end sits on
//! top; this crate only tracks state and produces input.
//!
//! ## Architecture Overview
//!
//! The authority decides everything. The client keeps the latest snapshot,
//! follows lobby and match phases, and detects its own death either from
//! `PLAYER_DIED` or from its snake missing in two consecutive snapshots.
//!
//! ## Module Organization
//!
//! ### Game Module (`game`)
//! Phase tracking, the latest snapshot and the death detector.
//!
//! ### Input Module (`input`)
//! Change detection with a heartbeat, and an autopilot that steers toward
//! food and away from walls.
//!
//! ### Network Module (`network`)
//! The remote/local link and the driver loop.
//!
//! ### Services Module (`services`)
//! Name suggestions and end-of-run commentary, with fixed fallbacks when the
//! service fails.
//!
//! ## Usage Example
//!
//! ```rust,no_run
//! use client::network::{Client, ClientOptions, Intent, Link, CONNECT_ATTEMPTS, CONNECT_DELAY};
//! use client::services::OfflineFlavor;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let link = Link::connect("ws://127.0.0.1:8080", CONNECT_ATTEMPTS, CONNECT_DELAY).await?;
//!     let options = ClientOptions {
//!         name: "viper".to_string(),
//!         intent: Intent::Create { room_id: None },
//!         start_at: Some(1),
//!     };
//!     let mut client = Client::new(link, options, OfflineFlavor::new(rand::thread_rng()));
//!
//!     println!("{}", client.run().await?);
//!     Ok(())
//! }
//! ```

pub mod error;
pub mod game;
pub mod input;
pub mod network;
pub mod services;

pub use error::ClientError;
