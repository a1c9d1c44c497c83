//! # Pong Participant Library
//!
//! This library implements everything a pong participant does between two
//! exchanges with the relay: it turns the relay's directory snapshot into a
//! local view of the match, decides its own role, moves paddles and, when it
//! is the primary, owns the ball.
//!
//! ## Architecture Overview
//!
//! Every participant runs the same loop. There is no dedicated game server;
//! the relay only stores and returns reports, so authority over the ball is
//! handed around by a rule every participant evaluates identically.
//!
//! ### Derived Primary
//! The participant with the smallest id in the latest snapshot is primary.
//! The role is recomputed on every tick and never stored, so when the
//! primary leaves, the next-smallest id takes over on its next tick without
//! any handshake.
//!
//! ### Slot Claiming
//! A participant without a paddle takes the first free slot in the order
//! left, right, top, bottom. Non-primary participants wait until they can
//! see at least one other paddle before claiming, so simultaneous newcomers
//! do not pick the same slot from an empty view.
//!
//! ### Ball Ownership
//! Only the primary integrates the ball and resolves collisions. Everyone
//! else copies the ball and the run state from the primary's latest report.
//!
//! ## Module Organization
//!
//! ### Game Module (`game`)
//! The per-participant view of the match and the tick procedure:
//! - Snapshot ingestion and role derivation
//! - Slot claiming and remote paddle reconstruction
//! - Run/pause arbitration on the primary
//!
//! ### Physics Module (`physics`)
//! Paddle and ball kinematics and collision resolution.
//!
//! ### Network Module (`network`)
//! The blocking request/response channel to the relay and the `Client`
//! that ties one channel to one game view.
//!
//! ### Input Module (`input`)
//! Arrow-key steering of the local paddle.
//!
//! ### Rendering Module (`rendering`)
//! Court, ball, paddles and labels drawn with macroquad.
//!
//! ## Usage Example
//!
//! ```rust,no_run
//! use client::network::Client;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut client = Client::connect("127.0.0.1:8080", None).await?;
//!
//!     loop {
//!         // One exchange with the relay, then the local update
//!         client.tick().await?;
//!
//!         if let Some(paddle) = client.game().paddle() {
//!             println!("{} paddle at {:?}", paddle.slot, paddle.position);
//!         }
//!     }
//! }
//! ```

pub mod game;
pub mod input;
pub mod network;
pub mod physics;
pub mod rendering;
