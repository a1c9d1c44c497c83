//! # Pong State Relay
//!
//! This library implements the relay that lets several pong clients share one
//! ball and up to four paddles. The relay never simulates anything. It keeps
//! the last state each participant reported and hands the whole collection
//! back to whoever reports next, so every client can rebuild the others'
//! paddles and follow the ball owned by the current primary.
//!
//! ## Core Responsibilities
//!
//! ### Directory Keeping
//! Every admitted connection owns one directory entry keyed by its
//! [`shared::ParticipantId`]. The entry starts empty, is overwritten in full
//! on every report and disappears when the connection closes. Nothing else
//! mutates it.
//!
//! ### Request/Response Relaying
//! Each inbound report is answered with exactly one snapshot of the whole
//! directory, sent only to the reporter. Malformed reports are logged and
//! get no answer. The relay never sends anything unsolicited.
//!
//! ### Admission
//! Connections beyond the configured capacity are closed as soon as they
//! are accepted.
//!
//! ## Architecture Design
//!
//! ### Single Control Loop
//! One loop owns the directory. Per-connection tasks only split the byte
//! stream into frames and write replies they are handed; every decode,
//! directory update and snapshot happens on the control loop, so the
//! directory needs no locking.
//!
//! ### Poll Cadence
//! Pending reports are folded in on a fixed interval (10ms by default)
//! rather than on wakeup, which bounds how often the directory is touched
//! regardless of how fast clients report.
//!
//! ## Module Organization
//!
//! ### Directory Module (`directory`)
//! The participant registry and its admission rules.
//!
//! ### Network Module (`network`)
//! The TCP listener, per-connection tasks and the control loop.
//!
//! ### Config Module (`config`)
//! Command line flags and the interactive player-count prompt.
//!
//! ## Usage Example
//!
//! ```rust,no_run
//! use server::network::Relay;
//! use std::time::Duration;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Relay for two players, folding reports in every 10ms
//!     let mut relay = Relay::bind("127.0.0.1:8080", 2, Duration::from_millis(10)).await?;
//!     relay.run().await?;
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod directory;
pub mod network;
