//! # Audio Module
//!
//! Per-guild playback state and the contracts with the remote audio node.
//!
//! Decoding and streaming happen on the Lavalink node; this module only
//! tracks what should be playing and tells the node about it.
//!
//! ## Architecture
//!
//! ### [`session`] - Playback Session
//! - Current track, upcoming queue, loop mode, volume and 24/7 flag
//! - Pure state transitions, no I/O
//!
//! ### [`registry`] - Session Registry
//! - At most one session per guild
//! - Teardown that never waits on a session lock
//!
//! ### [`player`] - Audio Player
//! - Command operations over the registry
//! - Talks to the node through [`node::AudioNode`] and publishes
//!   [`node::Notice`]s through [`node::Notifier`]
//!
//! ### [`lavalink_client`] - Node Adapter
//! - [`node::AudioNode`] implementation on top of `lavalink-rs`
//! - Forwards node events as [`node::NodeEvent`]s

pub mod error;
pub mod filters;
pub mod lavalink_client;
pub mod node;
pub mod player;
pub mod queue;
pub mod registry;
pub mod session;
pub mod track;

#[cfg(test)]
pub(crate) mod testing;
