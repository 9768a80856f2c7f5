//! # Nexus Audio Peer Library (nexus-peer)
//!
//! Peer-side audio session for a networked host: applies commands from a single
//! authoritative sender to a set of playback resources.
//!
//! **Purpose:** Admission-controlled playback of remote audio URLs (one-shot
//! clips and periodically refreshed streams) with spatial attachment to live
//! world entities.
//!
//! **Architecture:** All session state lives on one engine task. The HTTP
//! adapter forwards messages over a channel; fetches are polled state machines
//! advanced once per tick (reqwest download, symphonia decode).

pub mod api;
pub mod audio;
pub mod config;
pub mod error;
pub mod playback;
pub mod startup;
pub mod state;

pub use error::{Error, Result};
pub use startup::{PeerComponents, RunningPeer};
pub use state::SharedState;
