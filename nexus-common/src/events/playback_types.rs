//! Playback-related type definitions
//!
//! Supporting types for resource state and lifecycle events.

use serde::{Deserialize, Serialize};

/// Playback state of an active resource
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum PlaybackState {
    Playing,
    Paused,
}

impl std::fmt::Display for PlaybackState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PlaybackState::Playing => write!(f, "playing"),
            PlaybackState::Paused => write!(f, "paused"),
        }
    }
}

/// Why a resource left the resource table
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum DisposeReason {
    /// Explicit `Destroy` command
    Destroyed,
    /// A newer `Play` on the same handle was materialized
    Replaced,
    /// `DestroyAll` command
    DestroyAll,
    /// Source could not be fetched or decoded
    FetchFailed,
    /// Session ended (disconnect or shutdown)
    SessionEnded,
}

impl std::fmt::Display for DisposeReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DisposeReason::Destroyed => write!(f, "destroyed"),
            DisposeReason::Replaced => write!(f, "replaced"),
            DisposeReason::DestroyAll => write!(f, "destroy_all"),
            DisposeReason::FetchFailed => write!(f, "fetch_failed"),
            DisposeReason::SessionEnded => write!(f, "session_ended"),
        }
    }
}

/// Why a `Play` or `Resume` was refused
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum RejectReason {
    /// Admission control refused a new allocation
    CapacityExceeded,
}

/// Why a session ended
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SessionEndReason {
    /// The transport reported the authority disconnected
    Disconnected,
    /// The peer process is shutting down
    Shutdown,
}

impl std::fmt::Display for SessionEndReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SessionEndReason::Disconnected => write!(f, "disconnected"),
            SessionEndReason::Shutdown => write!(f, "shutdown"),
        }
    }
}
