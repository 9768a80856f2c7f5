//! Error types for nexus-peer
//!
//! Defines module-specific error types using thiserror for clear error propagation.
//! None of these ever reach the authority: command handling is fire-and-forget, so
//! errors are logged where they occur and contained to the affected handle.

use thiserror::Error;

/// Main error type for the nexus-peer crate
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration file loading or validation errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// HTTP server errors
    #[error("HTTP server error: {0}")]
    Http(String),

    /// Source could not be downloaded
    #[error("Fetch error: {0}")]
    Fetch(String),

    /// Downloaded bytes could not be decoded to PCM
    #[error("Audio decode error: {0}")]
    Decode(String),

    /// The engine task is no longer running
    #[error("Playback engine stopped")]
    EngineStopped,

    /// Errors from shared nexus-common helpers
    #[error(transparent)]
    Common(#[from] nexus_common::Error),
}

/// Convenience Result type using nexus-peer Error
pub type Result<T> = std::result::Result<T, Error>;
