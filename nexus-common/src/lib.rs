//! # Nexus Common Library
//!
//! Shared code for the Nexus audio authority and its peers including:
//! - Playback handles and the authority-side handle allocator
//! - Wire command types (`AudioCommand`) and sender identity
//! - Spatial math (vectors, rotations, entity transforms)
//! - Event types (`NexusEvent`) and the broadcast `EventBus`
//! - Bootstrap configuration file resolution

pub mod authority;
pub mod command;
pub mod config;
pub mod error;
pub mod events;
pub mod handle;
pub mod spatial;

pub use command::{AudioCommand, CommandEnvelope, SenderId};
pub use error::{Error, Result};
pub use handle::{HandleAllocator, PlaybackHandle};
