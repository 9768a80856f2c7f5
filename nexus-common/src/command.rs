//! Wire command types
//!
//! Commands are one-way: the authority sends them, a peer applies them or
//! silently ignores them. Nothing is ever sent back in reply.

use crate::handle::PlaybackHandle;
use crate::spatial::{AudioMode, RolloffMode, Vec3};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identity of whoever sent a command, as reported by the transport
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SenderId(pub u64);

impl fmt::Display for SenderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for SenderId {
    type Err = crate::Error;

    fn from_str(s: &str) -> crate::Result<Self> {
        s.trim()
            .parse::<u64>()
            .map(SenderId)
            .map_err(|e| crate::Error::InvalidInput(format!("invalid sender id '{}': {}", s, e)))
    }
}

/// Commands accepted by a peer's audio session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum AudioCommand {
    Play {
        url: String,
        handle: PlaybackHandle,
        is_stream: bool,
        #[serde(default = "default_auto_start")]
        auto_start: bool,
    },
    SetVolume {
        handle: PlaybackHandle,
        volume: f32,
    },
    AttachToPlayer {
        handle: PlaybackHandle,
        player_id: u64,
    },
    AttachToVehicle {
        handle: PlaybackHandle,
        vehicle_id: u64,
    },
    Deattach {
        handle: PlaybackHandle,
    },
    SetPosition {
        handle: PlaybackHandle,
        position: Vec3,
    },
    SetMaxDistance {
        handle: PlaybackHandle,
        distance: f32,
    },
    SetMinDistance {
        handle: PlaybackHandle,
        distance: f32,
    },
    Resume {
        handle: PlaybackHandle,
    },
    Pause {
        handle: PlaybackHandle,
    },
    Destroy {
        handle: PlaybackHandle,
    },
    DestroyAll,
    SetLoop {
        handle: PlaybackHandle,
        looping: bool,
    },
    SetMute {
        handle: PlaybackHandle,
        muted: bool,
    },
    SetMode {
        handle: PlaybackHandle,
        mode: AudioMode,
    },
    SetSpatialBlend {
        handle: PlaybackHandle,
        blend: f32,
    },
    SetSpread {
        handle: PlaybackHandle,
        spread: f32,
    },
    SetDopplerLevel {
        handle: PlaybackHandle,
        level: f32,
    },
    SetRolloffMode {
        handle: PlaybackHandle,
        mode: RolloffMode,
    },
    SetInterval {
        handle: PlaybackHandle,
        seconds: f32,
    },
}

fn default_auto_start() -> bool {
    true
}

impl AudioCommand {
    /// Handle the command targets (None for session-wide commands)
    pub fn handle(&self) -> Option<PlaybackHandle> {
        use AudioCommand::*;
        match self {
            Play { handle, .. }
            | SetVolume { handle, .. }
            | AttachToPlayer { handle, .. }
            | AttachToVehicle { handle, .. }
            | Deattach { handle }
            | SetPosition { handle, .. }
            | SetMaxDistance { handle, .. }
            | SetMinDistance { handle, .. }
            | Resume { handle }
            | Pause { handle }
            | Destroy { handle }
            | SetLoop { handle, .. }
            | SetMute { handle, .. }
            | SetMode { handle, .. }
            | SetSpatialBlend { handle, .. }
            | SetSpread { handle, .. }
            | SetDopplerLevel { handle, .. }
            | SetRolloffMode { handle, .. }
            | SetInterval { handle, .. } => Some(*handle),
            DestroyAll => None,
        }
    }

    /// Short name for logging
    pub fn name(&self) -> &'static str {
        use AudioCommand::*;
        match self {
            Play { .. } => "Play",
            SetVolume { .. } => "SetVolume",
            AttachToPlayer { .. } => "AttachToPlayer",
            AttachToVehicle { .. } => "AttachToVehicle",
            Deattach { .. } => "Deattach",
            SetPosition { .. } => "SetPosition",
            SetMaxDistance { .. } => "SetMaxDistance",
            SetMinDistance { .. } => "SetMinDistance",
            Resume { .. } => "Resume",
            Pause { .. } => "Pause",
            Destroy { .. } => "Destroy",
            DestroyAll => "DestroyAll",
            SetLoop { .. } => "SetLoop",
            SetMute { .. } => "SetMute",
            SetMode { .. } => "SetMode",
            SetSpatialBlend { .. } => "SetSpatialBlend",
            SetSpread { .. } => "SetSpread",
            SetDopplerLevel { .. } => "SetDopplerLevel",
            SetRolloffMode { .. } => "SetRolloffMode",
            SetInterval { .. } => "SetInterval",
        }
    }
}

/// A command together with the identity the transport attributed it to
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommandEnvelope {
    pub sender: SenderId,
    pub command: AudioCommand,
}

impl CommandEnvelope {
    pub fn new(sender: SenderId, command: AudioCommand) -> Self {
        Self { sender, command }
    }
}
