//! Authority-side command builder
//!
//! The authority owns the only [`HandleAllocator`] for its session. `play`
//! is the sole operation that allocates; every other builder addresses a
//! handle the authority already holds. The returned commands are handed to
//! whatever transport delivers them to peers.

use crate::command::AudioCommand;
use crate::handle::{HandleAllocator, PlaybackHandle};
use crate::spatial::{AudioMode, RolloffMode, Vec3};
use tracing::debug;

/// Builds audio commands for one authority session
#[derive(Debug, Default)]
pub struct AuthorityAudio {
    handles: HandleAllocator,
}

impl AuthorityAudio {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate a handle and build the `Play` command for it
    pub fn play(
        &mut self,
        url: impl Into<String>,
        is_stream: bool,
        auto_start: bool,
    ) -> (PlaybackHandle, AudioCommand) {
        let handle = self.handles.next();
        let url = url.into();
        debug!("Allocated handle {} for {}", handle, url);
        (
            handle,
            AudioCommand::Play { url, handle, is_stream, auto_start },
        )
    }

    /// Re-issue `Play` on an existing handle (replaces the peer's resource)
    pub fn replay(
        &self,
        handle: PlaybackHandle,
        url: impl Into<String>,
        is_stream: bool,
        auto_start: bool,
    ) -> AudioCommand {
        AudioCommand::Play { url: url.into(), handle, is_stream, auto_start }
    }

    /// Last handle issued in this session
    pub fn last_handle(&self) -> Option<PlaybackHandle> {
        self.handles.last()
    }

    /// End the session: previously issued handles become meaningless
    pub fn end_session(&mut self) {
        self.handles.reset();
    }

    pub fn set_volume(&self, handle: PlaybackHandle, volume: f32) -> AudioCommand {
        AudioCommand::SetVolume { handle, volume }
    }

    pub fn attach_to_player(&self, handle: PlaybackHandle, player_id: u64) -> AudioCommand {
        AudioCommand::AttachToPlayer { handle, player_id }
    }

    pub fn attach_to_vehicle(&self, handle: PlaybackHandle, vehicle_id: u64) -> AudioCommand {
        AudioCommand::AttachToVehicle { handle, vehicle_id }
    }

    pub fn deattach(&self, handle: PlaybackHandle) -> AudioCommand {
        AudioCommand::Deattach { handle }
    }

    /// Local offset when attached, world position otherwise
    pub fn set_position(&self, handle: PlaybackHandle, position: Vec3) -> AudioCommand {
        AudioCommand::SetPosition { handle, position }
    }

    pub fn set_max_distance(&self, handle: PlaybackHandle, distance: f32) -> AudioCommand {
        AudioCommand::SetMaxDistance { handle, distance }
    }

    pub fn set_min_distance(&self, handle: PlaybackHandle, distance: f32) -> AudioCommand {
        AudioCommand::SetMinDistance { handle, distance }
    }

    pub fn resume(&self, handle: PlaybackHandle) -> AudioCommand {
        AudioCommand::Resume { handle }
    }

    pub fn pause(&self, handle: PlaybackHandle) -> AudioCommand {
        AudioCommand::Pause { handle }
    }

    pub fn destroy(&self, handle: PlaybackHandle) -> AudioCommand {
        AudioCommand::Destroy { handle }
    }

    pub fn destroy_all(&self) -> AudioCommand {
        AudioCommand::DestroyAll
    }

    pub fn set_loop(&self, handle: PlaybackHandle, looping: bool) -> AudioCommand {
        AudioCommand::SetLoop { handle, looping }
    }

    pub fn set_mute(&self, handle: PlaybackHandle, muted: bool) -> AudioCommand {
        AudioCommand::SetMute { handle, muted }
    }

    pub fn set_mode(&self, handle: PlaybackHandle, mode: AudioMode) -> AudioCommand {
        AudioCommand::SetMode { handle, mode }
    }

    pub fn set_spatial_blend(&self, handle: PlaybackHandle, blend: f32) -> AudioCommand {
        AudioCommand::SetSpatialBlend { handle, blend }
    }

    pub fn set_spread(&self, handle: PlaybackHandle, spread: f32) -> AudioCommand {
        AudioCommand::SetSpread { handle, spread }
    }

    pub fn set_doppler_level(&self, handle: PlaybackHandle, level: f32) -> AudioCommand {
        AudioCommand::SetDopplerLevel { handle, level }
    }

    pub fn set_rolloff_mode(&self, handle: PlaybackHandle, mode: RolloffMode) -> AudioCommand {
        AudioCommand::SetRolloffMode { handle, mode }
    }

    /// Refresh interval in seconds for stream resources
    pub fn set_interval(&self, handle: PlaybackHandle, seconds: f32) -> AudioCommand {
        AudioCommand::SetInterval { handle, seconds }
    }
}
