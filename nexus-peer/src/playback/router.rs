//! Command router
//!
//! Checks the sender of every inbound command and dispatches authorized ones to
//! the session. Unauthorized commands are dropped without touching session
//! state and without any reply.

use crate::playback::queue::PlaybackRequest;
use crate::playback::session::AudioSession;
use nexus_common::spatial::EntityRef;
use nexus_common::{AudioCommand, CommandEnvelope, SenderId};
use std::sync::Arc;
use tracing::debug;

/// Decides whether a sender may issue commands
pub trait AuthorityCheck: Send + Sync {
    fn is_authoritative(&self, sender: SenderId) -> bool;
}

impl<F> AuthorityCheck for F
where
    F: Fn(SenderId) -> bool + Send + Sync,
{
    fn is_authoritative(&self, sender: SenderId) -> bool {
        self(sender)
    }
}

/// Single configured authority; nobody is authoritative when unset
#[derive(Debug, Clone, Copy, Default)]
pub struct ConfiguredAuthority {
    authority: Option<SenderId>,
}

impl ConfiguredAuthority {
    pub fn new(authority: Option<SenderId>) -> Self {
        Self { authority }
    }
}

impl AuthorityCheck for ConfiguredAuthority {
    fn is_authoritative(&self, sender: SenderId) -> bool {
        self.authority == Some(sender)
    }
}

/// What happened to a routed command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteOutcome {
    Dispatched,
    Unauthorized,
}

#[derive(Clone)]
pub struct CommandRouter {
    authority: Arc<dyn AuthorityCheck>,
}

impl CommandRouter {
    pub fn new(authority: Arc<dyn AuthorityCheck>) -> Self {
        Self { authority }
    }

    /// The check applied to every command, shared with the engine's inbox
    pub fn authority(&self) -> Arc<dyn AuthorityCheck> {
        Arc::clone(&self.authority)
    }

    pub fn route(&self, session: &mut AudioSession, envelope: CommandEnvelope) -> RouteOutcome {
        let CommandEnvelope { sender, command } = envelope;
        if !self.authority.is_authoritative(sender) {
            debug!("Dropping {} from non-authoritative sender {}", command.name(), sender);
            return RouteOutcome::Unauthorized;
        }

        match command.handle() {
            Some(handle) => debug!("Dispatching {} for {} from {}", command.name(), handle, sender),
            None => debug!("Dispatching {} from {}", command.name(), sender),
        }
        dispatch(session, command);
        RouteOutcome::Dispatched
    }
}

fn dispatch(session: &mut AudioSession, command: AudioCommand) {
    use AudioCommand::*;
    match command {
        Play { url, handle, is_stream, auto_start } => {
            session.play(PlaybackRequest { url, handle, is_stream, auto_start });
        }
        SetVolume { handle, volume } => {
            session.mutate(handle, |r| r.set_volume(volume));
        }
        AttachToPlayer { handle, player_id } => {
            session.attach(handle, EntityRef::player(player_id));
        }
        AttachToVehicle { handle, vehicle_id } => {
            session.attach(handle, EntityRef::vehicle(vehicle_id));
        }
        Deattach { handle } => {
            session.mutate(handle, |r| r.deattach());
        }
        SetPosition { handle, position } => {
            session.mutate(handle, |r| r.set_position(position));
        }
        SetMaxDistance { handle, distance } => {
            session.mutate(handle, |r| r.set_max_distance(distance));
        }
        SetMinDistance { handle, distance } => {
            session.mutate(handle, |r| r.set_min_distance(distance));
        }
        Resume { handle } => session.resume(handle),
        Pause { handle } => session.pause(handle),
        Destroy { handle } => session.destroy(handle),
        DestroyAll => {
            session.destroy_all();
        }
        SetLoop { handle, looping } => {
            session.mutate(handle, |r| r.set_loop(looping));
        }
        SetMute { handle, muted } => {
            session.mutate(handle, |r| r.set_mute(muted));
        }
        SetMode { handle, mode } => {
            session.mutate(handle, |r| r.set_mode(mode));
        }
        SetSpatialBlend { handle, blend } => {
            session.mutate(handle, |r| r.set_spatial_blend(blend));
        }
        SetSpread { handle, spread } => {
            session.mutate(handle, |r| r.set_spread(spread));
        }
        SetDopplerLevel { handle, level } => {
            session.mutate(handle, |r| r.set_doppler_level(level));
        }
        SetRolloffMode { handle, mode } => {
            session.mutate(handle, |r| r.set_rolloff_mode(mode));
        }
        SetInterval { handle, seconds } => {
            session.mutate(handle, |r| r.set_interval(seconds));
        }
    }
}
