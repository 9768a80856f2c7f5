//! AudioSession test harness

use super::fakes::{RecordingSink, Script, ScriptedFetcher};
use nexus_common::events::{EventBus, NexusEvent};
use nexus_common::{AudioCommand, CommandEnvelope, PlaybackHandle, SenderId};
use nexus_peer::audio::AudioClip;
use nexus_peer::playback::{
    AudioSession, CapacityLimits, CommandRouter, ConfiguredAuthority, SessionContext,
    SessionSettings, SharedEntityDirectory,
};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast;

/// Nominal tick length (30 Hz)
pub const TICK: Duration = Duration::from_millis(33);

/// The configured authoritative sender
pub fn authority() -> SenderId {
    SenderId(42)
}

/// Some other client
pub fn foreign() -> SenderId {
    SenderId(7)
}

pub fn router() -> CommandRouter {
    CommandRouter::new(Arc::new(ConfiguredAuthority::new(Some(authority()))))
}

pub fn envelope(command: AudioCommand) -> CommandEnvelope {
    CommandEnvelope::new(authority(), command)
}

pub fn play(handle: i32, url: &str, is_stream: bool, auto_start: bool) -> AudioCommand {
    AudioCommand::Play {
        url: url.to_string(),
        handle: PlaybackHandle::new(handle),
        is_stream,
        auto_start,
    }
}

/// 100 stereo frames of silence
pub fn test_clip() -> AudioClip {
    AudioClip::new(vec![0.0; 200], 44_100, 2)
}

/// Non-blocking drain of everything received so far
pub fn drain_events(rx: &mut broadcast::Receiver<NexusEvent>) -> Vec<NexusEvent> {
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    events
}

/// Session wired to scripted collaborators
pub struct TestSession {
    pub session: AudioSession,
    pub router: CommandRouter,
    pub fetcher: ScriptedFetcher,
    pub sink: RecordingSink,
    pub directory: SharedEntityDirectory,
    pub events: broadcast::Receiver<NexusEvent>,
}

impl TestSession {
    pub fn new() -> Self {
        Self::build(SessionSettings::default(), Script::Pending)
    }

    pub fn with_limits(max_concurrent_audio: usize, max_concurrent_streams: usize) -> Self {
        Self::build(
            SessionSettings {
                limits: CapacityLimits { max_concurrent_audio, max_concurrent_streams },
                ..SessionSettings::default()
            },
            Script::Pending,
        )
    }

    pub fn build(settings: SessionSettings, default_script: Script) -> Self {
        let fetcher = ScriptedFetcher::new(default_script);
        let sink = RecordingSink::new();
        let directory = SharedEntityDirectory::new();
        let bus = EventBus::new(1024);
        let events = bus.subscribe();

        let session = AudioSession::new(
            settings,
            SessionContext {
                fetcher: Box::new(fetcher.clone()),
                sink: Box::new(sink.clone()),
                directory: Arc::new(directory.clone()),
                events: bus,
            },
        );

        Self { session, router: router(), fetcher, sink, directory, events }
    }

    /// Route a command from the authority
    pub fn send(&mut self, command: AudioCommand) {
        self.router.route(&mut self.session, envelope(command));
    }

    /// Route a command from a non-authoritative sender
    pub fn send_from(&mut self, sender: SenderId, command: AudioCommand) {
        self.router.route(&mut self.session, CommandEnvelope::new(sender, command));
    }

    pub fn tick(&mut self) {
        self.session.tick(TICK);
    }

    pub fn ticks(&mut self, n: usize) {
        for _ in 0..n {
            self.tick();
        }
    }

    pub fn drain_events(&mut self) -> Vec<NexusEvent> {
        drain_events(&mut self.events)
    }
}
