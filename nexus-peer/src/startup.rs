//! Startup registry
//!
//! Explicit wiring of the peer's collaborators. Nothing is discovered at
//! runtime: the binary builds [`PeerComponents`] from config, tests swap in
//! their own pieces with the `with_*` methods, and [`PeerComponents::start`]
//! assembles the session and spawns the engine.

use crate::api::AppContext;
use crate::audio::fetch::{HttpFetcher, SourceFetcher};
use crate::audio::sink::{AudioSink, TracingSink};
use crate::config::PeerConfig;
use crate::error::Result;
use crate::playback::engine::{EngineHandle, PlaybackEngine};
use crate::playback::router::{AuthorityCheck, CommandRouter, ConfiguredAuthority};
use crate::playback::session::{AudioSession, SessionContext, SessionSettings};
use crate::playback::spatial::SharedEntityDirectory;
use crate::state::SharedState;
use nexus_common::events::EventBus;
use nexus_common::SenderId;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::info;

/// Collaborators a peer session is built from
pub struct PeerComponents {
    pub fetcher: Box<dyn SourceFetcher>,
    pub sink: Box<dyn AudioSink>,
    pub directory: SharedEntityDirectory,
    pub authority: Arc<dyn AuthorityCheck>,
}

impl PeerComponents {
    /// Production wiring: HTTP fetcher, tracing sink, configured authority
    pub fn from_config(config: &PeerConfig) -> Result<Self> {
        let authority = ConfiguredAuthority::new(config.authority_id.map(SenderId));
        match config.authority_id {
            Some(id) => info!("Authoritative sender: {}", id),
            None => info!("No authority configured; all commands will be dropped"),
        }

        Ok(Self {
            fetcher: Box::new(HttpFetcher::new(&config.fetch)?),
            sink: Box::new(TracingSink::new()),
            directory: SharedEntityDirectory::new(),
            authority: Arc::new(authority),
        })
    }

    pub fn with_fetcher(mut self, fetcher: Box<dyn SourceFetcher>) -> Self {
        self.fetcher = fetcher;
        self
    }

    pub fn with_sink(mut self, sink: Box<dyn AudioSink>) -> Self {
        self.sink = sink;
        self
    }

    pub fn with_authority(mut self, authority: Arc<dyn AuthorityCheck>) -> Self {
        self.authority = authority;
        self
    }

    /// Build the first session and spawn the engine task
    ///
    /// Must be called from within a tokio runtime.
    pub fn start(self, config: &PeerConfig) -> RunningPeer {
        let events = EventBus::new(config.scheduler.event_capacity);
        let state = Arc::new(SharedState::new(events.clone()));

        let settings = SessionSettings {
            limits: config.limits,
            default_refresh_interval: config.default_refresh_interval(),
        };
        let ctx = SessionContext {
            fetcher: self.fetcher,
            sink: self.sink,
            directory: Arc::new(self.directory.clone()),
            events,
        };
        let session = AudioSession::new(settings, ctx);

        let (engine, handle) = PlaybackEngine::new(
            session,
            CommandRouter::new(self.authority),
            config.tick_period(),
            config.scheduler.command_buffer,
            Arc::clone(&state),
        );
        let task = engine.spawn();

        RunningPeer {
            engine: handle,
            state,
            directory: self.directory,
            port: config.port,
            task,
        }
    }
}

/// Handles to a started peer
pub struct RunningPeer {
    pub engine: EngineHandle,
    pub state: Arc<SharedState>,
    pub directory: SharedEntityDirectory,
    pub port: u16,
    pub task: JoinHandle<()>,
}

impl RunningPeer {
    pub fn app_context(&self) -> AppContext {
        AppContext {
            state: Arc::clone(&self.state),
            engine: self.engine.clone(),
            directory: self.directory.clone(),
            port: self.port,
        }
    }
}
