//! Playback engine task
//!
//! Owns the [`AudioSession`] and is the only code that ever mutates it. Other
//! tasks talk to it through an [`EngineHandle`]; messages are drained at the
//! start of every tick, then the session advances by the measured tick delta.
//! Commands from non-authoritative senders are dropped before they take an
//! inbox slot.

use crate::error::{Error, Result};
use crate::playback::router::{AuthorityCheck, CommandRouter};
use crate::playback::session::{AudioSession, SessionSettings, SessionSnapshot};
use crate::state::SharedState;
use nexus_common::events::SessionEndReason;
use nexus_common::CommandEnvelope;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

/// Messages accepted by the engine task
#[derive(Debug)]
pub enum EngineMessage {
    /// Inbound command with its transport-reported sender
    Command(CommandEnvelope),
    /// The authority's connection ended
    Disconnected,
    /// Request a snapshot of the current session
    Snapshot(oneshot::Sender<SessionSnapshot>),
    /// Dispose everything and stop
    Shutdown,
}

/// Cloneable sender side of the engine
#[derive(Clone)]
pub struct EngineHandle {
    tx: mpsc::Sender<EngineMessage>,
    state: Arc<SharedState>,
    authority: Arc<dyn AuthorityCheck>,
}

impl fmt::Debug for EngineHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EngineHandle")
            .field("closed", &self.tx.is_closed())
            .field("capacity", &self.tx.capacity())
            .finish()
    }
}

impl EngineHandle {
    /// Queue a command for the next tick. Never blocks; a full inbox drops it.
    ///
    /// Returns false when the command was not queued.
    pub fn submit(&self, envelope: CommandEnvelope) -> bool {
        if !self.authority.is_authoritative(envelope.sender) {
            debug!(
                "Dropping {} from non-authoritative sender {}",
                envelope.command.name(),
                envelope.sender
            );
            return false;
        }
        match self.tx.try_send(EngineMessage::Command(envelope)) {
            Ok(()) => true,
            Err(e) => {
                warn!("Dropping command: engine inbox unavailable ({})", e);
                self.state.record_dropped_command();
                false
            }
        }
    }

    pub async fn disconnect(&self) -> Result<()> {
        self.tx.send(EngineMessage::Disconnected).await.map_err(|_| Error::EngineStopped)
    }

    pub async fn snapshot(&self) -> Result<SessionSnapshot> {
        let (reply, rx) = oneshot::channel();
        self.tx.send(EngineMessage::Snapshot(reply)).await.map_err(|_| Error::EngineStopped)?;
        rx.await.map_err(|_| Error::EngineStopped)
    }

    pub async fn shutdown(&self) -> Result<()> {
        self.tx.send(EngineMessage::Shutdown).await.map_err(|_| Error::EngineStopped)
    }
}

/// Tick loop owning the session
pub struct PlaybackEngine {
    session: Option<AudioSession>,
    settings: SessionSettings,
    router: CommandRouter,
    rx: mpsc::Receiver<EngineMessage>,
    tick_period: Duration,
    state: Arc<SharedState>,
}

impl PlaybackEngine {
    pub fn new(
        session: AudioSession,
        router: CommandRouter,
        tick_period: Duration,
        inbox_capacity: usize,
        state: Arc<SharedState>,
    ) -> (Self, EngineHandle) {
        let (tx, rx) = mpsc::channel(inbox_capacity.max(1));
        let settings = session.settings();
        let authority = router.authority();
        let engine = Self {
            session: Some(session),
            settings,
            router,
            rx,
            tick_period,
            state: Arc::clone(&state),
        };
        (engine, EngineHandle { tx, state, authority })
    }

    /// Spawn the tick loop on the current runtime
    pub fn spawn(self) -> JoinHandle<()> {
        tokio::spawn(self.run())
    }

    pub async fn run(mut self) {
        info!("Playback engine running, tick period {:?}", self.tick_period);
        let mut ticker = tokio::time::interval(self.tick_period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        let mut last = Instant::now();

        loop {
            ticker.tick().await;
            if !self.drain_inbox() {
                break;
            }
            let now = Instant::now();
            let dt = now.duration_since(last);
            last = now;

            if let Some(session) = self.session.as_mut() {
                session.tick(dt);
            }
            self.state.record_tick();
        }

        if let Some(session) = self.session.take() {
            drop(session.end(SessionEndReason::Shutdown));
        }
        info!("Playback engine stopped");
    }

    /// Apply everything received since the last tick. Returns false to stop.
    fn drain_inbox(&mut self) -> bool {
        loop {
            match self.rx.try_recv() {
                Ok(EngineMessage::Command(envelope)) => {
                    if let Some(session) = self.session.as_mut() {
                        self.router.route(session, envelope);
                    }
                }
                Ok(EngineMessage::Disconnected) => self.restart_session(),
                Ok(EngineMessage::Snapshot(reply)) => {
                    if let Some(session) = self.session.as_ref() {
                        let _ = reply.send(session.snapshot());
                    }
                }
                Ok(EngineMessage::Shutdown) => {
                    debug!("Shutdown requested");
                    return false;
                }
                Err(mpsc::error::TryRecvError::Empty) => return true,
                Err(mpsc::error::TryRecvError::Disconnected) => {
                    debug!("All engine handles dropped");
                    return false;
                }
            }
        }
    }

    fn restart_session(&mut self) {
        if let Some(session) = self.session.take() {
            let ctx = session.end(SessionEndReason::Disconnected);
            self.session = Some(AudioSession::new(self.settings, ctx));
        }
    }
}
