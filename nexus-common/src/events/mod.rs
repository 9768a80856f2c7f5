//! Event types for the Nexus event system
//!
//! Provides the shared event definitions and the broadcast `EventBus` used to
//! surface session activity to local observers (SSE, logs, tests). Events never
//! travel back to the authority.

mod playback_types;

pub use playback_types::{DisposeReason, PlaybackState, RejectReason, SessionEndReason};

use crate::handle::PlaybackHandle;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use uuid::Uuid;

/// Nexus event types
///
/// Events are broadcast via [`EventBus`] and can be serialized for SSE transmission.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum NexusEvent {
    /// A new audio session was constructed
    SessionStarted {
        session_id: Uuid,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// A session was torn down and all its resources disposed
    SessionEnded {
        session_id: Uuid,
        reason: SessionEndReason,
        /// Active resources disposed by the teardown
        resources_disposed: usize,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// A `Play` request passed admission and entered the queue
    ResourceQueued {
        handle: PlaybackHandle,
        url: String,
        is_stream: bool,
        auto_start: bool,
        /// True when the handle was already tracked (replace, not allocation)
        replaces: bool,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// A request was refused
    RequestRejected {
        handle: PlaybackHandle,
        reason: RejectReason,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// The scheduler turned a queued request into an active resource
    ResourceMaterialized {
        handle: PlaybackHandle,
        url: String,
        is_stream: bool,
        state: PlaybackState,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// Resource moved between Playing and Paused
    PlaybackStateChanged {
        handle: PlaybackHandle,
        old_state: PlaybackState,
        new_state: PlaybackState,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// A stream resource abandoned its buffer and began re-fetching
    StreamRefreshed {
        handle: PlaybackHandle,
        /// Fetch generation started by this refresh (first fetch is 1)
        generation: u64,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// Resource removed from the resource table
    ResourceDisposed {
        handle: PlaybackHandle,
        reason: DisposeReason,
        timestamp: chrono::DateTime<chrono::Utc>,
    },
}

impl NexusEvent {
    /// Event name used as the SSE `event:` field
    pub fn event_type(&self) -> &'static str {
        match self {
            NexusEvent::SessionStarted { .. } => "SessionStarted",
            NexusEvent::SessionEnded { .. } => "SessionEnded",
            NexusEvent::ResourceQueued { .. } => "ResourceQueued",
            NexusEvent::RequestRejected { .. } => "RequestRejected",
            NexusEvent::ResourceMaterialized { .. } => "ResourceMaterialized",
            NexusEvent::PlaybackStateChanged { .. } => "PlaybackStateChanged",
            NexusEvent::StreamRefreshed { .. } => "StreamRefreshed",
            NexusEvent::ResourceDisposed { .. } => "ResourceDisposed",
        }
    }
}

/// Broadcast bus for [`NexusEvent`]
///
/// Cloning the bus clones the sender; all clones feed the same subscribers.
#[derive(Debug, Clone)]
pub struct EventBus {
    tx: broadcast::Sender<NexusEvent>,
    capacity: usize,
}

impl EventBus {
    /// Creates a new EventBus with specified channel capacity
    ///
    /// Subscribers that fall more than `capacity` events behind lose the oldest ones.
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx, capacity }
    }

    /// Subscribe to all future events
    pub fn subscribe(&self) -> broadcast::Receiver<NexusEvent> {
        self.tx.subscribe()
    }

    /// Emit an event, ignoring if no subscribers are listening
    pub fn emit_lossy(&self, event: NexusEvent) {
        let _ = self.tx.send(event);
    }

    /// Current number of subscribers
    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}
