//! Audio session
//!
//! Explicit per-session context: queue, resource table, admission control and
//! the collaborators they talk to. One session exists per authority connection;
//! on disconnect it is ended and a fresh one with a new id takes its place.
//!
//! **Responsibilities:**
//! - Admit and enqueue `Play` requests
//! - Materialize one queued request per tick
//! - Advance every resource (refresh timers, fetches, attachments)
//! - Apply resource commands and push voice changes to the sink
//! - Dispose resources and emit lifecycle events

use crate::audio::fetch::SourceFetcher;
use crate::audio::sink::AudioSink;
use crate::audio::types::SpatialAttributes;
use crate::playback::admission::{Admission, AdmissionController, CapacityLimits};
use crate::playback::queue::{Enqueued, PlaybackQueue, PlaybackRequest};
use crate::playback::resource::{FetchStatus, PlaybackResource, ResourceDefaults};
use crate::playback::spatial::EntityDirectory;
use crate::playback::table::ResourceTable;
use cgmath::Zero;
use chrono::Utc;
use nexus_common::events::{
    DisposeReason, EventBus, NexusEvent, PlaybackState, RejectReason, SessionEndReason,
};
use nexus_common::spatial::{EntityRef, PositionMode, Vec3};
use nexus_common::PlaybackHandle;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Collaborators a session is wired to
pub struct SessionContext {
    pub fetcher: Box<dyn SourceFetcher>,
    pub sink: Box<dyn AudioSink>,
    pub directory: Arc<dyn EntityDirectory>,
    pub events: EventBus,
}

/// Fixed per-session settings
#[derive(Debug, Clone, Copy)]
pub struct SessionSettings {
    pub limits: CapacityLimits,
    pub default_refresh_interval: Duration,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            limits: CapacityLimits::default(),
            default_refresh_interval: Duration::from_secs(60),
        }
    }
}

/// Read-only view of a session for observers
#[derive(Debug, Clone, Serialize)]
pub struct SessionSnapshot {
    pub session_id: Uuid,
    pub ticks: u64,
    pub queued: Vec<PlaybackRequest>,
    pub resources: Vec<ResourceSnapshot>,
}

/// Read-only view of one resource
#[derive(Debug, Clone, Serialize)]
pub struct ResourceSnapshot {
    pub handle: PlaybackHandle,
    pub url: String,
    pub is_stream: bool,
    pub state: PlaybackState,
    pub volume: f32,
    pub looping: bool,
    pub muted: bool,
    pub spatial: SpatialAttributes,
    pub position_mode: PositionMode,
    pub world_position: Vec3,
    pub attachment: Option<EntityRef>,
    pub refresh_interval_secs: f32,
    pub fetch_generation: u64,
    pub fetch_status: FetchStatus,
}

impl From<&PlaybackResource> for ResourceSnapshot {
    fn from(r: &PlaybackResource) -> Self {
        Self {
            handle: r.handle(),
            url: r.url().to_string(),
            is_stream: r.is_stream(),
            state: r.state(),
            volume: r.volume(),
            looping: r.is_looping(),
            muted: r.is_muted(),
            spatial: *r.spatial(),
            position_mode: r.position_mode(),
            world_position: r.world_position(),
            attachment: r.attachment_target(),
            refresh_interval_secs: r.refresh_interval().as_secs_f32(),
            fetch_generation: r.fetch_generation(),
            fetch_status: r.fetch_status(),
        }
    }
}

/// One authority session's audio state
pub struct AudioSession {
    id: Uuid,
    settings: SessionSettings,
    admission: AdmissionController,
    queue: PlaybackQueue,
    table: ResourceTable,
    ctx: SessionContext,
    ticks: u64,
}

impl AudioSession {
    pub fn new(settings: SessionSettings, ctx: SessionContext) -> Self {
        let id = Uuid::new_v4();
        info!("Audio session {} started", id);
        ctx.events.emit_lossy(NexusEvent::SessionStarted { session_id: id, timestamp: Utc::now() });

        Self {
            id,
            settings,
            admission: AdmissionController::new(settings.limits),
            queue: PlaybackQueue::new(),
            table: ResourceTable::new(),
            ctx,
            ticks: 0,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn settings(&self) -> SessionSettings {
        self.settings
    }

    pub fn queue_len(&self) -> usize {
        self.queue.len()
    }

    pub fn resource_count(&self) -> usize {
        self.table.len()
    }

    pub fn resource(&self, handle: PlaybackHandle) -> Option<&PlaybackResource> {
        self.table.get(handle)
    }

    pub fn is_queued(&self, handle: PlaybackHandle) -> bool {
        self.queue.contains(handle)
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            session_id: self.id,
            ticks: self.ticks,
            queued: self.queue.iter().cloned().collect(),
            resources: self.table.iter().map(ResourceSnapshot::from).collect(),
        }
    }

    fn emit(&self, event: NexusEvent) {
        self.ctx.events.emit_lossy(event);
    }

    /// Admission-gated enqueue. Returns false when capacity rejected it.
    pub fn play(&mut self, request: PlaybackRequest) -> bool {
        let admission =
            self.admission.check(request.handle, request.is_stream, &self.queue, &self.table);

        if admission == Admission::Reject {
            warn!("Play for {} ({}) rejected: capacity exceeded", request.handle, request.url);
            self.emit(NexusEvent::RequestRejected {
                handle: request.handle,
                reason: RejectReason::CapacityExceeded,
                timestamp: Utc::now(),
            });
            return false;
        }

        let event = NexusEvent::ResourceQueued {
            handle: request.handle,
            url: request.url.clone(),
            is_stream: request.is_stream,
            auto_start: request.auto_start,
            replaces: admission == Admission::Replace,
            timestamp: Utc::now(),
        };
        match self.queue.enqueue(request) {
            Enqueued::Appended => debug!("Queued request ({} pending)", self.queue.len()),
            Enqueued::Superseded => debug!("Superseded queued request in place"),
        }
        self.emit(event);
        true
    }

    /// Paused -> Playing, re-checked against capacity
    pub fn resume(&mut self, handle: PlaybackHandle) {
        let Some(state) = self.table.get(handle).map(|r| r.state()) else {
            debug!("Resume on unknown handle {}", handle);
            return;
        };
        if state == PlaybackState::Playing {
            return;
        }
        if !self.admission.check_resume(handle, &self.queue, &self.table).is_admitted() {
            warn!("Resume of {} rejected: capacity exceeded", handle);
            self.emit(NexusEvent::RequestRejected {
                handle,
                reason: RejectReason::CapacityExceeded,
                timestamp: Utc::now(),
            });
            return;
        }
        self.transition(handle, |r| r.resume());
    }

    /// Playing -> Paused
    pub fn pause(&mut self, handle: PlaybackHandle) {
        self.transition(handle, |r| r.pause());
    }

    fn transition<F>(&mut self, handle: PlaybackHandle, f: F)
    where
        F: FnOnce(&mut PlaybackResource) -> Option<(PlaybackState, PlaybackState)>,
    {
        let Some(resource) = self.table.get_mut(handle) else {
            debug!("State change on unknown handle {}", handle);
            return;
        };
        if let Some((old_state, new_state)) = f(resource) {
            self.ctx.events.emit_lossy(NexusEvent::PlaybackStateChanged {
                handle,
                old_state,
                new_state,
                timestamp: Utc::now(),
            });
        }
        self.flush_voice(handle);
    }

    /// Apply an attribute mutation to an active resource
    ///
    /// Returns false for unknown handles and rejected values.
    pub fn mutate<F>(&mut self, handle: PlaybackHandle, f: F) -> bool
    where
        F: FnOnce(&mut PlaybackResource) -> bool,
    {
        let Some(resource) = self.table.get_mut(handle) else {
            debug!("Mutation on unknown handle {}", handle);
            return false;
        };
        let changed = f(resource);
        self.flush_voice(handle);
        changed
    }

    /// Attach to `target` if the directory can resolve it now
    pub fn attach(&mut self, handle: PlaybackHandle, target: EntityRef) {
        if !self.table.contains(handle) {
            debug!("Attach on unknown handle {}", handle);
            return;
        }
        let Some(transform) = self.ctx.directory.resolve(target) else {
            debug!("Attach of {} ignored: {} not found", handle, target);
            return;
        };
        self.mutate(handle, |r| r.attach(target, transform));
    }

    /// Dispose one handle, queued or active
    pub fn destroy(&mut self, handle: PlaybackHandle) {
        if self.queue.remove(handle).is_some() {
            debug!("Dropped queued request for {}", handle);
        }
        self.dispose(handle, DisposeReason::Destroyed);
    }

    /// Dispose every resource and clear the queue
    pub fn destroy_all(&mut self) -> usize {
        self.teardown(DisposeReason::DestroyAll)
    }

    /// End the session, returning its collaborators for the next one
    pub fn end(mut self, reason: SessionEndReason) -> SessionContext {
        let disposed = self.teardown(DisposeReason::SessionEnded);
        info!("Audio session {} ended ({}): {} resources disposed", self.id, reason, disposed);
        self.emit(NexusEvent::SessionEnded {
            session_id: self.id,
            reason,
            resources_disposed: disposed,
            timestamp: Utc::now(),
        });
        self.ctx
    }

    fn dispose(&mut self, handle: PlaybackHandle, reason: DisposeReason) -> bool {
        let Some(mut resource) = self.table.remove(handle) else {
            return false;
        };
        resource.release();
        self.ctx.sink.close(handle);
        debug!("Disposed {} ({})", handle, reason);
        self.emit(NexusEvent::ResourceDisposed { handle, reason, timestamp: Utc::now() });
        true
    }

    fn teardown(&mut self, reason: DisposeReason) -> usize {
        let dropped = self.queue.clear();
        if dropped > 0 {
            debug!("Dropped {} queued requests", dropped);
        }
        let resources = self.table.drain();
        let count = resources.len();
        for mut resource in resources {
            let handle = resource.handle();
            resource.release();
            self.ctx.sink.close(handle);
            self.ctx.events.emit_lossy(NexusEvent::ResourceDisposed {
                handle,
                reason,
                timestamp: Utc::now(),
            });
        }
        count
    }

    /// One scheduling step
    pub fn tick(&mut self, dt: Duration) {
        self.ticks += 1;

        if let Some(request) = self.queue.pop_front() {
            self.materialize(request);
        }

        let mut failed = Vec::new();
        for resource in self.table.iter_mut() {
            let handle = resource.handle();
            let report =
                resource.advance(dt, self.ctx.fetcher.as_ref(), self.ctx.directory.as_ref());

            if let Some(generation) = report.refreshed {
                self.ctx.events.emit_lossy(NexusEvent::StreamRefreshed {
                    handle,
                    generation,
                    timestamp: Utc::now(),
                });
            }
            if let Some(clip) = report.delivered {
                self.ctx.sink.submit(handle, clip);
            }
            if let Some(e) = report.failure {
                warn!("Fetch for {} ({}) failed: {}", handle, resource.url(), e);
                failed.push(handle);
            }
        }

        for handle in failed {
            self.dispose(handle, DisposeReason::FetchFailed);
        }

        for resource in self.table.iter_mut() {
            if resource.take_dirty() {
                self.ctx.sink.update(resource.handle(), &resource.voice());
            }
        }
    }

    fn materialize(&mut self, request: PlaybackRequest) {
        let handle = request.handle;
        if self.dispose(handle, DisposeReason::Replaced) {
            debug!("Replaced active resource {}", handle);
        }

        let defaults = ResourceDefaults {
            refresh_interval: self.settings.default_refresh_interval,
            initial_position: self
                .ctx
                .directory
                .listener()
                .map(|t| t.position)
                .unwrap_or_else(Vec3::zero),
        };
        let resource = PlaybackResource::materialize(request, &defaults, self.ctx.fetcher.as_ref());

        info!(
            "Materialized {} ({}, stream={}, {})",
            handle,
            resource.url(),
            resource.is_stream(),
            resource.state()
        );
        self.ctx.sink.open(handle, &resource.voice());
        self.emit(NexusEvent::ResourceMaterialized {
            handle,
            url: resource.url().to_string(),
            is_stream: resource.is_stream(),
            state: resource.state(),
            timestamp: Utc::now(),
        });
        self.table.insert(resource);
    }

    fn flush_voice(&mut self, handle: PlaybackHandle) {
        if let Some(resource) = self.table.get_mut(handle) {
            if resource.take_dirty() {
                self.ctx.sink.update(handle, &resource.voice());
            }
        }
    }
}
