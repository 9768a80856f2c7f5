//! Admission control
//!
//! Gates creation of new playback resources against two concurrency caps. The
//! counts cover both active resources and requests still waiting in the queue,
//! so a burst of `Play` commands within one tick cannot overshoot.
//!
//! A `Play` for a handle that is already tracked (queued or active) is always
//! admitted: it replaces, it does not add. `Resume` has no such bypass; a
//! paused resource only plays again when the playing count has room for it.

use crate::playback::queue::PlaybackQueue;
use crate::playback::table::ResourceTable;
use nexus_common::events::PlaybackState;
use nexus_common::PlaybackHandle;
use serde::Deserialize;
use tracing::debug;

/// Concurrency caps for one session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct CapacityLimits {
    /// Resources allowed to play at once
    pub max_concurrent_audio: usize,
    /// Stream resources allowed at once
    pub max_concurrent_streams: usize,
}

impl Default for CapacityLimits {
    fn default() -> Self {
        Self { max_concurrent_audio: 5, max_concurrent_streams: 1 }
    }
}

/// Outcome of an admission check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    /// Handle already tracked; the request replaces it
    Replace,
    /// New handle within capacity
    Admit,
    /// New handle over capacity
    Reject,
}

impl Admission {
    pub fn is_admitted(self) -> bool {
        !matches!(self, Admission::Reject)
    }
}

/// Applies [`CapacityLimits`] to the current queue and resource table
#[derive(Debug, Clone, Copy)]
pub struct AdmissionController {
    limits: CapacityLimits,
}

impl AdmissionController {
    pub fn new(limits: CapacityLimits) -> Self {
        Self { limits }
    }

    /// Decide whether a `Play` for `handle` may start a (stream or one-shot) resource
    pub fn check(
        &self,
        handle: PlaybackHandle,
        is_stream: bool,
        queue: &PlaybackQueue,
        table: &ResourceTable,
    ) -> Admission {
        if table.contains(handle) || queue.contains(handle) {
            return Admission::Replace;
        }

        let streams = table.stream_count() + queued_streams(queue, table);
        let playing = table.playing_count() + queued_autostarts(queue, table);
        self.within_limits(handle, is_stream, streams, playing)
    }

    /// Decide whether the paused resource `handle` may start playing again
    ///
    /// Resume never replaces anything, so the handle itself is left out of
    /// the counts and every other playing resource is held against the cap.
    pub fn check_resume(
        &self,
        handle: PlaybackHandle,
        queue: &PlaybackQueue,
        table: &ResourceTable,
    ) -> Admission {
        let Some(resource) = table.get(handle) else {
            return Admission::Reject;
        };

        let others = table.iter().filter(|r| r.handle() != handle);
        let (streams, playing) = others.fold((0, 0), |(streams, playing), r| {
            (
                streams + usize::from(r.is_stream()),
                playing + usize::from(r.state() == PlaybackState::Playing),
            )
        });

        self.within_limits(
            handle,
            resource.is_stream(),
            streams + queued_streams(queue, table),
            playing + queued_autostarts(queue, table),
        )
    }

    fn within_limits(
        &self,
        handle: PlaybackHandle,
        is_stream: bool,
        streams: usize,
        playing: usize,
    ) -> Admission {
        if is_stream && streams >= self.limits.max_concurrent_streams {
            debug!(
                "Admission rejected {}: {} streams tracked, limit {}",
                handle, streams, self.limits.max_concurrent_streams
            );
            return Admission::Reject;
        }
        if playing >= self.limits.max_concurrent_audio {
            debug!(
                "Admission rejected {}: {} playing, limit {}",
                handle, playing, self.limits.max_concurrent_audio
            );
            return Admission::Reject;
        }
        Admission::Admit
    }
}

/// Queued streams that will add a resource rather than replace one
fn queued_streams(queue: &PlaybackQueue, table: &ResourceTable) -> usize {
    queue.iter().filter(|r| r.is_stream && !table.contains(r.handle)).count()
}

/// Queued auto-start requests that will add a playing resource
fn queued_autostarts(queue: &PlaybackQueue, table: &ResourceTable) -> usize {
    queue.iter().filter(|r| r.auto_start && !table.contains(r.handle)).count()
}
