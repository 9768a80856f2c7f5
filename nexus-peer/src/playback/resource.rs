//! Playback resource state machine
//!
//! One active resource per handle. A resource is built from an admitted
//! [`PlaybackRequest`], starts its first fetch immediately, and from then on is
//! only mutated in place by commands and advanced by the tick scheduler.
//!
//! **Responsibilities:**
//! - Playing/Paused state and per-voice attributes
//! - Spatial placement (free or attached)
//! - Fetch cursor: in-flight fetch, generation counter, delivery
//! - Periodic refresh of stream sources

use crate::audio::fetch::{FetchPoll, FetchTask, SourceFetcher};
use crate::audio::types::{AudioClip, SpatialAttributes, VoiceParams};
use crate::error::Error;
use crate::playback::queue::PlaybackRequest;
use crate::playback::spatial::{EntityDirectory, Placement};
use nexus_common::events::PlaybackState;
use nexus_common::spatial::{AudioMode, EntityRef, PositionMode, RolloffMode, Transform, Vec3};
use nexus_common::PlaybackHandle;
use serde::Serialize;
use std::fmt;
use std::time::Duration;
use tracing::debug;

/// Values a resource starts with that come from the session
#[derive(Debug, Clone, Copy)]
pub struct ResourceDefaults {
    pub refresh_interval: Duration,
    pub initial_position: Vec3,
}

/// Progress of the resource's current fetch generation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FetchStatus {
    Loading,
    Loaded,
}

/// What one tick did to a resource
#[derive(Debug, Default)]
pub struct TickReport {
    /// Generation begun by a refresh this tick
    pub refreshed: Option<u64>,
    /// Clip finished this tick
    pub delivered: Option<AudioClip>,
    /// Fetch failed this tick; the resource must be disposed
    pub failure: Option<Error>,
}

struct FetchCursor {
    generation: u64,
    task: Option<Box<dyn FetchTask>>,
    delivered: bool,
}

impl fmt::Debug for FetchCursor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FetchCursor")
            .field("generation", &self.generation)
            .field("in_flight", &self.task.is_some())
            .field("delivered", &self.delivered)
            .finish()
    }
}

/// Active playback resource
#[derive(Debug)]
pub struct PlaybackResource {
    handle: PlaybackHandle,
    url: String,
    is_stream: bool,
    state: PlaybackState,
    volume: f32,
    looping: bool,
    muted: bool,
    spatial: SpatialAttributes,
    placement: Placement,
    refresh_interval: Duration,
    elapsed: Duration,
    cursor: FetchCursor,
    dirty: bool,
}

fn finite(value: f32) -> Option<f32> {
    value.is_finite().then_some(value)
}

impl PlaybackResource {
    /// Build a resource from an admitted request and begin its first fetch
    pub fn materialize(
        request: PlaybackRequest,
        defaults: &ResourceDefaults,
        fetcher: &dyn SourceFetcher,
    ) -> Self {
        let task = fetcher.begin(&request.url, request.is_stream);
        let state = if request.auto_start {
            PlaybackState::Playing
        } else {
            PlaybackState::Paused
        };

        Self {
            handle: request.handle,
            url: request.url,
            is_stream: request.is_stream,
            state,
            volume: 1.0,
            looping: false,
            muted: false,
            spatial: SpatialAttributes::default(),
            placement: Placement::free(defaults.initial_position),
            refresh_interval: defaults.refresh_interval,
            elapsed: Duration::ZERO,
            cursor: FetchCursor { generation: 1, task: Some(task), delivered: false },
            dirty: false,
        }
    }

    pub fn handle(&self) -> PlaybackHandle {
        self.handle
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn is_stream(&self) -> bool {
        self.is_stream
    }

    pub fn state(&self) -> PlaybackState {
        self.state
    }

    pub fn volume(&self) -> f32 {
        self.volume
    }

    pub fn is_looping(&self) -> bool {
        self.looping
    }

    pub fn is_muted(&self) -> bool {
        self.muted
    }

    pub fn spatial(&self) -> &SpatialAttributes {
        &self.spatial
    }

    pub fn position_mode(&self) -> PositionMode {
        self.placement.position_mode()
    }

    pub fn world_position(&self) -> Vec3 {
        self.placement.world_position()
    }

    pub fn attachment_target(&self) -> Option<EntityRef> {
        self.placement.attachment().map(|a| a.target)
    }

    pub fn refresh_interval(&self) -> Duration {
        self.refresh_interval
    }

    /// Time accumulated toward the next refresh
    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    /// Number of fetches begun; the first fetch is generation 1
    pub fn fetch_generation(&self) -> u64 {
        self.cursor.generation
    }

    pub fn fetch_status(&self) -> FetchStatus {
        if self.cursor.delivered {
            FetchStatus::Loaded
        } else {
            FetchStatus::Loading
        }
    }

    pub fn voice(&self) -> VoiceParams {
        VoiceParams {
            state: self.state,
            volume: self.volume,
            looping: self.looping,
            muted: self.muted,
            spatial: self.spatial,
            position_mode: self.placement.position_mode(),
            world_position: self.placement.world_position(),
        }
    }

    /// Paused -> Playing. Returns the transition when one happened.
    pub fn resume(&mut self) -> Option<(PlaybackState, PlaybackState)> {
        self.transition(PlaybackState::Playing)
    }

    /// Playing -> Paused. Returns the transition when one happened.
    pub fn pause(&mut self) -> Option<(PlaybackState, PlaybackState)> {
        self.transition(PlaybackState::Paused)
    }

    fn transition(&mut self, to: PlaybackState) -> Option<(PlaybackState, PlaybackState)> {
        if self.state == to {
            return None;
        }
        let from = self.state;
        self.state = to;
        self.dirty = true;
        Some((from, to))
    }

    pub fn set_volume(&mut self, volume: f32) -> bool {
        let Some(volume) = finite(volume) else { return false };
        self.volume = volume.clamp(0.0, 1.0);
        self.mark()
    }

    pub fn set_loop(&mut self, looping: bool) -> bool {
        self.looping = looping;
        self.mark()
    }

    pub fn set_mute(&mut self, muted: bool) -> bool {
        self.muted = muted;
        self.mark()
    }

    /// Preset for the spatial blend
    pub fn set_mode(&mut self, mode: AudioMode) -> bool {
        self.spatial.spatial_blend = mode.spatial_blend();
        self.mark()
    }

    pub fn set_spatial_blend(&mut self, blend: f32) -> bool {
        let Some(blend) = finite(blend) else { return false };
        self.spatial.spatial_blend = blend.clamp(0.0, 1.0);
        self.mark()
    }

    /// Spread angle in degrees
    pub fn set_spread(&mut self, spread: f32) -> bool {
        let Some(spread) = finite(spread) else { return false };
        self.spatial.spread = spread.clamp(0.0, 360.0);
        self.mark()
    }

    pub fn set_doppler_level(&mut self, level: f32) -> bool {
        let Some(level) = finite(level) else { return false };
        self.spatial.doppler_level = level.clamp(0.0, 5.0);
        self.mark()
    }

    pub fn set_rolloff_mode(&mut self, mode: RolloffMode) -> bool {
        self.spatial.rolloff_mode = mode;
        self.mark()
    }

    pub fn set_max_distance(&mut self, distance: f32) -> bool {
        let Some(distance) = finite(distance) else { return false };
        self.spatial.max_distance = distance.max(0.0);
        self.mark()
    }

    pub fn set_min_distance(&mut self, distance: f32) -> bool {
        let Some(distance) = finite(distance) else { return false };
        self.spatial.min_distance = distance.max(0.0);
        self.mark()
    }

    /// Refresh interval in seconds; must be positive
    pub fn set_interval(&mut self, seconds: f32) -> bool {
        match Duration::try_from_secs_f32(seconds) {
            Ok(interval) if !interval.is_zero() => {
                self.refresh_interval = interval;
                true
            }
            _ => {
                debug!("Ignoring refresh interval {} for {}", seconds, self.handle);
                false
            }
        }
    }

    /// Local offset when attached, world position when free
    pub fn set_position(&mut self, position: Vec3) -> bool {
        if finite(position.x).and(finite(position.y)).and(finite(position.z)).is_none() {
            return false;
        }
        self.placement.set_position(position);
        self.mark()
    }

    pub fn attach(&mut self, target: EntityRef, transform: Transform) -> bool {
        self.placement.attach(target, transform);
        self.mark()
    }

    pub fn deattach(&mut self) -> bool {
        self.placement.deattach() && self.mark()
    }

    fn mark(&mut self) -> bool {
        self.dirty = true;
        true
    }

    /// Clear and return the pending-voice-update flag
    pub(crate) fn take_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    /// Advance timers and the fetch by `dt`
    pub(crate) fn advance(
        &mut self,
        dt: Duration,
        fetcher: &dyn SourceFetcher,
        directory: &dyn EntityDirectory,
    ) -> TickReport {
        let mut report = TickReport::default();

        if self.placement.sync(directory) {
            self.dirty = true;
        }

        if self.is_stream {
            self.elapsed += dt;
            if self.elapsed >= self.refresh_interval {
                self.refresh(fetcher);
                report.refreshed = Some(self.cursor.generation);
            }
        }

        if let Some(task) = self.cursor.task.as_mut() {
            match task.poll() {
                FetchPoll::Pending => {}
                FetchPoll::Ready(clip) => {
                    self.cursor.task = None;
                    self.cursor.delivered = true;
                    report.delivered = Some(clip);
                }
                FetchPoll::Failed(e) => {
                    self.cursor.task = None;
                    report.failure = Some(e);
                }
            }
        }

        report
    }

    /// Abandon the current fetch and start the next generation
    fn refresh(&mut self, fetcher: &dyn SourceFetcher) {
        if self.cursor.task.take().is_some() {
            debug!("Abandoning unfinished fetch for {}", self.handle);
        }
        self.elapsed = Duration::ZERO;
        self.cursor.generation += 1;
        self.cursor.delivered = false;
        self.cursor.task = Some(fetcher.begin(&self.url, self.is_stream));
        debug!("Refreshing {} (generation {})", self.handle, self.cursor.generation);
    }

    /// Abandon any in-flight fetch
    pub(crate) fn release(&mut self) {
        self.cursor.task = None;
    }
}
