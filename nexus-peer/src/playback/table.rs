//! Resource table
//!
//! Owns every active resource of a session, keyed by handle. Iteration is in
//! handle order so ticks and snapshots are deterministic.

use crate::playback::resource::PlaybackResource;
use nexus_common::events::PlaybackState;
use nexus_common::PlaybackHandle;
use std::collections::BTreeMap;

#[derive(Debug, Default)]
pub struct ResourceTable {
    resources: BTreeMap<PlaybackHandle, PlaybackResource>,
}

impl ResourceTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, handle: PlaybackHandle) -> bool {
        self.resources.contains_key(&handle)
    }

    pub fn get(&self, handle: PlaybackHandle) -> Option<&PlaybackResource> {
        self.resources.get(&handle)
    }

    pub fn get_mut(&mut self, handle: PlaybackHandle) -> Option<&mut PlaybackResource> {
        self.resources.get_mut(&handle)
    }

    /// Insert, returning any resource previously stored under the same handle
    pub fn insert(&mut self, resource: PlaybackResource) -> Option<PlaybackResource> {
        self.resources.insert(resource.handle(), resource)
    }

    pub fn remove(&mut self, handle: PlaybackHandle) -> Option<PlaybackResource> {
        self.resources.remove(&handle)
    }

    /// Remove every resource, in handle order
    pub fn drain(&mut self) -> Vec<PlaybackResource> {
        std::mem::take(&mut self.resources).into_values().collect()
    }

    pub fn len(&self) -> usize {
        self.resources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.resources.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &PlaybackResource> {
        self.resources.values()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut PlaybackResource> {
        self.resources.values_mut()
    }

    pub fn playing_count(&self) -> usize {
        self.iter().filter(|r| r.state() == PlaybackState::Playing).count()
    }

    pub fn stream_count(&self) -> usize {
        self.iter().filter(|r| r.is_stream()).count()
    }
}
