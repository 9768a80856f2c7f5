//! Playback request queue
//!
//! FIFO of admitted `Play` requests waiting to be materialized, one per tick.
//! A handle appears at most once: a second `Play` for a queued handle replaces
//! that request in place and keeps its position.

use nexus_common::PlaybackHandle;
use serde::Serialize;
use std::collections::VecDeque;

/// A `Play` request that passed admission
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlaybackRequest {
    pub url: String,
    pub handle: PlaybackHandle,
    pub is_stream: bool,
    pub auto_start: bool,
}

/// What [`PlaybackQueue::enqueue`] did with a request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Enqueued {
    /// Appended at the back
    Appended,
    /// Replaced an earlier request for the same handle
    Superseded,
}

/// FIFO of pending playback requests
#[derive(Debug, Default)]
pub struct PlaybackQueue {
    entries: VecDeque<PlaybackRequest>,
}

impl PlaybackQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn enqueue(&mut self, request: PlaybackRequest) -> Enqueued {
        if let Some(slot) = self.entries.iter_mut().find(|r| r.handle == request.handle) {
            *slot = request;
            return Enqueued::Superseded;
        }
        self.entries.push_back(request);
        Enqueued::Appended
    }

    pub fn pop_front(&mut self) -> Option<PlaybackRequest> {
        self.entries.pop_front()
    }

    pub fn contains(&self, handle: PlaybackHandle) -> bool {
        self.entries.iter().any(|r| r.handle == handle)
    }

    /// Drop the pending request for `handle`, if any
    pub fn remove(&mut self, handle: PlaybackHandle) -> Option<PlaybackRequest> {
        let index = self.entries.iter().position(|r| r.handle == handle)?;
        self.entries.remove(index)
    }

    /// Drop every pending request, returning how many there were
    pub fn clear(&mut self) -> usize {
        let count = self.entries.len();
        self.entries.clear();
        count
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &PlaybackRequest> {
        self.entries.iter()
    }
}
