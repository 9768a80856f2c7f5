//! Playback handles
//!
//! A handle is the only name a peer knows a playback resource by. Handles are
//! issued by the authority, one counter per authority session, and carried on
//! every command that targets a resource.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque, session-scoped identifier for a playback resource
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlaybackHandle(i32);

impl PlaybackHandle {
    pub const fn new(raw: i32) -> Self {
        Self(raw)
    }

    pub const fn raw(self) -> i32 {
        self.0
    }
}

impl From<i32> for PlaybackHandle {
    fn from(raw: i32) -> Self {
        Self(raw)
    }
}

impl From<PlaybackHandle> for i32 {
    fn from(handle: PlaybackHandle) -> Self {
        handle.0
    }
}

impl fmt::Display for PlaybackHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Monotonic handle counter for one authority session
///
/// The first handle issued is 1. [`HandleAllocator::reset`] is called when the
/// session ends; handles issued before the reset are meaningless afterwards
/// because every peer tears down its resources on the same boundary.
#[derive(Debug, Default)]
pub struct HandleAllocator {
    last: i32,
}

impl HandleAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Issue the next handle
    pub fn next(&mut self) -> PlaybackHandle {
        // Wraps back to 1 rather than issuing zero or negative handles
        self.last = match self.last.checked_add(1) {
            Some(next) => next,
            None => 1,
        };
        PlaybackHandle(self.last)
    }

    /// Most recently issued handle, if any
    pub fn last(&self) -> Option<PlaybackHandle> {
        (self.last > 0).then_some(PlaybackHandle(self.last))
    }

    /// Forget all issued handles (session ended)
    pub fn reset(&mut self) {
        self.last = 0;
    }
}
