//! Output sink seam
//!
//! The mixer that actually renders voices lives outside this crate. The session
//! talks to it only through [`AudioSink`]: one voice per active handle, opened
//! on materialization and closed on disposal.

use crate::audio::types::{AudioClip, VoiceParams};
use nexus_common::PlaybackHandle;
use std::collections::HashMap;
use tracing::{debug, info};

/// Receives voice lifecycle and parameter changes from the session
pub trait AudioSink: Send {
    /// A resource was materialized for `handle`
    fn open(&mut self, handle: PlaybackHandle, voice: &VoiceParams);

    /// Decoded audio for `handle` is available (once per fetch generation)
    fn submit(&mut self, handle: PlaybackHandle, clip: AudioClip);

    /// Voice parameters changed
    fn update(&mut self, handle: PlaybackHandle, voice: &VoiceParams);

    /// The resource was disposed; release the voice
    fn close(&mut self, handle: PlaybackHandle);
}

/// Sink that only logs what a mixer would be told
#[derive(Debug, Default)]
pub struct TracingSink {
    voices: HashMap<PlaybackHandle, VoiceParams>,
}

impl TracingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn open_voices(&self) -> usize {
        self.voices.len()
    }
}

impl AudioSink for TracingSink {
    fn open(&mut self, handle: PlaybackHandle, voice: &VoiceParams) {
        debug!("Voice {} opened: state={}, volume={:.2}", handle, voice.state, voice.volume);
        self.voices.insert(handle, *voice);
    }

    fn submit(&mut self, handle: PlaybackHandle, clip: AudioClip) {
        info!(
            "Voice {} received clip: {:.1}s, {} Hz, {} ch",
            handle,
            clip.duration().as_secs_f32(),
            clip.sample_rate,
            clip.channels
        );
    }

    fn update(&mut self, handle: PlaybackHandle, voice: &VoiceParams) {
        if self.voices.get(&handle) == Some(voice) {
            return;
        }
        debug!(
            "Voice {} updated: state={}, gain={:.2}, loop={}, blend={:.2}, at {:?}",
            handle,
            voice.state,
            voice.effective_volume(),
            voice.looping,
            voice.spatial.spatial_blend,
            voice.world_position
        );
        self.voices.insert(handle, *voice);
    }

    fn close(&mut self, handle: PlaybackHandle) {
        if self.voices.remove(&handle).is_some() {
            debug!("Voice {} closed", handle);
        }
    }
}
