//! Core audio data types
//!
//! Decoded clips handed to the output sink, and the per-voice parameters the
//! sink applies while mixing.

use nexus_common::events::PlaybackState;
use nexus_common::spatial::{PositionMode, RolloffMode, Vec3};
use serde::Serialize;
use std::time::Duration;

/// Fully decoded source audio
///
/// **Format:**
/// - Samples are f32 (floating point -1.0 to 1.0)
/// - Interleaved by channel: [L, R, L, R, ...] for stereo
/// - Sample rate is the source's own; resampling belongs to the mixer
#[derive(Debug, Clone, PartialEq)]
pub struct AudioClip {
    pub samples: Vec<f32>,
    pub sample_rate: u32,
    pub channels: u16,
}

impl AudioClip {
    pub fn new(samples: Vec<f32>, sample_rate: u32, channels: u16) -> Self {
        Self { samples, sample_rate, channels }
    }

    /// Number of sample frames (samples per channel)
    pub fn frames(&self) -> usize {
        if self.channels == 0 {
            return 0;
        }
        self.samples.len() / self.channels as usize
    }

    pub fn duration(&self) -> Duration {
        if self.sample_rate == 0 {
            return Duration::ZERO;
        }
        Duration::from_secs_f64(self.frames() as f64 / f64::from(self.sample_rate))
    }
}

/// 3D attenuation settings of a resource
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SpatialAttributes {
    /// 0.0 = non-positional, 1.0 = fully positional
    pub spatial_blend: f32,
    /// Stereo spread in degrees (0-360)
    pub spread: f32,
    pub doppler_level: f32,
    pub rolloff_mode: RolloffMode,
    pub min_distance: f32,
    pub max_distance: f32,
}

impl Default for SpatialAttributes {
    fn default() -> Self {
        Self {
            spatial_blend: 0.0,
            spread: 0.0,
            doppler_level: 1.0,
            rolloff_mode: RolloffMode::Logarithmic,
            min_distance: 1.0,
            max_distance: 500.0,
        }
    }
}

/// Everything the sink needs to render one voice
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VoiceParams {
    pub state: PlaybackState,
    pub volume: f32,
    pub looping: bool,
    pub muted: bool,
    pub spatial: SpatialAttributes,
    pub position_mode: PositionMode,
    /// Resolved world-space emitter position
    pub world_position: Vec3,
}

impl VoiceParams {
    /// Gain after mute is applied
    pub fn effective_volume(&self) -> f32 {
        if self.muted {
            0.0
        } else {
            self.volume
        }
    }

    pub fn is_audible(&self) -> bool {
        self.state == PlaybackState::Playing && self.effective_volume() > 0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cgmath::Zero;

    #[test]
    fn test_clip_frames_and_duration() {
        let clip = AudioClip::new(vec![0.0; 88_200], 44_100, 2);
        assert_eq!(clip.frames(), 44_100);
        assert_eq!(clip.duration(), Duration::from_secs(1));
    }

    #[test]
    fn test_degenerate_clip() {
        let clip = AudioClip::new(vec![0.0; 10], 0, 0);
        assert_eq!(clip.frames(), 0);
        assert_eq!(clip.duration(), Duration::ZERO);
    }

    #[test]
    fn test_mute_silences_voice() {
        let voice = VoiceParams {
            state: PlaybackState::Playing,
            volume: 0.8,
            looping: false,
            muted: true,
            spatial: SpatialAttributes::default(),
            position_mode: PositionMode::World,
            world_position: Vec3::zero(),
        };
        assert_eq!(voice.effective_volume(), 0.0);
        assert!(!voice.is_audible());
    }
}
