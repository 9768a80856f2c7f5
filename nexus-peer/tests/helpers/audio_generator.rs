//! In-memory WAV generation for decoder tests
//!
//! Sources are built as byte vectors so they can be handed straight to the
//! decoder, the same way downloaded bodies are.

use hound::{SampleFormat, WavSpec, WavWriter};
use std::f32::consts::PI;
use std::io::Cursor;

/// Standard test sample rate (44.1 kHz)
pub const TEST_SAMPLE_RATE: u32 = 44_100;

/// 16-bit PCM sine wave, same signal on every channel
pub fn sine_wav(channels: u16, frames: u32, frequency_hz: f32, amplitude: f32) -> Vec<u8> {
    let spec = WavSpec {
        channels,
        sample_rate: TEST_SAMPLE_RATE,
        bits_per_sample: 16,
        sample_format: SampleFormat::Int,
    };

    let mut cursor = Cursor::new(Vec::new());
    {
        let mut writer = WavWriter::new(&mut cursor, spec).unwrap();
        for n in 0..frames {
            let t = n as f32 / TEST_SAMPLE_RATE as f32;
            let value = (2.0 * PI * frequency_hz * t).sin() * amplitude;
            let sample = (value * i16::MAX as f32) as i16;
            for _ in 0..channels {
                writer.write_sample(sample).unwrap();
            }
        }
        writer.finalize().unwrap();
    }
    cursor.into_inner()
}

/// Silent stereo WAV
pub fn silent_wav(frames: u32) -> Vec<u8> {
    sine_wav(2, frames, 0.0, 0.0)
}
