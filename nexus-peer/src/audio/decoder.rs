//! Incremental audio decoder using symphonia
//!
//! Decodes an in-memory source (MP3, FLAC, AAC, Vorbis, WAV) to interleaved f32
//! a bounded number of packets at a time, so a large file never stalls a tick.
//!
//! **Behavior:**
//! - Probes the format from the bytes, using the URL extension as a hint
//! - Decodes the first track with a known codec
//! - Packets that fail to decode are skipped with a warning
//! - End of data finishes the clip; a clip with no samples is an error

use crate::audio::types::AudioClip;
use crate::error::{Error, Result};
use std::io::Cursor;
use symphonia::core::audio::SampleBuffer;
use symphonia::core::codecs::{Decoder, DecoderOptions, CODEC_TYPE_NULL};
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::{FormatOptions, FormatReader};
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;
use tracing::{debug, warn};

/// Progress of one [`IncrementalDecoder::step`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodeStep {
    /// More packets remain
    Continue,
    /// All packets consumed; call [`IncrementalDecoder::finish`]
    Finished,
}

/// Decoder that consumes a source a few packets at a time
pub struct IncrementalDecoder {
    format: Box<dyn FormatReader>,
    decoder: Box<dyn Decoder>,
    track_id: u32,
    sample_rate: Option<u32>,
    channels: Option<u16>,
    samples: Vec<f32>,
    skipped_packets: usize,
}

impl IncrementalDecoder {
    /// Probe `bytes` and prepare a decoder for its default audio track
    pub fn open(bytes: Vec<u8>, extension_hint: Option<&str>) -> Result<Self> {
        let source_len = bytes.len();
        let mss = MediaSourceStream::new(Box::new(Cursor::new(bytes)), Default::default());

        let mut hint = Hint::new();
        if let Some(ext) = extension_hint {
            hint.with_extension(ext);
        }

        let probed = symphonia::default::get_probe()
            .format(&hint, mss, &FormatOptions::default(), &MetadataOptions::default())
            .map_err(|e| Error::Decode(format!("Failed to probe format: {}", e)))?;

        let format = probed.format;

        let track = format
            .tracks()
            .iter()
            .find(|t| t.codec_params.codec != CODEC_TYPE_NULL)
            .ok_or_else(|| Error::Decode("No audio track found".to_string()))?;

        let track_id = track.id;
        let sample_rate = track.codec_params.sample_rate;
        let channels = track.codec_params.channels.map(|c| c.count() as u16);

        let decoder = symphonia::default::get_codecs()
            .make(&track.codec_params, &DecoderOptions::default())
            .map_err(|e| Error::Decode(format!("Failed to create decoder: {}", e)))?;

        debug!(
            "Opened source: {} bytes, sample_rate={:?}, channels={:?}",
            source_len, sample_rate, channels
        );

        Ok(Self {
            format,
            decoder,
            track_id,
            sample_rate,
            channels,
            samples: Vec::new(),
            skipped_packets: 0,
        })
    }

    /// Decode up to `max_packets` packets
    pub fn step(&mut self, max_packets: usize) -> Result<DecodeStep> {
        for _ in 0..max_packets.max(1) {
            let packet = match self.format.next_packet() {
                Ok(packet) => packet,
                Err(SymphoniaError::IoError(ref e))
                    if e.kind() == std::io::ErrorKind::UnexpectedEof =>
                {
                    return Ok(DecodeStep::Finished);
                }
                Err(SymphoniaError::ResetRequired) => {
                    debug!("Track list changed mid-source, stopping");
                    return Ok(DecodeStep::Finished);
                }
                Err(SymphoniaError::IoError(e)) => {
                    // Truncated stream buffers end mid-packet
                    debug!("Source ended early: {}", e);
                    return Ok(DecodeStep::Finished);
                }
                Err(e) => return Err(Error::Decode(format!("Failed to read packet: {}", e))),
            };

            if packet.track_id() != self.track_id {
                continue;
            }

            match self.decoder.decode(&packet) {
                Ok(decoded) => {
                    let spec = *decoded.spec();
                    self.sample_rate.get_or_insert(spec.rate);
                    self.channels.get_or_insert(spec.channels.count() as u16);

                    let mut buf = SampleBuffer::<f32>::new(decoded.capacity() as u64, spec);
                    buf.copy_interleaved_ref(decoded);
                    self.samples.extend_from_slice(buf.samples());
                }
                Err(SymphoniaError::DecodeError(e)) => {
                    self.skipped_packets += 1;
                    warn!("Decode error, skipping packet: {}", e);
                }
                Err(e) => return Err(Error::Decode(format!("Decoder failed: {}", e))),
            }
        }
        Ok(DecodeStep::Continue)
    }

    /// Samples decoded so far (interleaved)
    pub fn decoded_samples(&self) -> usize {
        self.samples.len()
    }

    /// Consume the decoder and return the clip
    pub fn finish(self) -> Result<AudioClip> {
        let (Some(sample_rate), Some(channels)) = (self.sample_rate, self.channels) else {
            return Err(Error::Decode("Source format is missing sample rate or channels".into()));
        };
        if self.samples.is_empty() {
            return Err(Error::Decode("Source contained no decodable audio".into()));
        }
        if self.skipped_packets > 0 {
            debug!("Finished clip with {} skipped packets", self.skipped_packets);
        }
        Ok(AudioClip::new(self.samples, sample_rate, channels))
    }

    /// Decode a whole source in one call
    pub fn decode_all(bytes: Vec<u8>, extension_hint: Option<&str>) -> Result<AudioClip> {
        let mut decoder = Self::open(bytes, extension_hint)?;
        while decoder.step(usize::MAX)? == DecodeStep::Continue {}
        decoder.finish()
    }
}
