//! Audio fetch, decode, and output seams

pub mod decoder;
pub mod fetch;
pub mod sink;
pub mod types;

pub use decoder::{DecodeStep, IncrementalDecoder};
pub use fetch::{FetchPoll, FetchTask, HttpFetcher, SourceFetcher};
pub use sink::{AudioSink, TracingSink};
pub use types::{AudioClip, SpatialAttributes, VoiceParams};
