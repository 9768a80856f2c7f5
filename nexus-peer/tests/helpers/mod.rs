//! Test helper modules for nexus-peer integration tests
//!
//! Provides reusable test infrastructure components:
//! - ScriptedFetcher: fetches whose outcome and timing the test decides
//! - RecordingSink: records every call the session makes to the output sink
//! - TestSession: an AudioSession wired to the two above
//! - audio_generator: in-memory WAV sources built with hound

#![allow(dead_code)]

pub mod audio_generator;
pub mod fakes;
pub mod session;

pub use fakes::{RecordingSink, Script, ScriptedFetcher, SinkCall};
pub use session::{
    authority, drain_events, envelope, foreign, play, router, test_clip, TestSession, TICK,
};
