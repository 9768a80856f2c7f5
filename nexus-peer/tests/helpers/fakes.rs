//! Scripted collaborators for the audio session

use nexus_common::PlaybackHandle;
use nexus_peer::audio::{AudioClip, AudioSink, FetchPoll, FetchTask, SourceFetcher, VoiceParams};
use nexus_peer::Error;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// How a scripted fetch behaves
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Script {
    /// Never completes
    Pending,
    /// Completes on the nth poll
    ReadyAfter(usize),
    /// Fails on the nth poll
    FailAfter(usize),
}

#[derive(Debug)]
struct FetcherState {
    default: Script,
    per_url: HashMap<String, Script>,
    begun: Vec<(String, bool)>,
    abandoned: usize,
}

/// Fetcher whose tasks follow a per-URL script
#[derive(Debug, Clone)]
pub struct ScriptedFetcher {
    state: Arc<Mutex<FetcherState>>,
}

impl ScriptedFetcher {
    pub fn new(default: Script) -> Self {
        Self {
            state: Arc::new(Mutex::new(FetcherState {
                default,
                per_url: HashMap::new(),
                begun: Vec::new(),
                abandoned: 0,
            })),
        }
    }

    pub fn script(&self, url: &str, script: Script) {
        self.state.lock().unwrap().per_url.insert(url.to_string(), script);
    }

    /// URLs fetched so far, in order
    pub fn begun(&self) -> Vec<String> {
        self.state.lock().unwrap().begun.iter().map(|(url, _)| url.clone()).collect()
    }

    pub fn begin_count(&self) -> usize {
        self.state.lock().unwrap().begun.len()
    }

    /// Tasks dropped before they finished
    pub fn abandoned(&self) -> usize {
        self.state.lock().unwrap().abandoned
    }
}

impl SourceFetcher for ScriptedFetcher {
    fn begin(&self, url: &str, is_stream: bool) -> Box<dyn FetchTask> {
        let mut state = self.state.lock().unwrap();
        state.begun.push((url.to_string(), is_stream));
        let script = state.per_url.get(url).copied().unwrap_or(state.default);
        Box::new(ScriptedTask {
            script,
            polls: 0,
            finished: false,
            fetcher: Arc::clone(&self.state),
        })
    }
}

struct ScriptedTask {
    script: Script,
    polls: usize,
    finished: bool,
    fetcher: Arc<Mutex<FetcherState>>,
}

impl FetchTask for ScriptedTask {
    fn poll(&mut self) -> FetchPoll {
        self.polls += 1;
        match self.script {
            Script::ReadyAfter(n) if self.polls >= n => {
                self.finished = true;
                FetchPoll::Ready(super::test_clip())
            }
            Script::FailAfter(n) if self.polls >= n => {
                self.finished = true;
                FetchPoll::Failed(Error::Fetch("scripted failure".into()))
            }
            _ => FetchPoll::Pending,
        }
    }
}

impl Drop for ScriptedTask {
    fn drop(&mut self) {
        if !self.finished {
            if let Ok(mut state) = self.fetcher.lock() {
                state.abandoned += 1;
            }
        }
    }
}

/// One call made to the sink
#[derive(Debug, Clone, PartialEq)]
pub enum SinkCall {
    Open(PlaybackHandle, VoiceParams),
    Submit(PlaybackHandle, usize),
    Update(PlaybackHandle, VoiceParams),
    Close(PlaybackHandle),
}

/// Sink that records every call
#[derive(Debug, Clone, Default)]
pub struct RecordingSink {
    calls: Arc<Mutex<Vec<SinkCall>>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> Vec<SinkCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn opened(&self, handle: PlaybackHandle) -> usize {
        self.count(|c| matches!(c, SinkCall::Open(h, _) if *h == handle))
    }

    pub fn closed(&self, handle: PlaybackHandle) -> usize {
        self.count(|c| matches!(c, SinkCall::Close(h) if *h == handle))
    }

    pub fn submitted(&self, handle: PlaybackHandle) -> usize {
        self.count(|c| matches!(c, SinkCall::Submit(h, _) if *h == handle))
    }

    /// Most recent voice parameters sent for `handle`
    pub fn last_voice(&self, handle: PlaybackHandle) -> Option<VoiceParams> {
        self.calls.lock().unwrap().iter().rev().find_map(|c| match c {
            SinkCall::Open(h, v) | SinkCall::Update(h, v) if *h == handle => Some(*v),
            _ => None,
        })
    }

    fn count(&self, pred: impl Fn(&SinkCall) -> bool) -> usize {
        self.calls.lock().unwrap().iter().filter(|c| pred(c)).count()
    }
}

impl AudioSink for RecordingSink {
    fn open(&mut self, handle: PlaybackHandle, voice: &VoiceParams) {
        self.calls.lock().unwrap().push(SinkCall::Open(handle, *voice));
    }

    fn submit(&mut self, handle: PlaybackHandle, clip: AudioClip) {
        self.calls.lock().unwrap().push(SinkCall::Submit(handle, clip.frames()));
    }

    fn update(&mut self, handle: PlaybackHandle, voice: &VoiceParams) {
        self.calls.lock().unwrap().push(SinkCall::Update(handle, *voice));
    }

    fn close(&mut self, handle: PlaybackHandle) {
        self.calls.lock().unwrap().push(SinkCall::Close(handle));
    }
}
