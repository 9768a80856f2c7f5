//! Source fetching
//!
//! A fetch is started by [`SourceFetcher::begin`] and then driven entirely by
//! the tick loop through [`FetchTask::poll`]. Nothing runs in the background:
//! dropping a task abandons it.
//!
//! **Responsibilities:**
//! - Download the source over HTTP with size and time bounds
//! - Decode the downloaded bytes incrementally into an [`AudioClip`]

use crate::audio::decoder::{DecodeStep, IncrementalDecoder};
use crate::audio::types::AudioClip;
use crate::config::FetchConfig;
use crate::error::{Error, Result};
use futures::future::BoxFuture;
use std::task::{Context, Poll};
use std::time::Duration;
use tracing::{debug, warn};

/// Result of polling a fetch once
#[derive(Debug)]
pub enum FetchPoll {
    /// Still downloading or decoding
    Pending,
    /// Source fully decoded
    Ready(AudioClip),
    /// Fetch failed; the task is finished
    Failed(Error),
}

/// An in-flight fetch, advanced one step per tick
pub trait FetchTask: Send {
    fn poll(&mut self) -> FetchPoll;
}

/// Starts fetches for resource sources
pub trait SourceFetcher: Send {
    /// Begin fetching `url`. Stream sources are buffered up to a cap instead of
    /// read to the end.
    fn begin(&self, url: &str, is_stream: bool) -> Box<dyn FetchTask>;
}

/// File extension of the last path segment, used as a decoder hint
pub fn extension_hint(url: &str) -> Option<&str> {
    let path = url.split(['?', '#']).next()?;
    let last = path.rsplit('/').next()?;
    let (_, ext) = last.rsplit_once('.')?;
    if ext.is_empty() || ext.len() > 5 {
        return None;
    }
    Some(ext)
}

/// reqwest-backed fetcher with symphonia decoding
pub struct HttpFetcher {
    client: reqwest::Client,
    max_source_bytes: u64,
    stream_buffer_bytes: u64,
    decode_packets_per_tick: usize,
}

impl HttpFetcher {
    pub fn new(config: &FetchConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| Error::Fetch(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            max_source_bytes: config.max_source_bytes,
            stream_buffer_bytes: config.stream_buffer_bytes,
            decode_packets_per_tick: config.decode_packets_per_tick,
        })
    }
}

impl SourceFetcher for HttpFetcher {
    fn begin(&self, url: &str, is_stream: bool) -> Box<dyn FetchTask> {
        let limit = if is_stream {
            BodyLimit::Truncate(self.stream_buffer_bytes)
        } else {
            BodyLimit::Fail(self.max_source_bytes)
        };
        debug!("Starting fetch of {} (stream={})", url, is_stream);

        Box::new(HttpFetchTask {
            url: url.to_string(),
            stage: Stage::Downloading(Box::pin(download(self.client.clone(), url.to_string(), limit))),
            packets_per_poll: self.decode_packets_per_tick,
        })
    }
}

#[derive(Debug, Clone, Copy)]
enum BodyLimit {
    /// Bodies larger than this are an error
    Fail(u64),
    /// Stop reading once this many bytes are buffered
    Truncate(u64),
}

async fn download(client: reqwest::Client, url: String, limit: BodyLimit) -> Result<Vec<u8>> {
    let mut response = client
        .get(&url)
        .send()
        .await
        .and_then(|r| r.error_for_status())
        .map_err(|e| Error::Fetch(format!("GET {} failed: {}", url, e)))?;

    if let (BodyLimit::Fail(max), Some(len)) = (limit, response.content_length()) {
        if len > max {
            return Err(Error::Fetch(format!("{} is {} bytes, limit is {}", url, len, max)));
        }
    }

    let mut body = Vec::new();
    while let Some(chunk) = response
        .chunk()
        .await
        .map_err(|e| Error::Fetch(format!("Reading body of {} failed: {}", url, e)))?
    {
        let total = body.len() as u64 + chunk.len() as u64;
        match limit {
            BodyLimit::Fail(max) if total > max => {
                return Err(Error::Fetch(format!("{} exceeds {} bytes", url, max)));
            }
            BodyLimit::Truncate(cap) if total >= cap => {
                let keep = (cap as usize).saturating_sub(body.len());
                body.extend_from_slice(&chunk[..keep.min(chunk.len())]);
                debug!("Stream buffer for {} full at {} bytes", url, body.len());
                break;
            }
            _ => body.extend_from_slice(&chunk),
        }
    }
    Ok(body)
}

enum Stage {
    Downloading(BoxFuture<'static, Result<Vec<u8>>>),
    Decoding(IncrementalDecoder),
    Done,
}

struct HttpFetchTask {
    url: String,
    stage: Stage,
    packets_per_poll: usize,
}

impl FetchTask for HttpFetchTask {
    fn poll(&mut self) -> FetchPoll {
        match std::mem::replace(&mut self.stage, Stage::Done) {
            Stage::Downloading(mut download) => {
                let mut cx = Context::from_waker(futures::task::noop_waker_ref());
                match download.as_mut().poll(&mut cx) {
                    Poll::Pending => {
                        self.stage = Stage::Downloading(download);
                        FetchPoll::Pending
                    }
                    Poll::Ready(Err(e)) => FetchPoll::Failed(e),
                    Poll::Ready(Ok(bytes)) => {
                        debug!("Downloaded {} bytes from {}", bytes.len(), self.url);
                        match IncrementalDecoder::open(bytes, extension_hint(&self.url)) {
                            Ok(decoder) => {
                                self.stage = Stage::Decoding(decoder);
                                FetchPoll::Pending
                            }
                            Err(e) => FetchPoll::Failed(e),
                        }
                    }
                }
            }
            Stage::Decoding(mut decoder) => match decoder.step(self.packets_per_poll) {
                Ok(DecodeStep::Continue) => {
                    self.stage = Stage::Decoding(decoder);
                    FetchPoll::Pending
                }
                Ok(DecodeStep::Finished) => match decoder.finish() {
                    Ok(clip) => FetchPoll::Ready(clip),
                    Err(e) => FetchPoll::Failed(e),
                },
                Err(e) => {
                    warn!("Decoding {} failed: {}", self.url, e);
                    FetchPoll::Failed(e)
                }
            },
            Stage::Done => FetchPoll::Failed(Error::Fetch(format!(
                "fetch of {} polled after completion",
                self.url
            ))),
        }
    }
}
