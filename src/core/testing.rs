//! Hand-written collaborators for tests.

use crate::core::llm::{ChatRequest, LanguageModel, LlmError};
use crate::core::video::{RawFrame, VideoError, VideoOpener, VideoSource};
use std::collections::VecDeque;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

#[derive(Debug, Clone, Default)]
pub struct ReleaseCounter(Arc<AtomicUsize>);

impl ReleaseCounter {
    pub fn get(&self) -> usize {
        self.0.load(Ordering::SeqCst)
    }
}

/// Generates `frame_count` small I420 frames; luma follows the frame number.
pub struct SyntheticSource {
    fps: f64,
    frame_count: u64,
    next: u64,
    releases: ReleaseCounter,
}

impl SyntheticSource {
    pub fn new(fps: f64, frame_count: u64) -> Self {
        Self {
            fps,
            frame_count,
            next: 0,
            releases: ReleaseCounter::default(),
        }
    }

    pub fn release_counter(&self) -> ReleaseCounter {
        self.releases.clone()
    }
}

impl VideoSource for SyntheticSource {
    fn fps(&self) -> f64 {
        self.fps
    }

    fn frame_count(&self) -> u64 {
        self.frame_count
    }

    fn read_next_frame(&mut self) -> Option<RawFrame> {
        if self.next >= self.frame_count {
            return None;
        }
        let luma = (self.next % 256) as u8;
        self.next += 1;
        Some(RawFrame::filled(8, 6, luma))
    }

    fn release(&mut self) {
        self.releases.0.fetch_add(1, Ordering::SeqCst);
    }
}

/// Opens a fresh [`SyntheticSource`] per call, or fails like an undecodable file.
pub struct SyntheticOpener {
    shape: Option<(f64, u64)>,
    releases: ReleaseCounter,
}

impl SyntheticOpener {
    pub fn new(fps: f64, frame_count: u64) -> Self {
        Self {
            shape: Some((fps, frame_count)),
            releases: ReleaseCounter::default(),
        }
    }

    pub fn failing() -> Self {
        Self {
            shape: None,
            releases: ReleaseCounter::default(),
        }
    }

    pub fn release_counter(&self) -> ReleaseCounter {
        self.releases.clone()
    }
}

impl VideoOpener for SyntheticOpener {
    fn open(&self, path: &Path) -> Result<Box<dyn VideoSource>, VideoError> {
        match self.shape {
            Some((fps, frame_count)) => {
                let mut source = SyntheticSource::new(fps, frame_count);
                source.releases = self.releases.clone();
                Ok(Box::new(source))
            }
            None => Err(VideoError::Open {
                path: path.to_path_buf(),
                reason: "invalid data found when processing input".to_string(),
            }),
        }
    }
}

/// Replies from a queue in call order and records every request.
/// An exhausted queue answers with an API error.
#[derive(Default)]
pub struct ScriptedModel {
    replies: Mutex<VecDeque<Result<String, LlmError>>>,
    requests: Mutex<Vec<ChatRequest>>,
}

impl ScriptedModel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reply(self, text: &str) -> Self {
        self.push(Ok(text.to_string()))
    }

    pub fn fail(self) -> Self {
        self.push(Err(LlmError::Api {
            status: 503,
            body: "service unavailable".to_string(),
        }))
    }

    fn push(self, reply: Result<String, LlmError>) -> Self {
        if let Ok(mut replies) = self.replies.lock() {
            replies.push_back(reply);
        }
        self
    }

    pub fn requests(&self) -> Vec<ChatRequest> {
        self.requests.lock().map(|r| r.clone()).unwrap_or_default()
    }
}

impl LanguageModel for ScriptedModel {
    fn complete(&self, request: &ChatRequest) -> Result<String, LlmError> {
        if let Ok(mut requests) = self.requests.lock() {
            requests.push(request.clone());
        }
        self.replies
            .lock()
            .ok()
            .and_then(|mut replies| replies.pop_front())
            .unwrap_or_else(|| {
                Err(LlmError::Api {
                    status: 500,
                    body: "no scripted reply".to_string(),
                })
            })
    }
}

/// Always fails; for tests that only care about fallback/failure paths.
pub struct FailingModel;

impl LanguageModel for FailingModel {
    fn complete(&self, _request: &ChatRequest) -> Result<String, LlmError> {
        Err(LlmError::MalformedResponse("empty completion".to_string()))
    }
}
