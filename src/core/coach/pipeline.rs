use super::aggregator::Aggregator;
use super::analyzer::{AnalyzerSettings, VisionAnalyzer};
use super::error::PipelineError;
use super::observer::PipelineObserver;
use super::prompts::PromptSet;
use super::report::{AnalysisReport, FrameResult};
use crate::core::config::{CoachConfig, FrameInterval};
use crate::core::llm::LanguageModel;
use crate::core::video::{FramePayloads, FrameSampler, SampleInterval, VideoOpener, VideoStream};
use log::{debug, info, warn};
use rayon::prelude::*;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineState {
    Idle,
    StreamOpened,
    Sampling,
    Encoding,
    Analyzing,
    Accumulating,
    Aggregating,
    Done,
    Cancelled,
    /// The stream could not be opened.
    Failed,
}

/// Shared abort switch, checked between sampled frames.
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    pub fn reset(&self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

enum SamplingEnd {
    Completed,
    Cancelled,
}

/// 流水线驱动 - 打开流、采样、编码、分析、累积、汇总
///
/// Owns the video stream for the duration of one [`run`](Self::run); the
/// stream is released on every exit path, unwinding included.
pub struct PipelineDriver<'a> {
    model: &'a dyn LanguageModel,
    prompts: &'a PromptSet,
    settings: AnalyzerSettings,
    batch_size: usize,
    jpeg_quality: u8,
    state: PipelineState,
    cancel: CancelFlag,
}

impl<'a> PipelineDriver<'a> {
    pub fn new(model: &'a dyn LanguageModel, prompts: &'a PromptSet, config: &CoachConfig) -> Self {
        Self {
            model,
            prompts,
            settings: AnalyzerSettings {
                vision_model: config.vision_model.clone(),
                text_model: config.text_model.clone(),
                fallback: config.fallback,
                max_tokens: config.max_tokens,
                temperature: config.temperature,
            },
            batch_size: config.batch_size.max(1),
            jpeg_quality: config.jpeg_quality,
            state: PipelineState::Idle,
            cancel: CancelFlag::new(),
        }
    }

    pub fn with_cancel_flag(mut self, cancel: CancelFlag) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn cancel_flag(&self) -> CancelFlag {
        self.cancel.clone()
    }

    pub fn state(&self) -> PipelineState {
        self.state
    }

    fn transition(&mut self, next: PipelineState) {
        if self.state != next {
            debug!("Pipeline: {:?} -> {:?}", self.state, next);
            self.state = next;
        }
    }

    pub fn run(
        &mut self,
        opener: &dyn VideoOpener,
        path: &Path,
        interval: FrameInterval,
        observer: &dyn PipelineObserver,
    ) -> Result<AnalysisReport, PipelineError> {
        self.transition(PipelineState::Idle);

        let mut stream = match VideoStream::open(opener, path) {
            Ok(stream) => stream,
            Err(e) => {
                warn!("❌ Failed to open {:?}: {}", path, e);
                self.transition(PipelineState::Failed);
                return Err(PipelineError::StreamOpen(e));
            }
        };
        self.transition(PipelineState::StreamOpened);

        let info = stream.info();
        info!(
            "🎬 Video duration: {:.1}s, FPS: {:.2}, frames: {}",
            info.duration_secs, info.fps, info.frame_count
        );
        observer.on_stream_opened(&info);

        let sample_interval = SampleInterval::from_fps(stream.fps(), interval.secs());
        info!(
            "Sampling every {} frames ({}s)",
            sample_interval.frames(),
            interval.secs()
        );

        let mut results = Vec::new();
        let end = self.sample_and_analyze(&mut stream, sample_interval, observer, &mut results);
        stream.close();

        if let SamplingEnd::Cancelled = end {
            info!("Analysis cancelled after {} frames", results.len());
            self.transition(PipelineState::Cancelled);
            return Err(PipelineError::Cancelled { results });
        }

        info!(
            "Analyzed {} frames ({} failed)",
            results.len(),
            results.iter().filter(|r| !r.is_usable()).count()
        );

        self.transition(PipelineState::Aggregating);
        let aggregator = Aggregator::new(
            self.model,
            self.prompts,
            &self.settings.text_model,
            self.settings.max_tokens,
            self.settings.temperature,
        );
        let outcome = aggregator.aggregate(&results);
        self.transition(PipelineState::Done);

        match outcome {
            Ok(advice) => {
                if let Some(advice) = &advice {
                    observer.on_advice(advice);
                }
                Ok(AnalysisReport { results, advice })
            }
            Err(source) => Err(PipelineError::Aggregation { source, results }),
        }
    }

    fn sample_and_analyze(
        &mut self,
        stream: &mut VideoStream,
        interval: SampleInterval,
        observer: &dyn PipelineObserver,
        results: &mut Vec<FrameResult>,
    ) -> SamplingEnd {
        let analyzer = VisionAnalyzer::new(self.model, self.prompts, self.settings.clone());
        let mut batch: Vec<(FramePayloads, f64)> = Vec::with_capacity(self.batch_size);

        self.transition(PipelineState::Sampling);
        for frame in FrameSampler::new(stream, interval) {
            if self.cancel.is_cancelled() {
                return SamplingEnd::Cancelled;
            }

            observer.on_frame_sampled(&frame);

            self.transition(PipelineState::Encoding);
            batch.push((
                FramePayloads::from_frame(&frame, self.jpeg_quality),
                frame.timestamp_secs,
            ));

            if batch.len() >= self.batch_size {
                self.analyze_batch(&analyzer, &mut batch, observer, results);
                self.transition(PipelineState::Sampling);
            }
        }

        // a cancel after the last frame was analyzed still gets its advice
        if !batch.is_empty() {
            if self.cancel.is_cancelled() {
                return SamplingEnd::Cancelled;
            }
            self.analyze_batch(&analyzer, &mut batch, observer, results);
        }
        SamplingEnd::Completed
    }

    /// Results come back in batch order whatever the execution order.
    fn analyze_batch(
        &mut self,
        analyzer: &VisionAnalyzer<'_>,
        batch: &mut Vec<(FramePayloads, f64)>,
        observer: &dyn PipelineObserver,
        results: &mut Vec<FrameResult>,
    ) {
        self.transition(PipelineState::Analyzing);
        let analyzed: Vec<FrameResult> = if batch.len() == 1 {
            batch
                .iter()
                .map(|(payloads, ts)| analyzer.analyze(payloads, *ts))
                .collect()
        } else {
            batch
                .par_iter()
                .map(|(payloads, ts)| analyzer.analyze(payloads, *ts))
                .collect()
        };
        batch.clear();

        self.transition(PipelineState::Accumulating);
        for result in analyzed {
            observer.on_frame_analyzed(&result);
            results.push(result);
        }
    }
}
