use super::report::FrameResult;
use crate::core::video::{Frame, StreamInfo};
use log::info;

/// One-way push of progress to a presentation layer. Nothing in the
/// pipeline depends on what an observer does.
pub trait PipelineObserver {
    fn on_stream_opened(&self, _info: &StreamInfo) {}

    fn on_frame_sampled(&self, _frame: &Frame) {}

    fn on_frame_analyzed(&self, _result: &FrameResult) {}

    fn on_advice(&self, _advice: &str) {}
}

pub struct NoopObserver;

impl PipelineObserver for NoopObserver {}

/// Writes progress to the log.
pub struct LogObserver;

impl PipelineObserver for LogObserver {
    fn on_stream_opened(&self, info: &StreamInfo) {
        info!(
            "Video duration: {:.1}s, FPS: {:.2}",
            info.duration_secs, info.fps
        );
    }

    fn on_frame_sampled(&self, frame: &Frame) {
        info!("{}", frame.caption());
    }

    fn on_frame_analyzed(&self, result: &FrameResult) {
        info!("AI description: {}", result.description);
    }

    fn on_advice(&self, advice: &str) {
        info!("📣 Coaching suggestions: {}", advice);
    }
}
