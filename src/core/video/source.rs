//! 视频源 - 解码协作者抽象与流句柄

use super::error::VideoError;
use super::frame::RawFrame;
use log::{debug, info};
use std::path::Path;

/// Substituted when the container reports no usable frame rate.
pub const DEFAULT_FPS: f64 = 30.0;

/// A decoded video, read strictly front to back.
pub trait VideoSource {
    /// Frame rate as reported by the container; may be 0.
    fn fps(&self) -> f64;

    fn frame_count(&self) -> u64;

    /// Next decoded frame, `None` at end of stream.
    fn read_next_frame(&mut self) -> Option<RawFrame>;

    /// Release decoder resources. Called exactly once by [`VideoStream`].
    fn release(&mut self) {}
}

/// Opens a video file into a [`VideoSource`].
pub trait VideoOpener: Send + Sync {
    fn open(&self, path: &Path) -> Result<Box<dyn VideoSource>, VideoError>;
}

/// 流概要（时长、帧率）
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StreamInfo {
    pub fps: f64,
    pub frame_count: u64,
    pub duration_secs: f64,
}

/// Exclusively owned stream handle. The underlying source is released once,
/// either through [`VideoStream::close`] or on drop.
pub struct VideoStream {
    source: Box<dyn VideoSource>,
    fps: f64,
    frame_count: u64,
    released: bool,
}

impl VideoStream {
    pub fn open(opener: &dyn VideoOpener, path: &Path) -> Result<Self, VideoError> {
        let source = opener.open(path)?;
        Ok(Self::from_source(source))
    }

    pub fn from_source(source: Box<dyn VideoSource>) -> Self {
        let reported = source.fps();
        let fps = if reported.is_finite() && reported > 0.0 {
            reported
        } else {
            debug!("Source reported fps {}, using {}", reported, DEFAULT_FPS);
            DEFAULT_FPS
        };
        let frame_count = source.frame_count();

        Self {
            source,
            fps,
            frame_count,
            released: false,
        }
    }

    pub fn fps(&self) -> f64 {
        self.fps
    }

    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    pub fn duration_secs(&self) -> f64 {
        self.frame_count as f64 / self.fps
    }

    pub fn info(&self) -> StreamInfo {
        StreamInfo {
            fps: self.fps,
            frame_count: self.frame_count,
            duration_secs: self.duration_secs(),
        }
    }

    pub(crate) fn read_next_frame(&mut self) -> Option<RawFrame> {
        if self.released {
            return None;
        }
        self.source.read_next_frame()
    }

    pub fn close(mut self) {
        self.release();
    }

    fn release(&mut self) {
        if !self.released {
            self.released = true;
            self.source.release();
            info!("🗑️ VideoStream: released");
        }
    }
}

impl Drop for VideoStream {
    fn drop(&mut self) {
        self.release();
    }
}
