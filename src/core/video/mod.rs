pub mod encoder;
pub mod error;
#[cfg(feature = "ffmpeg")]
pub mod ffmpeg;
pub mod frame;
pub mod sampler;
pub mod source;

pub use encoder::{encode_image, encode_stats, FramePayload, FramePayloads, FrameStats, ImagePayload};
pub use error::VideoError;
#[cfg(feature = "ffmpeg")]
pub use ffmpeg::{FfmpegOpener, FfmpegSource};
pub use frame::{Frame, RawFrame};
pub use sampler::{FrameSampler, SampleInterval};
pub use source::{StreamInfo, VideoOpener, VideoSource, VideoStream, DEFAULT_FPS};
