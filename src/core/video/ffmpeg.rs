//! FFmpeg 解码器适配

use super::error::VideoError;
use super::frame::RawFrame;
use super::source::{VideoOpener, VideoSource};
use ffmpeg_next as ffmpeg;
use ffmpeg::{
    codec::context::Context as CodecContext,
    decoder::Video as VideoDecoder,
    format::{context::Input, Pixel},
    frame::Video as VideoFrame,
    software::scaling::{Context as ScalingContext, Flags as ScalingFlags},
    Packet,
};
use log::{debug, info, warn};
use std::path::Path;

#[derive(Debug, Default, Clone, Copy)]
pub struct FfmpegOpener;

impl VideoOpener for FfmpegOpener {
    fn open(&self, path: &Path) -> Result<Box<dyn VideoSource>, VideoError> {
        Ok(Box::new(FfmpegSource::open(path)?))
    }
}

/// Sequential decoder producing I420 frames.
pub struct FfmpegSource {
    input: Input,
    decoder: VideoDecoder,
    scaler: ScalingContext,
    stream_index: usize,
    fps: f64,
    frame_count: u64,
    decoded: VideoFrame,
    eof_sent: bool,
}

impl FfmpegSource {
    pub fn open(path: &Path) -> Result<Self, VideoError> {
        let open_err = |e: ffmpeg::Error| VideoError::Open {
            path: path.to_path_buf(),
            reason: e.to_string(),
        };

        ffmpeg::init().map_err(open_err)?;
        let input = ffmpeg::format::input(&path).map_err(open_err)?;

        let stream = input
            .streams()
            .best(ffmpeg::media::Type::Video)
            .ok_or(VideoError::NoVideoStream)?;
        let stream_index = stream.index();

        let rate = stream.avg_frame_rate();
        let fps = if rate.denominator() != 0 {
            f64::from(rate)
        } else {
            0.0
        };

        let mut frame_count = stream.frames().max(0) as u64;
        if frame_count == 0 && fps > 0.0 && input.duration() > 0 {
            // container without a frame count, estimate from duration
            let duration_secs = input.duration() as f64 / f64::from(ffmpeg::ffi::AV_TIME_BASE);
            frame_count = (duration_secs * fps).round() as u64;
        }

        let decoder = CodecContext::from_parameters(stream.parameters())
            .and_then(|ctx| ctx.decoder().video())
            .map_err(open_err)?;

        let scaler = ScalingContext::get(
            decoder.format(),
            decoder.width(),
            decoder.height(),
            Pixel::YUV420P,
            decoder.width(),
            decoder.height(),
            ScalingFlags::BILINEAR,
        )
        .map_err(open_err)?;

        info!(
            "🎬 FfmpegSource: opened {:?} ({}x{}, {:.2} fps, {} frames)",
            path,
            decoder.width(),
            decoder.height(),
            fps,
            frame_count
        );

        Ok(Self {
            input,
            decoder,
            scaler,
            stream_index,
            fps,
            frame_count,
            decoded: VideoFrame::empty(),
            eof_sent: false,
        })
    }

    fn convert(&mut self) -> Option<RawFrame> {
        let mut yuv = VideoFrame::empty();
        if let Err(e) = self.scaler.run(&self.decoded, &mut yuv) {
            warn!("⚠️ Pixel conversion failed: {}", e);
            return None;
        }

        let width = yuv.width();
        let height = yuv.height();
        let chroma_width = width.div_ceil(2) as usize;
        let chroma_height = height.div_ceil(2) as usize;

        Some(RawFrame {
            width,
            height,
            y_plane: copy_plane(&yuv, 0, width as usize, height as usize),
            u_plane: copy_plane(&yuv, 1, chroma_width, chroma_height),
            v_plane: copy_plane(&yuv, 2, chroma_width, chroma_height),
        })
    }
}

/// Copy a plane row by row, dropping the line padding.
fn copy_plane(frame: &VideoFrame, plane: usize, width: usize, height: usize) -> Vec<u8> {
    let stride = frame.stride(plane);
    let data = frame.data(plane);
    let mut out = Vec::with_capacity(width * height);
    for row in 0..height {
        let start = row * stride;
        match data.get(start..start + width) {
            Some(line) => out.extend_from_slice(line),
            None => break,
        }
    }
    out
}

impl VideoSource for FfmpegSource {
    fn fps(&self) -> f64 {
        self.fps
    }

    fn frame_count(&self) -> u64 {
        self.frame_count
    }

    fn read_next_frame(&mut self) -> Option<RawFrame> {
        loop {
            if self.decoder.receive_frame(&mut self.decoded).is_ok() {
                return self.convert();
            }
            if self.eof_sent {
                return None;
            }

            let mut packet = Packet::empty();
            match packet.read(&mut self.input) {
                Ok(()) => {
                    if packet.stream() != self.stream_index {
                        continue;
                    }
                    if let Err(e) = self.decoder.send_packet(&packet) {
                        warn!("⚠️ Decoder rejected packet, ending stream: {}", e);
                        return None;
                    }
                }
                Err(ffmpeg::Error::Eof) => {
                    debug!("End of container, flushing decoder");
                    if self.decoder.send_eof().is_err() {
                        return None;
                    }
                    self.eof_sent = true;
                }
                Err(e) => {
                    warn!("⚠️ Read error, ending stream: {}", e);
                    return None;
                }
            }
        }
    }

    fn release(&mut self) {
        let _ = self.decoder.send_eof();
        self.decoder.flush();
        debug!("FfmpegSource: decoder flushed");
    }
}
