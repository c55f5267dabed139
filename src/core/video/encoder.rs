//! 帧编码 - JPEG 载荷与亮度/对比度统计

use super::frame::Frame;
use image::{ImageOutputFormat, RgbImage};
use std::io::Cursor;
use std::sync::Arc;

pub const DEFAULT_JPEG_QUALITY: u8 = 85;

/// Encoded image bytes, shared with every request built from them.
#[derive(Debug, Clone, PartialEq)]
pub struct ImagePayload {
    pub data: Arc<[u8]>,
    pub mime_type: &'static str,
}

/// Lightweight description of a frame for the text-only fallback.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameStats {
    pub width: u32,
    pub height: u32,
    /// Mean luminance, 0-255.
    pub brightness: f64,
    /// Luminance standard deviation.
    pub contrast: f64,
}

impl FrameStats {
    pub fn describe(&self, timestamp_secs: f64) -> String {
        format!(
            "Frame at {:.1} seconds: {}x{} pixels, brightness {:.1}/255, contrast {:.1}",
            timestamp_secs, self.width, self.height, self.brightness, self.contrast
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FramePayload<'a> {
    Image(&'a ImagePayload),
    Stats(&'a FrameStats),
}

/// Both encodings of the same frame, so a fallback never drifts to another frame.
#[derive(Debug, Clone)]
pub struct FramePayloads {
    pub image: Option<ImagePayload>,
    pub stats: FrameStats,
}

impl FramePayloads {
    pub fn from_frame(frame: &Frame, jpeg_quality: u8) -> Self {
        Self {
            image: encode_image(frame, jpeg_quality),
            stats: encode_stats(frame),
        }
    }
}

/// JPEG-encode the frame. `None` only when the buffer does not match its dimensions.
pub fn encode_image(frame: &Frame, quality: u8) -> Option<ImagePayload> {
    if frame.width == 0 || frame.height == 0 {
        return None;
    }

    let img = RgbImage::from_raw(frame.width, frame.height, frame.to_rgb())?;

    let mut buffer = Cursor::new(Vec::new());
    img.write_to(&mut buffer, ImageOutputFormat::Jpeg(quality.clamp(1, 100)))
        .ok()?;

    Some(ImagePayload {
        data: buffer.into_inner().into(),
        mime_type: "image/jpeg",
    })
}

pub fn encode_stats(frame: &Frame) -> FrameStats {
    let gray = frame.to_grayscale();
    let (brightness, contrast) = if gray.is_empty() {
        (0.0, 0.0)
    } else {
        let n = gray.len() as f64;
        let mean = gray.iter().map(|&v| v as f64).sum::<f64>() / n;
        let variance = gray
            .iter()
            .map(|&v| {
                let d = v as f64 - mean;
                d * d
            })
            .sum::<f64>()
            / n;
        (mean, variance.sqrt())
    };

    FrameStats {
        width: frame.width,
        height: frame.height,
        brightness,
        contrast,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn uniform_frame(width: u32, height: u32, value: u8) -> Frame {
        let mut data = Vec::with_capacity((width * height * 4) as usize);
        for _ in 0..width * height {
            data.extend_from_slice(&[value, value, value, 255]);
        }
        Frame::new(width, height, data, 0, 30.0)
    }

    #[test]
    fn test_stats_uniform_frame() {
        let stats = encode_stats(&uniform_frame(32, 16, 128));
        assert_eq!(stats.width, 32);
        assert_eq!(stats.height, 16);
        assert_eq!(stats.brightness, 128.0);
        assert_eq!(stats.contrast, 0.0);
    }

    #[test]
    fn test_stats_half_black_half_white() {
        let mut data = Vec::new();
        for i in 0..100 {
            let v = if i % 2 == 0 { 0 } else { 255 };
            data.extend_from_slice(&[v, v, v, 255]);
        }
        let frame = Frame::new(10, 10, data, 0, 30.0);

        let stats = encode_stats(&frame);
        assert_eq!(stats.brightness, 127.5);
        assert_eq!(stats.contrast, 127.5);
    }

    #[test]
    fn test_stats_description() {
        let stats = FrameStats {
            width: 640,
            height: 480,
            brightness: 101.3,
            contrast: 40.0,
        };
        assert_eq!(
            stats.describe(3.0),
            "Frame at 3.0 seconds: 640x480 pixels, brightness 101.3/255, contrast 40.0"
        );
    }

    #[test]
    fn test_encode_image_jpeg() {
        let payload = encode_image(&uniform_frame(64, 48, 90), DEFAULT_JPEG_QUALITY)
            .expect("frame should encode");

        assert_eq!(payload.mime_type, "image/jpeg");
        assert_eq!(&payload.data[0..2], &[0xFF, 0xD8]);
    }

    #[test]
    fn test_encode_image_rejects_mismatched_buffer() {
        let frame = Frame::new(10, 10, vec![0u8; 12], 0, 30.0);
        assert!(encode_image(&frame, DEFAULT_JPEG_QUALITY).is_none());
    }

    #[test]
    fn test_payloads_share_frame() {
        let frame = uniform_frame(8, 8, 200);
        let payloads = FramePayloads::from_frame(&frame, DEFAULT_JPEG_QUALITY);
        assert!(payloads.image.is_some());
        assert_eq!(payloads.stats, encode_stats(&frame));
    }
}
