/// 采样帧 - 色彩校正后的 RGBA 像素 + 在流中的序号
#[derive(Debug, Clone)]
pub struct Frame {
    pub width: u32,
    pub height: u32,
    pub data: Vec<u8>, // RGBA 格式
    /// Zero-based ordinal position in the stream.
    pub frame_number: u64,
    /// `frame_number / fps`, in seconds.
    pub timestamp_secs: f64,
}

impl Frame {
    pub fn new(width: u32, height: u32, data: Vec<u8>, frame_number: u64, fps: f64) -> Self {
        Self {
            width,
            height,
            data,
            frame_number,
            timestamp_secs: frame_number as f64 / fps,
        }
    }

    pub fn pixel_count(&self) -> usize {
        (self.width * self.height) as usize
    }

    pub fn to_rgb(&self) -> Vec<u8> {
        let mut rgb = Vec::with_capacity(self.pixel_count() * 3);
        for chunk in self.data.chunks_exact(4) {
            rgb.push(chunk[0]); // R
            rgb.push(chunk[1]); // G
            rgb.push(chunk[2]); // B
        }
        rgb
    }

    /// BT.601 luma per pixel.
    pub fn to_grayscale(&self) -> Vec<u8> {
        self.data
            .chunks_exact(4)
            .map(|rgba| {
                ((rgba[0] as u32 * 299 + rgba[1] as u32 * 587 + rgba[2] as u32 * 114) / 1000) as u8
            })
            .collect()
    }

    /// Caption used when a frame is shown to the user.
    pub fn caption(&self) -> String {
        format!("Frame at {:.1}s", self.timestamp_secs)
    }
}

/// 解码器输出的原始帧数据（I420 平面）
#[derive(Debug, Clone)]
pub struct RawFrame {
    pub width: u32,
    pub height: u32,
    pub y_plane: Vec<u8>,
    pub u_plane: Vec<u8>,
    pub v_plane: Vec<u8>,
}

impl RawFrame {
    /// Uniform frame, mostly for synthetic sources.
    pub fn filled(width: u32, height: u32, luma: u8) -> Self {
        let chroma_len = (width.div_ceil(2) * height.div_ceil(2)) as usize;
        Self {
            width,
            height,
            y_plane: vec![luma; (width * height) as usize],
            u_plane: vec![128; chroma_len],
            v_plane: vec![128; chroma_len],
        }
    }

    /// Color conversion to RGBA, attaching the frame's position in the stream.
    pub fn to_frame(&self, frame_number: u64, fps: f64) -> Frame {
        let mut rgba_data = vec![0u8; (self.width * self.height * 4) as usize];
        let chroma_width = self.width.div_ceil(2);

        for y in 0..self.height {
            for x in 0..self.width {
                let y_idx = (y * self.width + x) as usize;
                let uv_idx = ((y / 2) * chroma_width + x / 2) as usize;

                let y_val = self.y_plane.get(y_idx).copied().unwrap_or(0) as f32;
                let u_val = self.u_plane.get(uv_idx).copied().unwrap_or(128) as f32 - 128.0;
                let v_val = self.v_plane.get(uv_idx).copied().unwrap_or(128) as f32 - 128.0;

                let r = (y_val + 1.402 * v_val).clamp(0.0, 255.0) as u8;
                let g = (y_val - 0.344136 * u_val - 0.714136 * v_val).clamp(0.0, 255.0) as u8;
                let b = (y_val + 1.772 * u_val).clamp(0.0, 255.0) as u8;

                let rgba_idx = y_idx * 4;
                rgba_data[rgba_idx] = r;
                rgba_data[rgba_idx + 1] = g;
                rgba_data[rgba_idx + 2] = b;
                rgba_data[rgba_idx + 3] = 255;
            }
        }

        Frame::new(self.width, self.height, rgba_data, frame_number, fps)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_creation() {
        let data = vec![255u8; 100 * 100 * 4];
        let frame = Frame::new(100, 100, data, 30, 30.0);

        assert_eq!(frame.width, 100);
        assert_eq!(frame.height, 100);
        assert_eq!(frame.pixel_count(), 10000);
        assert_eq!(frame.frame_number, 30);
        assert_eq!(frame.timestamp_secs, 1.0);
        assert_eq!(frame.caption(), "Frame at 1.0s");
    }

    #[test]
    fn test_timestamp_is_index_over_fps() {
        let frame = Frame::new(1, 1, vec![0; 4], 48, 24.0);
        assert_eq!(frame.timestamp_secs, 48.0 / 24.0);

        let frame = Frame::new(1, 1, vec![0; 4], 7, 29.97);
        assert_eq!(frame.timestamp_secs, 7.0 / 29.97);
    }

    #[test]
    fn test_yuv_to_rgba() {
        let raw_frame = RawFrame::filled(64, 64, 128);

        let frame = raw_frame.to_frame(0, 30.0);
        assert_eq!(frame.width, 64);
        assert_eq!(frame.height, 64);
        assert_eq!(frame.data.len(), 64 * 64 * 4);
        // neutral chroma keeps the pixel gray
        assert_eq!(&frame.data[0..4], &[128, 128, 128, 255]);
    }

    #[test]
    fn test_odd_dimensions_convert() {
        let raw_frame = RawFrame::filled(5, 3, 200);
        let frame = raw_frame.to_frame(2, 10.0);
        assert_eq!(frame.data.len(), 5 * 3 * 4);
        assert!(frame.to_grayscale().iter().all(|&v| v == 200));
    }

    #[test]
    fn test_to_rgb_drops_alpha() {
        let frame = Frame::new(2, 1, vec![1, 2, 3, 255, 4, 5, 6, 255], 0, 30.0);
        assert_eq!(frame.to_rgb(), vec![1, 2, 3, 4, 5, 6]);
    }
}
