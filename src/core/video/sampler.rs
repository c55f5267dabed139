use super::frame::Frame;
use super::source::VideoStream;

/// Number of frames between two analyzed frames. Never zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SampleInterval(u64);

impl SampleInterval {
    /// `max(1, round(fps × interval_secs))`
    pub fn from_fps(fps: f64, interval_secs: u32) -> Self {
        let frames = (fps * interval_secs as f64).round();
        if frames.is_finite() && frames >= 1.0 {
            Self(frames as u64)
        } else {
            Self(1)
        }
    }

    pub fn frames(&self) -> u64 {
        self.0
    }

    pub fn selects(&self, frame_number: u64) -> bool {
        frame_number % self.0 == 0
    }
}

/// 帧采样器 - 按固定间隔从流中取帧
///
/// Lazy and non-restartable: once the stream is exhausted it keeps
/// returning `None`. End of stream is a normal terminal condition.
pub struct FrameSampler<'a> {
    stream: &'a mut VideoStream,
    interval: SampleInterval,
    next_index: u64,
    finished: bool,
}

impl<'a> FrameSampler<'a> {
    pub fn new(stream: &'a mut VideoStream, interval: SampleInterval) -> Self {
        Self {
            stream,
            interval,
            next_index: 0,
            finished: false,
        }
    }

    pub fn interval(&self) -> SampleInterval {
        self.interval
    }
}

impl Iterator for FrameSampler<'_> {
    type Item = Frame;

    fn next(&mut self) -> Option<Frame> {
        if self.finished {
            return None;
        }

        loop {
            let Some(raw) = self.stream.read_next_frame() else {
                self.finished = true;
                return None;
            };

            let index = self.next_index;
            self.next_index += 1;

            // only selected frames pay for color conversion
            if self.interval.selects(index) {
                return Some(raw.to_frame(index, self.stream.fps()));
            }
        }
    }
}

impl std::iter::FusedIterator for FrameSampler<'_> {}
