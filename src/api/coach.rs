//! 视频教练 - 上传视频 → 逐帧描述 → 教练建议
//!
//! ```ignore
//! let coach = VideoCoach::create(CoachConfig::from_env()?)?;
//! let report = coach.analyze_upload(&bytes, 3, &LogObserver)?;
//! println!("{}", report.timeline());
//! ```

use crate::core::coach::{
    AnalysisReport, CancelFlag, PipelineDriver, PipelineError, PipelineObserver, PromptSet,
};
use crate::core::config::{CoachConfig, FrameInterval};
use crate::core::llm::LanguageModel;
use crate::core::upload::TempVideo;
use crate::core::video::VideoOpener;
use log::info;
use std::path::Path;

/// Holds the language-model handle for the whole process and runs videos
/// through the pipeline one at a time.
pub struct VideoCoach {
    config: CoachConfig,
    prompts: PromptSet,
    model: Box<dyn LanguageModel>,
    opener: Box<dyn VideoOpener>,
    cancel: CancelFlag,
}

impl VideoCoach {
    /// FFmpeg decoding plus the HTTP chat client described by `config`.
    #[cfg(feature = "ffmpeg")]
    pub fn create(config: CoachConfig) -> Result<Self, PipelineError> {
        use crate::core::llm::ChatClient;
        use crate::core::video::FfmpegOpener;

        let client = ChatClient::new(&config.api_base, config.api_key()?, config.request_timeout)?;
        Ok(Self::with_parts(config, Box::new(client), Box::new(FfmpegOpener)))
    }

    pub fn with_parts(
        config: CoachConfig,
        model: Box<dyn LanguageModel>,
        opener: Box<dyn VideoOpener>,
    ) -> Self {
        info!(
            "🎬 VideoCoach: created (vision={}, text={}, fallback={:?})",
            config.vision_model, config.text_model, config.fallback
        );
        Self {
            config,
            prompts: PromptSet::default(),
            model,
            opener,
            cancel: CancelFlag::new(),
        }
    }

    pub fn with_prompts(mut self, prompts: PromptSet) -> Self {
        self.prompts = prompts;
        self
    }

    pub fn config(&self) -> &CoachConfig {
        &self.config
    }

    /// Flip to abort the running analysis after the current frame. A cancel
    /// applies to the run in progress (or the next one) and is cleared when
    /// that run ends.
    pub fn cancel_flag(&self) -> CancelFlag {
        self.cancel.clone()
    }

    /// Store the upload in a temporary file, analyze it, then delete the file.
    pub fn analyze_upload(
        &self,
        bytes: &[u8],
        interval_secs: u32,
        observer: &dyn PipelineObserver,
    ) -> Result<AnalysisReport, PipelineError> {
        let interval = FrameInterval::new(interval_secs)?;
        let video = TempVideo::materialize(bytes)?;

        let result = self.analyze_file(video.path(), interval, observer);
        video.cleanup();
        result
    }

    pub fn analyze_file(
        &self,
        path: &Path,
        interval: FrameInterval,
        observer: &dyn PipelineObserver,
    ) -> Result<AnalysisReport, PipelineError> {
        let mut driver = PipelineDriver::new(self.model.as_ref(), &self.prompts, &self.config)
            .with_cancel_flag(self.cancel.clone());
        let result = driver.run(self.opener.as_ref(), path, interval, observer);
        self.cancel.reset();
        result
    }
}

impl Drop for VideoCoach {
    fn drop(&mut self) {
        info!("🗑️ VideoCoach: released");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::coach::NoopObserver;
    use crate::core::config::ConfigError;
    use crate::core::testing::{ScriptedModel, SyntheticOpener};
    use crate::core::video::{VideoError, VideoSource};
    use std::path::PathBuf;
    use std::sync::{Arc, Mutex};

    /// Remembers which path the pipeline opened.
    struct RecordingOpener {
        inner: SyntheticOpener,
        seen: Arc<Mutex<Option<PathBuf>>>,
    }

    impl VideoOpener for RecordingOpener {
        fn open(&self, path: &Path) -> Result<Box<dyn VideoSource>, VideoError> {
            if let Ok(mut seen) = self.seen.lock() {
                *seen = Some(path.to_path_buf());
            }
            self.inner.open(path)
        }
    }

    fn coach_with(model: ScriptedModel, inner: SyntheticOpener) -> (VideoCoach, Arc<Mutex<Option<PathBuf>>>) {
        let seen = Arc::new(Mutex::new(None));
        let opener = RecordingOpener {
            inner,
            seen: seen.clone(),
        };
        let coach = VideoCoach::with_parts(CoachConfig::default(), Box::new(model), Box::new(opener));
        (coach, seen)
    }

    #[test]
    fn test_upload_is_analyzed_and_removed() {
        let model = ScriptedModel::new().reply("Good stance").reply("Stay low.");
        let (coach, seen) = coach_with(model, SyntheticOpener::new(30.0, 90));

        let report = coach
            .analyze_upload(b"fake video bytes", 3, &NoopObserver)
            .unwrap();

        assert_eq!(report.results.len(), 1);
        assert_eq!(report.advice.as_deref(), Some("Stay low."));

        let path = seen.lock().unwrap().clone().expect("opener was called");
        assert!(!path.exists());
    }

    #[test]
    fn test_upload_removed_when_open_fails() {
        let (coach, seen) = coach_with(ScriptedModel::new(), SyntheticOpener::failing());

        let result = coach.analyze_upload(b"garbage", 2, &NoopObserver);

        assert!(matches!(result, Err(PipelineError::StreamOpen(_))));
        let path = seen.lock().unwrap().clone().expect("opener was called");
        assert!(!path.exists());
    }

    #[test]
    fn test_interval_out_of_range_rejected_before_upload() {
        let (coach, seen) = coach_with(ScriptedModel::new(), SyntheticOpener::new(30.0, 90));

        let result = coach.analyze_upload(b"bytes", 11, &NoopObserver);

        assert!(matches!(
            result,
            Err(PipelineError::Config(ConfigError::IntervalOutOfRange(11)))
        ));
        assert!(seen.lock().unwrap().is_none());
    }

    #[test]
    fn test_cancelled_before_start() {
        let (coach, _) = coach_with(ScriptedModel::new(), SyntheticOpener::new(24.0, 100));
        coach.cancel_flag().cancel();

        let result = coach.analyze_upload(b"bytes", 1, &NoopObserver);

        match result {
            Err(PipelineError::Cancelled { results }) => assert!(results.is_empty()),
            other => panic!("expected cancellation, got {:?}", other),
        }
    }

    #[test]
    fn test_cancel_does_not_carry_over_to_next_run() {
        let model = ScriptedModel::new().reply("Hips square").reply("Keep the hips square.");
        let (coach, _) = coach_with(model, SyntheticOpener::new(30.0, 90));
        coach.cancel_flag().cancel();

        let first = coach.analyze_upload(b"bytes", 3, &NoopObserver);
        assert!(matches!(first, Err(PipelineError::Cancelled { .. })));
        assert!(!coach.cancel_flag().is_cancelled());

        let second = coach.analyze_upload(b"bytes", 3, &NoopObserver).unwrap();
        assert_eq!(second.results.len(), 1);
        assert_eq!(second.advice.as_deref(), Some("Keep the hips square."));
    }
}
