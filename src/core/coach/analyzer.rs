//! 逐帧分析器 - 图像优先，失败时降级为统计信息文本

use super::prompts::PromptSet;
use super::report::{AnalysisTier, FrameResult};
use crate::core::config::FallbackPolicy;
use crate::core::llm::{ChatMessage, ChatRequest, LanguageModel, LlmError, MessagePart};
use crate::core::video::{FramePayload, FramePayloads, FrameStats, ImagePayload};
use log::{debug, error, warn};

#[derive(Debug, Clone)]
pub struct AnalyzerSettings {
    pub vision_model: String,
    pub text_model: String,
    pub fallback: FallbackPolicy,
    pub max_tokens: u32,
    pub temperature: f32,
}

/// Where the tiered analysis of one frame currently stands.
#[derive(Debug)]
enum TierStep {
    Try(AnalysisTier),
    Done(FrameResult),
}

pub struct VisionAnalyzer<'a> {
    model: &'a dyn LanguageModel,
    prompts: &'a PromptSet,
    settings: AnalyzerSettings,
}

impl<'a> VisionAnalyzer<'a> {
    pub fn new(
        model: &'a dyn LanguageModel,
        prompts: &'a PromptSet,
        settings: AnalyzerSettings,
    ) -> Self {
        Self {
            model,
            prompts,
            settings,
        }
    }

    /// Describe one frame. Never fails: exhausted tiers yield a failed result.
    pub fn analyze(&self, payloads: &FramePayloads, timestamp_secs: f64) -> FrameResult {
        let mut step = TierStep::Try(AnalysisTier::Image);

        loop {
            step = match step {
                TierStep::Done(result) => return result,
                TierStep::Try(tier) => {
                    let outcome = match tier {
                        AnalysisTier::Image => match &payloads.image {
                            Some(image) => self.describe(FramePayload::Image(image), timestamp_secs),
                            None => Err(LlmError::MalformedResponse(
                                "frame could not be encoded as an image".to_string(),
                            )),
                        },
                        AnalysisTier::Stats => {
                            self.describe(FramePayload::Stats(&payloads.stats), timestamp_secs)
                        }
                    };

                    match outcome {
                        Ok(description) => {
                            debug!("✅ Frame {:.1}s described via {} tier", timestamp_secs, tier);
                            TierStep::Done(FrameResult::described(timestamp_secs, description, tier))
                        }
                        Err(e) => {
                            warn!("⚠️ {} tier failed for frame {:.1}s: {}", tier, timestamp_secs, e);
                            self.next_step(tier, timestamp_secs)
                        }
                    }
                }
            };
        }
    }

    fn next_step(&self, failed: AnalysisTier, timestamp_secs: f64) -> TierStep {
        match (failed, self.settings.fallback) {
            (AnalysisTier::Image, FallbackPolicy::ImageThenStats) => {
                TierStep::Try(AnalysisTier::Stats)
            }
            _ => {
                error!("❌ Analysis failed for frame {:.1}s", timestamp_secs);
                TierStep::Done(FrameResult::failed(timestamp_secs))
            }
        }
    }

    /// One model call for exactly one payload variant.
    pub fn describe(&self, payload: FramePayload<'_>, timestamp_secs: f64) -> Result<String, LlmError> {
        let request = match payload {
            FramePayload::Image(image) => self.image_request(image),
            FramePayload::Stats(stats) => self.stats_request(stats, timestamp_secs),
        };
        self.model.complete(&request)
    }

    pub(crate) fn image_request(&self, image: &ImagePayload) -> ChatRequest {
        ChatRequest::new(&self.settings.vision_model)
            .message(ChatMessage::system(&self.prompts.frame_system))
            .message(ChatMessage::user_parts(vec![
                MessagePart::text(&self.prompts.frame_user),
                MessagePart::image(image),
            ]))
            .max_tokens(self.settings.max_tokens)
            .temperature(self.settings.temperature)
    }

    pub(crate) fn stats_request(&self, stats: &FrameStats, timestamp_secs: f64) -> ChatRequest {
        ChatRequest::new(&self.settings.text_model)
            .message(ChatMessage::system(&self.prompts.stats_system))
            .message(ChatMessage::user(stats.describe(timestamp_secs)))
            .max_tokens(self.settings.max_tokens)
            .temperature(self.settings.temperature)
    }
}
