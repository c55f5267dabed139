use super::prompts::PromptSet;
use super::report::FrameResult;
use crate::core::llm::{ChatMessage, ChatRequest, LanguageModel, LlmError};
use log::{error, info};

/// 汇总器 - 将逐帧描述合并为一次教练建议请求
pub struct Aggregator<'a> {
    model: &'a dyn LanguageModel,
    prompts: &'a PromptSet,
    text_model: String,
    max_tokens: u32,
    temperature: f32,
}

impl<'a> Aggregator<'a> {
    pub fn new(
        model: &'a dyn LanguageModel,
        prompts: &'a PromptSet,
        text_model: &str,
        max_tokens: u32,
        temperature: f32,
    ) -> Self {
        Self {
            model,
            prompts,
            text_model: text_model.to_string(),
            max_tokens,
            temperature,
        }
    }

    /// Usable descriptions joined by newlines, in timestamp order.
    pub fn observations(results: &[FrameResult]) -> Option<String> {
        let usable: Vec<&str> = results
            .iter()
            .filter(|r| r.is_usable())
            .map(|r| r.description.as_str())
            .collect();

        if usable.is_empty() {
            None
        } else {
            Some(usable.join("\n"))
        }
    }

    /// `Ok(None)` without any model call when nothing is usable.
    pub fn aggregate(&self, results: &[FrameResult]) -> Result<Option<String>, LlmError> {
        let Some(observations) = Self::observations(results) else {
            info!("No frames analyzed successfully, skipping coaching summary");
            return Ok(None);
        };

        let request = self.advice_request(&observations);
        match self.model.complete(&request) {
            Ok(advice) => {
                info!("✅ Coaching summary ready ({} chars)", advice.len());
                Ok(Some(advice))
            }
            Err(e) => {
                error!("❌ Coaching summary failed: {}", e);
                Err(e)
            }
        }
    }

    pub(crate) fn advice_request(&self, observations: &str) -> ChatRequest {
        ChatRequest::new(&self.text_model)
            .message(ChatMessage::system(&self.prompts.coach_system))
            .message(ChatMessage::user(self.prompts.advice_prompt(observations)))
            .max_tokens(self.max_tokens)
            .temperature(self.temperature)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::coach::report::AnalysisTier;
    use crate::core::llm::Role;
    use crate::core::testing::ScriptedModel;

    fn ok(ts: f64, text: &str) -> FrameResult {
        FrameResult::described(ts, text.to_string(), AnalysisTier::Image)
    }

    #[test]
    fn test_observations_keep_order_and_drop_failures() {
        let results = vec![
            ok(0.0, "a"),
            FrameResult::failed(1.0),
            ok(2.0, "b"),
            FrameResult::failed(3.0),
            ok(4.0, "c"),
        ];
        assert_eq!(Aggregator::observations(&results).unwrap(), "a\nb\nc");
    }

    #[test]
    fn test_all_failed_skips_model_call() {
        let model = ScriptedModel::new().reply("should not be asked");
        let prompts = PromptSet::default();
        let aggregator = Aggregator::new(&model, &prompts, "text", 256, 0.4);

        let results: Vec<FrameResult> = (0..5).map(|i| FrameResult::failed(i as f64)).collect();

        assert!(aggregator.aggregate(&results).unwrap().is_none());
        assert!(model.requests().is_empty());
    }

    #[test]
    fn test_empty_input_skips_model_call() {
        let model = ScriptedModel::new();
        let prompts = PromptSet::default();
        let aggregator = Aggregator::new(&model, &prompts, "text", 256, 0.4);

        assert!(aggregator.aggregate(&[]).unwrap().is_none());
        assert!(model.requests().is_empty());
    }

    #[test]
    fn test_single_advice_request() {
        let model = ScriptedModel::new().reply("Keep your elbow high.");
        let prompts = PromptSet::default();
        let aggregator = Aggregator::new(&model, &prompts, "text", 256, 0.4);

        let advice = aggregator
            .aggregate(&[ok(0.0, "a"), ok(1.0, "b")])
            .unwrap();
        assert_eq!(advice.as_deref(), Some("Keep your elbow high."));

        let requests = model.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].messages[0].role, Role::System);
        assert_eq!(requests[0].messages[0].text(), prompts.coach_system);
        assert_eq!(
            requests[0].user_text().unwrap(),
            prompts.advice_prompt("a\nb")
        );
    }

    #[test]
    fn test_failure_is_surfaced() {
        let model = ScriptedModel::new().fail();
        let prompts = PromptSet::default();
        let aggregator = Aggregator::new(&model, &prompts, "text", 256, 0.4);

        let result = aggregator.aggregate(&[ok(0.0, "a")]);
        assert!(matches!(result, Err(LlmError::Api { status: 503, .. })));
    }
}
