/// Prompt wording for every model call. Configuration, not contract.
#[derive(Debug, Clone, PartialEq)]
pub struct PromptSet {
    pub frame_system: String,
    pub frame_user: String,
    pub stats_system: String,
    pub coach_system: String,
    /// Prepended to the joined observations in the advice request.
    pub advice_request: String,
}

impl Default for PromptSet {
    fn default() -> Self {
        Self {
            frame_system: "You are a sports video analyst. Describe the athlete's body position, \
                           movement and technique visible in a single video frame in two or three \
                           sentences."
                .to_string(),
            frame_user: "Describe what is happening in this frame.".to_string(),
            stats_system: "You are a sports video analyst. The image itself is unavailable; infer \
                           what you can about filming conditions from the frame metadata and say \
                           briefly what a coach should check in it."
                .to_string(),
            coach_system: "You are an experienced sports coach. Give concrete, encouraging, \
                           actionable feedback."
                .to_string(),
            advice_request: "Summarize the following observations into coaching advice:"
                .to_string(),
        }
    }
}

impl PromptSet {
    pub fn advice_prompt(&self, observations: &str) -> String {
        format!("{}\n\n{}", self.advice_request, observations)
    }
}
