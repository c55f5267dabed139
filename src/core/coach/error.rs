use super::report::FrameResult;
use crate::core::config::ConfigError;
use crate::core::llm::LlmError;
use crate::core::video::VideoError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Video could not be opened: {0}")]
    StreamOpen(#[from] VideoError),
    /// Advice call failed; the per-frame results are still valid.
    #[error("Coaching summary failed: {source}")]
    Aggregation {
        #[source]
        source: LlmError,
        results: Vec<FrameResult>,
    },
    #[error("Analysis cancelled after {} frames", .results.len())]
    Cancelled { results: Vec<FrameResult> },
    #[error("Upload could not be stored: {0}")]
    Upload(#[from] std::io::Error),
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error("Language model client error: {0}")]
    Client(#[from] LlmError),
}

impl PipelineError {
    /// Per-frame results gathered before the failure, if any.
    pub fn partial_results(&self) -> &[FrameResult] {
        match self {
            PipelineError::Aggregation { results, .. } | PipelineError::Cancelled { results } => {
                results
            }
            _ => &[],
        }
    }
}
