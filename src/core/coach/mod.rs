//! 教练分析流水线
//!
//! 采样帧 → 编码 → 逐帧描述（图像失败时降级为统计信息文本）→ 汇总为教练建议。

pub mod aggregator;
pub mod analyzer;
pub mod error;
pub mod observer;
pub mod pipeline;
pub mod prompts;
pub mod report;

pub use aggregator::Aggregator;
pub use analyzer::VisionAnalyzer;
pub use error::PipelineError;
pub use observer::{LogObserver, NoopObserver, PipelineObserver};
pub use pipeline::{CancelFlag, PipelineDriver, PipelineState};
pub use prompts::PromptSet;
pub use report::{AnalysisReport, AnalysisTier, FrameResult, FrameStatus, ANALYSIS_FAILED};
