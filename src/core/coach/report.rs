use std::fmt;

/// Description stored for a frame whose every tier failed.
pub const ANALYSIS_FAILED: &str = "Analysis failed";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameStatus {
    Ok,
    Failed,
}

/// Which tier produced a description.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnalysisTier {
    Image,
    Stats,
}

impl fmt::Display for AnalysisTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AnalysisTier::Image => write!(f, "image"),
            AnalysisTier::Stats => write!(f, "stats"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FrameResult {
    pub timestamp_secs: f64,
    pub description: String,
    pub status: FrameStatus,
    /// `None` for failed frames.
    pub tier: Option<AnalysisTier>,
}

impl FrameResult {
    pub fn described(timestamp_secs: f64, description: String, tier: AnalysisTier) -> Self {
        Self {
            timestamp_secs,
            description,
            status: FrameStatus::Ok,
            tier: Some(tier),
        }
    }

    pub fn failed(timestamp_secs: f64) -> Self {
        Self {
            timestamp_secs,
            description: ANALYSIS_FAILED.to_string(),
            status: FrameStatus::Failed,
            tier: None,
        }
    }

    /// Eligible as aggregation input.
    pub fn is_usable(&self) -> bool {
        self.status == FrameStatus::Ok && self.description != ANALYSIS_FAILED
    }
}

/// 分析结果 - 按时间顺序的逐帧结果 + 汇总建议
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AnalysisReport {
    pub results: Vec<FrameResult>,
    /// Absent when no frame was analyzed successfully.
    pub advice: Option<String>,
}

impl AnalysisReport {
    pub fn successful(&self) -> impl Iterator<Item = &FrameResult> {
        self.results.iter().filter(|r| r.is_usable())
    }

    pub fn failed_count(&self) -> usize {
        self.results.iter().filter(|r| !r.is_usable()).count()
    }

    pub fn no_frames_processed(&self) -> bool {
        self.successful().next().is_none()
    }

    /// One `At {t}s: {description}` line per successful frame.
    pub fn timeline(&self) -> String {
        self.successful()
            .map(|r| format!("At {:.1}s: {}", r.timestamp_secs, r.description))
            .collect::<Vec<_>>()
            .join("\n")
    }
}
