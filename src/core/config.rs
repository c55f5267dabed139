//! Run configuration, loaded from the environment.

use crate::core::video::encoder::DEFAULT_JPEG_QUALITY;
use log::debug;
use std::env;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

pub const MIN_INTERVAL_SECS: u32 = 1;
pub const MAX_INTERVAL_SECS: u32 = 10;

pub const DEFAULT_API_BASE: &str = "https://api.groq.com/openai/v1";
pub const DEFAULT_MODEL: &str = "meta-llama/llama-4-scout-17b-16e-instruct";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Frame interval {0}s is outside [1, 10]")]
    IntervalOutOfRange(u32),
    #[error("GROQ_API_KEY is not set")]
    MissingApiKey,
    #[error("Invalid value for {key}: {value}")]
    InvalidValue { key: &'static str, value: String },
}

/// Seconds between two analyzed frames, bounded to [1, 10].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameInterval(u32);

impl FrameInterval {
    pub fn new(secs: u32) -> Result<Self, ConfigError> {
        if (MIN_INTERVAL_SECS..=MAX_INTERVAL_SECS).contains(&secs) {
            Ok(Self(secs))
        } else {
            Err(ConfigError::IntervalOutOfRange(secs))
        }
    }

    pub fn secs(&self) -> u32 {
        self.0
    }
}

impl Default for FrameInterval {
    fn default() -> Self {
        Self(3)
    }
}

/// 降级策略
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FallbackPolicy {
    /// Image analysis, then statistics-as-text when it fails.
    #[default]
    ImageThenStats,
    /// Image analysis only; a failure marks the frame failed.
    ImageOnly,
}

impl FromStr for FallbackPolicy {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "image-then-stats" | "fallback" => Ok(FallbackPolicy::ImageThenStats),
            "image-only" | "none" => Ok(FallbackPolicy::ImageOnly),
            _ => Err(ConfigError::InvalidValue {
                key: "COACH_FALLBACK",
                value: s.to_string(),
            }),
        }
    }
}

#[derive(Debug, Clone)]
pub struct CoachConfig {
    pub api_key: Option<String>,
    pub api_base: String,
    pub vision_model: String,
    pub text_model: String,
    pub interval: FrameInterval,
    pub request_timeout: Duration,
    pub fallback: FallbackPolicy,
    /// Frames analyzed concurrently; 1 keeps the run strictly sequential.
    pub batch_size: usize,
    pub jpeg_quality: u8,
    pub max_tokens: u32,
    pub temperature: f32,
}

impl Default for CoachConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            api_base: DEFAULT_API_BASE.to_string(),
            vision_model: DEFAULT_MODEL.to_string(),
            text_model: DEFAULT_MODEL.to_string(),
            interval: FrameInterval::default(),
            request_timeout: Duration::from_secs(60),
            fallback: FallbackPolicy::default(),
            batch_size: 1,
            jpeg_quality: DEFAULT_JPEG_QUALITY,
            max_tokens: 512,
            temperature: 0.4,
        }
    }
}

impl CoachConfig {
    /// Load `.env` if present, then read `GROQ_API_KEY` and the `COACH_*` variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub(crate) fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let interval = match parse_var::<u32, _>(&lookup, "COACH_INTERVAL_SECS")? {
            Some(secs) => FrameInterval::new(secs)?,
            None => defaults.interval,
        };
        let fallback = match lookup("COACH_FALLBACK") {
            Some(value) => value.parse()?,
            None => defaults.fallback,
        };
        let jpeg_quality = parse_var::<u8, _>(&lookup, "COACH_JPEG_QUALITY")?
            .unwrap_or(defaults.jpeg_quality);
        if !(1..=100).contains(&jpeg_quality) {
            return Err(ConfigError::InvalidValue {
                key: "COACH_JPEG_QUALITY",
                value: jpeg_quality.to_string(),
            });
        }

        let config = Self {
            api_key: lookup("GROQ_API_KEY").filter(|k| !k.trim().is_empty()),
            api_base: lookup("COACH_API_BASE").unwrap_or(defaults.api_base),
            vision_model: lookup("COACH_VISION_MODEL").unwrap_or(defaults.vision_model),
            text_model: lookup("COACH_TEXT_MODEL").unwrap_or(defaults.text_model),
            interval,
            request_timeout: parse_var::<u64, _>(&lookup, "COACH_REQUEST_TIMEOUT_SECS")?
                .map(Duration::from_secs)
                .unwrap_or(defaults.request_timeout),
            fallback,
            batch_size: parse_var::<usize, _>(&lookup, "COACH_BATCH_SIZE")?
                .unwrap_or(defaults.batch_size)
                .max(1),
            jpeg_quality,
            max_tokens: parse_var::<u32, _>(&lookup, "COACH_MAX_TOKENS")?
                .unwrap_or(defaults.max_tokens),
            temperature: parse_var::<f32, _>(&lookup, "COACH_TEMPERATURE")?
                .unwrap_or(defaults.temperature),
        };

        debug!("Loaded config: {:?}", config.redacted());
        Ok(config)
    }

    pub fn api_key(&self) -> Result<&str, ConfigError> {
        self.api_key.as_deref().ok_or(ConfigError::MissingApiKey)
    }

    fn redacted(&self) -> Self {
        Self {
            api_key: self.api_key.as_ref().map(|_| "***".to_string()),
            ..self.clone()
        }
    }
}

fn parse_var<T, F>(lookup: &F, key: &'static str) -> Result<Option<T>, ConfigError>
where
    T: FromStr,
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        None => Ok(None),
        Some(value) => value
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::InvalidValue { key, value }),
    }
}
