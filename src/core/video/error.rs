use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum VideoError {
    #[error("Cannot open video {path:?}: {reason}")]
    Open { path: PathBuf, reason: String },
    #[error("No video stream found")]
    NoVideoStream,
    #[error("Decode error: {0}")]
    Decode(String),
}
