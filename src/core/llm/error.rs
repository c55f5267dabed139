use thiserror::Error;

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Language model API error ({status}): {body}")]
    Api { status: u16, body: String },
    #[error("Malformed completion: {0}")]
    MalformedResponse(String),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
