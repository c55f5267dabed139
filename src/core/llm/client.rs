use super::error::LlmError;
use super::message::{ChatRequest, MessagePart};
use super::LanguageModel;
use base64::Engine;
use log::debug;
use reqwest::blocking::Client;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// OpenAI 兼容的 chat-completions 客户端（Groq 等）
///
/// Built once per process and shared by reference between the analyzer and
/// the aggregator.
pub struct ChatClient {
    client: Client,
    base_url: String,
    api_key: String,
}

impl ChatClient {
    /// * `base_url` - API root, e.g. `https://api.groq.com/openai/v1`.
    /// * `timeout` - bound for a whole request, connect included.
    pub fn new(base_url: &str, api_key: &str, timeout: Duration) -> Result<Self, LlmError> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("coach_lib/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
        })
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.base_url)
    }
}

impl LanguageModel for ChatClient {
    fn complete(&self, request: &ChatRequest) -> Result<String, LlmError> {
        let body = WireRequest::from_request(request);
        debug!(
            "POST {} model={} messages={} image={}",
            self.endpoint(),
            request.model,
            request.messages.len(),
            request.has_image()
        );

        let response = self
            .client
            .post(self.endpoint())
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()?;

        let status = response.status();
        let text = response.text()?;
        read_completion(status, text)
    }
}

/// Non-2xx statuses become `Api` errors carrying the response body.
pub(crate) fn read_completion(status: StatusCode, body: String) -> Result<String, LlmError> {
    if !status.is_success() {
        return Err(LlmError::Api {
            status: status.as_u16(),
            body,
        });
    }
    parse_completion(&body)
}

/// First choice's content, trimmed. Empty content counts as malformed.
pub(crate) fn parse_completion(body: &str) -> Result<String, LlmError> {
    let parsed: WireResponse = serde_json::from_str(body)?;
    let content = parsed
        .choices
        .into_iter()
        .next()
        .and_then(|c| c.message.content)
        .ok_or_else(|| LlmError::MalformedResponse("no choices in completion".to_string()))?;

    let content = content.trim();
    if content.is_empty() {
        return Err(LlmError::MalformedResponse("empty completion".to_string()));
    }
    Ok(content.to_string())
}

#[derive(Debug, Serialize)]
struct WireRequest<'a> {
    model: &'a str,
    messages: Vec<WireMessage<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

#[derive(Debug, Serialize)]
struct WireMessage<'a> {
    role: &'static str,
    content: WireContent<'a>,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum WireContent<'a> {
    Text(&'a str),
    Parts(Vec<WirePart<'a>>),
}

#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum WirePart<'a> {
    Text { text: &'a str },
    ImageUrl { image_url: WireImageUrl },
}

#[derive(Debug, Serialize)]
struct WireImageUrl {
    url: String,
}

impl<'a> WireRequest<'a> {
    fn from_request(request: &'a ChatRequest) -> Self {
        let messages = request
            .messages
            .iter()
            .map(|m| {
                let content = match m.parts.as_slice() {
                    // plain string content for single-text messages
                    [MessagePart::Text(text)] => WireContent::Text(text),
                    parts => WireContent::Parts(parts.iter().map(WirePart::from_part).collect()),
                };
                WireMessage {
                    role: m.role.as_str(),
                    content,
                }
            })
            .collect();

        Self {
            model: &request.model,
            messages,
            max_tokens: request.max_tokens,
            temperature: request.temperature,
        }
    }
}

impl<'a> WirePart<'a> {
    fn from_part(part: &'a MessagePart) -> Self {
        match part {
            MessagePart::Text(text) => WirePart::Text { text },
            MessagePart::Image { mime_type, data } => WirePart::ImageUrl {
                image_url: WireImageUrl {
                    url: format!(
                        "data:{};base64,{}",
                        mime_type,
                        base64::engine::general_purpose::STANDARD.encode(data)
                    ),
                },
            },
        }
    }
}

#[derive(Debug, Deserialize)]
struct WireResponse {
    #[serde(default)]
    choices: Vec<WireChoice>,
}

#[derive(Debug, Deserialize)]
struct WireChoice {
    message: WireChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct WireChoiceMessage {
    content: Option<String>,
}
