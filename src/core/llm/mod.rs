//! 语言模型协作者 - 消息类型与 OpenAI 兼容客户端

pub mod client;
pub mod error;
pub mod message;

pub use client::ChatClient;
pub use error::LlmError;
pub use message::{ChatMessage, ChatRequest, MessagePart, Role};

/// A text-completion service that may also accept images.
pub trait LanguageModel: Send + Sync {
    fn complete(&self, request: &ChatRequest) -> Result<String, LlmError>;
}
