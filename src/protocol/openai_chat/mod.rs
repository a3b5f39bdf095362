//! Wire types for the internal chat-completions backend.
//!
//! Requests are always serialized from canonical form; responses and stream
//! chunks are deserialized leniently since only a handful of fields matter.
pub mod encoder;
pub mod response_decoder;
pub mod stream;

use serde::{Deserialize, Serialize};

/// Chat completion request sent to the backend.
#[derive(Debug, Clone, Serialize)]
pub struct BackendChatRequest<'a> {
    pub model: &'a str,
    pub messages: Vec<BackendMessage<'a>>,
    pub stream: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_p: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u64>,
}

/// One backend message. Content is always plain text.
#[derive(Debug, Clone, Serialize)]
pub struct BackendMessage<'a> {
    pub role: &'static str,
    pub content: &'a str,
}

/// Batch chat completion response.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BackendChatResponse {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub choices: Vec<BackendChoice>,
    #[serde(default)]
    pub usage: Option<BackendUsage>,
}

/// A single choice in a batch response.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BackendChoice {
    #[serde(default)]
    pub message: BackendResponseMessage,
    #[serde(default)]
    pub finish_reason: Option<String>,
}

/// The assistant message in a batch choice. `content` may be `null`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BackendResponseMessage {
    #[serde(default)]
    pub content: Option<String>,
}

/// Usage block, present on batch responses and optionally on the last
/// stream chunk.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub struct BackendUsage {
    #[serde(default)]
    pub prompt_tokens: Option<u64>,
    #[serde(default)]
    pub completion_tokens: Option<u64>,
    #[serde(default)]
    pub total_tokens: Option<u64>,
}

/// One `data:` payload of the backend stream.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BackendStreamChunk {
    #[serde(default)]
    pub choices: Vec<BackendStreamChoice>,
    #[serde(default)]
    pub usage: Option<BackendUsage>,
}

/// A choice within a stream chunk.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BackendStreamChoice {
    #[serde(default)]
    pub delta: BackendDelta,
    #[serde(default)]
    pub finish_reason: Option<String>,
}

/// Delta content within a stream choice.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BackendDelta {
    #[serde(default)]
    pub content: Option<String>,
}
