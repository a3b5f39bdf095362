pub mod decoder;
pub mod response_encoder;
pub mod stream;

use serde::{Deserialize, Serialize};

/// Messages API request wire type.
///
/// Only the fields the gateway reads are modelled; unknown fields are ignored.
#[derive(Debug, Clone, Deserialize)]
pub struct AnthropicRequest {
    #[serde(default)]
    pub model: String,
    pub messages: Vec<AnthropicMessageEntry>,
    #[serde(default)]
    pub system: Option<AnthropicContent>,
    #[serde(default)]
    pub stream: Option<bool>,
    #[serde(default)]
    pub max_tokens: Option<u64>,
    #[serde(default)]
    pub temperature: Option<f64>,
    #[serde(default)]
    pub top_p: Option<f64>,
}

/// One entry of `messages`. Entries that are not message objects are kept
/// as `Malformed` and skipped by the normalizer.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum AnthropicMessageEntry {
    Message(AnthropicMessage),
    Malformed(serde_json::Value),
}

/// Messages API message wire type.
#[derive(Debug, Clone, Deserialize)]
pub struct AnthropicMessage {
    /// Usually a string; any other JSON value marks a turn without a usable
    /// role.
    #[serde(default)]
    pub role: serde_json::Value,
    #[serde(default)]
    pub content: AnthropicContent,
}

/// Message content (and top-level `system`): a flat string or a list of
/// typed blocks. Anything else is kept so it can degrade to empty text.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum AnthropicContent {
    Text(String),
    Blocks(Vec<AnthropicContentBlock>),
    Malformed(serde_json::Value),
}

impl Default for AnthropicContent {
    fn default() -> Self {
        Self::Malformed(serde_json::Value::Null)
    }
}

/// One entry of a block list.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum AnthropicContentBlock {
    Typed {
        #[serde(rename = "type")]
        kind: String,
        #[serde(default)]
        text: Option<String>,
    },
    Unknown(serde_json::Value),
}

/// Messages API response wire type.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnthropicResponse {
    pub id: String,
    #[serde(rename = "type")]
    pub type_: String,
    pub role: String,
    pub content: Vec<AnthropicResponseBlock>,
    pub model: String,
    pub stop_reason: Option<String>,
    pub stop_sequence: Option<String>,
    pub usage: AnthropicUsage,
}

/// A content block in a Messages response.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum AnthropicResponseBlock {
    #[serde(rename = "text")]
    Text { text: String },
}

/// Messages usage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnthropicUsage {
    pub input_tokens: u64,
    pub output_tokens: u64,
}
