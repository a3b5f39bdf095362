pub mod decoder;
pub mod response_encoder;
pub mod stream;

use serde::{Deserialize, Serialize};

/// generateContent request wire type.
///
/// The model normally comes from the URL path; a `model` field in the body is
/// honoured as a fallback.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeminiRequest {
    pub contents: Vec<GeminiContent>,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default, alias = "system_instruction")]
    pub system_instruction: Option<GeminiSystemInstruction>,
    #[serde(default)]
    pub stream: Option<bool>,
    #[serde(default, alias = "generation_config")]
    pub generation_config: Option<GeminiGenerationConfig>,
}

/// One turn in `contents`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GeminiContent {
    /// Any value other than the string `model` counts as a user turn.
    #[serde(default)]
    pub role: Option<serde_json::Value>,
    #[serde(default)]
    pub parts: GeminiParts,
}

/// `parts` as sent by the client. Anything that is not a list degrades to no
/// text.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum GeminiParts {
    List(Vec<GeminiPart>),
    Malformed(serde_json::Value),
}

impl Default for GeminiParts {
    fn default() -> Self {
        Self::Malformed(serde_json::Value::Null)
    }
}

/// One part. Only `text` is read; non-text parts (inline data, function
/// calls) deserialize with `text: None`.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum GeminiPart {
    Text {
        #[serde(default)]
        text: Option<String>,
    },
    Other(serde_json::Value),
}

/// `systemInstruction`: a bare string or a content object with parts.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum GeminiSystemInstruction {
    Text(String),
    Content {
        #[serde(default)]
        parts: GeminiParts,
    },
    Malformed(serde_json::Value),
}

/// Generation config fields forwarded to the backend.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeminiGenerationConfig {
    #[serde(default)]
    pub temperature: Option<f64>,
    #[serde(default, alias = "top_p")]
    pub top_p: Option<f64>,
    #[serde(default, alias = "max_output_tokens")]
    pub max_output_tokens: Option<u64>,
}

/// generateContent response wire type.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeminiResponse {
    pub candidates: Vec<GeminiCandidate>,
    pub usage_metadata: GeminiUsageMetadata,
}

/// A candidate in the response.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeminiCandidate {
    pub content: GeminiResponseContent,
    pub finish_reason: Option<String>,
    pub index: u32,
    pub safety_ratings: Vec<serde_json::Value>,
}

/// Candidate content: text parts authored by `model`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeminiResponseContent {
    pub parts: Vec<GeminiResponsePart>,
    pub role: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeminiResponsePart {
    pub text: String,
}

/// Usage metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeminiUsageMetadata {
    pub prompt_token_count: u64,
    pub candidates_token_count: u64,
    pub total_token_count: u64,
}
