use serde::{Deserialize, Serialize};

/// Which client dialect the request arrived on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IngressApi {
    Anthropic,
    Gemini,
}

/// Canonical message role. Only the two conversational roles survive
/// normalization; system text travels separately.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CanonicalRole {
    User,
    Assistant,
}

/// Why the backend stopped generating.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CanonicalFinishReason {
    Stop,
    Length,
    Other,
}

/// Token usage as reported by the backend.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CanonicalUsage {
    pub input_tokens: Option<u64>,
    pub output_tokens: Option<u64>,
    pub total_tokens: Option<u64>,
}

/// Generation parameters passed through to the backend when the client sets them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GenerationParams {
    pub temperature: Option<f64>,
    pub max_tokens: Option<u64>,
    pub top_p: Option<f64>,
}

/// A single conversational turn with its content flattened to text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CanonicalMessage {
    pub role: CanonicalRole,
    pub content: String,
}

impl CanonicalMessage {
    #[must_use]
    pub fn new(role: CanonicalRole, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }
}

/// The dialect-agnostic request handed to the backend.
///
/// `messages` already carries `system_text` prepended to the first user turn;
/// the field itself is kept for logging and inspection.
#[derive(Debug, Clone, PartialEq)]
pub struct CanonicalRequest {
    pub model: String,
    pub stream: bool,
    pub system_text: Option<String>,
    pub messages: Vec<CanonicalMessage>,
    pub generation: GenerationParams,
}

/// One incremental update decoded from a backend stream chunk.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CanonicalDelta {
    pub text_fragment: Option<String>,
    pub finish_reason: Option<CanonicalFinishReason>,
    pub usage: Option<CanonicalUsage>,
}

/// One complete backend answer for a non-streaming request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CanonicalResult {
    pub id: String,
    pub text: String,
    pub finish_reason: CanonicalFinishReason,
    pub prompt_tokens: u64,
    pub completion_tokens: u64,
    pub total_tokens: u64,
}

/// Prepend `system_text` to the first user message, separated by a blank line.
///
/// Returns `false` when there is no user message to receive it, in which case
/// the messages are left untouched.
pub fn prepend_system_text(messages: &mut [CanonicalMessage], system_text: &str) -> bool {
    let Some(first_user) = messages
        .iter_mut()
        .find(|message| message.role == CanonicalRole::User)
    else {
        return false;
    };

    let mut content = String::with_capacity(system_text.len() + 2 + first_user.content.len());
    content.push_str(system_text);
    content.push_str("\n\n");
    content.push_str(&first_user.content);
    first_user.content = content;
    true
}

/// Drop empty system text so that "absent" has a single representation.
#[must_use]
pub fn non_empty_system_text(system_text: Option<String>) -> Option<String> {
    system_text.filter(|text| !text.is_empty())
}
