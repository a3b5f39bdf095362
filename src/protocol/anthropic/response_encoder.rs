use crate::protocol::anthropic::{AnthropicResponse, AnthropicResponseBlock, AnthropicUsage};
use crate::protocol::canonical::CanonicalResult;
use crate::protocol::mapping::canonical_finish_to_anthropic;
use crate::util::generated_message_id;

/// Project a complete canonical result onto the Messages API response shape.
///
/// `model` echoes what the client asked for. A result without an id gets a
/// freshly generated `msg_` id; otherwise the projection is deterministic.
#[must_use]
pub fn encode_anthropic_response(result: &CanonicalResult, model: &str) -> AnthropicResponse {
    let id = if result.id.is_empty() {
        generated_message_id()
    } else {
        result.id.clone()
    };

    AnthropicResponse {
        id,
        type_: "message".to_string(),
        role: "assistant".to_string(),
        content: vec![AnthropicResponseBlock::Text {
            text: result.text.clone(),
        }],
        model: model.to_string(),
        stop_reason: Some(canonical_finish_to_anthropic(result.finish_reason).to_string()),
        stop_sequence: None,
        usage: AnthropicUsage {
            input_tokens: result.prompt_tokens,
            output_tokens: result.completion_tokens,
        },
    }
}
