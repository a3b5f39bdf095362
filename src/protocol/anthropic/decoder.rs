use crate::protocol::anthropic::{
    AnthropicContent, AnthropicContentBlock, AnthropicMessageEntry, AnthropicRequest,
};
use crate::protocol::canonical::{
    non_empty_system_text, prepend_system_text, CanonicalMessage, CanonicalRequest,
    GenerationParams,
};
use crate::protocol::mapping::anthropic_role_to_canonical;

/// Normalize a Messages API request into canonical form.
///
/// Only `user` and `assistant` turns are kept, in order. The top-level
/// `system` text is prepended to the first user turn exactly once.
#[must_use]
pub fn decode_anthropic_request(request: AnthropicRequest) -> CanonicalRequest {
    let AnthropicRequest {
        model,
        messages: wire_messages,
        system,
        stream,
        max_tokens,
        temperature,
        top_p,
    } = request;

    let mut messages = Vec::with_capacity(wire_messages.len());
    for entry in wire_messages {
        let AnthropicMessageEntry::Message(msg) = entry else {
            tracing::debug!("skipping malformed message entry");
            continue;
        };
        let Some(role) = msg.role.as_str().and_then(anthropic_role_to_canonical) else {
            tracing::debug!(role = %msg.role, "skipping non-conversational message");
            continue;
        };
        messages.push(CanonicalMessage {
            role,
            content: flatten_content(msg.content),
        });
    }

    let system_text = non_empty_system_text(system.map(flatten_content));
    if let Some(text) = system_text.as_deref() {
        if !prepend_system_text(&mut messages, text) {
            tracing::debug!("system text dropped: request has no user message");
        }
    }

    CanonicalRequest {
        model,
        stream: stream.unwrap_or(false),
        system_text,
        messages,
        generation: GenerationParams {
            temperature,
            max_tokens,
            top_p,
        },
    }
}

/// Flatten string-or-blocks content into text. Blocks contribute only when
/// their `type` is `text`; their texts are joined with `\n`.
#[must_use]
pub fn flatten_content(content: AnthropicContent) -> String {
    match content {
        AnthropicContent::Text(text) => text,
        AnthropicContent::Blocks(blocks) => {
            let texts: Vec<String> = blocks
                .into_iter()
                .filter_map(|block| match block {
                    AnthropicContentBlock::Typed { kind, text } if kind == "text" => {
                        Some(text.unwrap_or_default())
                    }
                    _ => None,
                })
                .collect();
            texts.join("\n")
        }
        AnthropicContent::Malformed(_) => String::new(),
    }
}
