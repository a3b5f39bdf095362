use crate::protocol::canonical::{
    non_empty_system_text, prepend_system_text, CanonicalMessage, CanonicalRequest,
    GenerationParams,
};
use crate::protocol::gemini::{GeminiPart, GeminiParts, GeminiRequest, GeminiSystemInstruction};
use crate::protocol::mapping::gemini_role_to_canonical;

/// Per-request values that come from the URL rather than the body.
#[derive(Debug, Clone, Default)]
pub struct GeminiDecodeContext<'a> {
    /// Model name from the `/v1beta/models/{model}:action` path.
    pub path_model: Option<&'a str>,
    /// `true` for `:streamGenerateContent`.
    pub force_stream: bool,
}

/// Normalize a generateContent request into canonical form.
///
/// Every turn is kept: `model` maps to assistant and any other role to user.
/// The system instruction is prepended to the first user turn exactly once.
#[must_use]
pub fn decode_gemini_request(
    request: GeminiRequest,
    ctx: &GeminiDecodeContext<'_>,
) -> CanonicalRequest {
    let GeminiRequest {
        contents,
        model,
        system_instruction,
        stream,
        generation_config,
    } = request;

    let mut messages: Vec<CanonicalMessage> = contents
        .into_iter()
        .map(|content| CanonicalMessage {
            role: gemini_role_to_canonical(content.role.as_ref().and_then(|r| r.as_str())),
            content: flatten_parts(content.parts),
        })
        .collect();

    let system_text = non_empty_system_text(system_instruction.map(flatten_system_instruction));
    if let Some(text) = system_text.as_deref() {
        if !prepend_system_text(&mut messages, text) {
            tracing::debug!("system instruction dropped: request has no user turn");
        }
    }

    let model = ctx
        .path_model
        .filter(|m| !m.is_empty())
        .map(str::to_string)
        .or(model)
        .unwrap_or_default();
    let generation = generation_config.unwrap_or_default();

    CanonicalRequest {
        model,
        stream: ctx.force_stream || stream.unwrap_or(false),
        system_text,
        messages,
        generation: GenerationParams {
            temperature: generation.temperature,
            max_tokens: generation.max_output_tokens,
            top_p: generation.top_p,
        },
    }
}

/// Join the non-empty `text` fields of a parts list with `\n`.
#[must_use]
pub fn flatten_parts(parts: GeminiParts) -> String {
    let GeminiParts::List(parts) = parts else {
        return String::new();
    };
    let texts: Vec<String> = parts
        .into_iter()
        .filter_map(|part| match part {
            GeminiPart::Text { text: Some(text) } if !text.is_empty() => Some(text),
            _ => None,
        })
        .collect();
    texts.join("\n")
}

fn flatten_system_instruction(instruction: GeminiSystemInstruction) -> String {
    match instruction {
        GeminiSystemInstruction::Text(text) => text,
        GeminiSystemInstruction::Content { parts } => flatten_parts(parts),
        GeminiSystemInstruction::Malformed(_) => String::new(),
    }
}
