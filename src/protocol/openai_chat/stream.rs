use crate::protocol::canonical::{CanonicalDelta, CanonicalUsage};
use crate::protocol::mapping::backend_finish_to_canonical;
use crate::protocol::openai_chat::{BackendStreamChunk, BackendUsage};
use crate::util::extract_sse_data_payload;

/// How one complete backend stream line should be treated.
#[derive(Debug)]
pub enum BackendLine {
    /// Blank line, comment, `event:` line, non-data line, or `[DONE]`.
    Ignored,
    Chunk(BackendStreamChunk),
    /// A `data:` line whose payload is not a valid chunk.
    Malformed(String),
}

/// Classify a single, fully terminated backend stream line.
#[must_use]
pub fn classify_backend_line(line: &str) -> BackendLine {
    let Some(payload) = extract_sse_data_payload(line) else {
        return BackendLine::Ignored;
    };
    match serde_json::from_str::<BackendStreamChunk>(payload) {
        Ok(chunk) => BackendLine::Chunk(chunk),
        Err(e) => BackendLine::Malformed(e.to_string()),
    }
}

/// Decode a backend stream chunk into a canonical delta.
///
/// Returns `None` when the chunk carries no `choices[0]`; such chunks (for
/// example a trailing usage-only chunk) do not count as deltas. An empty
/// `finish_reason` string is treated as absent.
#[must_use]
pub fn decode_backend_stream_chunk(chunk: BackendStreamChunk) -> Option<CanonicalDelta> {
    let BackendStreamChunk { choices, usage } = chunk;
    let choice = choices.into_iter().next()?;

    let finish_reason = choice
        .finish_reason
        .as_deref()
        .filter(|reason| !reason.is_empty())
        .map(backend_finish_to_canonical);

    Some(CanonicalDelta {
        text_fragment: choice.delta.content,
        finish_reason,
        usage: usage.map(usage_to_canonical),
    })
}

fn usage_to_canonical(usage: BackendUsage) -> CanonicalUsage {
    CanonicalUsage {
        input_tokens: usage.prompt_tokens,
        output_tokens: usage.completion_tokens,
        total_tokens: usage.total_tokens,
    }
}
