use bytes::Bytes;

use crate::protocol::canonical::{CanonicalFinishReason, CanonicalUsage};
use crate::protocol::mapping::canonical_finish_to_anthropic;
use crate::stream::sse::anthropic_sse_frame;
use crate::stream::transcoder::DialectFramer;
use crate::util::{push_json_string_escaped, push_u64_decimal};

/// Output-token count reported in `message_delta` when the backend gave none.
const NOMINAL_OUTPUT_TOKENS: u64 = 1;

/// Messages-dialect SSE framing: named events around a single text block at
/// index 0.
#[derive(Debug, Clone)]
pub struct AnthropicFramer {
    model: String,
    scratch: String,
}

impl AnthropicFramer {
    #[must_use]
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            scratch: String::with_capacity(128),
        }
    }

    fn push_frame(&mut self, event_type: &str, out: &mut Vec<Bytes>) {
        out.push(Bytes::from(anthropic_sse_frame(event_type, &self.scratch)));
        self.scratch.clear();
    }
}

impl DialectFramer for AnthropicFramer {
    fn open(&mut self, message_id: &str, out: &mut Vec<Bytes>) {
        self.scratch.clear();
        self.scratch
            .push_str("{\"type\":\"message_start\",\"message\":{\"id\":");
        push_json_string_escaped(&mut self.scratch, message_id);
        self.scratch.push_str(
            ",\"type\":\"message\",\"role\":\"assistant\",\"content\":[],\"model\":",
        );
        push_json_string_escaped(&mut self.scratch, &self.model);
        self.scratch.push_str(
            ",\"stop_reason\":null,\"stop_sequence\":null,\"usage\":{\"input_tokens\":0,\"output_tokens\":0}}}",
        );
        self.push_frame("message_start", out);

        self.scratch.push_str(
            "{\"type\":\"content_block_start\",\"index\":0,\"content_block\":{\"type\":\"text\",\"text\":\"\"}}",
        );
        self.push_frame("content_block_start", out);
    }

    fn text(&mut self, fragment: &str, out: &mut Vec<Bytes>) {
        self.scratch.clear();
        self.scratch.push_str(
            "{\"type\":\"content_block_delta\",\"index\":0,\"delta\":{\"type\":\"text_delta\",\"text\":",
        );
        push_json_string_escaped(&mut self.scratch, fragment);
        self.scratch.push_str("}}");
        self.push_frame("content_block_delta", out);
    }

    fn finish(&mut self, usage: Option<&CanonicalUsage>, out: &mut Vec<Bytes>) {
        self.scratch.clear();
        self.scratch
            .push_str("{\"type\":\"content_block_stop\",\"index\":0}");
        self.push_frame("content_block_stop", out);

        // Streams always report a natural end; length cut-offs are only
        // distinguished in batch responses.
        self.scratch
            .push_str("{\"type\":\"message_delta\",\"delta\":{\"stop_reason\":");
        push_json_string_escaped(
            &mut self.scratch,
            canonical_finish_to_anthropic(CanonicalFinishReason::Stop),
        );
        self.scratch
            .push_str(",\"stop_sequence\":null},\"usage\":{\"output_tokens\":");
        let output_tokens = usage
            .and_then(|u| u.output_tokens)
            .unwrap_or(NOMINAL_OUTPUT_TOKENS);
        push_u64_decimal(&mut self.scratch, output_tokens);
        self.scratch.push_str("}}");
        self.push_frame("message_delta", out);

        self.scratch.push_str("{\"type\":\"message_stop\"}");
        self.push_frame("message_stop", out);
    }
}
