use bytes::Bytes;

use crate::protocol::canonical::{CanonicalFinishReason, CanonicalUsage};
use crate::protocol::mapping::canonical_finish_to_gemini;
use crate::stream::sse::gemini_sse_frame;
use crate::stream::transcoder::DialectFramer;
use crate::util::{push_json_string_escaped, push_u64_decimal};

/// generateContent SSE framing: one unnamed data frame per fragment and a
/// final frame carrying the finish reason and usage metadata.
#[derive(Debug, Clone, Default)]
pub struct GeminiFramer {
    scratch: String,
}

impl GeminiFramer {
    #[must_use]
    pub fn new() -> Self {
        Self {
            scratch: String::with_capacity(160),
        }
    }

    fn push_candidate(&mut self, text: &str, finish_reason: Option<&str>) {
        self.scratch
            .push_str("{\"candidates\":[{\"content\":{\"parts\":[{\"text\":");
        push_json_string_escaped(&mut self.scratch, text);
        self.scratch
            .push_str("}],\"role\":\"model\"},\"finishReason\":");
        match finish_reason {
            Some(reason) => push_json_string_escaped(&mut self.scratch, reason),
            None => self.scratch.push_str("null"),
        }
        self.scratch
            .push_str(",\"index\":0,\"safetyRatings\":[]}]");
    }

    fn push_frame(&mut self, out: &mut Vec<Bytes>) {
        out.push(Bytes::from(gemini_sse_frame(&self.scratch)));
        self.scratch.clear();
    }
}

impl DialectFramer for GeminiFramer {
    fn open(&mut self, _message_id: &str, _out: &mut Vec<Bytes>) {}

    fn text(&mut self, fragment: &str, out: &mut Vec<Bytes>) {
        self.scratch.clear();
        self.push_candidate(fragment, None);
        self.scratch.push('}');
        self.push_frame(out);
    }

    fn finish(&mut self, usage: Option<&CanonicalUsage>, out: &mut Vec<Bytes>) {
        let prompt = usage.and_then(|u| u.input_tokens).unwrap_or(1);
        let candidates = usage.and_then(|u| u.output_tokens).unwrap_or(1);
        let total = usage
            .and_then(|u| u.total_tokens)
            .unwrap_or(prompt.saturating_add(candidates));

        self.scratch.clear();
        self.push_candidate(
            "",
            Some(canonical_finish_to_gemini(CanonicalFinishReason::Stop)),
        );
        self.scratch
            .push_str(",\"usageMetadata\":{\"promptTokenCount\":");
        push_u64_decimal(&mut self.scratch, prompt);
        self.scratch.push_str(",\"candidatesTokenCount\":");
        push_u64_decimal(&mut self.scratch, candidates);
        self.scratch.push_str(",\"totalTokenCount\":");
        push_u64_decimal(&mut self.scratch, total);
        self.scratch.push_str("}}");
        self.push_frame(out);
    }
}
