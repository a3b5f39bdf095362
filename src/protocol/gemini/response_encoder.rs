use crate::protocol::canonical::CanonicalResult;
use crate::protocol::gemini::{
    GeminiCandidate, GeminiResponse, GeminiResponseContent, GeminiResponsePart,
    GeminiUsageMetadata,
};
use crate::protocol::mapping::canonical_finish_to_gemini;

/// Project a complete canonical result onto the generateContent response
/// shape: one candidate with one text part.
#[must_use]
pub fn encode_gemini_response(result: &CanonicalResult) -> GeminiResponse {
    GeminiResponse {
        candidates: vec![GeminiCandidate {
            content: GeminiResponseContent {
                parts: vec![GeminiResponsePart {
                    text: result.text.clone(),
                }],
                role: "model".to_string(),
            },
            finish_reason: Some(canonical_finish_to_gemini(result.finish_reason).to_string()),
            index: 0,
            safety_ratings: Vec::new(),
        }],
        usage_metadata: GeminiUsageMetadata {
            prompt_token_count: result.prompt_tokens,
            candidates_token_count: result.completion_tokens,
            total_token_count: result.total_tokens,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::canonical::CanonicalFinishReason;

    #[test]
    fn test_text_response_encode() {
        let result = CanonicalResult {
            id: String::new(),
            text: "Hello".to_string(),
            finish_reason: CanonicalFinishReason::Stop,
            prompt_tokens: 4,
            completion_tokens: 2,
            total_tokens: 6,
        };
        let json = serde_json::to_value(encode_gemini_response(&result)).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "candidates": [{
                    "content": {"parts": [{"text": "Hello"}], "role": "model"},
                    "finishReason": "STOP",
                    "index": 0,
                    "safetyRatings": []
                }],
                "usageMetadata": {
                    "promptTokenCount": 4,
                    "candidatesTokenCount": 2,
                    "totalTokenCount": 6
                }
            })
        );
    }

    #[test]
    fn test_non_stop_maps_to_max_tokens() {
        for reason in [CanonicalFinishReason::Length, CanonicalFinishReason::Other] {
            let result = CanonicalResult {
                id: "x".to_string(),
                text: String::new(),
                finish_reason: reason,
                prompt_tokens: 0,
                completion_tokens: 0,
                total_tokens: 0,
            };
            let resp = encode_gemini_response(&result);
            assert_eq!(resp.candidates[0].finish_reason.as_deref(), Some("MAX_TOKENS"));
        }
    }
}
