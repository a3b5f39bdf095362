use crate::error::CanonicalError;
use crate::protocol::canonical::{CanonicalFinishReason, CanonicalResult};
use crate::protocol::mapping::backend_finish_to_canonical;
use crate::protocol::openai_chat::BackendChatResponse;

/// Decode a batch backend response body into a canonical result.
///
/// A missing id stays empty so the dialect synthesizer can generate one.
/// Missing usage counts default to zero; a missing total is the sum of the
/// other two.
pub fn decode_backend_response(body: &[u8]) -> Result<CanonicalResult, CanonicalError> {
    let response: BackendChatResponse = serde_json::from_slice(body)
        .map_err(|e| CanonicalError::Translation(format!("backend response decode failed: {e}")))?;
    decode_backend_response_owned(response)
}

pub fn decode_backend_response_owned(
    response: BackendChatResponse,
) -> Result<CanonicalResult, CanonicalError> {
    let BackendChatResponse { id, choices, usage } = response;
    let Some(choice) = choices.into_iter().next() else {
        return Err(CanonicalError::Translation(
            "backend response has no choices".to_string(),
        ));
    };

    let finish_reason = choice
        .finish_reason
        .as_deref()
        .map_or(CanonicalFinishReason::Other, backend_finish_to_canonical);
    let usage = usage.unwrap_or_default();
    let prompt_tokens = usage.prompt_tokens.unwrap_or(0);
    let completion_tokens = usage.completion_tokens.unwrap_or(0);

    Ok(CanonicalResult {
        id: id.unwrap_or_default(),
        text: choice.message.content.unwrap_or_default(),
        finish_reason,
        prompt_tokens,
        completion_tokens,
        total_tokens: usage
            .total_tokens
            .unwrap_or(prompt_tokens.saturating_add(completion_tokens)),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_text_response() {
        let body = br#"{
            "id": "chatcmpl-abc",
            "object": "chat.completion",
            "choices": [{
                "index": 0,
                "message": {"role": "assistant", "content": "Hello!"},
                "finish_reason": "stop"
            }],
            "usage": {"prompt_tokens": 10, "completion_tokens": 5, "total_tokens": 15}
        }"#;
        let result = decode_backend_response(body).unwrap();
        assert_eq!(
            result,
            CanonicalResult {
                id: "chatcmpl-abc".to_string(),
                text: "Hello!".to_string(),
                finish_reason: CanonicalFinishReason::Stop,
                prompt_tokens: 10,
                completion_tokens: 5,
                total_tokens: 15,
            }
        );
    }

    #[test]
    fn test_decode_defaults_for_sparse_response() {
        let body = br#"{"choices":[{"message":{"content":null},"finish_reason":"length"}]}"#;
        let result = decode_backend_response(body).unwrap();
        assert_eq!(result.id, "");
        assert_eq!(result.text, "");
        assert_eq!(result.finish_reason, CanonicalFinishReason::Length);
        assert_eq!(result.total_tokens, 0);
    }

    #[test]
    fn test_missing_finish_reason_is_other() {
        let body = br#"{"choices":[{"message":{"content":"x"}}],"usage":{"prompt_tokens":2,"completion_tokens":3}}"#;
        let result = decode_backend_response(body).unwrap();
        assert_eq!(result.finish_reason, CanonicalFinishReason::Other);
        assert_eq!(result.total_tokens, 5);
    }

    #[test]
    fn test_derived_total_saturates() {
        let body = format!(
            r#"{{"choices":[{{"message":{{"content":"x"}},"finish_reason":"stop"}}],"usage":{{"prompt_tokens":{},"completion_tokens":1}}}}"#,
            u64::MAX
        );
        let result = decode_backend_response(body.as_bytes()).unwrap();
        assert_eq!(result.prompt_tokens, u64::MAX);
        assert_eq!(result.total_tokens, u64::MAX);
    }

    #[test]
    fn test_decode_empty_choices() {
        let err = decode_backend_response(br#"{"id":"x","choices":[]}"#).unwrap_err();
        assert!(matches!(err, CanonicalError::Translation(_)));
    }

    #[test]
    fn test_decode_invalid_json() {
        let err = decode_backend_response(b"not json").unwrap_err();
        assert!(matches!(err, CanonicalError::Translation(_)));
    }
}
