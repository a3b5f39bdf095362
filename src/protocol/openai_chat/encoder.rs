use bytes::Bytes;

use crate::error::CanonicalError;
use crate::protocol::canonical::CanonicalRequest;
use crate::protocol::mapping::canonical_role_to_backend;
use crate::protocol::openai_chat::{BackendChatRequest, BackendMessage};

/// Build the backend wire request for a canonical request.
///
/// System text is not sent separately: it already lives in the first user
/// message. Generation parameters are only included when the client set them.
#[must_use]
pub fn build_backend_request(request: &CanonicalRequest) -> BackendChatRequest<'_> {
    BackendChatRequest {
        model: &request.model,
        messages: request
            .messages
            .iter()
            .map(|msg| BackendMessage {
                role: canonical_role_to_backend(msg.role),
                content: &msg.content,
            })
            .collect(),
        stream: request.stream,
        temperature: request.generation.temperature,
        top_p: request.generation.top_p,
        max_tokens: request.generation.max_tokens,
    }
}

/// Serialize a canonical request into the backend JSON body.
pub fn encode_backend_request(request: &CanonicalRequest) -> Result<Bytes, CanonicalError> {
    serde_json::to_vec(&build_backend_request(request))
        .map(Bytes::from)
        .map_err(|e| CanonicalError::Translation(format!("backend request encode failed: {e}")))
}
