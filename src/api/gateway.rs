use std::sync::Arc;
use std::time::Instant;

use axum::response::Response;
use bytes::Bytes;
use serde::de::DeserializeOwned;

use crate::api::streaming::{json_ok_response, sse_ok_response};
use crate::error::CanonicalError;
use crate::observability::log_request_complete;
use crate::protocol::canonical::{CanonicalRequest, CanonicalResult, IngressApi};
use crate::protocol::openai_chat::encoder::encode_backend_request;
use crate::protocol::openai_chat::response_decoder::decode_backend_response;
use crate::state::AppState;
use crate::stream::{transcode_stream, DialectFramer, StreamTranscoder};

/// The dialect-specific pieces of one client-facing endpoint.
pub(crate) trait DialectSpec {
    type WireRequest: DeserializeOwned;
    type Framer: DialectFramer + 'static;

    const INGRESS: IngressApi;
    const LABEL: &'static str;

    fn parse_wire_request(body: &Bytes) -> Result<Self::WireRequest, CanonicalError> {
        serde_json::from_slice(body).map_err(|e| {
            CanonicalError::InvalidRequest(format!("Invalid {} request body: {e}", Self::LABEL))
        })
    }

    /// Encode the non-streaming response body.
    fn synthesize(result: &CanonicalResult, model: &str) -> Result<Bytes, CanonicalError>;

    fn framer(model: &str) -> Self::Framer;
}

/// Send a normalized request to the backend and answer in the dialect of `S`.
///
/// The model is resolved against the configured default first; the resolved
/// name is what the backend receives and what the response echoes.
pub(crate) async fn run_gateway<S: DialectSpec>(
    state: Arc<AppState>,
    mut request: CanonicalRequest,
) -> Result<Response, CanonicalError> {
    let start = Instant::now();
    request.model = state.resolve_model(&request.model);

    tracing::debug!(
        ingress = ?S::INGRESS,
        model = %request.model,
        stream = request.stream,
        messages = request.messages.len(),
        has_system = request.system_text.is_some(),
        "forwarding request to backend"
    );

    let body = encode_backend_request(&request)?;

    if request.stream {
        let upstream = state.backend.open_stream(body).await?;
        let transcoder = StreamTranscoder::new(S::framer(&request.model));
        return Ok(sse_ok_response(transcode_stream(upstream, transcoder)));
    }

    let raw = state.backend.complete(body).await?;
    let result = decode_backend_response(&raw)?;
    log_request_complete(S::INGRESS, &request.model, &result, start);
    Ok(json_ok_response(S::synthesize(&result, &request.model)?))
}

/// Serialize a dialect response object.
pub(crate) fn encode_json<T: serde::Serialize>(value: &T) -> Result<Bytes, CanonicalError> {
    serde_json::to_vec(value)
        .map(Bytes::from)
        .map_err(|e| CanonicalError::Internal(format!("response serialization failed: {e}")))
}
