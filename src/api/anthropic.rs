use std::sync::Arc;

use axum::extract::State;
use axum::response::Response;
use bytes::Bytes;

use crate::api::gateway::{encode_json, run_gateway, DialectSpec};
use crate::error::{into_axum_response, CanonicalError};
use crate::protocol::anthropic::decoder::decode_anthropic_request;
use crate::protocol::anthropic::response_encoder::encode_anthropic_response;
use crate::protocol::anthropic::stream::AnthropicFramer;
use crate::protocol::anthropic::AnthropicRequest;
use crate::protocol::canonical::{CanonicalResult, IngressApi};
use crate::state::AppState;

pub(crate) struct AnthropicSpec;

impl DialectSpec for AnthropicSpec {
    type WireRequest = AnthropicRequest;
    type Framer = AnthropicFramer;

    const INGRESS: IngressApi = IngressApi::Anthropic;
    const LABEL: &'static str = "Messages";

    fn synthesize(result: &CanonicalResult, model: &str) -> Result<Bytes, CanonicalError> {
        encode_json(&encode_anthropic_response(result, model))
    }

    fn framer(model: &str) -> Self::Framer {
        AnthropicFramer::new(model)
    }
}

/// `POST /v1/messages`.
pub async fn handler(State(state): State<Arc<AppState>>, body: Bytes) -> Response {
    match handle(state, &body).await {
        Ok(response) => response,
        Err(err) => into_axum_response(&err, AnthropicSpec::INGRESS),
    }
}

async fn handle(state: Arc<AppState>, body: &Bytes) -> Result<Response, CanonicalError> {
    let wire_request = AnthropicSpec::parse_wire_request(body)?;
    let request = decode_anthropic_request(wire_request);
    run_gateway::<AnthropicSpec>(state, request).await
}
