use std::sync::Arc;

use axum::response::{IntoResponse, Response};
use bytes::Bytes;

use crate::api::gateway::{encode_json, run_gateway, DialectSpec};
use crate::error::{into_axum_response, CanonicalError};
use crate::protocol::canonical::{CanonicalResult, IngressApi};
use crate::protocol::gemini::decoder::{decode_gemini_request, GeminiDecodeContext};
use crate::protocol::gemini::response_encoder::encode_gemini_response;
use crate::protocol::gemini::stream::GeminiFramer;
use crate::protocol::gemini::GeminiRequest;
use crate::state::AppState;

pub(crate) struct GeminiSpec;

impl DialectSpec for GeminiSpec {
    type WireRequest = GeminiRequest;
    type Framer = GeminiFramer;

    const INGRESS: IngressApi = IngressApi::Gemini;
    const LABEL: &'static str = "generateContent";

    fn synthesize(result: &CanonicalResult, _model: &str) -> Result<Bytes, CanonicalError> {
        encode_json(&encode_gemini_response(result))
    }

    fn framer(_model: &str) -> Self::Framer {
        GeminiFramer::new()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum GeminiAction {
    Generate,
    StreamGenerate,
}

/// Split `{model}:{action}` from the path tail.
fn parse_model_action(model_action: &str) -> Option<(&str, GeminiAction)> {
    let (model, action) = model_action.rsplit_once(':')?;
    let action = match action {
        "generateContent" => GeminiAction::Generate,
        "streamGenerateContent" => GeminiAction::StreamGenerate,
        _ => return None,
    };
    Some((model, action))
}

/// `POST /v1beta/models/{model}:generateContent` and `:streamGenerateContent`.
pub async fn handler_from_action(
    state: Arc<AppState>,
    model_action: &str,
    body: Bytes,
) -> Response {
    let Some((model, action)) = parse_model_action(model_action) else {
        return http::StatusCode::NOT_FOUND.into_response();
    };
    match handle(state, model, action, &body).await {
        Ok(response) => response,
        Err(err) => into_axum_response(&err, GeminiSpec::INGRESS),
    }
}

async fn handle(
    state: Arc<AppState>,
    model: &str,
    action: GeminiAction,
    body: &Bytes,
) -> Result<Response, CanonicalError> {
    let wire_request = GeminiSpec::parse_wire_request(body)?;
    let ctx = GeminiDecodeContext {
        path_model: Some(model),
        force_stream: action == GeminiAction::StreamGenerate,
    };
    let request = decode_gemini_request(wire_request, &ctx);
    run_gateway::<GeminiSpec>(state, request).await
}
