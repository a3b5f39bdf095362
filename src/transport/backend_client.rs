use std::pin::Pin;
use std::time::Duration;

use bytes::Bytes;
use futures_util::Stream;

use crate::config::{BackendConfig, ServerConfig};
use crate::error::CanonicalError;

const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);
const POOL_MAX_IDLE_PER_HOST: usize = 16;
const POOL_IDLE_TIMEOUT: Duration = Duration::from_secs(15);

/// Raw backend response body, as handed to the stream transcoder.
pub type BackendByteStream =
    Pin<Box<dyn Stream<Item = Result<Bytes, reqwest::Error>> + Send + 'static>>;

fn build_reqwest_client() -> Result<reqwest::Client, CanonicalError> {
    reqwest::Client::builder()
        .pool_max_idle_per_host(POOL_MAX_IDLE_PER_HOST)
        .pool_idle_timeout(POOL_IDLE_TIMEOUT)
        .tcp_nodelay(true)
        .connect_timeout(CONNECT_TIMEOUT)
        .redirect(reqwest::redirect::Policy::none())
        .no_proxy()
        .build()
        .map_err(|err| CanonicalError::Transport(format!("Failed to build HTTP client: {err}")))
}

/// HTTP client for the internal chat-completions backend.
///
/// Requests are sent once; there are no retries. Batch requests are bounded
/// by the configured timeout. Streams are only bounded by the connect
/// timeout, since a healthy stream may legitimately run for minutes.
#[derive(Debug, Clone)]
pub struct BackendClient {
    client: reqwest::Client,
    endpoint: url::Url,
    bearer: Option<http::HeaderValue>,
    timeout: Duration,
}

impl BackendClient {
    /// Build a client for the configured backend endpoint.
    ///
    /// # Errors
    ///
    /// Returns [`CanonicalError::Config`] when the endpoint or API key cannot
    /// be used, or [`CanonicalError::Transport`] when the HTTP client fails
    /// to build.
    pub fn new(server: &ServerConfig, backend: &BackendConfig) -> Result<Self, CanonicalError> {
        let endpoint = backend_endpoint(&backend.base_url, &backend.chat_path)?;
        let bearer = backend
            .bearer_token()
            .map(|key| {
                let mut value = http::HeaderValue::from_str(&format!("Bearer {key}"))
                    .map_err(|_| {
                        CanonicalError::Config("backend.api_key is not a valid header value".into())
                    })?;
                value.set_sensitive(true);
                Ok::<_, CanonicalError>(value)
            })
            .transpose()?;

        Ok(Self {
            client: build_reqwest_client()?,
            endpoint,
            bearer,
            timeout: Duration::from_secs(server.timeout),
        })
    }

    #[must_use]
    pub fn endpoint(&self) -> &url::Url {
        &self.endpoint
    }

    fn request(&self, body: Bytes) -> reqwest::RequestBuilder {
        let mut request = self
            .client
            .post(self.endpoint.clone())
            .header(http::header::CONTENT_TYPE, "application/json")
            .body(body);
        if let Some(bearer) = &self.bearer {
            request = request.header(http::header::AUTHORIZATION, bearer.clone());
        }
        request
    }

    async fn send(&self, request: reqwest::RequestBuilder) -> Result<reqwest::Response, CanonicalError> {
        let response = request
            .send()
            .await
            .map_err(|err| CanonicalError::Transport(err.to_string()))?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.bytes().await.unwrap_or_default();
        let message = sanitize_upstream_error(&body);
        tracing::warn!(
            status = status.as_u16(),
            message = %message,
            "backend returned error status"
        );
        Err(CanonicalError::Upstream {
            status: status.as_u16(),
            message,
        })
    }

    /// Send a batch request and return the full response body.
    ///
    /// # Errors
    ///
    /// Returns [`CanonicalError::Upstream`] for non-2xx statuses and
    /// [`CanonicalError::Transport`] for network failures and timeouts.
    pub async fn complete(&self, body: Bytes) -> Result<Bytes, CanonicalError> {
        let response = self.send(self.request(body).timeout(self.timeout)).await?;
        response
            .bytes()
            .await
            .map_err(|err| CanonicalError::Transport(err.to_string()))
    }

    /// Send a streaming request and return the raw body stream once the
    /// backend has answered with a success status.
    ///
    /// # Errors
    ///
    /// Returns [`CanonicalError::Upstream`] for non-2xx statuses and
    /// [`CanonicalError::Transport`] for network failures.
    pub async fn open_stream(&self, body: Bytes) -> Result<BackendByteStream, CanonicalError> {
        let response = self
            .send(self.request(body).header(http::header::ACCEPT, "text/event-stream"))
            .await?;
        Ok(Box::pin(response.bytes_stream()))
    }
}

/// Join the backend base URL and chat path into one endpoint URL.
fn backend_endpoint(base_url: &str, chat_path: &str) -> Result<url::Url, CanonicalError> {
    let joined = format!("{}{}", base_url.trim().trim_end_matches('/'), chat_path);
    url::Url::parse(&joined)
        .map_err(|err| CanonicalError::Config(format!("Invalid backend URL '{joined}': {err}")))
}

/// Reduce a backend error body to a short, client-safe message.
///
/// Prefers the JSON `error.message` (or a string `error`) field; otherwise
/// falls back to the lossy body text. Both are truncated.
#[must_use]
pub fn sanitize_upstream_error(body: &[u8]) -> String {
    if let Ok(json) = serde_json::from_slice::<serde_json::Value>(body) {
        let message = json
            .get("error")
            .and_then(|e| e.get("message").and_then(|m| m.as_str()).or_else(|| e.as_str()))
            .or_else(|| json.get("message").and_then(|m| m.as_str()));
        if let Some(msg) = message {
            return truncate_message(msg);
        }
    }

    truncate_message(&String::from_utf8_lossy(body))
}

fn truncate_message(msg: &str) -> String {
    const MAX_LEN: usize = 500;
    if msg.len() <= MAX_LEN {
        return msg.to_string();
    }
    let mut end = MAX_LEN;
    while !msg.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...", &msg[..end])
}
