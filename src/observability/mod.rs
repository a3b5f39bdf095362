use std::time::{Duration, Instant};

use crate::protocol::canonical::{CanonicalResult, IngressApi};
use tracing_subscriber::EnvFilter;

/// Initialize the tracing subscriber with the configured log level.
///
/// Maps config log levels to tracing levels:
/// - "DISABLED" -> no subscriber installed
/// - "WARNING" -> WARN
/// - "CRITICAL" -> ERROR
/// - Others map directly (DEBUG, INFO, ERROR)
pub fn init_tracing(log_level: &str) {
    let Some(directive) = tracing_directive(log_level) else {
        return;
    };

    let filter = EnvFilter::try_new(directive).unwrap_or_else(|_| EnvFilter::new("INFO"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .init();
}

/// The `EnvFilter` directive for a config log level, or `None` when logging
/// is disabled.
#[must_use]
pub fn tracing_directive(log_level: &str) -> Option<String> {
    let level = log_level.to_uppercase();
    match level.as_str() {
        "DISABLED" => None,
        "WARNING" => Some("WARN".to_string()),
        "CRITICAL" => Some("ERROR".to_string()),
        _ => Some(level),
    }
}

/// Log token usage for a completed batch request, computing duration from start time.
pub fn log_request_complete(
    ingress: IngressApi,
    model: &str,
    result: &CanonicalResult,
    start_time: Instant,
) {
    log_request_usage(ingress, model, result, start_time.elapsed());
}

fn log_request_usage(ingress: IngressApi, model: &str, result: &CanonicalResult, duration: Duration) {
    tracing::info!(
        ingress = ?ingress,
        model = model,
        input_tokens = result.prompt_tokens,
        output_tokens = result.completion_tokens,
        total_tokens = result.total_tokens,
        duration_seconds = duration.as_secs_f64(),
        "request completed"
    );
}
