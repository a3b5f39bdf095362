//! SSE frame encoding for the two client dialects.
//!
//! The Messages dialect uses named events (`event: X\ndata: {...}\n\n`);
//! the generateContent dialect uses bare data frames (`data: {...}\n\n`).

/// Format a Messages-style SSE frame (with named event type).
#[must_use]
pub fn anthropic_sse_frame(event_type: &str, json: &str) -> String {
    let mut out = String::with_capacity(18 + event_type.len() + json.len());
    out.push_str("event: ");
    out.push_str(event_type);
    out.push('\n');
    out.push_str("data: ");
    out.push_str(json);
    out.push_str("\n\n");
    out
}

/// Format a generateContent-style SSE frame (no event type, just data).
#[must_use]
pub fn gemini_sse_frame(json: &str) -> String {
    let mut out = String::with_capacity(8 + json.len());
    out.push_str("data: ");
    out.push_str(json);
    out.push_str("\n\n");
    out
}

/// One frame split back into its event name and data payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SseFrame {
    pub event: Option<String>,
    pub data: String,
}

/// Split encoded SSE text back into frames. Used to inspect transcoder
/// output; multi-line data fields are joined with `\n`.
#[must_use]
pub fn split_sse_frames(text: &str) -> Vec<SseFrame> {
    text.split("\n\n")
        .filter(|block| !block.trim().is_empty())
        .map(|block| {
            let mut event = None;
            let mut data: Vec<&str> = Vec::new();
            for line in block.lines() {
                if let Some(value) = line.strip_prefix("event:") {
                    event = Some(value.trim_start().to_string());
                } else if let Some(value) = line.strip_prefix("data:") {
                    data.push(value.strip_prefix(' ').unwrap_or(value));
                }
            }
            SseFrame {
                event,
                data: data.join("\n"),
            }
        })
        .collect()
}
