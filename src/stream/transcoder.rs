use bytes::Bytes;
use futures_util::{Stream, StreamExt};
use smallvec::SmallVec;

use crate::protocol::canonical::{CanonicalDelta, CanonicalUsage};
use crate::protocol::openai_chat::stream::{
    classify_backend_line, decode_backend_stream_chunk, BackendLine,
};
use crate::stream::line_buffer::LineBuffer;
use crate::util::generated_message_id;

/// Dialect-specific frame encoding driven by [`StreamTranscoder`].
///
/// The transcoder owns the state machine and line discipline; a framer only
/// turns transitions into encoded SSE frames appended to `out`.
pub trait DialectFramer: Send {
    /// Called once, on the first delta of the stream.
    fn open(&mut self, message_id: &str, out: &mut Vec<Bytes>);
    /// Called for every non-empty text fragment, in arrival order.
    fn text(&mut self, fragment: &str, out: &mut Vec<Bytes>);
    /// Called once, when a delta carries a finish reason. `usage` is the
    /// backend-reported usage on that delta, if any.
    fn finish(&mut self, usage: Option<&CanonicalUsage>, out: &mut Vec<Bytes>);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamPhase {
    NotStarted,
    Streaming,
    Finished,
}

/// How the output stream ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamTermination {
    /// The backend sent a finish reason and terminal frames were emitted.
    Completed,
    /// The backend connection failed. No terminal frames were fabricated.
    UpstreamError,
    /// The backend closed before finishing. No terminal frames were fabricated.
    UpstreamClosed,
}

/// One notification from the backend connection.
#[derive(Debug, Clone)]
pub enum UpstreamNotification {
    Data(Bytes),
    Error(String),
    Close,
}

/// Whether the output stream should keep going after a notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamControl {
    Continue,
    End,
}

/// Per-connection transcoder state.
#[derive(Debug)]
pub struct TranscoderState {
    pub phase: StreamPhase,
    pub message_id: String,
    pub accumulated_text: String,
    pub line_buffer: LineBuffer,
    pub termination: Option<StreamTermination>,
}

impl TranscoderState {
    fn new(message_id: String) -> Self {
        Self {
            phase: StreamPhase::NotStarted,
            message_id,
            accumulated_text: String::new(),
            line_buffer: LineBuffer::new(),
            termination: None,
        }
    }
}

/// Converts a raw backend chat-completions stream into dialect frames.
///
/// One instance per streamed request. Feed it backend notifications in
/// arrival order with [`StreamTranscoder::on_notification`]; once it returns
/// [`StreamControl::End`] every later notification is ignored.
pub struct StreamTranscoder<F> {
    framer: F,
    state: TranscoderState,
    lines: Vec<String>,
}

impl<F: DialectFramer> StreamTranscoder<F> {
    #[must_use]
    pub fn new(framer: F) -> Self {
        Self::with_message_id(framer, generated_message_id())
    }

    #[must_use]
    pub fn with_message_id(framer: F, message_id: impl Into<String>) -> Self {
        Self {
            framer,
            state: TranscoderState::new(message_id.into()),
            lines: Vec::with_capacity(8),
        }
    }

    #[must_use]
    pub fn state(&self) -> &TranscoderState {
        &self.state
    }

    #[must_use]
    pub fn is_ended(&self) -> bool {
        self.state.termination.is_some()
    }

    /// Handle one backend notification, appending any frames to `out`.
    pub fn on_notification(
        &mut self,
        notification: UpstreamNotification,
        out: &mut Vec<Bytes>,
    ) -> StreamControl {
        if self.is_ended() {
            return StreamControl::End;
        }

        match notification {
            UpstreamNotification::Data(chunk) => {
                let mut lines = std::mem::take(&mut self.lines);
                self.state.line_buffer.feed_into(&chunk, &mut lines);
                let mut control = StreamControl::Continue;
                for line in &lines {
                    if self.on_line(line, out) == StreamControl::End {
                        control = StreamControl::End;
                        break;
                    }
                }
                lines.clear();
                self.lines = lines;
                control
            }
            UpstreamNotification::Error(message) => {
                tracing::error!(
                    message_id = %self.state.message_id,
                    error = %message,
                    "backend stream error, ending output"
                );
                self.state.termination = Some(StreamTermination::UpstreamError);
                StreamControl::End
            }
            UpstreamNotification::Close => {
                if let Some(line) = self.state.line_buffer.take_remainder() {
                    if self.on_line(&line, out) == StreamControl::End {
                        return StreamControl::End;
                    }
                }
                tracing::debug!(
                    message_id = %self.state.message_id,
                    phase = ?self.state.phase,
                    "backend stream closed before finish"
                );
                self.state.termination = Some(StreamTermination::UpstreamClosed);
                StreamControl::End
            }
        }
    }

    /// Handle one complete backend line.
    fn on_line(&mut self, line: &str, out: &mut Vec<Bytes>) -> StreamControl {
        let chunk = match classify_backend_line(line) {
            BackendLine::Ignored => return StreamControl::Continue,
            BackendLine::Malformed(error) => {
                tracing::warn!(
                    message_id = %self.state.message_id,
                    error = %error,
                    line = %truncate_for_log(line),
                    "skipping unparsable backend stream line"
                );
                return StreamControl::Continue;
            }
            BackendLine::Chunk(chunk) => chunk,
        };
        match decode_backend_stream_chunk(chunk) {
            Some(delta) => self.on_delta(delta, out),
            None => StreamControl::Continue,
        }
    }

    /// Apply one canonical delta. Text is emitted before the finish when a
    /// delta carries both.
    pub fn on_delta(&mut self, delta: CanonicalDelta, out: &mut Vec<Bytes>) -> StreamControl {
        if self.is_ended() {
            return StreamControl::End;
        }

        if self.state.phase == StreamPhase::NotStarted {
            self.framer.open(&self.state.message_id, out);
            self.state.phase = StreamPhase::Streaming;
        }

        if let Some(fragment) = delta.text_fragment.as_deref().filter(|f| !f.is_empty()) {
            self.state.accumulated_text.push_str(fragment);
            self.framer.text(fragment, out);
        }

        if delta.finish_reason.is_some() {
            self.framer.finish(delta.usage.as_ref(), out);
            self.state.phase = StreamPhase::Finished;
            self.state.termination = Some(StreamTermination::Completed);
            tracing::debug!(
                message_id = %self.state.message_id,
                chars = self.state.accumulated_text.len(),
                "stream finished"
            );
            return StreamControl::End;
        }
        StreamControl::Continue
    }
}

impl<F> Drop for StreamTranscoder<F> {
    fn drop(&mut self) {
        if self.state.termination.is_none() {
            tracing::debug!(
                message_id = %self.state.message_id,
                "stream dropped before completion (client disconnected)"
            );
        }
    }
}

fn truncate_for_log(line: &str) -> &str {
    const MAX: usize = 200;
    if line.len() <= MAX {
        return line;
    }
    let mut end = MAX;
    while !line.is_char_boundary(end) {
        end -= 1;
    }
    &line[..end]
}

struct PendingBytes {
    chunks: SmallVec<[Bytes; 8]>,
    head: usize,
}

impl PendingBytes {
    #[inline]
    fn with_capacity(capacity: usize) -> Self {
        let mut chunks = SmallVec::new();
        chunks.reserve(capacity);
        Self { chunks, head: 0 }
    }

    #[inline]
    fn pop_front(&mut self) -> Option<Bytes> {
        if self.head >= self.chunks.len() {
            return None;
        }
        let chunk = std::mem::take(&mut self.chunks[self.head]);
        self.head += 1;
        if self.head == self.chunks.len() {
            self.chunks.clear();
            self.head = 0;
        }
        Some(chunk)
    }

    #[inline]
    fn extend_from_bytes(&mut self, frames: &mut Vec<Bytes>) {
        if frames.is_empty() {
            return;
        }
        self.chunks.reserve(frames.len());
        self.chunks.extend(frames.drain(..));
    }
}

/// Drive a transcoder from a backend byte stream.
///
/// The backend is only polled when the returned stream is polled and all
/// previously produced frames have been handed out, so a slow consumer
/// suspends backend reads. Dropping the returned stream drops the backend
/// stream and the transcoder with it.
pub fn transcode_stream<S, E, F>(
    upstream: S,
    transcoder: StreamTranscoder<F>,
) -> impl Stream<Item = Bytes> + Send + 'static
where
    S: Stream<Item = Result<Bytes, E>> + Send + 'static,
    E: std::fmt::Display + Send + 'static,
    F: DialectFramer + 'static,
{
    futures_util::stream::unfold(
        (
            Box::pin(upstream),
            transcoder,
            Vec::<Bytes>::with_capacity(8),
            PendingBytes::with_capacity(8),
            false,
        ),
        |(mut upstream, mut transcoder, mut frames, mut pending, mut done)| async move {
            loop {
                if let Some(chunk) = pending.pop_front() {
                    return Some((chunk, (upstream, transcoder, frames, pending, done)));
                }
                if done {
                    return None;
                }
                let notification = match upstream.as_mut().next().await {
                    Some(Ok(chunk)) => UpstreamNotification::Data(chunk),
                    Some(Err(e)) => UpstreamNotification::Error(e.to_string()),
                    None => UpstreamNotification::Close,
                };
                if transcoder.on_notification(notification, &mut frames) == StreamControl::End {
                    done = true;
                }
                pending.extend_from_bytes(&mut frames);
            }
        },
    )
}
