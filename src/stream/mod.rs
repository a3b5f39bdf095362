pub mod line_buffer;
pub mod sse;
pub mod transcoder;

pub use line_buffer::LineBuffer;
pub use sse::{anthropic_sse_frame, gemini_sse_frame, split_sse_frames, SseFrame};
pub use transcoder::{
    transcode_stream, DialectFramer, StreamControl, StreamPhase, StreamTermination,
    StreamTranscoder, TranscoderState, UpstreamNotification,
};
