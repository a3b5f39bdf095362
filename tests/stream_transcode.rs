use bytes::Bytes;
use chatbridge::protocol::anthropic::stream::AnthropicFramer;
use chatbridge::protocol::gemini::stream::GeminiFramer;
use chatbridge::stream::{
    split_sse_frames, transcode_stream, SseFrame, StreamControl, StreamPhase, StreamTermination,
    StreamTranscoder, UpstreamNotification,
};
use futures_util::StreamExt;
use serde_json::{json, Value};

fn chunk_line(content: &str) -> String {
    format!(
        "data: {}\n\n",
        json!({"choices": [{"delta": {"content": content}, "finish_reason": null}]})
    )
}

fn finish_line(reason: &str) -> String {
    format!(
        "data: {}\n\n",
        json!({"choices": [{"delta": {}, "finish_reason": reason}]})
    )
}

fn feed_all<F: chatbridge::stream::DialectFramer>(
    transcoder: &mut StreamTranscoder<F>,
    chunks: &[&[u8]],
) -> Vec<SseFrame> {
    let mut out = Vec::new();
    for chunk in chunks {
        transcoder.on_notification(
            UpstreamNotification::Data(Bytes::copy_from_slice(chunk)),
            &mut out,
        );
    }
    render(&out)
}

fn render(frames: &[Bytes]) -> Vec<SseFrame> {
    let text: String = frames
        .iter()
        .map(|b| std::str::from_utf8(b).expect("utf-8 frame"))
        .collect();
    split_sse_frames(&text)
}

fn data_json(frame: &SseFrame) -> Value {
    serde_json::from_str(&frame.data).expect("frame data is json")
}

#[test]
fn test_anthropic_full_event_sequence() {
    let mut transcoder =
        StreamTranscoder::with_message_id(AnthropicFramer::new("qwen-max"), "msg_fixed");
    let body = format!(
        "{}{}{}data: [DONE]\n\n",
        chunk_line("Hel"),
        chunk_line("lo"),
        finish_line("stop")
    );
    let frames = feed_all(&mut transcoder, &[body.as_bytes()]);

    let events: Vec<&str> = frames
        .iter()
        .map(|f| f.event.as_deref().unwrap_or(""))
        .collect();
    assert_eq!(
        events,
        vec![
            "message_start",
            "content_block_start",
            "content_block_delta",
            "content_block_delta",
            "content_block_stop",
            "message_delta",
            "message_stop",
        ]
    );
    assert_eq!(data_json(&frames[0])["message"]["id"], "msg_fixed");
    assert_eq!(data_json(&frames[0])["message"]["model"], "qwen-max");
    assert_eq!(data_json(&frames[2])["delta"]["text"], "Hel");
    assert_eq!(data_json(&frames[3])["delta"]["text"], "lo");
    assert_eq!(data_json(&frames[5])["delta"]["stop_reason"], "end_turn");
    assert_eq!(data_json(&frames[5])["usage"]["output_tokens"], 1);

    assert_eq!(transcoder.state().phase, StreamPhase::Finished);
    assert_eq!(transcoder.state().accumulated_text, "Hello");
    assert_eq!(
        transcoder.state().termination,
        Some(StreamTermination::Completed)
    );
}

#[test]
fn test_gemini_frames_and_nominal_usage() {
    let mut transcoder = StreamTranscoder::new(GeminiFramer::new());
    let body = format!("{}{}", chunk_line("Hi"), finish_line("length"));
    let frames = feed_all(&mut transcoder, &[body.as_bytes()]);

    assert_eq!(frames.len(), 2);
    assert!(frames.iter().all(|f| f.event.is_none()));
    let text = data_json(&frames[0]);
    assert_eq!(text["candidates"][0]["content"]["parts"][0]["text"], "Hi");
    assert_eq!(text["candidates"][0]["content"]["role"], "model");
    assert_eq!(text["candidates"][0]["finishReason"], Value::Null);

    let last = data_json(&frames[1]);
    assert_eq!(last["candidates"][0]["content"]["parts"][0]["text"], "");
    assert_eq!(last["candidates"][0]["finishReason"], "STOP");
    assert_eq!(
        last["usageMetadata"],
        json!({"promptTokenCount": 1, "candidatesTokenCount": 1, "totalTokenCount": 2})
    );
}

#[test]
fn test_backend_usage_on_finishing_chunk_is_reported() {
    let mut transcoder = StreamTranscoder::new(GeminiFramer::new());
    let line = format!(
        "data: {}\n",
        json!({
            "choices": [{"delta": {"content": "x"}, "finish_reason": "stop"}],
            "usage": {"prompt_tokens": 12, "completion_tokens": 3, "total_tokens": 15}
        })
    );
    let frames = feed_all(&mut transcoder, &[line.as_bytes()]);
    assert_eq!(frames.len(), 2);
    assert_eq!(
        data_json(&frames[1])["usageMetadata"],
        json!({"promptTokenCount": 12, "candidatesTokenCount": 3, "totalTokenCount": 15})
    );
}

#[test]
fn test_line_split_across_chunks_yields_same_frames() {
    let body = format!("{}{}", chunk_line("split"), finish_line("stop"));
    let bytes = body.as_bytes();

    let mut whole = StreamTranscoder::with_message_id(AnthropicFramer::new("m"), "msg_1");
    let expected = feed_all(&mut whole, &[bytes]);

    for cut in [1, 7, 20, bytes.len() - 3] {
        let mut split = StreamTranscoder::with_message_id(AnthropicFramer::new("m"), "msg_1");
        let frames = feed_all(&mut split, &[&bytes[..cut], &bytes[cut..]]);
        assert_eq!(frames, expected, "cut at {cut}");
    }
}

#[test]
fn test_multibyte_text_split_mid_character() {
    let body = chunk_line("héllo wörld ✓");
    let bytes = body.as_bytes();
    let cut = body.find('✓').expect("check mark") + 1;

    let mut transcoder = StreamTranscoder::new(GeminiFramer::new());
    let frames = feed_all(&mut transcoder, &[&bytes[..cut], &bytes[cut..]]);
    assert_eq!(frames.len(), 1);
    assert_eq!(
        data_json(&frames[0])["candidates"][0]["content"]["parts"][0]["text"],
        "héllo wörld ✓"
    );
}

#[test]
fn test_crlf_line_endings() {
    let body = format!("{}{}", chunk_line("crlf"), finish_line("stop")).replace('\n', "\r\n");
    let mut transcoder = StreamTranscoder::new(GeminiFramer::new());
    let frames = feed_all(&mut transcoder, &[body.as_bytes()]);
    assert_eq!(frames.len(), 2);
    assert_eq!(
        data_json(&frames[0])["candidates"][0]["content"]["parts"][0]["text"],
        "crlf"
    );
    assert!(transcoder.is_ended());
}

#[test]
fn test_malformed_and_non_data_lines_are_skipped() {
    let body = format!(
        ": keepalive\nevent: ping\ndata: {{not json\n{}\ndata: [DONE]\n",
        chunk_line("ok").trim_end()
    );
    let mut transcoder = StreamTranscoder::new(GeminiFramer::new());
    let frames = feed_all(&mut transcoder, &[body.as_bytes()]);
    assert_eq!(frames.len(), 1);
    assert_eq!(transcoder.state().accumulated_text, "ok");
    assert_eq!(transcoder.state().phase, StreamPhase::Streaming);
    assert!(!transcoder.is_ended());
}

#[test]
fn test_chunk_without_choices_does_not_open_stream() {
    let body = format!("data: {}\n", json!({"choices": [], "usage": {"prompt_tokens": 1}}));
    let mut transcoder = StreamTranscoder::new(AnthropicFramer::new("m"));
    let frames = feed_all(&mut transcoder, &[body.as_bytes()]);
    assert!(frames.is_empty());
    assert_eq!(transcoder.state().phase, StreamPhase::NotStarted);
}

#[test]
fn test_empty_fragment_opens_but_emits_no_delta() {
    let mut transcoder = StreamTranscoder::new(AnthropicFramer::new("m"));
    let frames = feed_all(&mut transcoder, &[chunk_line("").as_bytes()]);
    let events: Vec<_> = frames.iter().filter_map(|f| f.event.clone()).collect();
    assert_eq!(events, vec!["message_start", "content_block_start"]);
}

#[test]
fn test_error_ends_without_terminal_frames() {
    let mut transcoder = StreamTranscoder::new(AnthropicFramer::new("m"));
    let mut out = Vec::new();
    transcoder.on_notification(
        UpstreamNotification::Data(Bytes::from(chunk_line("partial"))),
        &mut out,
    );
    let before = out.len();
    let control = transcoder.on_notification(
        UpstreamNotification::Error("connection reset".into()),
        &mut out,
    );
    assert_eq!(control, StreamControl::End);
    assert_eq!(out.len(), before);
    assert_eq!(
        transcoder.state().termination,
        Some(StreamTermination::UpstreamError)
    );

    let control = transcoder.on_notification(
        UpstreamNotification::Data(Bytes::from(finish_line("stop"))),
        &mut out,
    );
    assert_eq!(control, StreamControl::End);
    assert_eq!(out.len(), before);
}

#[test]
fn test_close_flushes_unterminated_final_line() {
    let mut transcoder = StreamTranscoder::new(GeminiFramer::new());
    let mut out = Vec::new();
    let last = json!({"choices": [{"delta": {"content": "tail"}, "finish_reason": "stop"}]});
    transcoder.on_notification(
        UpstreamNotification::Data(Bytes::from(format!("data: {last}"))),
        &mut out,
    );
    assert!(out.is_empty());

    let control = transcoder.on_notification(UpstreamNotification::Close, &mut out);
    assert_eq!(control, StreamControl::End);
    let frames = render(&out);
    assert_eq!(frames.len(), 2);
    assert_eq!(
        transcoder.state().termination,
        Some(StreamTermination::Completed)
    );
}

#[test]
fn test_close_before_finish_fabricates_nothing() {
    let mut transcoder = StreamTranscoder::new(AnthropicFramer::new("m"));
    let mut out = Vec::new();
    transcoder.on_notification(
        UpstreamNotification::Data(Bytes::from(chunk_line("cut"))),
        &mut out,
    );
    let before = out.len();
    transcoder.on_notification(UpstreamNotification::Close, &mut out);
    assert_eq!(out.len(), before);
    assert!(render(&out)
        .iter()
        .all(|f| f.event.as_deref() != Some("message_stop")));
    assert_eq!(
        transcoder.state().termination,
        Some(StreamTermination::UpstreamClosed)
    );
}

#[tokio::test]
async fn test_transcode_stream_drives_transcoder_from_byte_stream() {
    let body = format!("{}{}", chunk_line("a"), finish_line("stop"));
    let (first, second) = body.as_bytes().split_at(10);
    let upstream = futures_util::stream::iter(vec![
        Ok::<_, std::io::Error>(Bytes::copy_from_slice(first)),
        Ok(Bytes::copy_from_slice(second)),
        Ok(Bytes::from(chunk_line("ignored after finish"))),
    ]);

    let frames: Vec<Bytes> = transcode_stream(upstream, StreamTranscoder::new(GeminiFramer::new()))
        .collect()
        .await;
    let frames = render(&frames);
    assert_eq!(frames.len(), 2);
    assert_eq!(
        data_json(&frames[1])["candidates"][0]["finishReason"],
        "STOP"
    );
}

#[tokio::test]
async fn test_transcode_stream_stops_on_upstream_error() {
    let upstream = futures_util::stream::iter(vec![
        Ok(Bytes::from(chunk_line("before"))),
        Err(std::io::Error::other("reset by peer")),
        Ok(Bytes::from(finish_line("stop"))),
    ]);
    let frames: Vec<Bytes> =
        transcode_stream(upstream, StreamTranscoder::new(AnthropicFramer::new("m")))
            .collect()
            .await;
    let events: Vec<_> = render(&frames)
        .into_iter()
        .filter_map(|f| f.event)
        .collect();
    assert_eq!(
        events,
        vec!["message_start", "content_block_start", "content_block_delta"]
    );
}
