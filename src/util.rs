const HEX: &[u8; 16] = b"0123456789abcdef";

/// Generate a fresh message identifier in the Messages dialect's `msg_` form.
#[inline]
pub(crate) fn generated_message_id() -> String {
    format!("msg_{}", uuid::Uuid::new_v4().simple())
}

/// Extract the JSON payload of one backend stream line.
///
/// Returns `None` for blank lines, SSE comments, `event:` lines, non-data
/// lines, and the `[DONE]` sentinel.
#[inline]
pub(crate) fn extract_sse_data_payload(line: &str) -> Option<&str> {
    let trimmed = line.trim();
    if trimmed.is_empty() || trimmed.starts_with(':') || trimmed.starts_with("event:") {
        return None;
    }

    let payload = match trimmed.strip_prefix("data: ") {
        Some(rest) => rest,
        None => trimmed.strip_prefix("data:")?,
    };

    let payload = payload.trim();
    if payload.is_empty() || payload == "[DONE]" {
        return None;
    }
    Some(payload)
}

#[inline]
pub(crate) fn push_json_string_escaped(out: &mut String, value: &str) {
    let bytes = value.as_bytes();
    if bytes.iter().all(|&b| b >= 0x20 && b != b'"' && b != b'\\') {
        out.push('"');
        out.push_str(value);
        out.push('"');
        return;
    }

    out.push('"');
    for ch in value.chars() {
        match ch {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            '\u{08}' => out.push_str("\\b"),
            '\u{0c}' => out.push_str("\\f"),
            c if c <= '\u{1f}' => {
                let control = c as u8;
                out.push_str("\\u00");
                out.push(char::from(HEX[(control >> 4) as usize]));
                out.push(char::from(HEX[(control & 0x0f) as usize]));
            }
            _ => out.push(ch),
        }
    }
    out.push('"');
}

#[inline]
pub(crate) fn push_u64_decimal(out: &mut String, mut n: u64) {
    if n == 0 {
        out.push('0');
        return;
    }

    let mut buf = [0u8; 20];
    let mut i = buf.len();
    while n > 0 {
        i -= 1;
        buf[i] = b'0' + ((n % 10) as u8);
        n /= 10;
    }
    let digits = std::str::from_utf8(&buf[i..]).unwrap_or("0");
    out.push_str(digits);
}
