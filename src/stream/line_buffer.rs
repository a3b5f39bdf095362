//! Line reassembly for chunked backend bodies.
//!
//! Transport chunks arrive at arbitrary byte boundaries: a line (or a UTF-8
//! character) may be split across any number of chunks. [`LineBuffer`] keeps
//! the unterminated tail between feeds and only hands out lines that a `\n`
//! has completed.
use memchr::memchr_iter;

/// Incremental `\n`-delimited line splitter over raw bytes.
#[derive(Debug, Default)]
pub struct LineBuffer {
    buffer: Vec<u8>,
    read_offset: usize,
}

impl LineBuffer {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed a raw chunk and append every completed line to `out`.
    ///
    /// A trailing `\r` is stripped from each line. Bytes after the last `\n`
    /// stay buffered until a later feed completes them or the stream ends.
    pub fn feed_into(&mut self, chunk: &[u8], out: &mut Vec<String>) {
        if chunk.is_empty() {
            return;
        }
        self.buffer.extend_from_slice(chunk);

        let scan_start = self.buffer.len() - chunk.len();
        let mut processed_up_to = self.read_offset;
        for rel_pos in memchr_iter(b'\n', &self.buffer[scan_start..]) {
            let line_end = scan_start + rel_pos;
            let mut line = &self.buffer[processed_up_to..line_end];
            if let Some(stripped) = line.strip_suffix(b"\r") {
                line = stripped;
            }
            out.push(String::from_utf8_lossy(line).into_owned());
            processed_up_to = line_end + 1;
        }

        self.read_offset = processed_up_to;
        if self.read_offset == self.buffer.len() {
            self.buffer.clear();
            self.read_offset = 0;
            return;
        }
        let should_compact = self.read_offset > 0
            && (self.read_offset >= self.buffer.len() / 2 || self.read_offset >= 8 * 1024);
        if should_compact {
            self.buffer.drain(..self.read_offset);
            self.read_offset = 0;
        }
    }

    /// Feed a raw chunk and return the completed lines.
    pub fn feed(&mut self, chunk: &[u8]) -> Vec<String> {
        let mut out = Vec::new();
        self.feed_into(chunk, &mut out);
        out
    }

    /// Take the buffered unterminated tail, if any, as a final line.
    pub fn take_remainder(&mut self) -> Option<String> {
        let pending = &self.buffer[self.read_offset..];
        let pending = pending.strip_suffix(b"\r").unwrap_or(pending);
        let line = if pending.is_empty() {
            None
        } else {
            Some(String::from_utf8_lossy(pending).into_owned())
        };
        self.buffer.clear();
        self.read_offset = 0;
        line
    }

    /// Number of buffered bytes not yet terminated by a newline.
    #[must_use]
    pub fn pending_len(&self) -> usize {
        self.buffer.len() - self.read_offset
    }
}
