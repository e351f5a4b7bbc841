use crate::model::ProgressEvent;

/// Splits a byte stream into `\n`-terminated lines, tolerating `\r\n`.
#[derive(Debug, Default)]
pub(super) struct LineFramer {
    buf: Vec<u8>,
}

impl LineFramer {
    pub(super) fn push(&mut self, chunk: &[u8]) -> Vec<String> {
        self.buf.extend_from_slice(chunk);
        let mut out = Vec::new();
        while let Some(pos) = self.buf.iter().position(|b| *b == b'\n') {
            let mut line: Vec<u8> = self.buf.drain(..=pos).collect();
            line.pop();
            if line.last() == Some(&b'\r') {
                line.pop();
            }
            out.push(String::from_utf8_lossy(&line).into_owned());
        }
        out
    }

    /// Whatever is left once the connection closed without a final newline.
    pub(super) fn finish(&mut self) -> Option<String> {
        if self.buf.is_empty() {
            return None;
        }
        let rest = std::mem::take(&mut self.buf);
        let line = String::from_utf8_lossy(&rest).trim_end_matches('\r').to_string();
        Some(line)
    }
}

/// Decode one line. Blank lines, comments, non-data SSE fields and anything
/// that is not a progress event yield `None`.
pub(super) fn decode_line(line: &str) -> Option<ProgressEvent> {
    let line = line.trim();
    if line.is_empty() || line.starts_with(':') {
        return None;
    }
    let payload = match line.strip_prefix("data:") {
        Some(rest) => rest.trim_start(),
        None if is_sse_field(line) => return None,
        None => line,
    };
    match serde_json::from_str(payload) {
        Ok(event) => Some(event),
        Err(err) => {
            tracing::debug!("skipping undecodable progress line: {}", err);
            None
        }
    }
}

fn is_sse_field(line: &str) -> bool {
    ["event:", "id:", "retry:"]
        .iter()
        .any(|field| line.starts_with(field))
}

#[cfg(test)]
#[path = "../tests/stream/lines_tests.rs"]
mod tests;
