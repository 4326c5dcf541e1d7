//! SSE decoding for `streamGenerateContent?alt=sse`.
//!
//! Each SSE event carries one full `GenerateContentResponse` chunk in its
//! `data:` field. Frames are split on blank lines; `\r` is dropped so CRLF and
//! LF framing decode the same way.

use bytes::Bytes;
use futures::{stream, StreamExt};
use serde_json::Value;
use std::collections::VecDeque;

use crate::types::GenerateContentResponse;
use crate::{BoxStream, Error, Result};

/// Incremental SSE frame splitter.
#[derive(Debug, Default)]
pub struct SseDecoder {
    buf: Vec<u8>,
}

impl SseDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed raw bytes; returns the `data` payload of every completed event.
    pub fn push(&mut self, chunk: &[u8]) -> Vec<String> {
        self.buf.extend(chunk.iter().copied().filter(|b| *b != b'\r'));
        let mut payloads = Vec::new();
        while let Some(idx) = find_frame_end(&self.buf) {
            let frame: Vec<u8> = self.buf.drain(..idx + 2).collect();
            if let Some(data) = frame_data(&String::from_utf8_lossy(&frame)) {
                payloads.push(data);
            }
        }
        payloads
    }

    /// Flush whatever is left once the byte stream has ended.
    pub fn finish(&mut self) -> Option<String> {
        let rest = std::mem::take(&mut self.buf);
        frame_data(&String::from_utf8_lossy(&rest))
    }
}

fn find_frame_end(buf: &[u8]) -> Option<usize> {
    buf.windows(2).position(|w| w == b"\n\n")
}

/// Join the frame's `data:` lines. Comments and other fields are ignored.
fn frame_data(frame: &str) -> Option<String> {
    let lines: Vec<&str> = frame
        .lines()
        .filter_map(|line| line.strip_prefix("data:"))
        .map(|data| data.strip_prefix(' ').unwrap_or(data))
        .collect();
    if lines.is_empty() {
        return None;
    }
    let data = lines.join("\n");
    if data.trim().is_empty() {
        None
    } else {
        Some(data)
    }
}

/// Decode one payload. `None` means "nothing to emit" (e.g. a `[DONE]` marker).
fn parse_payload(payload: &str) -> Option<Result<GenerateContentResponse>> {
    let trimmed = payload.trim();
    if trimmed == "[DONE]" {
        return None;
    }
    let value: Value = match serde_json::from_str(trimmed) {
        Ok(v) => v,
        Err(e) => return Some(Err(Error::Serialization(e))),
    };
    if let Some(err) = value.get("error") {
        let status = err
            .get("code")
            .and_then(Value::as_u64)
            .and_then(|c| u16::try_from(c).ok());
        let message = err
            .get("message")
            .and_then(Value::as_str)
            .unwrap_or("stream reported an error")
            .to_string();
        return Some(Err(Error::ModelRequest { status, message }));
    }
    Some(serde_json::from_value(value).map_err(Error::Serialization))
}

/// Turn a response byte stream into a stream of response chunks.
pub fn response_stream(
    input: BoxStream<'static, Bytes>,
) -> BoxStream<'static, GenerateContentResponse> {
    let stream = stream::unfold(
        (input, SseDecoder::new(), VecDeque::<String>::new(), false),
        |(mut input, mut decoder, mut pending, mut eof)| async move {
            loop {
                if let Some(payload) = pending.pop_front() {
                    match parse_payload(&payload) {
                        Some(item) => return Some((item, (input, decoder, pending, eof))),
                        None => continue,
                    }
                }
                if eof {
                    return None;
                }
                match input.next().await {
                    Some(Ok(bytes)) => pending.extend(decoder.push(&bytes)),
                    Some(Err(e)) => return Some((Err(e), (input, decoder, pending, true))),
                    None => {
                        eof = true;
                        pending.extend(decoder.finish());
                    }
                }
            }
        },
    );
    Box::pin(stream)
}
