//! Server-sent-event plumbing for chat-completion streams.
//!
//! Byte chunks from the HTTP response are split into complete `data:`
//! payloads (partial tails held across chunks), then each payload's delta
//! is mapped to a labeled [`StreamPart`].

use anyhow::{anyhow, Result};
use bytes::{Bytes, BytesMut};
use serde_json::Value;

use super::types::StreamPart;

/// Stream-termination sentinel used by OpenAI-compatible backends.
pub const DONE_MARKER: &str = "[DONE]";

/// Accumulates raw bytes and yields complete SSE `data:` payloads.
///
/// Chunk boundaries fall anywhere, including mid-line; the unfinished
/// tail stays buffered until the next chunk completes it.
#[derive(Default)]
pub struct SseLineBuffer {
    buffer: BytesMut,
}

impl SseLineBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one chunk, returning every `data:` payload completed by it.
    ///
    /// Lines are split on raw byte boundaries before any decoding, so a
    /// multi-byte character straddling two chunks stays intact in the
    /// buffered tail.
    pub fn push(&mut self, chunk: &Bytes) -> Vec<String> {
        self.buffer.extend_from_slice(chunk);

        let mut payloads = Vec::new();
        while let Some(newline) = self.buffer.iter().position(|&b| b == b'\n') {
            let line = self.buffer.split_to(newline + 1);
            let line = String::from_utf8_lossy(&line);
            let line = line.trim_end_matches(['\n', '\r']);
            if let Some(payload) = line.strip_prefix("data:") {
                let payload = payload.trim_start();
                if !payload.is_empty() {
                    payloads.push(payload.to_string());
                }
            }
        }
        payloads
    }
}

/// Map one chat-completions delta payload to a labeled part.
///
/// Returns `Ok(None)` for keep-alive events and deltas with nothing to
/// surface (role-only deltas, finish markers). Backend error objects
/// become `Err`.
pub fn parse_delta(json: &Value) -> Result<Option<StreamPart>> {
    // {"error": {"message": "...", "type": "..."}}
    if let Some(error) = json.get("error") {
        let message = error
            .get("message")
            .and_then(|m| m.as_str())
            .unwrap_or("Unknown error");
        let error_type = error
            .get("type")
            .and_then(|t| t.as_str())
            .unwrap_or("unknown");
        return Err(anyhow!("backend error ({}): {}", error_type, message));
    }

    let Some(delta) = json
        .pointer("/choices/0/delta")
        .filter(|d| d.is_object())
    else {
        return Ok(None);
    };

    if let Some(reasoning) = delta.get("reasoning_content").and_then(|r| r.as_str()) {
        if !reasoning.is_empty() {
            return Ok(Some(StreamPart::Reasoning {
                text: reasoning.to_string(),
            }));
        }
    }

    if let Some(content) = delta.get("content").and_then(|c| c.as_str()) {
        if !content.is_empty() {
            return Ok(Some(StreamPart::Content {
                text: content.to_string(),
            }));
        }
    }

    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn buffer_reassembles_split_lines() {
        let mut buffer = SseLineBuffer::new();
        assert!(buffer.push(&Bytes::from_static(b"data: {\"a\":")).is_empty());
        let payloads = buffer.push(&Bytes::from_static(b"1}\n\ndata: [DONE]\n"));
        assert_eq!(payloads, vec!["{\"a\":1}", "[DONE]"]);
    }

    #[test]
    fn multibyte_character_split_across_chunks_stays_intact() {
        let line = "data: {\"choices\":[{\"delta\":{\"content\":\"café\"}}]}\n".as_bytes();
        // split between the two bytes of the 'é'
        let split = line.iter().position(|&b| b == 0xC3).unwrap() + 1;
        let (head, tail) = line.split_at(split);

        let mut buffer = SseLineBuffer::new();
        assert!(buffer.push(&Bytes::copy_from_slice(head)).is_empty());
        let payloads = buffer.push(&Bytes::copy_from_slice(tail));
        assert_eq!(payloads.len(), 1);

        let json: Value = serde_json::from_str(&payloads[0]).unwrap();
        assert_eq!(
            parse_delta(&json).unwrap(),
            Some(StreamPart::Content {
                text: "café".to_string()
            })
        );
    }

    #[test]
    fn buffer_tolerates_crlf_and_ignores_comments() {
        let mut buffer = SseLineBuffer::new();
        let payloads = buffer.push(&Bytes::from_static(
            b": keep-alive\r\ndata: {\"b\":2}\r\n\r\n",
        ));
        assert_eq!(payloads, vec!["{\"b\":2}"]);
    }

    #[test]
    fn delta_reasoning_content_is_labeled_reasoning() {
        let part = parse_delta(&json!({
            "choices": [{"delta": {"reasoning_content": "hm"}}]
        }))
        .unwrap();
        assert_eq!(
            part,
            Some(StreamPart::Reasoning {
                text: "hm".to_string()
            })
        );
    }

    #[test]
    fn delta_content_is_labeled_content() {
        let part = parse_delta(&json!({
            "choices": [{"delta": {"content": "answer"}}]
        }))
        .unwrap();
        assert_eq!(
            part,
            Some(StreamPart::Content {
                text: "answer".to_string()
            })
        );
    }

    #[test]
    fn role_only_delta_yields_nothing() {
        let part = parse_delta(&json!({
            "choices": [{"delta": {"role": "assistant"}}]
        }))
        .unwrap();
        assert_eq!(part, None);
    }

    #[test]
    fn finish_marker_yields_nothing() {
        let part = parse_delta(&json!({
            "choices": [{"delta": {}, "finish_reason": "stop"}]
        }))
        .unwrap();
        assert_eq!(part, None);
    }

    #[test]
    fn backend_error_object_is_an_error() {
        let err = parse_delta(&json!({
            "error": {"message": "quota exceeded", "type": "rate_limit"}
        }))
        .unwrap_err();
        assert!(err.to_string().contains("quota exceeded"));
    }
}
