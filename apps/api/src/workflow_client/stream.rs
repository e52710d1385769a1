//! Streamed workflow response decoding.
//!
//! The body is newline-delimited; only lines starting with `data: ` carry an
//! event. One [`EventAccumulator`] is owned by the read loop and folds every
//! decoded event into a single result string.

use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

pub const DATA_PREFIX: &str = "data: ";

#[derive(Debug, Deserialize)]
struct RawEvent {
    event: String,
    #[serde(default)]
    data: Value,
}

/// One decoded event from the workflow stream.
#[derive(Debug, Clone, PartialEq)]
pub enum WorkflowEvent {
    WorkflowFinished { result: Option<String> },
    TextChunk { text: String },
    NodeFinished { node_type: String, text: Option<String> },
    Unrecognized(String),
}

impl WorkflowEvent {
    /// Decodes a single line. Non-data lines and malformed JSON yield `None`.
    pub fn decode(line: &str) -> Option<Self> {
        let payload = line.strip_prefix(DATA_PREFIX)?;
        let raw: RawEvent = match serde_json::from_str(payload) {
            Ok(raw) => raw,
            Err(e) => {
                debug!("Skipping malformed event line: {e}");
                return None;
            }
        };

        debug!(event = %raw.event, "Workflow event");

        Some(match raw.event.as_str() {
            "workflow_finished" => WorkflowEvent::WorkflowFinished {
                result: non_empty_str(&raw.data, "/outputs/result"),
            },
            "text_chunk" => WorkflowEvent::TextChunk {
                text: non_empty_str(&raw.data, "/text").unwrap_or_default(),
            },
            "node_finished" => WorkflowEvent::NodeFinished {
                node_type: non_empty_str(&raw.data, "/node_type").unwrap_or_default(),
                text: non_empty_str(&raw.data, "/outputs/text"),
            },
            _ => WorkflowEvent::Unrecognized(raw.event),
        })
    }
}

fn non_empty_str(data: &Value, pointer: &str) -> Option<String> {
    data.pointer(pointer)
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// How an event changes the accumulated text.
#[derive(Debug, PartialEq)]
enum Update<'a> {
    Replace(&'a str),
    Append(&'a str),
    Keep,
}

/// Authoritative events replace; `text_chunk` appends; anything else is ignored.
fn update_for<'a>(event: &'a WorkflowEvent, generation_node_type: &str) -> Update<'a> {
    match event {
        WorkflowEvent::WorkflowFinished {
            result: Some(result),
        } => Update::Replace(result),
        WorkflowEvent::TextChunk { text } => Update::Append(text),
        WorkflowEvent::NodeFinished {
            node_type,
            text: Some(text),
        } if node_type == generation_node_type => Update::Replace(text),
        _ => Update::Keep,
    }
}

/// Folds a byte stream of event lines into one string.
///
/// Bytes are buffered until a full line is available, so lines and multi-byte
/// characters split across transport chunks decode intact.
#[derive(Debug)]
pub struct EventAccumulator {
    text: String,
    pending: Vec<u8>,
    generation_node_type: String,
    events_seen: usize,
}

impl EventAccumulator {
    pub fn new(generation_node_type: impl Into<String>) -> Self {
        Self {
            text: String::new(),
            pending: Vec::new(),
            generation_node_type: generation_node_type.into(),
            events_seen: 0,
        }
    }

    pub fn feed(&mut self, chunk: &[u8]) {
        self.pending.extend_from_slice(chunk);
        while let Some(newline) = self.pending.iter().position(|&b| b == b'\n') {
            let line: Vec<u8> = self.pending.drain(..=newline).collect();
            self.process_line(&line[..newline]);
        }
    }

    pub fn apply(&mut self, event: &WorkflowEvent) {
        self.events_seen += 1;
        match update_for(event, &self.generation_node_type) {
            Update::Replace(text) => {
                self.text.clear();
                self.text.push_str(text);
            }
            Update::Append(text) => self.text.push_str(text),
            Update::Keep => {}
        }
    }

    pub fn events_seen(&self) -> usize {
        self.events_seen
    }

    /// Processes any unterminated trailing line and returns the result.
    pub fn finish(mut self) -> String {
        if !self.pending.is_empty() {
            let rest = std::mem::take(&mut self.pending);
            self.process_line(&rest);
        }
        self.text
    }

    fn process_line(&mut self, bytes: &[u8]) {
        let line = String::from_utf8_lossy(bytes);
        if let Some(event) = WorkflowEvent::decode(line.trim_end_matches('\r')) {
            self.apply(&event);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn line(event: Value) -> String {
        format!("{DATA_PREFIX}{event}\n")
    }

    fn chunk(text: &str) -> String {
        line(json!({"event": "text_chunk", "data": {"text": text}}))
    }

    fn accumulate(body: &str) -> String {
        let mut acc = EventAccumulator::new("llm");
        acc.feed(body.as_bytes());
        acc.finish()
    }

    #[test]
    fn test_text_chunks_are_appended() {
        assert_eq!(accumulate(&(chunk("A") + &chunk("B"))), "AB");
    }

    #[test]
    fn test_workflow_finished_replaces_chunks() {
        let body = chunk("A")
            + &line(json!({"event": "workflow_finished", "data": {"outputs": {"result": "Z"}}}));
        assert_eq!(accumulate(&body), "Z");
    }

    #[test]
    fn test_workflow_finished_without_result_keeps_text() {
        let body = chunk("A")
            + &line(json!({"event": "workflow_finished", "data": {"outputs": {}}}))
            + &line(json!({"event": "workflow_finished", "data": {"outputs": {"result": ""}}}));
        assert_eq!(accumulate(&body), "A");
    }

    #[test]
    fn test_generation_node_replaces_and_other_nodes_are_ignored() {
        let body = chunk("partial")
            + &line(json!({"event": "node_finished", "data": {"node_type": "llm", "outputs": {"text": "full"}}}))
            + &line(json!({"event": "node_finished", "data": {"node_type": "code", "outputs": {"text": "noise"}}}));
        assert_eq!(accumulate(&body), "full");
    }

    #[test]
    fn test_last_authoritative_event_wins() {
        let body = line(json!({"event": "node_finished", "data": {"node_type": "llm", "outputs": {"text": "first"}}}))
            + &chunk(" tail")
            + &line(json!({"event": "workflow_finished", "data": {"outputs": {"result": "final"}}}));
        assert_eq!(accumulate(&body), "final");
    }

    #[test]
    fn test_non_data_and_malformed_lines_are_skipped() {
        let body = String::from("event: ping\n\n")
            + "data: {not json\n"
            + &chunk("A")
            + &line(json!({"event": "workflow_started", "data": {}}))
            + &chunk("B");
        let mut acc = EventAccumulator::new("llm");
        acc.feed(body.as_bytes());
        assert_eq!(acc.events_seen(), 3);
        assert_eq!(acc.finish(), "AB");
    }

    #[test]
    fn test_lines_split_across_chunks_are_rejoined() {
        let body = chunk("シフト") + &chunk("表");
        let bytes = body.as_bytes();
        let mut acc = EventAccumulator::new("llm");
        // Feed one byte at a time: splits lines and multi-byte characters.
        for b in bytes {
            acc.feed(std::slice::from_ref(b));
        }
        assert_eq!(acc.finish(), "シフト表");
    }

    #[test]
    fn test_trailing_line_without_newline_is_processed() {
        let body = chunk("A") + "data: {\"event\":\"text_chunk\",\"data\":{\"text\":\"B\"}}";
        assert_eq!(accumulate(&body), "AB");
    }

    #[test]
    fn test_crlf_line_endings() {
        let body = chunk("A").replace('\n', "\r\n");
        assert_eq!(accumulate(&body), "A");
    }

    #[test]
    fn test_decode_unrecognized_event() {
        let event = WorkflowEvent::decode(r#"data: {"event":"ping"}"#);
        assert_eq!(event, Some(WorkflowEvent::Unrecognized("ping".to_string())));
        assert_eq!(WorkflowEvent::decode("id: 1"), None);
    }
}
