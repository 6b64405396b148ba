//! Line buffering for `text/event-stream` bodies.
//!
//! Network chunks do not line up with event boundaries: one chunk can carry several events and
//! one event can span several chunks, including a split inside a multi-byte character. Bytes are
//! held until a full line is available and only then decoded.

use std::mem;

const DONE_MARKER: &str = "[DONE]";

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SseEvent {
	/// The payload of a `data:` line, prefix removed.
	Data(String),
	/// The OpenAI-style `data: [DONE]` terminator.
	Done,
}

#[derive(Debug, Default)]
pub struct SseLineBuffer {
	pending: Vec<u8>,
}
impl SseLineBuffer {
	/// Appends a chunk and returns the events completed by it.
	pub fn feed(&mut self, chunk: &[u8]) -> Vec<SseEvent> {
		self.pending.extend_from_slice(chunk);

		let mut events = Vec::new();

		while let Some(newline) = self.pending.iter().position(|byte| *byte == b'\n') {
			let line: Vec<u8> = self.pending.drain(..=newline).collect();

			if let Some(event) = parse_line(&String::from_utf8_lossy(&line)) {
				events.push(event);
			}
		}

		events
	}

	/// Drains a final line that arrived without a trailing newline.
	pub fn flush(&mut self) -> Option<SseEvent> {
		let rest = mem::take(&mut self.pending);

		parse_line(&String::from_utf8_lossy(&rest))
	}
}

fn parse_line(line: &str) -> Option<SseEvent> {
	// `event:`, `id:`, `retry:` and `:` comment lines carry nothing we use.
	let data = line.trim().strip_prefix("data:")?.trim_start();

	if data.is_empty() {
		return None;
	}
	if data == DONE_MARKER {
		return Some(SseEvent::Done);
	}

	Some(SseEvent::Data(data.to_string()))
}
