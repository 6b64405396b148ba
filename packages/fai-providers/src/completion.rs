use std::{error::Error as StdError, pin, time::Duration};

use bytes::Bytes;
use color_eyre::{Result, eyre};
use futures::{Stream, StreamExt};
use reqwest::{Client, header::CONTENT_TYPE};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::sse::{SseEvent, SseLineBuffer};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
	System,
	User,
	Assistant,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
	pub role: Role,
	pub content: String,
}
impl ChatMessage {
	pub fn user(content: impl Into<String>) -> Self {
		Self { role: Role::User, content: content.into() }
	}
}

/// Sends `messages` to an OpenAI-compatible chat completions endpoint and returns the trimmed
/// answer text.
///
/// The request asks for a streamed answer and the deltas are concatenated as they arrive. A
/// stream that fails before any content is an error. One that fails after some content yields
/// the partial answer. A stream that finishes without content yields the empty string.
pub async fn complete(
	cfg: &fai_config::LlmProviderConfig,
	messages: &[ChatMessage],
) -> Result<String> {
	let client = Client::builder().timeout(Duration::from_millis(cfg.timeout_ms)).build()?;
	let url = format!("{}{}", cfg.api_base, cfg.path);
	let body = serde_json::json!({
		"model": cfg.model,
		"messages": messages,
		"temperature": cfg.temperature,
		"max_tokens": cfg.max_tokens,
		"top_p": cfg.top_p,
		"stream": true,
	});
	let res = client
		.post(&url)
		.headers(crate::auth_headers(&cfg.api_key, &cfg.default_headers)?)
		.json(&body)
		.send()
		.await?
		.error_for_status()?;
	let is_json = res
		.headers()
		.get(CONTENT_TYPE)
		.and_then(|value| value.to_str().ok())
		.is_some_and(|value| value.starts_with("application/json"));

	// Some gateways ignore `stream` and answer with a single completion object.
	if is_json {
		let json: Value = res.json().await?;

		return Ok(parse_message_content(&json)?.trim().to_string());
	}

	let mut answer = String::new();

	match accumulate_stream(res.bytes_stream(), &mut answer).await {
		Ok(()) => Ok(answer.trim().to_string()),
		Err(err) if answer.trim().is_empty() => Err(err),
		Err(err) => {
			tracing::warn!(
				error = %err,
				received_bytes = answer.len(),
				model = %cfg.model,
				"Completion stream ended early. Returning the partial answer."
			);

			Ok(answer.trim().to_string())
		},
	}
}

/// Appends every content delta in `stream` to `answer` until the stream ends or sends `[DONE]`.
pub async fn accumulate_stream<S, E>(stream: S, answer: &mut String) -> Result<()>
where
	S: Stream<Item = Result<Bytes, E>>,
	E: StdError + Send + Sync + 'static,
{
	let mut stream = pin::pin!(stream);
	let mut buffer = SseLineBuffer::default();

	while let Some(chunk) = stream.next().await {
		for event in buffer.feed(&chunk?) {
			match event {
				SseEvent::Data(data) => push_delta(&data, answer)?,
				SseEvent::Done => return Ok(()),
			}
		}
	}

	if let Some(SseEvent::Data(data)) = buffer.flush() {
		push_delta(&data, answer)?;
	}

	Ok(())
}

fn push_delta(data: &str, answer: &mut String) -> Result<()> {
	let json: Value = serde_json::from_str(data)
		.map_err(|err| eyre::eyre!("Completion stream event is not valid JSON: {err}."))?;

	if let Some(error) = json.get("error") {
		return Err(eyre::eyre!("Completion stream reported an error: {error}."));
	}
	if let Some(content) = json
		.get("choices")
		.and_then(|v| v.as_array())
		.and_then(|arr| arr.first())
		.and_then(|choice| choice.get("delta"))
		.and_then(|delta| delta.get("content"))
		.and_then(|c| c.as_str())
	{
		answer.push_str(content);
	}

	Ok(())
}

fn parse_message_content(json: &Value) -> Result<&str> {
	json.get("choices")
		.and_then(|v| v.as_array())
		.and_then(|arr| arr.first())
		.and_then(|choice| choice.get("message"))
		.and_then(|msg| msg.get("content"))
		.and_then(|c| c.as_str())
		.ok_or_else(|| eyre::eyre!("Completion response is missing message content."))
}

#[cfg(test)]
mod tests {
	use std::io;

	use futures::stream;

	use super::*;

	fn chunk(text: &str) -> Result<Bytes, io::Error> {
		Ok(Bytes::copy_from_slice(text.as_bytes()))
	}

	fn delta(content: &str) -> String {
		format!(
			"data: {}\n\n",
			serde_json::json!({ "choices": [{ "index": 0, "delta": { "content": content } }] })
		)
	}

	#[tokio::test]
	async fn concatenates_deltas_until_done() {
		let chunks = vec![
			chunk(&delta("Hello")),
			chunk(&format!("{}{}", delta(", "), delta("world"))),
			chunk("data: [DONE]\n\n"),
			chunk(&delta("ignored")),
		];
		let mut answer = String::new();

		accumulate_stream(stream::iter(chunks), &mut answer).await.expect("stream failed");

		assert_eq!(answer, "Hello, world");
	}

	#[tokio::test]
	async fn skips_role_only_deltas() {
		let role_only = "data: {\"choices\":[{\"index\":0,\"delta\":{\"role\":\"assistant\"}}]}\n\n";
		let chunks = vec![chunk(role_only), chunk(&delta("ok"))];
		let mut answer = String::new();

		accumulate_stream(stream::iter(chunks), &mut answer).await.expect("stream failed");

		assert_eq!(answer, "ok");
	}

	#[tokio::test]
	async fn keeps_partial_content_when_the_stream_breaks() {
		let chunks = vec![
			chunk(&delta("partial")),
			Err(io::Error::new(io::ErrorKind::ConnectionReset, "reset")),
		];
		let mut answer = String::new();
		let result = accumulate_stream(stream::iter(chunks), &mut answer).await;

		assert!(result.is_err());
		assert_eq!(answer, "partial");
	}

	#[tokio::test]
	async fn surfaces_error_events() {
		let chunks = vec![chunk("data: {\"error\":\"Model is overloaded\"}\n\n")];
		let mut answer = String::new();
		let err = accumulate_stream(stream::iter(chunks), &mut answer)
			.await
			.expect_err("Expected a stream error.");

		assert!(err.to_string().contains("Model is overloaded"));
	}

	#[test]
	fn parses_non_streamed_message_content() {
		let json = serde_json::json!({
			"choices": [{ "message": { "role": "assistant", "content": " Hi " } }]
		});

		assert_eq!(parse_message_content(&json).expect("parse failed"), " Hi ");
		assert!(parse_message_content(&serde_json::json!({})).is_err());
	}
}
