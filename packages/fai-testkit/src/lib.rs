//! A local stand-in for both upstreams: the GraphQL content store and the chat completions
//! endpoint. Tests mount canned responses on it and point a [`fai_config::Config`] at it.

use serde_json::{Map, Value};
use wiremock::{
	Mock, MockServer, ResponseTemplate,
	matchers::{body_string_contains, method, path},
};

use fai_config::{Config, LlmProviderConfig, Providers, Service, Store, Training};

pub const GRAPHQL_PATH: &str = "/api/graphql";
pub const COMPLETION_PATH: &str = "/v1/chat/completions";
pub const TEST_MODEL: &str = "test-model";

pub struct MockUpstream {
	server: MockServer,
}
impl MockUpstream {
	pub async fn start() -> Self {
		Self { server: MockServer::start().await }
	}

	pub fn server(&self) -> &MockServer {
		&self.server
	}

	/// A valid configuration whose store and model both live on this server.
	pub fn config(&self) -> Config {
		test_config(&self.server.uri())
	}

	/// Answers GraphQL requests whose body contains `marker` with `{ "data": data }`.
	pub async fn mount_graphql(&self, marker: &str, data: Value) {
		Mock::given(method("POST"))
			.and(path(GRAPHQL_PATH))
			.and(body_string_contains(marker))
			.respond_with(
				ResponseTemplate::new(200).set_body_json(serde_json::json!({ "data": data })),
			)
			.mount(&self.server)
			.await;
	}

	pub async fn mount_graphql_errors(&self, message: &str) {
		Mock::given(method("POST"))
			.and(path(GRAPHQL_PATH))
			.respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
				"errors": [{ "message": message }],
			})))
			.mount(&self.server)
			.await;
	}

	/// Streams `deltas` as chat completion chunks for requests whose body contains `marker`.
	pub async fn mount_completion(&self, marker: &str, deltas: &[&str]) {
		Mock::given(method("POST"))
			.and(path(COMPLETION_PATH))
			.and(body_string_contains(marker))
			.respond_with(
				ResponseTemplate::new(200).set_body_raw(sse_body(deltas), "text/event-stream"),
			)
			.mount(&self.server)
			.await;
	}

	pub async fn mount_completion_status(&self, status: u16) {
		Mock::given(method("POST"))
			.and(path(COMPLETION_PATH))
			.respond_with(ResponseTemplate::new(status))
			.mount(&self.server)
			.await;
	}

	/// Request bodies received on `request_path`, oldest first.
	pub async fn request_bodies(&self, request_path: &str) -> Vec<Value> {
		self.server
			.received_requests()
			.await
			.unwrap_or_default()
			.into_iter()
			.filter(|request| request.url.path() == request_path)
			.filter_map(|request| serde_json::from_slice(&request.body).ok())
			.collect()
	}
}

/// A valid configuration pointing both upstreams at `base_url`.
pub fn test_config(base_url: &str) -> Config {
	Config {
		service: Service { http_bind: "127.0.0.1:0".to_string(), log_level: "info".to_string() },
		store: Store {
			graphql_url: format!("{base_url}{GRAPHQL_PATH}"),
			timeout_ms: 5_000,
			api_key: None,
			default_headers: headers(&[("apollo-require-preflight", "true")]),
		},
		providers: Providers {
			llm: LlmProviderConfig {
				provider_id: "test".to_string(),
				api_base: base_url.to_string(),
				api_key: "test-key".to_string(),
				path: COMPLETION_PATH.to_string(),
				model: TEST_MODEL.to_string(),
				temperature: 0.5,
				max_tokens: 512,
				top_p: 0.9,
				timeout_ms: 5_000,
				default_headers: Map::new(),
			},
		},
		training: Training::default(),
	}
}

/// An OpenAI-style event stream carrying one delta per entry, then `[DONE]`.
pub fn sse_body(deltas: &[&str]) -> String {
	let mut body = String::new();

	for delta in deltas {
		let event = serde_json::json!({
			"object": "chat.completion.chunk",
			"choices": [{ "index": 0, "delta": { "content": delta }, "finish_reason": null }],
		});

		body.push_str(&format!("data: {event}\n\n"));
	}

	body.push_str("data: [DONE]\n\n");

	body
}

pub fn headers(pairs: &[(&str, &str)]) -> Map<String, Value> {
	pairs.iter().map(|(key, value)| (key.to_string(), Value::String(value.to_string()))).collect()
}

/// Taxonomy as the store returns it for the metadata query.
pub fn sample_taxonomy() -> Value {
	serde_json::json!({
		"genres": [{ "name": "Energizer" }, { "name": "Icebreaker" }],
		"groupTypes": [{ "name": "Large" }, { "name": "Small" }],
		"activityTypes": [{ "name": "Game" }],
		"physicalities": [{ "name": "High" }, { "name": "Low" }],
		"tags": [{ "name": "Outdoor" }],
	})
}

pub fn sample_process(title: &str, genre: &str, group_type: &str, duration: &str) -> Value {
	serde_json::json!({
		"title": title,
		"description": { "document": [
			{ "type": "paragraph", "children": [{ "text": format!("{title} gets people moving.") }] },
		] },
		"instructions": { "document": [
			{ "type": "ordered-list", "children": [
				{ "type": "list-item", "children": [{ "text": "Form a circle." }] },
				{ "type": "list-item", "children": [{ "text": "Start the game.", "bold": true }] },
			] },
		] },
		"sources": "Workshop handbook",
		"duration": duration,
		"genres": [{ "name": genre }],
		"activityTypes": [{ "name": "Game" }],
		"miscTags": [],
		"physicalities": [{ "name": "High" }],
		"groupTypes": [{ "name": group_type }],
	})
}

/// The full export payload: taxonomy, collections and every process.
pub fn sample_export() -> Value {
	let mut data = sample_taxonomy();

	if let Some(obj) = data.as_object_mut() {
		obj.insert(
			"collections".to_string(),
			serde_json::json!([{ "title": "Warm-ups" }]),
		);
		obj.insert(
			"processes".to_string(),
			serde_json::json!([
				sample_process("Zip Zap Boing", "Energizer", "Large", "10 min"),
				sample_process("Two Truths", "Icebreaker", "Small", "15 min"),
			]),
		);
	}

	data
}
