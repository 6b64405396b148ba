use std::sync::{
	Arc, Mutex,
	atomic::{AtomicUsize, Ordering},
};

use rand::{SeedableRng, rngs::StdRng};
use serde_json::Value;

use fai_config::{LlmProviderConfig, Store};
use fai_providers::completion::{ChatMessage, Role};
use fai_service::{
	BoxFuture, CompletionProvider, ContentStore, Error, FacilitaiService, Providers, QueryRequest,
	training::{self, RESPONSE_PREFIX},
};
use fai_storage::models::{ProcessRecord, Taxonomy};

const FINAL_ANSWER: &str = "## Energizers\n\n- Zip Zap Boing";

/// Answers the filter prompt with `filter_answer` and everything else with `final_answer`.
struct SpyCompletion {
	calls: Arc<AtomicUsize>,
	filter_answer: String,
	final_answer: String,
	seen: Mutex<Vec<Vec<ChatMessage>>>,
}
impl SpyCompletion {
	fn new(filter_answer: &str, final_answer: &str) -> Self {
		Self {
			calls: Arc::new(AtomicUsize::new(0)),
			filter_answer: filter_answer.to_string(),
			final_answer: final_answer.to_string(),
			seen: Mutex::new(Vec::new()),
		}
	}

	fn count(&self) -> usize {
		self.calls.load(Ordering::SeqCst)
	}

	fn last_prompt(&self) -> String {
		let seen = self.seen.lock().unwrap_or_else(|err| err.into_inner());

		seen.last()
			.and_then(|messages| messages.last())
			.map(|message| message.content.clone())
			.unwrap_or_default()
	}
}
impl CompletionProvider for SpyCompletion {
	fn complete<'a>(
		&'a self,
		_cfg: &'a LlmProviderConfig,
		messages: &'a [ChatMessage],
	) -> BoxFuture<'a, color_eyre::Result<String>> {
		self.calls.fetch_add(1, Ordering::SeqCst);
		self.seen.lock().unwrap_or_else(|err| err.into_inner()).push(messages.to_vec());

		let is_filter_prompt =
			messages.last().is_some_and(|message| message.content.contains("---- Metadata:"));
		let answer =
			if is_filter_prompt { self.filter_answer.clone() } else { self.final_answer.clone() };

		Box::pin(async move { Ok(answer) })
	}
}

struct SpyStore {
	taxonomy: Value,
	processes: Vec<ProcessRecord>,
	taxonomy_calls: AtomicUsize,
	process_calls: AtomicUsize,
	filters: Mutex<Vec<String>>,
}
impl SpyStore {
	fn new(taxonomy: Value) -> Self {
		let processes = serde_json::from_value(serde_json::json!([fai_testkit::sample_process(
			"Zip Zap Boing",
			"Energizer",
			"Large",
			"10 min"
		)]))
		.expect("Failed to decode sample processes.");

		Self {
			taxonomy,
			processes,
			taxonomy_calls: AtomicUsize::new(0),
			process_calls: AtomicUsize::new(0),
			filters: Mutex::new(Vec::new()),
		}
	}
}
impl ContentStore for SpyStore {
	fn fetch_taxonomy<'a>(
		&'a self,
		_cfg: &'a Store,
	) -> BoxFuture<'a, fai_storage::Result<Taxonomy>> {
		self.taxonomy_calls.fetch_add(1, Ordering::SeqCst);

		Box::pin(async move { Taxonomy::from_data(&self.taxonomy) })
	}

	fn fetch_processes<'a>(
		&'a self,
		_cfg: &'a Store,
		filter: &'a str,
	) -> BoxFuture<'a, fai_storage::Result<Vec<ProcessRecord>>> {
		self.process_calls.fetch_add(1, Ordering::SeqCst);
		self.filters.lock().unwrap_or_else(|err| err.into_inner()).push(filter.to_string());

		Box::pin(async move { Ok(self.processes.clone()) })
	}

	fn fetch_all<'a>(&'a self, _cfg: &'a Store) -> BoxFuture<'a, fai_storage::Result<Value>> {
		Box::pin(async move { Ok(fai_testkit::sample_export()) })
	}
}

fn build_service(completion: Arc<SpyCompletion>, store: Arc<SpyStore>) -> FacilitaiService {
	let cfg = fai_testkit::test_config("http://127.0.0.1:9");

	FacilitaiService::with_providers(cfg, Providers::new(completion, store))
}

fn spies(filter_answer: &str, final_answer: &str) -> (Arc<SpyCompletion>, Arc<SpyStore>) {
	(
		Arc::new(SpyCompletion::new(filter_answer, final_answer)),
		Arc::new(SpyStore::new(fai_testkit::sample_taxonomy())),
	)
}

#[tokio::test]
async fn initial_query_searches_with_the_repaired_filter() {
	let (completion, store) = spies(
		"```json\n{ groupTypes: { in: [\"Large\"] }, genres_in: [\"Energizer\"] }\n```",
		FINAL_ANSWER,
	);
	let service = build_service(completion.clone(), store.clone());
	let response = service
		.query(QueryRequest::from_messages(vec![ChatMessage::user(
			"short energizers for large groups",
		)]))
		.await
		.expect("Query failed.");
	let expected_filter = "{ groupTypes: { some: { name: { in: [\"Large\"] } } }, genres: { some: { name: { in: [\"Energizer\"] } } } }";

	assert_eq!(response.response, FINAL_ANSWER);
	assert_eq!(response.filter.as_deref(), Some(expected_filter));
	assert_eq!(completion.count(), 2);
	assert_eq!(store.taxonomy_calls.load(Ordering::SeqCst), 1);
	assert_eq!(store.process_calls.load(Ordering::SeqCst), 1);
	assert_eq!(
		store.filters.lock().unwrap_or_else(|err| err.into_inner()).as_slice(),
		[expected_filter.to_string()]
	);

	let prompt = response.prompt.expect("Initial queries return the answer prompt.");

	assert!(prompt.contains("short energizers for large groups"));
	assert!(prompt.contains("Title: Zip Zap Boing"));
	assert!(prompt.contains("Instructions: 1. Form a circle. 2. **Start the game.**"));
	assert_eq!(completion.last_prompt(), prompt);
}

#[tokio::test]
async fn filter_prompt_lists_taxonomy_with_misc_tags() {
	let (completion, store) = spies("\"\"", FINAL_ANSWER);
	let service = build_service(completion.clone(), store);

	service.derive_filter("outdoor games").await.expect("Deriving the filter failed.");

	let prompt = completion.last_prompt();

	assert!(prompt.contains("genres: Energizer, Icebreaker\ngroupTypes: Large, Small"));
	assert!(prompt.contains("\nmiscTags: Outdoor"));
	assert!(prompt.ends_with("---- User Query:\noutdoor games"));
}

#[tokio::test]
async fn empty_filter_skips_the_process_search() {
	let (completion, store) = spies("\"\"", FINAL_ANSWER);
	let service = build_service(completion.clone(), store.clone());
	let response = service
		.query(QueryRequest { messages: None, query: Some("tell me a joke".to_string()) })
		.await
		.expect("Query failed.");

	assert_eq!(response.filter.as_deref(), Some(""));
	assert_eq!(store.taxonomy_calls.load(Ordering::SeqCst), 1);
	assert_eq!(store.process_calls.load(Ordering::SeqCst), 0);
	assert_eq!(completion.count(), 2);
	assert!(response.prompt.is_some_and(|prompt| prompt.ends_with("Database:\n\n")));
}

#[tokio::test]
async fn follow_up_goes_straight_to_the_model() {
	let (completion, store) = spies("{ genres_in: [\"Energizer\"] }", "Sure, here is more detail.");
	let service = build_service(completion.clone(), store.clone());
	let history = vec![
		ChatMessage::user("energizers"),
		ChatMessage { role: Role::Assistant, content: "Try Zip Zap Boing.".to_string() },
		ChatMessage::user("How long does it take?"),
	];
	let response =
		service.query(QueryRequest::from_messages(history.clone())).await.expect("Query failed.");

	assert_eq!(response.response, "Sure, here is more detail.");
	assert!(response.prompt.is_none());
	assert!(response.filter.is_none());
	assert_eq!(completion.count(), 1);
	assert_eq!(store.taxonomy_calls.load(Ordering::SeqCst), 0);
	assert_eq!(store.process_calls.load(Ordering::SeqCst), 0);

	let seen = completion.seen.lock().unwrap_or_else(|err| err.into_inner());

	assert_eq!(seen[0], history);
	assert_eq!(seen[0][1].role, Role::Assistant);
}

#[tokio::test]
async fn unparseable_filter_fails_the_query() {
	let (completion, store) = spies("Sorry, I can only talk about facilitation.", FINAL_ANSWER);
	let service = build_service(completion.clone(), store.clone());
	let err = service
		.query(QueryRequest::from_messages(vec![ChatMessage::user("energizers")]))
		.await
		.expect_err("Expected a filter parse error.");

	assert!(matches!(err, Error::FilterParse { .. }), "Unexpected error: {err}");
	assert_eq!(completion.count(), 1);
	assert_eq!(store.process_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn empty_final_answer_becomes_the_sentinel() {
	let (completion, store) = spies("{ genres_in: [\"Energizer\"] }", "   ");
	let service = build_service(completion, store);
	let response = service
		.query(QueryRequest::from_messages(vec![ChatMessage::user("energizers")]))
		.await
		.expect("Query failed.");

	assert_eq!(response.response, fai_service::query::EMPTY_ANSWER);
}

#[tokio::test]
async fn malformed_taxonomy_is_reported() {
	let completion = Arc::new(SpyCompletion::new("{}", FINAL_ANSWER));
	let store = Arc::new(SpyStore::new(serde_json::json!({ "genres": [] })));
	let service = build_service(completion.clone(), store);
	let err = service
		.query(QueryRequest::from_messages(vec![ChatMessage::user("energizers")]))
		.await
		.expect_err("Expected a taxonomy error.");

	assert!(matches!(err, Error::MalformedTaxonomyResponse { .. }), "Unexpected error: {err}");
	assert_eq!(completion.count(), 0);
}

#[tokio::test]
async fn missing_input_makes_no_upstream_calls() {
	let (completion, store) = spies("{}", FINAL_ANSWER);
	let service = build_service(completion.clone(), store.clone());
	let err = service.query(QueryRequest::default()).await.expect_err("Expected missing input.");

	assert!(matches!(err, Error::MissingInput));
	assert_eq!(completion.count(), 0);
	assert_eq!(store.taxonomy_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn export_returns_the_store_dump() {
	let (completion, store) = spies("{}", FINAL_ANSWER);
	let service = build_service(completion, store);
	let data = service.export().await.expect("Export failed.");

	assert_eq!(data, fai_testkit::sample_export());
}

#[tokio::test]
async fn training_data_rejects_out_of_range_counts() {
	let (completion, store) = spies("{}", FINAL_ANSWER);
	let service = build_service(completion, store);

	for count in [0, 5_001] {
		let err = service.training_data(Some(count)).await.expect_err("Expected a bad count.");

		assert!(matches!(err, Error::InvalidRequest { .. }), "Count: {count}");
	}
}

#[test]
fn synthesizes_pairs_grounded_in_matching_processes() {
	let mut rng = StdRng::seed_from_u64(42);
	let pairs = training::synthesize(&fai_testkit::sample_export(), 20, 50, &mut rng)
		.expect("Synthesis failed.");

	assert_eq!(pairs.len(), 20);

	for pair in &pairs {
		assert!(!pair.prompt.contains('{'), "Unfilled prompt: {}", pair.prompt);
		assert!(pair.response.starts_with(RESPONSE_PREFIX));
		assert!(
			pair.response.contains("# Zip Zap Boing") || pair.response.contains("# Two Truths")
		);
		assert!(pair.response.contains(". These are the instructions:\n\n1. Form a circle."));
	}
}

#[test]
fn synthesis_stops_at_the_attempt_limit() {
	let data = serde_json::json!({
		"genres": [{ "name": "Energizer" }],
		"groupTypes": [{ "name": "Large" }],
		"activityTypes": [],
		"physicalities": [],
		"tags": [],
		"processes": [{ "title": "Untagged", "duration": "" }],
	});
	let mut rng = StdRng::seed_from_u64(1);
	let pairs = training::synthesize(&data, 3, 5, &mut rng).expect("Synthesis failed.");

	assert!(pairs.is_empty());
}
