use std::time::Duration;

use reqwest::{
	Client,
	header::{AUTHORIZATION, HeaderMap, HeaderName, HeaderValue},
};
use serde_json::Value;

use crate::{
	Error, Result,
	models::{ProcessRecord, Taxonomy},
	queries,
};

/// Read-only client for the content store's GraphQL endpoint.
pub struct GraphQlStore {
	client: Client,
	url: String,
}
impl GraphQlStore {
	pub fn new(cfg: &fai_config::Store) -> Result<Self> {
		let client = Client::builder()
			.timeout(Duration::from_millis(cfg.timeout_ms))
			.default_headers(store_headers(cfg)?)
			.build()?;

		Ok(Self { client, url: cfg.graphql_url.clone() })
	}

	pub async fn fetch_taxonomy(&self) -> Result<Taxonomy> {
		let data = self.query(&queries::taxonomy_query()).await?;

		Taxonomy::from_data(&data)
	}

	/// Fetches the processes matching a repaired filter literal.
	pub async fn fetch_processes(&self, filter: &str) -> Result<Vec<ProcessRecord>> {
		let filter = filter.trim();

		if filter.is_empty() {
			return Err(Error::InvalidArgument(
				"A process search requires a non-empty filter.".to_string(),
			));
		}

		let mut data = self.query(&queries::processes_query(filter)).await?;
		let processes = data.get_mut("processes").map(Value::take).unwrap_or(Value::Null);

		if processes.is_null() {
			return Ok(Vec::new());
		}

		serde_json::from_value(processes).map_err(|err| Error::Malformed {
			message: format!("Processes could not be decoded: {err}."),
		})
	}

	/// Taxonomy, collections and every process, as the store returned them.
	pub async fn fetch_all(&self) -> Result<Value> {
		self.query(&queries::export_query()).await
	}

	async fn query(&self, query: &str) -> Result<Value> {
		tracing::debug!(url = %self.url, query_len = query.len(), "Sending GraphQL query.");

		let body = serde_json::json!({ "query": query });
		let res = self.client.post(&self.url).json(&body).send().await?.error_for_status()?;
		let mut json: Value = res.json().await?;

		if let Some(errors) = json.get("errors").and_then(Value::as_array)
			&& !errors.is_empty()
		{
			let message = errors
				.iter()
				.map(|error| {
					error.get("message").and_then(Value::as_str).unwrap_or("unknown error")
				})
				.collect::<Vec<_>>()
				.join("; ");

			return Err(Error::GraphQl { message });
		}

		match json.get_mut("data").map(Value::take) {
			Some(data) if data.is_object() => Ok(data),
			_ => Err(Error::Malformed { message: "No data returned from the query.".to_string() }),
		}
	}
}

fn store_headers(cfg: &fai_config::Store) -> Result<HeaderMap> {
	let mut headers = HeaderMap::new();

	if let Some(api_key) = cfg.api_key.as_deref() {
		headers.insert(AUTHORIZATION, header_value(&format!("Bearer {api_key}"))?);
	}

	for (key, value) in &cfg.default_headers {
		let Some(raw) = value.as_str() else {
			return Err(Error::InvalidArgument(
				"Default header values must be strings.".to_string(),
			));
		};
		let name = HeaderName::from_bytes(key.as_bytes())
			.map_err(|_| Error::InvalidArgument(format!("Invalid header name {key:?}.")))?;

		headers.insert(name, header_value(raw)?);
	}

	Ok(headers)
}

fn header_value(raw: &str) -> Result<HeaderValue> {
	HeaderValue::from_str(raw)
		.map_err(|_| Error::InvalidArgument("Header values must be visible ASCII.".to_string()))
}
