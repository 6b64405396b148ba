use serde::Deserialize;
use serde_json::{Map, Value};

#[derive(Debug, Deserialize)]
pub struct Config {
	pub service: Service,
	pub store: Store,
	pub providers: Providers,
	#[serde(default)]
	pub training: Training,
}

#[derive(Debug, Deserialize)]
pub struct Service {
	pub http_bind: String,
	pub log_level: String,
}

/// The remote GraphQL content store holding processes and their taxonomy.
#[derive(Debug, Deserialize)]
pub struct Store {
	pub graphql_url: String,
	pub timeout_ms: u64,
	/// Optional. Bearer token for stores that are not publicly readable.
	pub api_key: Option<String>,
	#[serde(default)]
	pub default_headers: Map<String, Value>,
}

#[derive(Debug, Deserialize)]
pub struct Providers {
	pub llm: LlmProviderConfig,
}

#[derive(Debug, Deserialize)]
pub struct LlmProviderConfig {
	pub provider_id: String,
	pub api_base: String,
	pub api_key: String,
	pub path: String,
	pub model: String,
	pub temperature: f32,
	pub max_tokens: u32,
	#[serde(default = "default_top_p")]
	pub top_p: f32,
	pub timeout_ms: u64,
	#[serde(default)]
	pub default_headers: Map<String, Value>,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Training {
	pub default_num_prompts: u32,
	pub max_num_prompts: u32,
	/// Template draws allowed per requested prompt before generation gives up.
	pub max_attempts_per_prompt: u32,
}
impl Default for Training {
	fn default() -> Self {
		Self { default_num_prompts: 100, max_num_prompts: 5_000, max_attempts_per_prompt: 50 }
	}
}

fn default_top_p() -> f32 {
	0.9
}
