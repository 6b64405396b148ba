mod error;
mod types;

pub use error::{Error, Result};
pub use types::{Config, LlmProviderConfig, Providers, Service, Store, Training};

use std::{fs, net::SocketAddr, path::Path};

use serde_json::{Map, Value};

pub fn load(path: &Path) -> Result<Config> {
	let raw = fs::read_to_string(path)
		.map_err(|err| Error::ReadConfig { path: path.to_path_buf(), source: err })?;

	let mut cfg: Config = toml::from_str(&raw)
		.map_err(|err| Error::ParseConfig { path: path.to_path_buf(), source: err })?;

	normalize(&mut cfg);

	validate(&cfg)?;

	Ok(cfg)
}

pub fn validate(cfg: &Config) -> Result<()> {
	if cfg.service.http_bind.parse::<SocketAddr>().is_err() {
		return Err(Error::Validation {
			message: "service.http_bind must be a socket address, e.g. 127.0.0.1:3000.".to_string(),
		});
	}
	if cfg.service.log_level.trim().is_empty() {
		return Err(Error::Validation {
			message: "service.log_level must be non-empty.".to_string(),
		});
	}
	if !is_http_url(&cfg.store.graphql_url) {
		return Err(Error::Validation {
			message: "store.graphql_url must be an http(s) URL.".to_string(),
		});
	}
	if cfg.store.timeout_ms == 0 {
		return Err(Error::Validation {
			message: "store.timeout_ms must be greater than zero.".to_string(),
		});
	}

	validate_headers("store.default_headers", &cfg.store.default_headers)?;

	let llm = &cfg.providers.llm;

	for (label, value) in [
		("providers.llm.provider_id", &llm.provider_id),
		("providers.llm.api_key", &llm.api_key),
		("providers.llm.path", &llm.path),
		("providers.llm.model", &llm.model),
	] {
		if value.trim().is_empty() {
			return Err(Error::Validation { message: format!("{label} must be non-empty.") });
		}
	}

	if !is_http_url(&llm.api_base) {
		return Err(Error::Validation {
			message: "providers.llm.api_base must be an http(s) URL.".to_string(),
		});
	}
	if !llm.path.starts_with('/') {
		return Err(Error::Validation {
			message: "providers.llm.path must start with '/'.".to_string(),
		});
	}
	if !llm.temperature.is_finite() || !(0.0..=2.0).contains(&llm.temperature) {
		return Err(Error::Validation {
			message: "providers.llm.temperature must be in the range 0.0-2.0.".to_string(),
		});
	}
	if !llm.top_p.is_finite() || llm.top_p <= 0.0 || llm.top_p > 1.0 {
		return Err(Error::Validation {
			message: "providers.llm.top_p must be greater than 0.0 and at most 1.0.".to_string(),
		});
	}
	if llm.max_tokens == 0 {
		return Err(Error::Validation {
			message: "providers.llm.max_tokens must be greater than zero.".to_string(),
		});
	}
	if llm.timeout_ms == 0 {
		return Err(Error::Validation {
			message: "providers.llm.timeout_ms must be greater than zero.".to_string(),
		});
	}

	validate_headers("providers.llm.default_headers", &llm.default_headers)?;

	let training = &cfg.training;

	if training.max_num_prompts == 0 || training.max_attempts_per_prompt == 0 {
		return Err(Error::Validation {
			message:
				"training.max_num_prompts and training.max_attempts_per_prompt must be greater than zero."
					.to_string(),
		});
	}
	if training.default_num_prompts > training.max_num_prompts {
		return Err(Error::Validation {
			message: "training.default_num_prompts must not exceed training.max_num_prompts."
				.to_string(),
		});
	}

	Ok(())
}

fn normalize(cfg: &mut Config) {
	if cfg.store.api_key.as_deref().map(|key| key.trim().is_empty()).unwrap_or(false) {
		cfg.store.api_key = None;
	}

	let trimmed = cfg.providers.llm.api_base.trim_end_matches('/').len();

	cfg.providers.llm.api_base.truncate(trimmed);
}

fn validate_headers(label: &str, headers: &Map<String, Value>) -> Result<()> {
	if headers.values().any(|value| !value.is_string()) {
		return Err(Error::Validation { message: format!("{label} values must be strings.") });
	}

	Ok(())
}

fn is_http_url(raw: &str) -> bool {
	let raw = raw.trim();

	raw.starts_with("http://") || raw.starts_with("https://")
}
