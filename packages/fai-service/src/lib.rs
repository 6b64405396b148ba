pub mod context;
pub mod export;
pub mod prompts;
pub mod query;
pub mod training;

mod error;

pub use error::{Error, Result};
pub use query::{QueryRequest, QueryResponse};
pub use training::TrainingPair;

use std::{future::Future, pin::Pin, sync::Arc};

use serde_json::Value;

use fai_config::{Config, LlmProviderConfig, Store};
use fai_providers::completion::{self, ChatMessage};
use fai_storage::{
	GraphQlStore,
	models::{ProcessRecord, Taxonomy},
};

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

pub trait CompletionProvider
where
	Self: Send + Sync,
{
	fn complete<'a>(
		&'a self,
		cfg: &'a LlmProviderConfig,
		messages: &'a [ChatMessage],
	) -> BoxFuture<'a, color_eyre::Result<String>>;
}

pub trait ContentStore
where
	Self: Send + Sync,
{
	fn fetch_taxonomy<'a>(
		&'a self,
		cfg: &'a Store,
	) -> BoxFuture<'a, fai_storage::Result<Taxonomy>>;

	fn fetch_processes<'a>(
		&'a self,
		cfg: &'a Store,
		filter: &'a str,
	) -> BoxFuture<'a, fai_storage::Result<Vec<ProcessRecord>>>;

	fn fetch_all<'a>(&'a self, cfg: &'a Store) -> BoxFuture<'a, fai_storage::Result<Value>>;
}

#[derive(Clone)]
pub struct Providers {
	pub completion: Arc<dyn CompletionProvider>,
	pub store: Arc<dyn ContentStore>,
}
impl Providers {
	pub fn new(completion: Arc<dyn CompletionProvider>, store: Arc<dyn ContentStore>) -> Self {
		Self { completion, store }
	}
}

impl Default for Providers {
	fn default() -> Self {
		let provider = Arc::new(DefaultProviders);

		Self { completion: provider.clone(), store: provider }
	}
}

pub struct FacilitaiService {
	pub cfg: Config,
	pub providers: Providers,
}
impl FacilitaiService {
	pub fn new(cfg: Config) -> Self {
		Self { cfg, providers: Providers::default() }
	}

	pub fn with_providers(cfg: Config, providers: Providers) -> Self {
		Self { cfg, providers }
	}
}

struct DefaultProviders;

impl CompletionProvider for DefaultProviders {
	fn complete<'a>(
		&'a self,
		cfg: &'a LlmProviderConfig,
		messages: &'a [ChatMessage],
	) -> BoxFuture<'a, color_eyre::Result<String>> {
		Box::pin(completion::complete(cfg, messages))
	}
}

impl ContentStore for DefaultProviders {
	fn fetch_taxonomy<'a>(
		&'a self,
		cfg: &'a Store,
	) -> BoxFuture<'a, fai_storage::Result<Taxonomy>> {
		Box::pin(async move { GraphQlStore::new(cfg)?.fetch_taxonomy().await })
	}

	fn fetch_processes<'a>(
		&'a self,
		cfg: &'a Store,
		filter: &'a str,
	) -> BoxFuture<'a, fai_storage::Result<Vec<ProcessRecord>>> {
		Box::pin(async move { GraphQlStore::new(cfg)?.fetch_processes(filter).await })
	}

	fn fetch_all<'a>(&'a self, cfg: &'a Store) -> BoxFuture<'a, fai_storage::Result<Value>> {
		Box::pin(async move { GraphQlStore::new(cfg)?.fetch_all().await })
	}
}
