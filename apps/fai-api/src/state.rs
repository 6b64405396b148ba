use std::sync::Arc;

use fai_service::{FacilitaiService, Providers};

#[derive(Clone)]
pub struct AppState {
	pub service: Arc<FacilitaiService>,
}
impl AppState {
	pub fn new(config: fai_config::Config) -> Self {
		Self::with_providers(config, Providers::default())
	}

	pub fn with_providers(config: fai_config::Config, providers: Providers) -> Self {
		Self { service: Arc::new(FacilitaiService::with_providers(config, providers)) }
	}
}
