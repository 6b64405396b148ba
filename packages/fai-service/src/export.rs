use serde_json::Value;

use crate::{FacilitaiService, Result};

impl FacilitaiService {
	/// The store's full dump: taxonomy, collections and every process, unmodified.
	pub async fn export(&self) -> Result<Value> {
		let data = self.providers.store.fetch_all(&self.cfg.store).await?;

		tracing::info!(
			processes = data.get("processes").and_then(serde_json::Value::as_array).map_or(0, Vec::len),
			"Exported store data."
		);

		Ok(data)
	}
}
